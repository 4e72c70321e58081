use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::Cookie;
use actix_web::web::{scope, ServiceConfig};
use actix_web::{HttpRequest, HttpResponse, HttpResponseBuilder};

use crate::types::{ErrorResponse, SessionUser, TokenError, SESSION_COOKIE};
use crate::utils::SessionTokens;

mod check;
mod login;
mod logout;
mod register;
mod reset_password;

use check::check_auth;
use login::login_user;
use logout::log_out;
use register::register_user;
use reset_password::{complete_password_reset, request_password_reset};

pub fn auth_routes_config(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/auth")
            .service(register_user)
            .service(login_user)
            .service(log_out)
            .service(check_auth)
            .service(request_password_reset)
            .service(complete_password_reset),
    );
}

fn session_cookie(token: String, sessions: &SessionTokens) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .max_age(CookieDuration::minutes(sessions.lifetime().num_minutes()))
        .finish()
}

fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .finish();
    cookie.make_removal();
    cookie
}

/// Issues a session token for `user`, sets it as the session cookie on
/// `builder` and answers with the sanitized user.
fn start_session(
    sessions: &SessionTokens,
    user: SessionUser,
    mut builder: HttpResponseBuilder,
) -> HttpResponse {
    match sessions.issue(&user) {
        Ok(token) => builder.cookie(session_cookie(token, sessions)).json(user),
        Err(e) => {
            tracing::event!(target: "backend", tracing::Level::ERROR, "Cannot issue session token: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Something unexpected happened. Kindly try again.".to_string(),
            })
        }
    }
}

/// The user carried by the request's session cookie, if it is valid.
fn session_user(req: &HttpRequest, sessions: &SessionTokens) -> Result<SessionUser, TokenError> {
    let cookie = req
        .cookie(SESSION_COOKIE)
        .ok_or_else(|| TokenError::Invalid("no session cookie".to_string()))?;
    sessions.verify(cookie.value())
}
