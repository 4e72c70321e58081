use actix_web::{get, HttpResponse};
use tracing::instrument;

use crate::routes::users::expired_session_cookie;
use crate::types::SuccessResponse;

/// Expires the session cookie. Succeeds whether or not a session existed.
#[instrument(name = "Log out user.")]
#[get("/logout")]
pub async fn log_out() -> HttpResponse {
    tracing::event!(target: "backend", tracing::Level::INFO, "Clearing session cookie.");
    HttpResponse::Ok()
        .cookie(expired_session_cookie())
        .json(SuccessResponse {
            message: "You have successfully logged out".to_string(),
        })
}
