use actix_web::web::Data;
use actix_web::{get, HttpRequest, HttpResponse};
use tracing::instrument;

use crate::routes::users::session_user;
use crate::types::ErrorResponse;
use crate::utils::SessionTokens;

#[instrument(name = "Checking session.", skip(req, sessions))]
#[get("/check")]
pub async fn check_auth(req: HttpRequest, sessions: Data<SessionTokens>) -> HttpResponse {
    match session_user(&req, &sessions) {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(e) => {
            tracing::event!(target: "backend", tracing::Level::DEBUG, "No valid session: {}", e);
            HttpResponse::Unauthorized().json(ErrorResponse {
                error: "You are not authenticated".to_string(),
            })
        }
    }
}
