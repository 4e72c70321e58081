use actix_web::web::{Data, Json};
use actix_web::{post, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::types::{ErrorResponse, FrontendUrl, SuccessResponse};
use crate::utils::{send_reset_confirmation, send_reset_link, Notifier, ResetTokenManager};

#[derive(Serialize, Deserialize)]
pub struct ResetRequest {
    email: String,
}

#[derive(Serialize, Deserialize)]
pub struct ResetPassword {
    email: String,
    token: String,
    password: String,
}

#[instrument(name = "Requesting a password reset",
skip(resets, notifier, frontend_url, body), fields(user_email = %body.email))]
#[post("/reset-password-request")]
pub async fn request_password_reset(
    resets: Data<ResetTokenManager>,
    notifier: Data<dyn Notifier>,
    frontend_url: Data<FrontendUrl>,
    body: Json<ResetRequest>,
) -> HttpResponse {
    let (account, token) = match resets.request(body.email.trim()).await {
        Ok(issued) => issued,
        Err(e) => {
            tracing::event!(target: "backend", tracing::Level::WARN, "Cannot issue reset token: {}", e);
            return e.error_response();
        }
    };

    match send_reset_link(notifier.get_ref(), &frontend_url.0, &account.email, &token).await {
        Ok(()) => HttpResponse::Ok().json(SuccessResponse {
            message: "A password reset link has been sent to your e-mail address.".to_string(),
        }),
        Err(e) => {
            tracing::event!(target: "backend", tracing::Level::ERROR, "Cannot send reset link: {}", e);
            e.error_response()
        }
    }
}

#[instrument(name = "Resetting a password",
skip(resets, notifier, body), fields(user_email = %body.email))]
#[post("/reset-password")]
pub async fn complete_password_reset(
    resets: Data<ResetTokenManager>,
    notifier: Data<dyn Notifier>,
    body: Json<ResetPassword>,
) -> HttpResponse {
    if body.password.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Password cannot be empty.".to_string(),
        });
    }

    let account = match resets
        .validate_and_consume(body.email.trim(), &body.token, body.password.as_bytes())
        .await
    {
        Ok(account) => account,
        Err(e) => {
            tracing::event!(target: "backend", tracing::Level::WARN, "Password reset refused: {}", e);
            return e.error_response();
        }
    };

    // The password is already changed; a lost confirmation mail must not undo that.
    if let Err(e) = send_reset_confirmation(notifier.get_ref(), &account.email).await {
        tracing::event!(target: "backend", tracing::Level::ERROR, "Cannot send reset confirmation: {}", e);
    }

    HttpResponse::Ok().json(SuccessResponse {
        message: "Your password has been reset. You can now log in.".to_string(),
    })
}
