use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::types::ErrorResponse;

/// Failures of the account store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("An account with identifier {0} already exists")]
    DuplicateIdentifier(String),
    #[error("Account {0} does not exist")]
    Missing(uuid::Uuid),
    #[error("Account store unavailable: {0}")]
    Unavailable(String),
    #[error("Stored account is corrupted: {0}")]
    Corrupted(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        StorageError::Unavailable(e.to_string())
    }
}

/// The four coarse outcomes the credential and reset operations report.
///
/// The `Display` text is for logs. Clients only ever see the fixed bodies
/// produced by the `ResponseError` impl.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Credential hashing failed: {0}")]
    HashingFailure(String),
    #[error("Credentials do not match")]
    InvalidCredential,
    #[error("Reset token is invalid or has already been used")]
    InvalidOrExpiredToken,
    #[error(transparent)]
    StorageFailure(#[from] StorageError),
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::HashingFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::InvalidCredential => StatusCode::UNAUTHORIZED,
            AuthError::InvalidOrExpiredToken => StatusCode::BAD_REQUEST,
            AuthError::StorageFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AuthError::HashingFailure(_) => "Something unexpected happened. Kindly try again.",
            AuthError::InvalidCredential => "Email and password do not match.",
            AuthError::InvalidOrExpiredToken => {
                "The reset link is invalid or has already been used. Kindly request a new one."
            }
            AuthError::StorageFailure(_) => {
                "We cannot process your request at the moment. Kindly try again later."
            }
        };
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: error.to_string(),
        })
    }
}

/// Failures of the outbound mail path.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid e-mail address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("Cannot build e-mail message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("SMTP transport failure: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
    #[error("Cannot render e-mail template: {0}")]
    Template(#[from] minijinja::Error),
}

impl ResponseError for NotifyError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_GATEWAY
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: "We could not send you an e-mail at the moment. Kindly try again.".to_string(),
        })
    }
}

/// Failures while issuing or reading a session token.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Session key rejected: {0}")]
    Key(String),
    #[error("Cannot issue session token: {0}")]
    Issue(String),
    #[error("Session token rejected: {0}")]
    Invalid(String),
}
