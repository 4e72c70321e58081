use actix_web::web::{Data, Json};
use actix_web::{post, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::routes::users::start_session;
use crate::store::AccountStore;
use crate::types::{Account, AuthError, ErrorResponse, StorageError};
use crate::utils::{CredentialHasher, SessionTokens};

#[derive(Serialize, Deserialize)]
pub struct NewUser {
    email: String,
    password: String,
}

#[instrument(name = "Adding a new user",
skip(store, hasher, sessions, new_user), fields(new_user_email = %new_user.email))]
#[post("/signup")]
pub async fn register_user(
    store: Data<dyn AccountStore>,
    hasher: Data<CredentialHasher>,
    sessions: Data<SessionTokens>,
    new_user: Json<NewUser>,
) -> HttpResponse {
    let NewUser { email, password } = new_user.into_inner();
    let email = email.trim().to_string();
    if email.is_empty() || password.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Email and password are required.".to_string(),
        });
    }

    let credential = match hasher.hash_new(password.as_bytes()).await {
        Ok(credential) => credential,
        Err(e) => {
            tracing::event!(target: "backend", tracing::Level::ERROR, "Unable to hash password: {}", e);
            return e.error_response();
        }
    };

    let account = Account::new(email, credential);
    match store.insert(&account).await {
        Ok(()) => {}
        Err(StorageError::DuplicateIdentifier(_)) => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "A user with that email address already exists".to_string(),
            });
        }
        Err(e) => {
            tracing::event!(target: "backend", tracing::Level::ERROR, "Failed to store new user: {}", e);
            return AuthError::from(e).error_response();
        }
    }

    tracing::event!(target: "backend", tracing::Level::INFO, "User created successfully");
    start_session(&sessions, account.session_user(), HttpResponse::Created())
}
