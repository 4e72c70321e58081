use actix_web::web::{Data, Json};
use actix_web::{post, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::routes::users::start_session;
use crate::store::AccountStore;
use crate::types::{Account, AuthError};
use crate::utils::{CredentialHasher, SessionTokens, KEY_LEN, SALT_LEN};

#[derive(Serialize, Deserialize)]
pub struct LoginUser {
    email: String,
    password: String,
}

#[instrument(name = "Logging a user in", skip(store, hasher, sessions, user), fields(user_email = %user.email))]
#[post("/login")]
pub async fn login_user(
    store: Data<dyn AccountStore>,
    hasher: Data<CredentialHasher>,
    sessions: Data<SessionTokens>,
    user: Json<LoginUser>,
) -> HttpResponse {
    match authenticate(store.get_ref(), &hasher, user.email.trim(), &user.password).await {
        Ok(account) => {
            tracing::event!(target: "backend", tracing::Level::INFO, "User logged in successfully");
            start_session(&sessions, account.session_user(), HttpResponse::Created())
        }
        Err(e) => {
            tracing::event!(target: "backend", tracing::Level::WARN, "Failed to authenticate user: {}", e);
            e.error_response()
        }
    }
}

/// Unknown e-mail and wrong password both end in `InvalidCredential`, and
/// both pay for one key derivation.
#[instrument(name = "Checking user credentials", skip(store, hasher, password))]
async fn authenticate(
    store: &dyn AccountStore,
    hasher: &CredentialHasher,
    email: &str,
    password: &str,
) -> Result<Account, AuthError> {
    let Some(account) = store.find_by_identifier(email).await? else {
        hasher
            .verify(password.as_bytes(), &[0_u8; SALT_LEN], &[0_u8; KEY_LEN])
            .await?;
        return Err(AuthError::InvalidCredential);
    };

    let credential = account.credential();
    if hasher
        .verify(password.as_bytes(), credential.salt(), credential.hash())
        .await?
    {
        Ok(account)
    } else {
        Err(AuthError::InvalidCredential)
    }
}
