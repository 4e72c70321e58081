use std::sync::Arc;

use argon2::password_hash::rand_core::{OsRng, RngCore};
use tracing::instrument;

use crate::store::AccountStore;
use crate::types::{Account, AuthError};
use crate::utils::CredentialHasher;

/// Random bytes behind every reset token; the token is their hex encoding.
pub const RESET_TOKEN_BYTES: usize = 48;

/// Issues password reset tokens and redeems them for a credential change.
///
/// A token lives on the account row. It is replaced by the next issue and
/// cleared by the write that changes the password, so it works at most once.
/// There is no time-based expiry.
#[derive(Clone)]
pub struct ResetTokenManager {
    store: Arc<dyn AccountStore>,
    hasher: CredentialHasher,
}

impl ResetTokenManager {
    pub fn new(store: Arc<dyn AccountStore>, hasher: CredentialHasher) -> Self {
        Self { store, hasher }
    }

    fn generate_token() -> String {
        let mut buff = [0_u8; RESET_TOKEN_BYTES];
        OsRng.fill_bytes(&mut buff);
        hex::encode(buff)
    }

    /// Stores a fresh token for `account`, overwriting any earlier one, and
    /// returns it for the reset mail. Only the token is written; `account`
    /// may be an older snapshot than the stored row.
    #[instrument(name = "Issue password reset token", skip(self, account),
    fields(user_id = %account.id))]
    pub async fn issue(&self, account: &mut Account) -> Result<String, AuthError> {
        let token = Self::generate_token();
        self.store
            .set_reset_token(account.id, &token)
            .await
            .map_err(|e| {
                tracing::event!(target: "backend", tracing::Level::ERROR, "Cannot store reset token: {}", e);
                AuthError::from(e)
            })?;
        account.reset_token = Some(token.clone());
        Ok(token)
    }

    /// Looks the account up by e-mail and issues a token for it. An unknown
    /// e-mail fails exactly like a bad token does.
    #[instrument(name = "Requesting password reset", skip(self, identifier),
    fields(user_email = %identifier))]
    pub async fn request(&self, identifier: &str) -> Result<(Account, String), AuthError> {
        let mut account = self
            .store
            .find_by_identifier(identifier)
            .await?
            .ok_or(AuthError::InvalidOrExpiredToken)?;
        let token = self.issue(&mut account).await?;
        Ok((account, token))
    }

    /// Sets `new_secret` as the password of the account that holds `token`
    /// and clears the token in the same write.
    #[instrument(name = "Consuming password reset token",
    skip(self, identifier, token, new_secret), fields(user_email = %identifier))]
    pub async fn validate_and_consume(
        &self,
        identifier: &str,
        token: &str,
        new_secret: &[u8],
    ) -> Result<Account, AuthError> {
        if token.is_empty() {
            return Err(AuthError::InvalidOrExpiredToken);
        }

        let mut account = self
            .store
            .find_by_identifier_and_reset_token(identifier, token)
            .await?
            .ok_or(AuthError::InvalidOrExpiredToken)?;

        let credential = self.hasher.hash_new(new_secret).await?;
        account.replace_credential(credential);
        account.reset_token = None;

        // Another request may have redeemed the token while we were hashing.
        if !self.store.save_if_reset_token(&account, token).await? {
            tracing::event!(target: "backend", tracing::Level::WARN, "Reset token was consumed concurrently");
            return Err(AuthError::InvalidOrExpiredToken);
        }

        tracing::event!(target: "backend", tracing::Level::INFO, "Password reset completed");
        Ok(account)
    }
}
