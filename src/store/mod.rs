//! Account persistence.
//!
//! The credential and reset logic only talks to [`AccountStore`]; the
//! PostgreSQL store backs the running service and the in-memory store backs
//! tests and local runs without a database.

use async_trait::async_trait;

use uuid::Uuid;

use crate::types::{Account, StorageError};
use crate::utils::constant_time_eq;

mod memory;
mod postgres;

pub use memory::InMemoryAccountStore;
pub use postgres::PgAccountStore;

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Persists a new account. Fails with `DuplicateIdentifier` if the
    /// e-mail is taken.
    async fn insert(&self, account: &Account) -> Result<(), StorageError>;

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Account>, StorageError>;

    /// The account for `identifier`, only if its outstanding reset token
    /// equals `token`. Tokens are compared in constant time.
    async fn find_by_identifier_and_reset_token(
        &self,
        identifier: &str,
        token: &str,
    ) -> Result<Option<Account>, StorageError> {
        let account = self.find_by_identifier(identifier).await?;
        Ok(account.filter(|account| match &account.reset_token {
            Some(stored) => constant_time_eq(stored.as_bytes(), token.as_bytes()),
            None => false,
        }))
    }

    /// Overwrites role, credential and reset token of an existing account.
    async fn save(&self, account: &Account) -> Result<(), StorageError>;

    /// Replaces only the outstanding reset token of account `id`. The
    /// credential is never touched, so a stale snapshot cannot roll back a
    /// password change that committed in between.
    async fn set_reset_token(&self, id: Uuid, token: &str) -> Result<(), StorageError>;

    /// Like [`save`](Self::save), but only if the stored reset token is
    /// still `expected_token`. Returns whether the write happened. This is
    /// the single-record read-modify-write that keeps a token single-use.
    async fn save_if_reset_token(
        &self,
        account: &Account,
        expected_token: &str,
    ) -> Result<bool, StorageError>;
}
