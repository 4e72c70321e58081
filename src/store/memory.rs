use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::AccountStore;
use crate::types::{Account, StorageError};
use crate::utils::constant_time_eq;

/// Accounts keyed by e-mail, held behind one lock.
#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<String, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn insert(&self, account: &Account) -> Result<(), StorageError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.email) {
            return Err(StorageError::DuplicateIdentifier(account.email.clone()));
        }
        accounts.insert(account.email.clone(), account.clone());
        Ok(())
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Account>, StorageError> {
        Ok(self.accounts.read().await.get(identifier).cloned())
    }

    async fn save(&self, account: &Account) -> Result<(), StorageError> {
        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(&account.email) {
            Some(stored) if stored.id == account.id => {
                *stored = account.clone();
                Ok(())
            }
            _ => Err(StorageError::Missing(account.id)),
        }
    }

    async fn set_reset_token(&self, id: Uuid, token: &str) -> Result<(), StorageError> {
        let mut accounts = self.accounts.write().await;
        let stored = accounts
            .values_mut()
            .find(|stored| stored.id == id)
            .ok_or(StorageError::Missing(id))?;
        stored.reset_token = Some(token.to_string());
        Ok(())
    }

    async fn save_if_reset_token(
        &self,
        account: &Account,
        expected_token: &str,
    ) -> Result<bool, StorageError> {
        let mut accounts = self.accounts.write().await;
        let stored = match accounts.get_mut(&account.email) {
            Some(stored) if stored.id == account.id => stored,
            _ => return Err(StorageError::Missing(account.id)),
        };
        let token_matches = stored
            .reset_token
            .as_deref()
            .is_some_and(|current| constant_time_eq(current.as_bytes(), expected_token.as_bytes()));
        if token_matches {
            *stored = account.clone();
        }
        Ok(token_matches)
    }
}
