use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use crate::store::AccountStore;
use crate::types::{Account, PasswordCredential, Role, StorageError};

/// Postgres violation code for a unique constraint.
const UNIQUE_VIOLATION: &str = "23505";

pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn account_from_row(row: &PgRow) -> Result<Account, StorageError> {
    let role: String = row.try_get("role")?;
    let role = role
        .parse::<Role>()
        .map_err(|e| StorageError::Corrupted(e.to_string()))?;

    Ok(Account::from_parts(
        row.try_get("id")?,
        row.try_get("email")?,
        role,
        PasswordCredential::new(row.try_get("password_hash")?, row.try_get("salt")?),
        row.try_get("reset_token")?,
        row.try_get("date_joined")?,
    ))
}

#[async_trait]
impl AccountStore for PgAccountStore {
    #[instrument(name = "Inserting new account into DB", skip(self, account),
    fields(user_email = %account.email))]
    async fn insert(&self, account: &Account) -> Result<(), StorageError> {
        let credential = account.credential();
        let result = sqlx::query(
            "INSERT INTO users (id, email, role, password_hash, salt, reset_token, date_joined) \
            VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(account.id)
        .bind(&account.email)
        .bind(account.role.as_str())
        .bind(credential.hash())
        .bind(credential.salt())
        .bind(account.reset_token.as_deref())
        .bind(account.date_joined)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let is_duplicate = e
                    .as_database_error()
                    .and_then(|db| db.code())
                    .is_some_and(|code| code == UNIQUE_VIOLATION);
                if is_duplicate {
                    return Err(StorageError::DuplicateIdentifier(account.email.clone()));
                }
                tracing::event!(target: "sqlx", tracing::Level::ERROR, "Failed to insert account into DB: {:#?}", e);
                Err(e.into())
            }
        }
    }

    #[instrument(name = "Getting an account from DB", skip(self, identifier),
    fields(user_email = %identifier))]
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Account>, StorageError> {
        let row = sqlx::query(
            "SELECT id, email, role, password_hash, salt, reset_token, date_joined \
            FROM users WHERE email = $1",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::event!(target: "sqlx", tracing::Level::ERROR, "Failed to query account: {:#?}", e);
            StorageError::from(e)
        })?;

        row.as_ref().map(account_from_row).transpose()
    }

    #[instrument(name = "Saving an account", skip(self, account),
    fields(user_id = %account.id))]
    async fn save(&self, account: &Account) -> Result<(), StorageError> {
        let credential = account.credential();
        let result = sqlx::query(
            "UPDATE users SET role = $2, password_hash = $3, salt = $4, reset_token = $5 \
            WHERE id = $1",
        )
        .bind(account.id)
        .bind(account.role.as_str())
        .bind(credential.hash())
        .bind(credential.salt())
        .bind(account.reset_token.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::event!(target: "sqlx", tracing::Level::ERROR, "Failed to save account: {:#?}", e);
            StorageError::from(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(StorageError::Missing(account.id));
        }
        Ok(())
    }

    #[instrument(name = "Storing a reset token", skip(self, token), fields(user_id = %id))]
    async fn set_reset_token(&self, id: Uuid, token: &str) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE users SET reset_token = $2 WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::event!(target: "sqlx", tracing::Level::ERROR, "Failed to store reset token: {:#?}", e);
                StorageError::from(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(StorageError::Missing(id));
        }
        Ok(())
    }

    #[instrument(name = "Saving an account guarded by its reset token",
    skip(self, account, expected_token), fields(user_id = %account.id))]
    async fn save_if_reset_token(
        &self,
        account: &Account,
        expected_token: &str,
    ) -> Result<bool, StorageError> {
        let credential = account.credential();
        let result = sqlx::query(
            "UPDATE users SET role = $2, password_hash = $3, salt = $4, reset_token = $5 \
            WHERE id = $1 AND reset_token = $6",
        )
        .bind(account.id)
        .bind(account.role.as_str())
        .bind(credential.hash())
        .bind(credential.salt())
        .bind(account.reset_token.as_deref())
        .bind(expected_token)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::event!(target: "sqlx", tracing::Level::ERROR, "Failed to save account: {:#?}", e);
            StorageError::from(e)
        })?;

        Ok(result.rows_affected() == 1)
    }
}
