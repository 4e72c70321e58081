use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::SessionUser;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0} is not a known role")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A derived key together with the salt it was derived from.
///
/// Accounts only ever receive a whole `PasswordCredential`, so the hash and
/// the salt cannot drift apart.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordCredential {
    hash: Vec<u8>,
    salt: Vec<u8>,
}

impl PasswordCredential {
    pub fn new(hash: Vec<u8>, salt: Vec<u8>) -> Self {
        Self { hash, salt }
    }

    pub fn hash(&self) -> &[u8] {
        &self.hash
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }
}

impl fmt::Debug for PasswordCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordCredential")
            .field("hash", &"<redacted>")
            .field("salt", &"<redacted>")
            .finish()
    }
}

#[derive(Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    credential: PasswordCredential,
    pub reset_token: Option<String>,
    pub date_joined: DateTime<Utc>,
}

impl Account {
    /// A freshly registered account with the default role.
    pub fn new(email: String, credential: PasswordCredential) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            role: Role::default(),
            credential,
            reset_token: None,
            date_joined: Utc::now(),
        }
    }

    /// Rebuilds an account from persisted columns.
    pub fn from_parts(
        id: Uuid,
        email: String,
        role: Role,
        credential: PasswordCredential,
        reset_token: Option<String>,
        date_joined: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            role,
            credential,
            reset_token,
            date_joined,
        }
    }

    pub fn credential(&self) -> &PasswordCredential {
        &self.credential
    }

    pub fn replace_credential(&mut self, credential: PasswordCredential) {
        self.credential = credential;
    }

    pub fn session_user(&self) -> SessionUser {
        SessionUser {
            id: self.id,
            role: self.role,
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("credential", &self.credential)
            .field("reset_token", &self.reset_token.as_ref().map(|_| "<redacted>"))
            .field("date_joined", &self.date_joined)
            .finish()
    }
}
