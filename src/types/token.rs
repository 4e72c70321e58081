use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Role;

/// The sanitized view of an account: what goes into a session token
/// and what auth endpoints hand back to the client.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionUser {
    pub id: Uuid,
    pub role: Role,
}
