use serde::{Deserialize, Serialize};

use crate::types::{BlogId, Email, PasswordHash, UserId};

/// Persisted user record.
///
/// Queries project `record::id(id) AS id` so the integer key comes back
/// instead of the full record link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Database identifier
    pub id: UserId,
    /// Unique identity key
    pub email: Email,
    /// Display name
    pub name: String,
    /// bcrypt hash of the password; never leaves the service
    pub password_hash: PasswordHash,
}

/// Payload for creating a new user.
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub email: Email,
    pub name: String,
    pub password_hash: PasswordHash,
}

/// Persisted blog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogRecord {
    /// Database identifier
    pub id: BlogId,
    pub title: String,
    pub body: String,
    /// The owning user
    pub user_id: UserId,
}

/// Payload for creating a blog or replacing its content.
#[derive(Debug, Clone)]
pub struct BlogWrite {
    pub title: String,
    pub body: String,
}
