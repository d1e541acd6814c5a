//! The authenticated principal for a request.

use serde::{Deserialize, Serialize};

use crate::db::UserRecord;
use crate::types::{Email, UserId};

/// The user a request acts as.
///
/// Built from the stored user record once the presented token has been
/// verified. It never carries the password hash. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Database user ID
    id: UserId,
    /// Identity key
    email: Email,
    /// Display name
    name: String,
}

impl Principal {
    pub fn new(id: UserId, email: Email, name: impl Into<String>) -> Self {
        Self {
            id,
            email,
            name: name.into(),
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this principal is the user with id `owner`.
    pub fn owns(&self, owner: UserId) -> bool {
        self.id == owner
    }
}

impl From<UserRecord> for Principal {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}
