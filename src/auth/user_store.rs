//! User storage.

use anyhow::{Result, anyhow};
use tracing::debug;

use crate::db::schema::{UserCreate, UserRecord};
use crate::db::{Db, next_id};
use crate::types::{Email, UserId};

const USER_FIELDS: &str = "record::id(id) AS id, email, name, password_hash";

/// Outcome of inserting a user.
#[derive(Debug)]
pub enum UserInsert {
    Created(UserRecord),
    /// Another user already holds this email.
    EmailTaken,
}

/// User store for database operations.
pub struct UserStore {
    db: Db,
}

impl UserStore {
    /// Create a new user store.
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Get a user by database ID.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>> {
        let query = format!("SELECT {USER_FIELDS} FROM type::thing('users', $id)");

        let mut res = self.db
            .query(query)
            .bind(("id", id.get()))
            .await?;

        let users: Vec<UserRecord> = res.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Get a user by email, the identity key.
    pub async fn find_by_email(&self, email: &Email) -> Result<Option<UserRecord>> {
        let query = format!("SELECT {USER_FIELDS} FROM users WHERE email = $email LIMIT 1");

        let mut res = self.db
            .query(query)
            .bind(("email", email.clone().into_inner()))
            .await?;

        let users: Vec<UserRecord> = res.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Insert a new user.
    ///
    /// Email uniqueness is checked up front; the unique index on
    /// `users.email` catches a concurrent insert of the same email, which is
    /// reported as [`UserInsert::EmailTaken`] as well.
    pub async fn insert(&self, create: &UserCreate) -> Result<UserInsert> {
        if self.find_by_email(&create.email).await?.is_some() {
            return Ok(UserInsert::EmailTaken);
        }

        self.create_row(create).await
    }

    /// Allocate an id and create the row, relying on the unique index alone.
    async fn create_row(&self, create: &UserCreate) -> Result<UserInsert> {
        let id = next_id(&self.db, "users").await?;

        let query = r#"
            CREATE ONLY type::thing('users', $id) CONTENT {
                email: $email,
                name: $name,
                password_hash: $password_hash
            }
        "#;

        let created = self.db
            .query(query)
            .bind(("id", id))
            .bind(("email", create.email.clone().into_inner()))
            .bind(("name", create.name.clone()))
            .bind(("password_hash", create.password_hash.clone().into_inner()))
            .await?
            .check();

        if let Err(e) = created {
            if self.find_by_email(&create.email).await?.is_some() {
                debug!(email = %create.email, "user insert lost a race on the email index");
                return Ok(UserInsert::EmailTaken);
            }
            return Err(e.into());
        }

        let user = self
            .find_by_id(UserId::new(id))
            .await?
            .ok_or_else(|| anyhow!("Failed to create user"))?;

        Ok(UserInsert::Created(user))
    }
}
