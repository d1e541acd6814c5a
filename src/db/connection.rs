use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use tracing::debug;

pub type Db = Surreal<Any>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: env::var("SURREALDB_URL")
                .unwrap_or_else(|_| "memory".to_string()),
            namespace: env::var("SURREALDB_NAMESPACE")
                .unwrap_or_else(|_| "blog".to_string()),
            database: env::var("SURREALDB_DATABASE")
                .unwrap_or_else(|_| "blog".to_string()),
            username: env::var("SURREALDB_USERNAME").ok(),
            password: env::var("SURREALDB_PASSWORD").ok(),
        }
    }
}

pub async fn create_connection(config: DatabaseConfig) -> Result<Db> {
    let db = surrealdb::engine::any::connect(config.url).await?;

    // Sign in if credentials are provided
    if let (Some(username), Some(password)) = (config.username, config.password) {
        db.signin(Root {
            username: &username,
            password: &password,
        })
        .await?;
    }

    db.use_ns(config.namespace).use_db(config.database).await?;

    Ok(db)
}

/// Define the `users`, `blogs` and `sequence` tables.
///
/// Safe to run against an existing database: every definition is
/// `IF NOT EXISTS`.
pub async fn ensure_schema(db: &Db) -> Result<()> {
    let schema_queries = [
        // Principals. `email` is the identity key.
        "DEFINE TABLE IF NOT EXISTS users SCHEMAFULL;
         DEFINE FIELD IF NOT EXISTS email ON TABLE users TYPE string;
         DEFINE FIELD IF NOT EXISTS name ON TABLE users TYPE string;
         DEFINE FIELD IF NOT EXISTS password_hash ON TABLE users TYPE string;
         DEFINE FIELD IF NOT EXISTS created_at ON TABLE users VALUE $before OR time::now();
         DEFINE INDEX IF NOT EXISTS users_email ON TABLE users COLUMNS email UNIQUE;",

        // Blog posts, each owned by exactly one user.
        "DEFINE TABLE IF NOT EXISTS blogs SCHEMAFULL;
         DEFINE FIELD IF NOT EXISTS title ON TABLE blogs TYPE string;
         DEFINE FIELD IF NOT EXISTS body ON TABLE blogs TYPE string;
         DEFINE FIELD IF NOT EXISTS user_id ON TABLE blogs TYPE record<users>;
         DEFINE FIELD IF NOT EXISTS created_at ON TABLE blogs VALUE $before OR time::now();
         DEFINE FIELD IF NOT EXISTS updated_at ON TABLE blogs VALUE time::now();
         DEFINE INDEX IF NOT EXISTS blogs_user_id ON TABLE blogs COLUMNS user_id;",

        // Per-table id counters
        "DEFINE TABLE IF NOT EXISTS sequence SCHEMALESS;",
    ];

    for query in schema_queries {
        db.query(query).await?.check()?;
    }

    debug!("database schema ensured");
    Ok(())
}
