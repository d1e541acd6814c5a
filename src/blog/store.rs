//! Blog storage.

use anyhow::{Result, anyhow};

use crate::db::schema::{BlogRecord, BlogWrite};
use crate::db::{Db, next_id};
use crate::types::{BlogId, UserId};

const BLOG_FIELDS: &str = "record::id(id) AS id, title, body, record::id(user_id) AS user_id";

/// Blog store for database operations.
pub struct BlogStore {
    db: Db,
}

impl BlogStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// All blogs, oldest first.
    pub async fn list(&self) -> Result<Vec<BlogRecord>> {
        let query = format!("SELECT {BLOG_FIELDS} FROM blogs ORDER BY id ASC");
        let mut res = self.db.query(query).await?;
        let blogs: Vec<BlogRecord> = res.take(0)?;
        Ok(blogs)
    }

    /// Blogs owned by `owner`, oldest first.
    pub async fn list_by_owner(&self, owner: UserId) -> Result<Vec<BlogRecord>> {
        let query = format!(
            "SELECT {BLOG_FIELDS} FROM blogs WHERE user_id = type::thing('users', $owner) ORDER BY id ASC"
        );

        let mut res = self.db
            .query(query)
            .bind(("owner", owner.get()))
            .await?;

        let blogs: Vec<BlogRecord> = res.take(0)?;
        Ok(blogs)
    }

    pub async fn find_by_id(&self, id: BlogId) -> Result<Option<BlogRecord>> {
        let query = format!("SELECT {BLOG_FIELDS} FROM type::thing('blogs', $id)");

        let mut res = self.db
            .query(query)
            .bind(("id", id.get()))
            .await?;

        let blogs: Vec<BlogRecord> = res.take(0)?;
        Ok(blogs.into_iter().next())
    }

    /// Create a blog owned by `owner`.
    pub async fn insert(&self, owner: UserId, write: &BlogWrite) -> Result<BlogRecord> {
        let id = next_id(&self.db, "blogs").await?;

        let query = r#"
            CREATE ONLY type::thing('blogs', $id) CONTENT {
                title: $title,
                body: $body,
                user_id: type::thing('users', $owner)
            }
        "#;

        self.db
            .query(query)
            .bind(("id", id))
            .bind(("title", write.title.clone()))
            .bind(("body", write.body.clone()))
            .bind(("owner", owner.get()))
            .await?
            .check()?;

        self.find_by_id(BlogId::new(id))
            .await?
            .ok_or_else(|| anyhow!("Failed to create blog"))
    }

    /// Replace the title and body of an existing blog.
    ///
    /// Ownership is not checked here; callers go through the access checks
    /// first.
    pub async fn update(&self, id: BlogId, write: &BlogWrite) -> Result<()> {
        let query = r#"
            UPDATE type::thing('blogs', $id) SET
                title = $title,
                body = $body
        "#;

        self.db
            .query(query)
            .bind(("id", id.get()))
            .bind(("title", write.title.clone()))
            .bind(("body", write.body.clone()))
            .await?
            .check()?;

        Ok(())
    }

    /// Delete a blog by id.
    pub async fn delete(&self, id: BlogId) -> Result<()> {
        self.db
            .query("DELETE type::thing('blogs', $id)")
            .bind(("id", id.get()))
            .await?
            .check()?;

        Ok(())
    }
}
