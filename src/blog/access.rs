//! Ownership checks gating blog mutations.
//!
//! The checks only read. They must complete before any write is issued, so
//! a failed check never leaves a partial mutation behind.

use thiserror::Error;
use tracing::warn;

use crate::auth::Principal;
use crate::blog::BlogStore;
use crate::db::BlogRecord;
use crate::types::BlogId;

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Blog with id {0} is not available")]
    NotFound(BlogId),
    #[error("Not authorized to modify blog {0}")]
    Forbidden(BlogId),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Check that `principal` owns `blog`.
pub fn ensure_owner(blog: &BlogRecord, principal: &Principal) -> Result<(), AccessError> {
    if principal.owns(blog.user_id) {
        Ok(())
    } else {
        warn!(
            blog_id = %blog.id,
            owner_id = %blog.user_id,
            user_id = %principal.id(),
            "ownership check failed"
        );
        Err(AccessError::Forbidden(blog.id))
    }
}

/// Load a blog for mutation by `principal`.
///
/// A missing blog is reported as `NotFound` whoever asks; only an existing
/// blog owned by someone else yields `Forbidden`.
pub async fn load_owned(
    blogs: &BlogStore,
    id: BlogId,
    principal: &Principal,
) -> Result<BlogRecord, AccessError> {
    let blog = blogs.find_by_id(id).await?.ok_or(AccessError::NotFound(id))?;
    ensure_owner(&blog, principal)?;
    Ok(blog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{BlogWrite, DatabaseConfig, create_connection, ensure_schema};
    use crate::types::{Email, UserId};

    fn principal(id: i64) -> Principal {
        Principal::new(UserId::new(id), Email::new(format!("user{id}@example.com")), "User")
    }

    async fn setup_store() -> BlogStore {
        let config = DatabaseConfig {
            url: "memory".to_string(),
            ..Default::default()
        };
        let db = create_connection(config).await.unwrap();
        ensure_schema(&db).await.unwrap();
        BlogStore::new(db)
    }

    #[test]
    fn test_ensure_owner() {
        let blog = BlogRecord {
            id: BlogId::new(1),
            title: "t".to_string(),
            body: "b".to_string(),
            user_id: UserId::new(10),
        };

        assert!(ensure_owner(&blog, &principal(10)).is_ok());
        assert!(matches!(
            ensure_owner(&blog, &principal(11)),
            Err(AccessError::Forbidden(id)) if id == BlogId::new(1)
        ));
    }

    #[tokio::test]
    async fn test_load_owned_by_owner() {
        let store = setup_store().await;
        let blog = store
            .insert(
                UserId::new(1),
                &BlogWrite { title: "t".to_string(), body: "b".to_string() },
            )
            .await
            .unwrap();

        let loaded = load_owned(&store, blog.id, &principal(1)).await.unwrap();
        assert_eq!(loaded, blog);
    }

    #[tokio::test]
    async fn test_load_owned_by_other_is_forbidden() {
        let store = setup_store().await;
        let blog = store
            .insert(
                UserId::new(1),
                &BlogWrite { title: "t".to_string(), body: "b".to_string() },
            )
            .await
            .unwrap();

        let result = load_owned(&store, blog.id, &principal(2)).await;
        assert!(matches!(result, Err(AccessError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_missing_blog_is_not_found_for_everyone() {
        let store = setup_store().await;

        for caller in [1, 2] {
            let result = load_owned(&store, BlogId::new(404), &principal(caller)).await;
            assert!(matches!(result, Err(AccessError::NotFound(id)) if id == BlogId::new(404)));
        }
    }
}
