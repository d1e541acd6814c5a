use axum::{
    extract::Path,
    http::StatusCode,
    response::Json,
};
use tracing::info;

use crate::api::dto::{BlogRequest, Detail};
use crate::api::extract::Authenticated;
use crate::blog::{AccessError, load_owned};
use crate::db::{BlogRecord, DbSession};
use crate::error::ApiError;
use crate::types::BlogId;

pub(super) async fn list(session: DbSession) -> Result<Json<Vec<BlogRecord>>, ApiError> {
    Ok(Json(session.blogs().list().await?))
}

pub(super) async fn show(
    session: DbSession,
    Path(id): Path<i64>,
) -> Result<Json<BlogRecord>, ApiError> {
    let id = BlogId::new(id);
    let blog = session
        .blogs()
        .find_by_id(id)
        .await?
        .ok_or(AccessError::NotFound(id))?;
    Ok(Json(blog))
}

pub(super) async fn create(
    auth: Authenticated,
    Json(payload): Json<BlogRequest>,
) -> Result<(StatusCode, Json<BlogRecord>), ApiError> {
    let write = payload.validate()?;
    let blog = auth.session.blogs().insert(auth.id(), &write).await?;
    info!(blog_id = %blog.id, user_id = %auth.id(), "blog created");
    Ok((StatusCode::CREATED, Json(blog)))
}

pub(super) async fn update(
    auth: Authenticated,
    Path(id): Path<i64>,
    Json(payload): Json<BlogRequest>,
) -> Result<(StatusCode, Json<Detail>), ApiError> {
    let write = payload.validate()?;
    let blogs = auth.session.blogs();

    let blog = load_owned(&blogs, BlogId::new(id), &auth.principal).await?;
    blogs.update(blog.id, &write).await?;

    info!(blog_id = %blog.id, user_id = %auth.id(), "blog updated");
    Ok((StatusCode::ACCEPTED, Json(Detail::new("Successfully updated the blog"))))
}

pub(super) async fn destroy(
    auth: Authenticated,
    Path(id): Path<i64>,
) -> Result<Json<Detail>, ApiError> {
    let blogs = auth.session.blogs();

    let blog = load_owned(&blogs, BlogId::new(id), &auth.principal).await?;
    blogs.delete(blog.id).await?;

    info!(blog_id = %blog.id, user_id = %auth.id(), "blog deleted");
    Ok(Json(Detail::new("Deleted Successfully")))
}
