use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::api::AppState;
use crate::api::dto::{SignupRequest, UserResponse, UserWithBlogs};
use crate::api::extract::Authenticated;
use crate::auth::AuthError;
use crate::db::DbSession;
use crate::error::ApiError;
use crate::types::Email;

const USER_EXISTS_DETAIL: &str = "User with this email already exists";
const USER_MISSING_DETAIL: &str = "User is not present";

pub(super) async fn create_user(
    State(state): State<AppState>,
    session: DbSession,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let signup = payload.validate()?;
    let user = state
        .accounts
        .signup(&session.users(), signup)
        .await
        .map_err(|e| match e {
            AuthError::Conflict => ApiError::conflict(USER_EXISTS_DETAIL),
            other => other.into(),
        })?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub(super) async fn get_user(
    session: DbSession,
    Path(email): Path<String>,
) -> Result<Json<UserWithBlogs>, ApiError> {
    let user = session
        .users()
        .find_by_email(&Email::new(email))
        .await?
        .ok_or_else(|| ApiError::not_found(USER_MISSING_DETAIL))?;

    let blogs = session.blogs().list_by_owner(user.id).await?;
    Ok(Json(UserWithBlogs::new(user, blogs)))
}

/// Profile of the caller.
pub(super) async fn me(auth: Authenticated) -> Result<Json<UserWithBlogs>, ApiError> {
    let user = auth
        .session
        .users()
        .find_by_id(auth.id())
        .await?
        .ok_or_else(|| ApiError::not_found(USER_MISSING_DETAIL))?;

    let blogs = auth.session.blogs().list_by_owner(user.id).await?;
    Ok(Json(UserWithBlogs::new(user, blogs)))
}
