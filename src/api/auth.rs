use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::Json,
};

use crate::api::AppState;
use crate::api::dto::{LoginRequest, SignupRequest, TokenForm, UserResponse};
use crate::auth::{AccessToken, AuthError};
use crate::db::DbSession;
use crate::error::{ApiError, INVALID_CREDENTIALS_DETAIL};

pub(super) async fn signup(
    State(state): State<AppState>,
    session: DbSession,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let signup = payload.validate()?;
    let user = state.accounts.signup(&session.users(), signup).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub(super) async fn login(
    State(state): State<AppState>,
    session: DbSession,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AccessToken>, ApiError> {
    authenticate(&state, &session, payload).await.map(Json)
}

/// OAuth2 password flow. Same outcome as `login`, form-encoded.
pub(super) async fn token(
    State(state): State<AppState>,
    session: DbSession,
    Form(form): Form<TokenForm>,
) -> Result<Json<AccessToken>, ApiError> {
    authenticate(&state, &session, form.into()).await.map(Json)
}

async fn authenticate(
    state: &AppState,
    session: &DbSession,
    payload: LoginRequest,
) -> Result<AccessToken, ApiError> {
    let (email, password) = payload.into_credentials();
    state
        .accounts
        .login(&session.users(), &email, password)
        .await
        .map_err(|e| match e {
            AuthError::Unauthenticated => ApiError::unauthenticated(INVALID_CREDENTIALS_DETAIL),
            other => other.into(),
        })
}
