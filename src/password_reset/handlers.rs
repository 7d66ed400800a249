use axum::{extract::State, http::StatusCode, routing::post, Router};
use tracing::instrument;

use super::dto::{ChangePasswordRequest, ResetLinkQuery, ResetPasswordRequest};
use crate::{
    error::ServiceResult,
    extract::{JsonBody, QueryParams},
    state::AppState,
};

pub fn reset_routes() -> Router<AppState> {
    Router::new().route(
        "/auth/reset-password",
        post(request_reset).put(change_password),
    )
}

#[instrument(skip(state, payload))]
pub async fn request_reset(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ResetPasswordRequest>,
) -> ServiceResult<StatusCode> {
    let payload = payload.into_valid()?;
    state.password_reset.request_reset(&payload.email).await?;
    Ok(StatusCode::OK)
}

/// PUT /auth/reset-password?token=..&email=..  { password, re_password }
#[instrument(skip(state, query, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ResetLinkQuery>,
    JsonBody(payload): JsonBody<ChangePasswordRequest>,
) -> ServiceResult<StatusCode> {
    let new_password = payload.into_valid()?;
    let email = query.email.trim().to_lowercase();
    state
        .password_reset
        .change_password(&email, &query.token, &new_password)
        .await?;
    Ok(StatusCode::OK)
}
