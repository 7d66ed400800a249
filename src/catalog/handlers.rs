use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use super::dto::BrandResponse;
use crate::{error::ServiceResult, state::AppState};

pub fn catalog_routes() -> Router<AppState> {
    Router::new().route("/aux/brands", get(list_brands))
}

#[instrument(skip(state))]
pub async fn list_brands(State(state): State<AppState>) -> ServiceResult<Json<Vec<BrandResponse>>> {
    Ok(Json(state.catalog.catalog().await?))
}
