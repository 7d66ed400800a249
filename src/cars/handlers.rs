use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{CarCreateRequest, CarCreatedResponse, CarDetail, CarListItem, CarListQuery};
use crate::{
    auth::jwt::AuthUser,
    error::ServiceResult,
    extract::{JsonBody, PathParam, QueryParams},
    state::AppState,
};

pub fn car_routes() -> Router<AppState> {
    Router::new()
        .route("/cars", get(list_cars).post(create_car))
        .route("/cars/:id", get(get_car))
}

#[instrument(skip(state))]
pub async fn list_cars(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<CarListQuery>,
) -> ServiceResult<Json<Vec<CarListItem>>> {
    Ok(Json(state.cars.list(query.into()).await?))
}

#[instrument(skip(state))]
pub async fn get_car(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> ServiceResult<Json<CarDetail>> {
    Ok(Json(state.cars.detail(id).await?))
}

#[instrument(skip(state, auth, payload), fields(user_id = %auth.user_id()))]
pub async fn create_car(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<CarCreateRequest>,
) -> ServiceResult<impl IntoResponse> {
    let listing = payload.into_valid()?;
    let car = state.cars.create(auth.user_id(), listing).await?;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/v1/cars/{}", car.id))],
        Json(CarCreatedResponse {
            id: car.id,
            listing_number: car.listing_number,
        }),
    ))
}
