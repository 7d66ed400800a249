use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use super::{repo::CarFilter, repo_types::ListingFields};
use crate::{auth::repo_types::User, error::ServiceError};

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct CarCreateRequest(pub ListingFields);

impl CarCreateRequest {
    pub fn into_valid(self) -> Result<ListingFields, ServiceError> {
        let mut listing = self.0;
        listing.trim_text();
        listing.validate()?;
        Ok(listing)
    }
}

/// `GET /cars` query string.
#[derive(Debug, Deserialize)]
pub struct CarListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub brand_id: Option<i32>,
    pub series_id: Option<i32>,
    pub model_id: Option<i32>,
}
fn default_page() -> i64 { 1 }
fn default_limit() -> i64 { DEFAULT_LIMIT }

impl From<CarListQuery> for CarFilter {
    fn from(q: CarListQuery) -> Self {
        Self {
            page: q.page.max(1),
            limit: q.limit.clamp(1, MAX_LIMIT),
            brand_id: q.brand_id,
            series_id: q.series_id,
            model_id: q.model_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CarCreatedResponse {
    pub id: Uuid,
    pub listing_number: String,
}

#[derive(Debug, Serialize)]
pub struct CarListItem {
    pub id: Uuid,
    pub thumbnail: String,
    pub title: String,
    pub currency: String,
    pub price: f64,
    pub brand: String,
    pub series: String,
    pub model: String,
    pub year: i32,
    pub mileage: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub listing_date: OffsetDateTime,
    pub city: String,
    pub district: String,
}

/// Public seller card on a listing.
#[derive(Debug, Serialize)]
pub struct OwnerResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub country_code: String,
    pub phone_number: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for OwnerResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            country_code: u.country_code,
            phone_number: u.phone_number,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CarDetail {
    pub id: Uuid,
    pub owner: OwnerResponse,
    pub listing_number: String,
    #[serde(with = "time::serde::rfc3339")]
    pub listing_date: OffsetDateTime,
    pub brand: String,
    pub series: String,
    pub model: String,
    #[serde(flatten)]
    pub listing: ListingFields,
    pub images: Vec<String>,
}
