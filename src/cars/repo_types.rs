use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::validation::one_of;

pub const CURRENCIES: &[&str] = &["TRY", "USD", "EUR"];
pub const FUEL_TYPES: &[&str] = &["Diesel", "Petrol", "Petrol & LPG", "Hybrid", "Electric"];
pub const TRANSMISSIONS: &[&str] = &["Automatic", "Manual", "Semiautomatic"];
pub const BODY_TYPES: &[&str] = &[
    "Sedan",
    "Hatchback/3",
    "Hatchback/5",
    "Coupe",
    "Cabrio",
    "MPV",
    "Pick-up",
    "Roadster",
    "Station wagon",
    "SUV",
];
pub const DRIVE_TYPES: &[&str] = &[
    "Front-Wheel Drive",
    "Rear-Wheel Drive",
    "Four-Wheel Drive",
    "All-Wheel Drive",
];
pub const SELLER_TYPES: &[&str] = &["Individual", "Dealer"];
pub const PART_CONDITIONS: &[&str] = &["Original", "Painted", "Changed"];

fn currency(v: &str) -> Result<(), ValidationError> {
    one_of(v, CURRENCIES)
}
fn fuel_type(v: &str) -> Result<(), ValidationError> {
    one_of(v, FUEL_TYPES)
}
fn transmission(v: &str) -> Result<(), ValidationError> {
    one_of(v, TRANSMISSIONS)
}
fn body_type(v: &str) -> Result<(), ValidationError> {
    one_of(v, BODY_TYPES)
}
fn drive_type(v: &str) -> Result<(), ValidationError> {
    one_of(v, DRIVE_TYPES)
}
fn seller_type(v: &str) -> Result<(), ValidationError> {
    one_of(v, SELLER_TYPES)
}
fn part_condition(v: &str) -> Result<(), ValidationError> {
    one_of(v, PART_CONDITIONS)
}

/// Everything the seller describes about a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Validate)]
pub struct ListingFields {
    #[validate(length(min = 1, message = "is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "is required"))]
    pub description: String,
    #[validate(custom(function = "currency"))]
    pub currency: String,
    #[validate(range(exclusive_min = 0.0, message = "must be positive"))]
    pub price: f64,
    #[validate(length(min = 1, message = "is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "is required"))]
    pub district: String,
    #[validate(length(min = 1, message = "is required"))]
    pub neighborhood: String,
    #[validate(range(min = 1, message = "is required"))]
    pub brand_id: i32,
    #[validate(range(min = 1, message = "is required"))]
    pub series_id: i32,
    #[validate(range(min = 1, message = "is required"))]
    pub model_id: i32,
    #[validate(range(min = 1, message = "is required"))]
    pub year: i32,
    #[validate(custom(function = "fuel_type"))]
    pub fuel_type: String,
    #[validate(custom(function = "transmission"))]
    pub transmission: String,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub mileage: i32,
    #[validate(custom(function = "body_type"))]
    pub body_type: String,
    #[validate(range(min = 1, message = "is required"))]
    pub engine_power: i32,
    #[validate(range(min = 1, message = "is required"))]
    pub engine_volume: i32,
    #[validate(custom(function = "drive_type"))]
    pub drive_type: String,
    #[validate(length(min = 1, message = "is required"))]
    pub color: String,
    #[serde(default)]
    pub warranty: bool,
    #[serde(default)]
    pub heavy_damage: bool,
    #[validate(custom(function = "seller_type"))]
    pub seller_type: String,
    #[serde(default)]
    pub trade_option: bool,
    #[validate(custom(function = "part_condition"))]
    pub front_bumper: String,
    #[validate(custom(function = "part_condition"))]
    pub front_hood: String,
    #[validate(custom(function = "part_condition"))]
    pub roof: String,
    #[validate(custom(function = "part_condition"))]
    pub front_right_door: String,
    #[validate(custom(function = "part_condition"))]
    pub rear_right_door: String,
    #[validate(custom(function = "part_condition"))]
    pub front_left_mudguard: String,
    #[validate(custom(function = "part_condition"))]
    pub front_left_door: String,
    #[validate(custom(function = "part_condition"))]
    pub rear_left_door: String,
    #[validate(custom(function = "part_condition"))]
    pub rear_left_mudguard: String,
    #[validate(custom(function = "part_condition"))]
    pub rear_bumper: String,
}

impl ListingFields {
    pub(super) fn trim_text(&mut self) {
        for field in [
            &mut self.title,
            &mut self.description,
            &mut self.city,
            &mut self.district,
            &mut self.neighborhood,
            &mut self.color,
        ] {
            *field = field.trim().to_string();
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Car {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub listing_number: String,
    pub listing_date: OffsetDateTime,
    #[sqlx(flatten)]
    pub listing: ListingFields,
}
