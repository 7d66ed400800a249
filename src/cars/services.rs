use std::{collections::HashMap, sync::Arc};

use anyhow::Context;
use rand::Rng;
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{CarDetail, CarListItem},
    repo::{CarFilter, CarStore},
    repo_types::{Car, ListingFields},
};
use crate::{
    auth::repo::UserStore,
    catalog::services::{CatalogNames, CatalogService},
    error::{ServiceError, ServiceResult},
};

const LISTING_NUMBER_LEN: usize = 10;

fn generate_listing_number() -> String {
    let mut rng = rand::thread_rng();
    (0..LISTING_NUMBER_LEN)
        .map(|_| rng.gen_range(b'A'..=b'Z') as char)
        .collect()
}

fn name_of(map: &HashMap<i32, String>, id: i32) -> String {
    map.get(&id).cloned().unwrap_or_default()
}

pub struct CarService {
    cars: Arc<dyn CarStore>,
    users: Arc<dyn UserStore>,
    catalog: Arc<CatalogService>,
}

impl CarService {
    pub fn new(cars: Arc<dyn CarStore>, users: Arc<dyn UserStore>, catalog: Arc<CatalogService>) -> Self {
        Self { cars, users, catalog }
    }

    #[instrument(skip(self, listing))]
    pub async fn create(&self, owner_id: Uuid, listing: ListingFields) -> ServiceResult<Car> {
        let car = Car {
            id: Uuid::new_v4(),
            owner_id,
            listing_number: generate_listing_number(),
            listing_date: OffsetDateTime::now_utc(),
            listing,
        };
        self.cars
            .create(&car)
            .await
            .context("create car")
            .map_err(ServiceError::Dependency)?;
        info!(car_id = %car.id, listing_number = %car.listing_number, "car listed");
        Ok(car)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: CarFilter) -> ServiceResult<Vec<CarListItem>> {
        let cars = self
            .cars
            .list(&filter)
            .await
            .context("list cars")
            .map_err(ServiceError::Dependency)?;
        let names = self.catalog.names().await?;

        Ok(cars.into_iter().map(|car| list_item(car, &names)).collect())
    }

    #[instrument(skip(self))]
    pub async fn detail(&self, id: Uuid) -> ServiceResult<CarDetail> {
        let car = self
            .cars
            .get_by_id(id)
            .await
            .context("get car")
            .map_err(ServiceError::Dependency)?
            .ok_or(ServiceError::NotFound("car"))?;
        let owner = self
            .users
            .get_by_id(car.owner_id)
            .await
            .context("get car owner")
            .map_err(ServiceError::Dependency)?
            .ok_or(ServiceError::NotFound("car owner"))?;
        let names = self.catalog.names().await?;

        Ok(CarDetail {
            id: car.id,
            owner: owner.into(),
            listing_number: car.listing_number,
            listing_date: car.listing_date,
            brand: name_of(&names.brands, car.listing.brand_id),
            series: name_of(&names.series, car.listing.series_id),
            model: name_of(&names.models, car.listing.model_id),
            listing: car.listing,
            images: Vec::new(),
        })
    }
}

fn list_item(car: Car, names: &CatalogNames) -> CarListItem {
    let l = car.listing;
    CarListItem {
        id: car.id,
        thumbnail: String::new(),
        brand: name_of(&names.brands, l.brand_id),
        series: name_of(&names.series, l.series_id),
        model: name_of(&names.models, l.model_id),
        title: l.title,
        currency: l.currency,
        price: l.price,
        year: l.year,
        mileage: l.mileage,
        listing_date: car.listing_date,
        city: l.city,
        district: l.district,
    }
}
