use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::Car;

/// Listing query: 1-based page, optional catalog filters.
#[derive(Debug, Clone, PartialEq)]
pub struct CarFilter {
    pub page: i64,
    pub limit: i64,
    pub brand_id: Option<i32>,
    pub series_id: Option<i32>,
    pub model_id: Option<i32>,
}

impl CarFilter {
    /// Rows to skip. Saturates, so an absurd page reads past the end.
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.limit)
    }
}

#[async_trait]
pub trait CarStore: Send + Sync {
    async fn create(&self, car: &Car) -> anyhow::Result<()>;
    async fn list(&self, filter: &CarFilter) -> anyhow::Result<Vec<Car>>;
    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Car>>;
}

const CAR_COLUMNS: &str = "id, owner_id, listing_number, listing_date, title, description, \
     currency, price, city, district, neighborhood, brand_id, series_id, model_id, year, \
     fuel_type, transmission, mileage, body_type, engine_power, engine_volume, drive_type, \
     color, warranty, heavy_damage, seller_type, trade_option, front_bumper, front_hood, roof, \
     front_right_door, rear_right_door, front_left_mudguard, front_left_door, rear_left_door, \
     rear_left_mudguard, rear_bumper";

#[derive(Clone)]
pub struct PgCarStore {
    db: PgPool,
}

impl PgCarStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CarStore for PgCarStore {
    async fn create(&self, car: &Car) -> anyhow::Result<()> {
        let l = &car.listing;
        let sql = format!(
            "INSERT INTO cars ({CAR_COLUMNS}) VALUES (\
             $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, \
             $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, $31, $32, $33, $34, $35, $36, $37)"
        );
        sqlx::query(&sql)
            .bind(car.id)
            .bind(car.owner_id)
            .bind(&car.listing_number)
            .bind(car.listing_date)
            .bind(&l.title)
            .bind(&l.description)
            .bind(&l.currency)
            .bind(l.price)
            .bind(&l.city)
            .bind(&l.district)
            .bind(&l.neighborhood)
            .bind(l.brand_id)
            .bind(l.series_id)
            .bind(l.model_id)
            .bind(l.year)
            .bind(&l.fuel_type)
            .bind(&l.transmission)
            .bind(l.mileage)
            .bind(&l.body_type)
            .bind(l.engine_power)
            .bind(l.engine_volume)
            .bind(&l.drive_type)
            .bind(&l.color)
            .bind(l.warranty)
            .bind(l.heavy_damage)
            .bind(&l.seller_type)
            .bind(l.trade_option)
            .bind(&l.front_bumper)
            .bind(&l.front_hood)
            .bind(&l.roof)
            .bind(&l.front_right_door)
            .bind(&l.rear_right_door)
            .bind(&l.front_left_mudguard)
            .bind(&l.front_left_door)
            .bind(&l.rear_left_door)
            .bind(&l.rear_left_mudguard)
            .bind(&l.rear_bumper)
            .execute(&self.db)
            .await
            .context("insert car")?;
        Ok(())
    }

    async fn list(&self, filter: &CarFilter) -> anyhow::Result<Vec<Car>> {
        // NULL filters match every row
        let sql = format!(
            r#"
            SELECT {CAR_COLUMNS}
            FROM cars
            WHERE ($1::INTEGER IS NULL OR brand_id = $1)
              AND ($2::INTEGER IS NULL OR series_id = $2)
              AND ($3::INTEGER IS NULL OR model_id = $3)
            ORDER BY listing_date DESC
            LIMIT $4 OFFSET $5
            "#
        );
        let rows = sqlx::query_as::<_, Car>(&sql)
            .bind(filter.brand_id)
            .bind(filter.series_id)
            .bind(filter.model_id)
            .bind(filter.limit)
            .bind(filter.offset())
            .fetch_all(&self.db)
            .await
            .context("query cars")?;
        Ok(rows)
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Car>> {
        let sql = format!("SELECT {CAR_COLUMNS} FROM cars WHERE id = $1");
        let row = sqlx::query_as::<_, Car>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("query car by id")?;
        Ok(row)
    }
}
