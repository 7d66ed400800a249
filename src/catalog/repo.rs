use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{Brand, Model, Series};

/// Read-only brand / series / model hierarchy.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_brands(&self) -> anyhow::Result<Vec<Brand>>;
    async fn list_series(&self, brand_id: i32) -> anyhow::Result<Vec<Series>>;
    async fn list_models(&self, series_id: i32) -> anyhow::Result<Vec<Model>>;
}

#[derive(Clone)]
pub struct PgCatalogStore {
    db: PgPool,
}

impl PgCatalogStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn list_brands(&self) -> anyhow::Result<Vec<Brand>> {
        let rows = sqlx::query_as::<_, Brand>("SELECT id, logo, name FROM brands ORDER BY id")
            .fetch_all(&self.db)
            .await
            .context("query brands")?;
        Ok(rows)
    }

    async fn list_series(&self, brand_id: i32) -> anyhow::Result<Vec<Series>> {
        let rows = sqlx::query_as::<_, Series>(
            r#"
            SELECT id, brand_id, name
            FROM series
            WHERE brand_id = $1
            ORDER BY id
            "#,
        )
        .bind(brand_id)
        .fetch_all(&self.db)
        .await
        .context("query series")?;
        Ok(rows)
    }

    async fn list_models(&self, series_id: i32) -> anyhow::Result<Vec<Model>> {
        let rows = sqlx::query_as::<_, Model>(
            r#"
            SELECT id, series_id, name
            FROM models
            WHERE series_id = $1
            ORDER BY id
            "#,
        )
        .bind(series_id)
        .fetch_all(&self.db)
        .await
        .context("query models")?;
        Ok(rows)
    }
}
