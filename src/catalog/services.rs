use std::{collections::HashMap, sync::Arc};

use anyhow::Context;
use tracing::{debug, instrument};

use super::{
    dto::{BrandResponse, ModelResponse, SeriesResponse},
    repo::CatalogStore,
};
use crate::error::{ServiceError, ServiceResult};

/// id → name lookups for every level of the catalog.
#[derive(Debug, Default, Clone)]
pub struct CatalogNames {
    pub brands: HashMap<i32, String>,
    pub series: HashMap<i32, String>,
    pub models: HashMap<i32, String>,
}

pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Builds the full brand → series → model tree. One query per brand and
    /// one per series; the first store error aborts the whole call.
    #[instrument(skip(self))]
    pub async fn catalog(&self) -> ServiceResult<Vec<BrandResponse>> {
        self.build_tree().await.map_err(ServiceError::Dependency)
    }

    async fn build_tree(&self) -> anyhow::Result<Vec<BrandResponse>> {
        let brands = self.store.list_brands().await.context("error fetching brands")?;

        let mut tree = Vec::with_capacity(brands.len());
        for brand in brands {
            let series = self
                .store
                .list_series(brand.id)
                .await
                .with_context(|| format!("error fetching series for brand {}", brand.id))?;

            let mut series_out = Vec::with_capacity(series.len());
            for s in series {
                let models = self
                    .store
                    .list_models(s.id)
                    .await
                    .with_context(|| format!("error fetching models for series {}", s.id))?;

                let count = models.len();
                let models_out = models
                    .into_iter()
                    .map(|m| ModelResponse {
                        id: m.id,
                        name: m.name,
                        count,
                    })
                    .collect();
                series_out.push(SeriesResponse {
                    id: s.id,
                    name: s.name,
                    count,
                    models: models_out,
                });
            }

            tree.push(BrandResponse {
                id: brand.id,
                logo: brand.logo,
                name: brand.name,
                count: series_out.len(),
                series: series_out,
            });
        }

        debug!(brands = tree.len(), "catalog assembled");
        Ok(tree)
    }

    pub async fn names(&self) -> ServiceResult<CatalogNames> {
        let tree = self.catalog().await?;
        let mut names = CatalogNames::default();
        for brand in tree {
            for series in brand.series {
                for model in series.models {
                    names.models.insert(model.id, model.name);
                }
                names.series.insert(series.id, series.name);
            }
            names.brands.insert(brand.id, brand.name);
        }
        Ok(names)
    }
}
