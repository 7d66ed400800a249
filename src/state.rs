use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::{
    auth::{
        blacklist::{RedisTokenBlacklist, TokenBlacklist},
        repo::{PgUserStore, UserStore},
        services::AuthService,
    },
    cache::RedisCache,
    cars::{
        repo::{CarStore, PgCarStore},
        services::CarService,
    },
    catalog::{
        repo::{CatalogStore, PgCatalogStore},
        services::CatalogService,
    },
    config::AppConfig,
    db,
    mail::{MailSender, SmtpMailer},
    password_reset::{
        repo::{RedisResetCodeStore, ResetCodeStore},
        services::{PasswordResetService, ResetSettings},
    },
    storage::{AssetStore, S3AssetStore},
};

/// Every outside collaborator the services need.
pub struct Adapters {
    pub users: Arc<dyn UserStore>,
    pub blacklist: Arc<dyn TokenBlacklist>,
    pub reset_codes: Arc<dyn ResetCodeStore>,
    pub catalog: Arc<dyn CatalogStore>,
    pub cars: Arc<dyn CarStore>,
    pub mailer: Arc<dyn MailSender>,
    pub assets: Arc<dyn AssetStore>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: Arc<AuthService>,
    pub password_reset: Arc<PasswordResetService>,
    pub catalog: Arc<CatalogService>,
    pub cars: Arc<CarService>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env().context("load config")?);

        let pool = db::connect(&config.database_url).await?;
        if let Err(e) = db::migrate(&pool).await {
            warn!(error = %e, "migration failed; continuing");
        }

        let cache = RedisCache::connect(&config.redis_url).await?;
        let token_ttl = config.jwt.ttl();

        let mailer = SmtpMailer::new(&config.mail).context("build smtp transport")?;
        let assets = S3AssetStore::new(&config.storage).await?;

        let adapters = Adapters {
            users: Arc::new(PgUserStore::new(pool.clone())),
            blacklist: Arc::new(RedisTokenBlacklist::new(cache.clone(), token_ttl)),
            reset_codes: Arc::new(RedisResetCodeStore::new(cache)),
            catalog: Arc::new(PgCatalogStore::new(pool.clone())),
            cars: Arc::new(PgCarStore::new(pool)),
            mailer: Arc::new(mailer),
            assets: Arc::new(assets),
        };

        info!("adapters ready");
        Ok(Self::from_parts(config, adapters))
    }

    pub fn from_parts(config: Arc<AppConfig>, adapters: Adapters) -> Self {
        let auth = AuthService::new(
            adapters.users.clone(),
            adapters.blacklist,
            adapters.assets,
        );
        let password_reset = PasswordResetService::new(
            adapters.users.clone(),
            adapters.reset_codes,
            adapters.mailer,
            ResetSettings::from(&config.reset),
        );
        let catalog = Arc::new(CatalogService::new(adapters.catalog));
        let cars = CarService::new(adapters.cars, adapters.users, catalog.clone());

        Self {
            config,
            auth: Arc::new(auth),
            password_reset: Arc::new(password_reset),
            catalog,
            cars: Arc::new(cars),
        }
    }
}
