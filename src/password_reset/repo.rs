use std::time::Duration;

use async_trait::async_trait;

use crate::cache::RedisCache;

/// One active reset code per email; saving again replaces the previous code.
#[async_trait]
pub trait ResetCodeStore: Send + Sync {
    async fn save(&self, email: &str, code: &str, ttl: Duration) -> anyhow::Result<()>;
    /// Removes the active code if it equals `code`, atomically. `false` when
    /// there is no active code or it differs, in which case nothing changes.
    async fn consume(&self, email: &str, code: &str) -> anyhow::Result<bool>;
}

fn key(email: &str) -> String {
    format!("password-reset:{email}")
}

#[derive(Clone)]
pub struct RedisResetCodeStore {
    cache: RedisCache,
}

impl RedisResetCodeStore {
    pub fn new(cache: RedisCache) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl ResetCodeStore for RedisResetCodeStore {
    async fn save(&self, email: &str, code: &str, ttl: Duration) -> anyhow::Result<()> {
        self.cache
            .set_with_expiry(&key(email), code, ttl.as_secs().max(1))
            .await
    }

    async fn consume(&self, email: &str, code: &str) -> anyhow::Result<bool> {
        self.cache.delete_if_equals(&key(email), code).await
    }
}
