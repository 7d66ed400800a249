use std::time::Duration;

use async_trait::async_trait;

use crate::cache::RedisCache;

/// Revoked bearer tokens. Membership is a set: adding twice is a no-op.
#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    async fn is_blacklisted(&self, token: &str) -> anyhow::Result<bool>;
    async fn add(&self, token: &str) -> anyhow::Result<()>;
}

const BLACKLISTED: &str = "blacklisted";

fn key(token: &str) -> String {
    format!("token-blacklist:{token}")
}

/// Entries expire after `ttl`, which should be the token lifetime: an expired
/// token is rejected by signature validation anyway.
#[derive(Clone)]
pub struct RedisTokenBlacklist {
    cache: RedisCache,
    ttl: Duration,
}

impl RedisTokenBlacklist {
    pub fn new(cache: RedisCache, ttl: Duration) -> Self {
        Self { cache, ttl }
    }
}

#[async_trait]
impl TokenBlacklist for RedisTokenBlacklist {
    async fn is_blacklisted(&self, token: &str) -> anyhow::Result<bool> {
        let value = self.cache.get(&key(token)).await?;
        Ok(value.as_deref() == Some(BLACKLISTED))
    }

    async fn add(&self, token: &str) -> anyhow::Result<()> {
        self.cache
            .set_with_expiry(&key(token), BLACKLISTED, self.ttl.as_secs().max(1))
            .await
    }
}
