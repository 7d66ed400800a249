use anyhow::Context;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client, Script};
use tracing::{debug, info};

const COMPARE_AND_DELETE: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
end
return 0
"#;

/// Thin key/value wrapper over a multiplexed Redis connection.
///
/// Cloning is cheap: all clones share the same underlying connection.
#[derive(Clone)]
pub struct RedisCache {
    connection: MultiplexedConnection,
}

impl RedisCache {
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let client = Client::open(url).context("parse redis url")?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .context("connect to redis")?;
        info!("connected to redis");
        Ok(Self { connection })
    }

    /// SET with an expiry in seconds. Overwrites any previous value.
    pub async fn set_with_expiry(&self, key: &str, value: &str, seconds: u64) -> anyhow::Result<()> {
        let mut conn = self.connection.clone();
        conn.set_ex::<_, _, ()>(key, value, seconds)
            .await
            .with_context(|| format!("redis SETEX {key}"))?;
        debug!(key, seconds, "redis key set");
        Ok(())
    }

    pub async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let mut conn = self.connection.clone();
        let value = conn
            .get::<_, Option<String>>(key)
            .await
            .with_context(|| format!("redis GET {key}"))?;
        Ok(value)
    }

    /// Deletes `key` only if it currently holds `expected`. GET and DEL run
    /// as one script, so of two concurrent callers at most one sees `true`.
    pub async fn delete_if_equals(&self, key: &str, expected: &str) -> anyhow::Result<bool> {
        let mut conn = self.connection.clone();
        let removed = Script::new(COMPARE_AND_DELETE)
            .key(key)
            .arg(expected)
            .invoke_async::<_, u32>(&mut conn)
            .await
            .with_context(|| format!("redis compare-and-delete {key}"))?;
        debug!(key, removed, "redis compare-and-delete");
        Ok(removed > 0)
    }
}
