use anyhow::Context;
use async_trait::async_trait;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;

use crate::config::StorageConfig;

/// Stores user-uploaded assets and hands back a URL to reach them.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn save_avatar(&self, user_id: Uuid, body: Bytes, content_type: &str) -> anyhow::Result<String>;
}

/// File extension for the image types accepted as avatars.
pub fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        _ => None,
    }
}

pub fn avatar_key(user_id: Uuid, ext: &str) -> String {
    format!("users/{}/avatar.{}", user_id, ext)
}

/// S3 / MinIO backed asset store (path-style addressing).
#[derive(Clone)]
pub struct S3AssetStore {
    client: Client,
    endpoint: String,
    bucket: String,
}

impl S3AssetStore {
    pub async fn new(config: &StorageConfig) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(Credentials::new(
                &config.access_key,
                &config.secret_key,
                None,
                None,
                "static",
            ))
            .endpoint_url(&config.endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(&config.endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
        })
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key)
    }
}

#[async_trait]
impl AssetStore for S3AssetStore {
    async fn save_avatar(&self, user_id: Uuid, body: Bytes, content_type: &str) -> anyhow::Result<String> {
        let ext = ext_from_mime(content_type)
            .with_context(|| format!("unsupported avatar content type {content_type}"))?;
        let key = avatar_key(user_id, ext);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .with_context(|| format!("s3 put_object {key}"))?;
        debug!(%user_id, key, "avatar stored");
        Ok(self.public_url(&key))
    }
}
