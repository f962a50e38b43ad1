/// Blob stores
///
/// The handler writes the finished catalog through the `BlobStore`
/// trait. Two backends exist:
/// - `vercel`: Vercel Blob HTTP API
/// - `local`: a directory on disk (dry runs)
pub mod local;
pub mod vercel;

use std::sync::Arc;

use serde::Deserialize;

use crate::{
    config::{StoreBackend, StoreConfig},
    schema::BlobInfo,
};

/// Visibility of an uploaded blob.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    #[default]
    Public,
    Private,
}

impl Access {
    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Private => "private",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOptions {
    pub access: Access,
    pub content_type: String,
}

impl PutOptions {
    pub fn json(access: Access) -> Self {
        Self {
            access,
            content_type: "application/json".to_string(),
        }
    }
}

/// Destination for the aggregated catalog.
///
/// CONTRACT:
/// - `content` is the complete document; a store writes all of it
///   or reports an error
/// - On success the returned `BlobInfo.url` points at the content
///
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(
        &self,
        pathname: &str,
        content: String,
        options: &PutOptions,
    ) -> anyhow::Result<BlobInfo>;
}

/// Builds the store described by the configuration.
pub fn build_store(cfg: &StoreConfig) -> anyhow::Result<Arc<dyn BlobStore>> {
    match &cfg.backend {
        StoreBackend::Vercel { api_url, token } => {
            let token = token
                .clone()
                .ok_or_else(|| anyhow::anyhow!("vercel store requires a token"))?;
            Ok(Arc::new(vercel::VercelBlobStore::new(api_url, token)?))
        }
        StoreBackend::Local { dir } => Ok(Arc::new(local::LocalBlobStore::new(dir.clone()))),
    }
}
