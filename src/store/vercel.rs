use anyhow::{Context, anyhow};
use reqwest::{Client, RequestBuilder, Url, header::CONTENT_TYPE};

use crate::schema::BlobInfo;

use super::{BlobStore, PutOptions};

/// API version sent in `x-api-version`.
const API_VERSION: &str = "7";

/// Vercel Blob store.
///
/// Upload:
///     PUT <api_url>/<pathname>
///     authorization: Bearer <BLOB_READ_WRITE_TOKEN>
///
/// The catalog always lands under the same pathname: random
/// suffixes are disabled and overwriting is allowed.
pub struct VercelBlobStore {
    client: Client,
    api_url: Url,
    token: String,
}

impl VercelBlobStore {
    pub fn new(api_url: &str, token: String) -> anyhow::Result<Self> {
        let api_url = Url::parse(api_url)
            .with_context(|| format!("invalid blob api url {:?}", api_url))?;

        Ok(Self {
            client: Client::new(),
            api_url,
            token,
        })
    }

    fn build_request(
        &self,
        pathname: &str,
        content: String,
        options: &PutOptions,
    ) -> anyhow::Result<RequestBuilder> {
        let mut url = self.api_url.clone();
        let base_error = || anyhow!("blob api url cannot be a base: {}", self.api_url);
        url.path_segments_mut()
            .map_err(|_| base_error())?
            .pop_if_empty()
            .extend(pathname.split('/').filter(|s| !s.is_empty()));

        Ok(self
            .client
            .put(url)
            .bearer_auth(&self.token)
            .header("x-api-version", API_VERSION)
            .header("x-content-type", options.content_type.as_str())
            .header("x-add-random-suffix", "0")
            .header("x-allow-overwrite", "1")
            .header("x-vercel-blob-access", options.access.as_str())
            .header(CONTENT_TYPE, options.content_type.as_str())
            .body(content))
    }
}

#[async_trait::async_trait]
impl BlobStore for VercelBlobStore {
    async fn put(
        &self,
        pathname: &str,
        content: String,
        options: &PutOptions,
    ) -> anyhow::Result<BlobInfo> {
        let response = self
            .build_request(pathname, content, options)?
            .send()
            .await
            .context("sending blob upload")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "blob upload failed with status {}: {}",
                status.as_u16(),
                text
            ));
        }

        let info = response
            .json::<BlobInfo>()
            .await
            .context("decoding blob upload response")?;

        Ok(info)
    }
}
