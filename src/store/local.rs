use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, anyhow, bail};
use log::debug;

use crate::schema::BlobInfo;

use super::{BlobStore, PutOptions};

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// Writes blobs into a local directory.
///
/// Access is ignored; the URL is a `file://` URL of the written file.
///
/// Content goes to a staging file next to the target first and is
/// renamed into place, so readers see the old blob or the new one.
pub struct LocalBlobStore {
    dir: PathBuf,
}

impl LocalBlobStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

#[async_trait::async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(
        &self,
        pathname: &str,
        content: String,
        options: &PutOptions,
    ) -> anyhow::Result<BlobInfo> {
        if pathname.split('/').any(|part| part == "..") {
            bail!("pathname {:?} escapes the store directory", pathname);
        }

        let path = self.dir.join(pathname.trim_start_matches('/'));
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let file_name = path
            .file_name()
            .ok_or_else(|| anyhow!("pathname {:?} has no file name", pathname))?
            .to_string_lossy()
            .into_owned();
        let staging = path.with_file_name(format!(
            ".{}.{}-{}.tmp",
            file_name,
            std::process::id(),
            STAGING_SEQ.fetch_add(1, Ordering::Relaxed)
        ));

        let written = match tokio::fs::write(&staging, content).await {
            Ok(()) => tokio::fs::rename(&staging, &path).await,
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&staging).await;
            let context = format!("writing {}", path.display());
            return Err(anyhow::Error::from(e).context(context));
        }

        debug!(
            "Wrote {} ({}, {})",
            path.display(),
            options.content_type,
            options.access.as_str()
        );

        let absolute = std::path::absolute(&path).unwrap_or(path);

        Ok(BlobInfo {
            url: format!("file://{}", absolute.display()),
            download_url: None,
            pathname: Some(pathname.to_string()),
        })
    }
}
