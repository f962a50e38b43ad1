use std::sync::Arc;

use anyhow::Context;
use log::{error, info, warn};
use serde_json::{Value, json};

use crate::{
    collector::{self, Collection},
    schema::BlobInfo,
    source::adapter::PageSource,
    store::{Access, BlobStore, PutOptions},
};

/// HTTP-style result of one cron invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    pub status: u16,
    pub body: Value,
}

impl HandlerResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Scrape-and-upload entry point.
///
/// One call:
/// 1. collects pages `1..=total_pages`
/// 2. serializes `{"movies": [...]}`
/// 3. uploads the document under `pathname`
///
/// Per-page failures never reach this level. Serialization or
/// upload errors turn into a 500 response.
#[derive(Clone)]
pub struct CronHandler {
    source: Arc<dyn PageSource>,
    store: Arc<dyn BlobStore>,
    total_pages: u32,
    pathname: String,
    access: Access,
}

impl CronHandler {
    pub fn new(
        source: Arc<dyn PageSource>,
        store: Arc<dyn BlobStore>,
        total_pages: u32,
        pathname: String,
        access: Access,
    ) -> Self {
        Self {
            source,
            store,
            total_pages,
            pathname,
            access,
        }
    }

    pub async fn handle(&self) -> HandlerResponse {
        match self.run().await {
            Ok((blob, count)) => {
                info!("Upload successful: {}", blob.url);
                HandlerResponse {
                    status: 200,
                    body: json!({
                        "success": true,
                        "message": "Movies scraped and uploaded successfully!",
                        "uploadedUrl": blob.url,
                        "count": count,
                    }),
                }
            }
            Err(e) => {
                error!("Scraping and upload failed: {:#}", e);
                HandlerResponse {
                    status: 500,
                    body: json!({
                        "success": false,
                        "error": format!("{:#}", e),
                    }),
                }
            }
        }
    }

    async fn run(&self) -> anyhow::Result<(BlobInfo, usize)> {
        let collection: Collection =
            collector::collect(self.source.as_ref(), self.total_pages).await;
        let count = collection.len();
        if collection.is_empty() {
            warn!("No movies collected, uploading an empty catalog");
        }

        let content = collection
            .into_catalog()
            .to_json()
            .context("serializing movie catalog")?;

        let blob = self
            .store
            .put(&self.pathname, content, &PutOptions::json(self.access))
            .await
            .with_context(|| format!("uploading {}", self.pathname))?;

        Ok((blob, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Movie, MovieCatalog, PageFailure};
    use std::sync::Mutex;

    struct FixedSource;

    #[async_trait::async_trait]
    impl PageSource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch_page(&self, page: u32) -> Result<Vec<Movie>, PageFailure> {
            match page {
                1 => Ok(vec![json!({ "name": "A" }), json!({ "name": "B" })]),
                2 => Err(PageFailure::Status(500)),
                _ => Ok(vec![json!({ "name": "C" })]),
            }
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        fail: bool,
        puts: Mutex<Vec<(String, String, PutOptions)>>,
    }

    #[async_trait::async_trait]
    impl BlobStore for RecordingStore {
        async fn put(
            &self,
            pathname: &str,
            content: String,
            options: &PutOptions,
        ) -> anyhow::Result<BlobInfo> {
            if self.fail {
                anyhow::bail!("store unavailable");
            }

            self.puts
                .lock()
                .unwrap()
                .push((pathname.to_string(), content, options.clone()));

            Ok(BlobInfo {
                url: format!("https://blob.test/{}", pathname),
                download_url: None,
                pathname: Some(pathname.to_string()),
            })
        }
    }

    fn handler(store: Arc<RecordingStore>, access: Access) -> CronHandler {
        CronHandler::new(
            Arc::new(FixedSource),
            store,
            3,
            "movies.json".to_string(),
            access,
        )
    }

    #[tokio::test]
    async fn uploads_aggregate_and_reports_url() {
        let store = Arc::new(RecordingStore::default());

        let response = handler(store.clone(), Access::Public).handle().await;

        assert!(response.is_success());
        assert_eq!(response.body["success"], true);
        assert_eq!(
            response.body["uploadedUrl"],
            "https://blob.test/movies.json"
        );
        assert_eq!(response.body["count"], 3);

        let puts = store.puts.lock().unwrap();
        assert_eq!(puts.len(), 1);

        let (pathname, content, options) = &puts[0];
        assert_eq!(pathname, "movies.json");
        assert_eq!(options, &PutOptions::json(Access::Public));

        let catalog: MovieCatalog = serde_json::from_str(content).unwrap();
        let names: Vec<&str> = catalog
            .movies
            .iter()
            .map(|m| m["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert!(content.contains("\n  \"movies\""));
    }

    #[tokio::test]
    async fn upload_failure_is_500_with_message() {
        let store = Arc::new(RecordingStore {
            fail: true,
            ..Default::default()
        });

        let response = handler(store, Access::Private).handle().await;

        assert_eq!(response.status, 500);
        assert_eq!(response.body["success"], false);
        let message = response.body["error"].as_str().unwrap();
        assert!(message.contains("uploading movies.json"));
        assert!(message.contains("store unavailable"));
    }
}
