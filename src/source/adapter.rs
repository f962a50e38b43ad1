use crate::schema::{Movie, PageFailure};

/// PageSource is the boundary between:
/// - The paginated collector
/// - The upstream movie API
///
/// Implementations perform exactly one request per call and
/// turn whatever happens into either the page's records or a
/// `PageFailure`.
///
/// CONTRACT:
/// - Must never panic on bad upstream data
/// - A body without the records field yields `Ok(vec![])`
/// - Records are returned in upstream order
///
#[async_trait::async_trait]
pub trait PageSource: Send + Sync {
    /// Short identifier used in log lines.
    fn name(&self) -> &str;

    /// Requests a single 1-based page.
    async fn fetch_page(&self, page: u32) -> Result<Vec<Movie>, PageFailure>;
}
