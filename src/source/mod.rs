/// Upstream page sources
///
/// The collector only talks to the `PageSource` trait. The HTTP
/// implementation lives in `http`.
pub mod adapter;
pub mod http;

use std::sync::Arc;

use adapter::PageSource;

use crate::config::UpstreamConfig;

/// Builds the page source described by the upstream configuration.
pub fn build_source(cfg: &UpstreamConfig) -> anyhow::Result<Arc<dyn PageSource>> {
    Ok(Arc::new(http::HttpPageSource::new(cfg)?))
}
