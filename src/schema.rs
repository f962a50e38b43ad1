use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single movie record as returned by the upstream API.
///
/// The shape is owned entirely by the upstream scraper. This collector
/// never looks inside a record, it only moves it from a page response
/// into the catalog.
pub type Movie = Value;

// ------------------------------------------------------------
// Movie catalog
// ------------------------------------------------------------
//
// The document uploaded to the blob store:
//
//     { "movies": [ ... ] }
//
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MovieCatalog {
    pub movies: Vec<Movie>,
}

impl MovieCatalog {
    /// Pretty-printed JSON with two-space indentation.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ------------------------------------------------------------
// Page outcome
// ------------------------------------------------------------
//
// Result of requesting exactly one page.
//
// Every page the collector asks for produces exactly one outcome,
// in page order. Failed pages never carry records.
//
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Success { page: u32, movies: Vec<Movie> },
    Failure { page: u32, reason: PageFailure },
}

impl PageOutcome {
    /// Number of records this page contributes to the aggregate.
    pub fn record_count(&self) -> usize {
        match self {
            PageOutcome::Success { movies, .. } => movies.len(),
            PageOutcome::Failure { .. } => 0,
        }
    }
}

/// Why a page contributed nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageFailure {
    /// Upstream answered with a non-2xx status code.
    #[error("HTTP status {0}")]
    Status(u16),

    /// The request never produced a usable response
    /// (connect, DNS, TLS, timeout, body read).
    #[error("transport error: {0}")]
    Transport(String),

    /// 2xx response whose body was not valid JSON.
    #[error("malformed body: {0}")]
    Malformed(String),
}

// ------------------------------------------------------------
// Blob info
// ------------------------------------------------------------
//
// What the blob store hands back after a successful write.
//
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlobInfo {
    pub url: String,

    #[serde(default)]
    pub download_url: Option<String>,

    #[serde(default)]
    pub pathname: Option<String>,
}
