use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::Deserialize;

use crate::store::Access;

/// Environment variable overriding `upstream.token`.
pub const UPSTREAM_TOKEN_ENV: &str = "UPSTREAM_BEARER_TOKEN";

/// Environment variable overriding the Vercel store token.
pub const BLOB_TOKEN_ENV: &str = "BLOB_READ_WRITE_TOKEN";

// ------------------------------------------------------------
// Root configuration
// ------------------------------------------------------------
//
// Loaded from `config.json`.
//
// It defines:
// - Where movie pages come from and how many to request
// - Where the aggregated catalog is written
// - Optional HTTP server and debug settings
//
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Upstream movie API
    pub upstream: UpstreamConfig,

    /// Destination of the aggregated catalog
    pub store: StoreConfig,

    /// Optional HTTP server settings (used by `serve`)
    #[serde(default)]
    pub server: ServerConfig,

    /// Optional debug configuration
    pub debug: Option<DebugConfig>,
}

// ------------------------------------------------------------
// Upstream configuration
// ------------------------------------------------------------
//
// The two historical entry points of this utility (a long
// authenticated POST pagination and a single anonymous GET) are
// both expressed here:
//
//   { "total_pages": 1282, "method": "post", "token": "..." }
//   { "total_pages": 1,    "method": "get" }
//
#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    /// Movies endpoint, e.g. https://scraper.example.com/api/movies
    pub url: String,

    /// Static bearer token. `None` sends no Authorization header.
    ///
    /// Overridden by `UPSTREAM_BEARER_TOKEN` when set.
    #[serde(default)]
    pub token: Option<String>,

    /// Number of pages requested per run (pages 1..=total_pages)
    #[serde(default = "default_total_pages")]
    pub total_pages: u32,

    /// How the page number is sent
    #[serde(default)]
    pub method: RequestMethod,

    /// Name of the body field holding the records array
    #[serde(default = "default_records_field")]
    pub records_field: String,
}

/// Page number transport.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestMethod {
    /// `POST url` with body `{"page": n}`
    #[default]
    Post,

    /// `GET url?page=n`
    Get,
}

// ------------------------------------------------------------
// Store configuration
// ------------------------------------------------------------
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Storage backend selection
    pub backend: StoreBackend,

    /// Blob name of the uploaded catalog
    #[serde(default = "default_pathname")]
    pub pathname: String,

    /// Visibility of the uploaded blob
    #[serde(default)]
    pub access: Access,
}

/// Backend selection, tagged by `kind`.
///
///   { "kind": "vercel", "token": "..." }
///   { "kind": "local", "dir": "./out" }
///
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreBackend {
    Vercel {
        #[serde(default = "default_blob_api_url")]
        api_url: String,

        /// Overridden by `BLOB_READ_WRITE_TOKEN` when set.
        #[serde(default)]
        token: Option<String>,
    },
    Local { dir: PathBuf },
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Listen address for `serve`
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    /// Raises the default log level to `debug`
    pub log: Option<bool>,
}

fn default_total_pages() -> u32 {
    1282
}

fn default_records_field() -> String {
    "movies".to_string()
}

fn default_pathname() -> String {
    "movies.json".to_string()
}

fn default_blob_api_url() -> String {
    "https://blob.vercel-storage.com".to_string()
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

impl Config {
    /// Reads, overrides from the process environment, and validates.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Config> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;

        let mut cfg = Self::from_json(&data)?;
        cfg.apply_overrides(|key| std::env::var(key).ok());
        cfg.validate()?;

        Ok(cfg)
    }

    pub fn from_json(data: &str) -> anyhow::Result<Config> {
        let cfg = serde_json::from_str(data).context("parsing config json")?;
        Ok(cfg)
    }

    /// Replaces secrets with values from `lookup` when present.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty(UPSTREAM_TOKEN_ENV) {
            self.upstream.token = Some(token);
        }

        if let StoreBackend::Vercel { token, .. } = &mut self.store.backend {
            if let Some(value) = non_empty(BLOB_TOKEN_ENV) {
                *token = Some(value);
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.upstream.url.trim().is_empty() {
            bail!("upstream.url must not be empty");
        }

        if self.upstream.records_field.is_empty() {
            bail!("upstream.records_field must not be empty");
        }

        if self.store.pathname.trim().is_empty() {
            bail!("store.pathname must not be empty");
        }

        if let StoreBackend::Vercel { token, .. } = &self.store.backend {
            if token.as_deref().is_none_or(|t| t.trim().is_empty()) {
                bail!(
                    "vercel store requires a token (store.backend.token or {})",
                    BLOB_TOKEN_ENV
                );
            }
        }

        Ok(())
    }

    pub fn debug_log(&self) -> bool {
        self.debug.as_ref().is_some_and(|d| d.log.unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "upstream": { "url": "https://scraper.example.com/api/movies" },
        "store": { "backend": { "kind": "vercel" } }
    }"#;

    #[test]
    fn defaults_match_paginated_variant() {
        let cfg = Config::from_json(MINIMAL).unwrap();

        assert_eq!(cfg.upstream.total_pages, 1282);
        assert_eq!(cfg.upstream.method, RequestMethod::Post);
        assert_eq!(cfg.upstream.records_field, "movies");
        assert_eq!(cfg.upstream.token, None);
        assert_eq!(cfg.store.pathname, "movies.json");
        assert_eq!(cfg.store.access, Access::Public);
        assert_eq!(cfg.server.bind, "0.0.0.0:3000");
        assert!(!cfg.debug_log());

        match cfg.store.backend {
            StoreBackend::Vercel { api_url, .. } => {
                assert_eq!(api_url, "https://blob.vercel-storage.com")
            }
            other => panic!("unexpected backend {:?}", other),
        }
    }

    #[test]
    fn single_get_variant() {
        let cfg = Config::from_json(
            r#"{
                "upstream": {
                    "url": "https://scraper.example.com/api/movies",
                    "total_pages": 1,
                    "method": "get"
                },
                "store": {
                    "backend": { "kind": "local", "dir": "out" },
                    "access": "private"
                },
                "debug": { "log": true }
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.upstream.total_pages, 1);
        assert_eq!(cfg.upstream.method, RequestMethod::Get);
        assert_eq!(cfg.store.access, Access::Private);
        assert!(cfg.debug_log());
        assert!(matches!(cfg.store.backend, StoreBackend::Local { .. }));
        cfg.validate().unwrap();
    }

    #[test]
    fn vercel_store_needs_token() {
        let cfg = Config::from_json(MINIMAL).unwrap();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains(BLOB_TOKEN_ENV));
    }

    #[test]
    fn environment_overrides_secrets() {
        let mut cfg = Config::from_json(MINIMAL).unwrap();

        cfg.apply_overrides(|key| match key {
            UPSTREAM_TOKEN_ENV => Some("upstream-secret".to_string()),
            BLOB_TOKEN_ENV => Some("blob-secret".to_string()),
            _ => None,
        });

        assert_eq!(cfg.upstream.token.as_deref(), Some("upstream-secret"));
        match &cfg.store.backend {
            StoreBackend::Vercel { token, .. } => {
                assert_eq!(token.as_deref(), Some("blob-secret"))
            }
            other => panic!("unexpected backend {:?}", other),
        }
        cfg.validate().unwrap();
    }

    #[test]
    fn empty_override_is_ignored() {
        let mut cfg = Config::from_json(MINIMAL).unwrap();
        cfg.upstream.token = Some("from-file".to_string());

        cfg.apply_overrides(|_| Some("   ".to_string()));

        assert_eq!(cfg.upstream.token.as_deref(), Some("from-file"));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Config::load("does-not-exist.json").is_err());
    }
}
