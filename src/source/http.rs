use anyhow::Context;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::{Value, json};

use crate::{
    config::{RequestMethod, UpstreamConfig},
    schema::{Movie, PageFailure},
};

use super::adapter::PageSource;

/// HTTP page source for the movie scraper API.
///
/// POST mode:
///     POST <url>  {"page": n}
///
/// GET mode:
///     GET <url>?page=n
///
/// Both modes attach `Authorization: Bearer <token>` when a token
/// is configured. No timeout is set beyond reqwest's defaults.
pub struct HttpPageSource {
    client: Client,
    url: Url,
    token: Option<String>,
    method: RequestMethod,
    records_field: String,
}

impl HttpPageSource {
    pub fn new(cfg: &UpstreamConfig) -> anyhow::Result<Self> {
        let url = Url::parse(&cfg.url)
            .with_context(|| format!("invalid upstream url {:?}", cfg.url))?;

        Ok(Self {
            client: Client::new(),
            url,
            token: cfg.token.clone(),
            method: cfg.method,
            records_field: cfg.records_field.clone(),
        })
    }

    fn build_request(&self, page: u32) -> RequestBuilder {
        let request = match self.method {
            RequestMethod::Post => self
                .client
                .post(self.url.clone())
                .json(&json!({ "page": page })),

            RequestMethod::Get => {
                let mut url = self.url.clone();
                url.query_pairs_mut()
                    .append_pair("page", &page.to_string());
                self.client.get(url)
            }
        };

        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait::async_trait]
impl PageSource for HttpPageSource {
    fn name(&self) -> &str {
        self.url.as_str()
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<Movie>, PageFailure> {
        let response = self
            .build_request(page)
            .send()
            .await
            .map_err(|e| PageFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PageFailure::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PageFailure::Transport(e.to_string()))?;

        decode_page(&body, &self.records_field)
    }
}

/// Extracts the records array from a page body.
///
/// - invalid JSON                    -> `Malformed`
/// - field missing or not an array   -> empty page
/// - otherwise                       -> the array, in order
pub fn decode_page(body: &[u8], records_field: &str) -> Result<Vec<Movie>, PageFailure> {
    let mut value: Value =
        serde_json::from_slice(body).map_err(|e| PageFailure::Malformed(e.to_string()))?;

    match value.get_mut(records_field).map(Value::take) {
        Some(Value::Array(movies)) => Ok(movies),
        _ => Ok(Vec::new()),
    }
}
