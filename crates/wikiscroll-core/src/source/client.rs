use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, USER_AGENT};
use reqwest::{Client, Proxy};
use url::Url;

use super::endpoint::Endpoints;
use super::response::{parse_extract, parse_page};
use super::{Page, PageId, PaginationCursor, Source};
use crate::config::AppConfig;
use crate::{Error, FetchError, Result};

const MAX_RESPONSE_BYTES: usize = 2 * 1024 * 1024;

/// Issues one paginated fetch against a source.
///
/// Implementations never retry; a failed page is reported once and the caller
/// decides whether a later trigger tries again.
#[async_trait::async_trait]
pub trait SourceClient: Send + Sync {
    async fn fetch_page(
        &self,
        source: Source,
        cursor: &PaginationCursor,
    ) -> std::result::Result<Page, FetchError>;
}

/// MediaWiki API client
#[derive(Clone)]
pub struct WikipediaClient {
    client: Client,
    endpoints: Endpoints,
}

impl WikipediaClient {
    /// Create a new client with configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Self::build_client(
            config.source.request_timeout_secs,
            &config.source.proxy_url,
            &config.source.user_agent,
        )?;

        Ok(Self {
            client,
            endpoints: Endpoints::new(&config.source)?,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Build HTTP client with optional proxy
    fn build_client(timeout_secs: u64, proxy_url: &Option<String>, user_agent: &str) -> Result<Client> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .default_headers(Self::build_headers(user_agent))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(5));

        if let Some(ref proxy) = proxy_url {
            let proxy = Proxy::all(proxy)
                .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?;
            builder = builder.proxy(proxy);
            tracing::info!("Using HTTP proxy for API requests");
        }

        builder.build().map_err(Error::Http)
    }

    fn build_headers(user_agent: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate, br"));
        if let Ok(ua) = HeaderValue::from_str(user_agent) {
            headers.insert(USER_AGENT, ua);
        }
        headers
    }

    /// GET a URL and return the body of a successful response
    async fn get_bytes(&self, url: &Url) -> std::result::Result<Bytes, FetchError> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Network(format!("HTTP {} for URL: {}", status, url)));
        }

        let body = response.bytes().await?;
        if body.len() > MAX_RESPONSE_BYTES {
            return Err(FetchError::MalformedResponse(format!(
                "response too large ({} bytes) for URL: {}",
                body.len(),
                url
            )));
        }

        Ok(body)
    }

    async fn get_json(&self, url: &Url) -> std::result::Result<serde_json::Value, FetchError> {
        let body = self.get_bytes(url).await?;
        serde_json::from_slice(&body)
            .map_err(|e| FetchError::MalformedResponse(format!("invalid JSON: {}", e)))
    }

    /// Load the plain-text introduction of an article
    pub async fn fetch_extract(&self, page_id: PageId) -> std::result::Result<String, FetchError> {
        let url = self.endpoints.extract_url(page_id);
        let body = self.get_json(&url).await?;
        parse_extract(&body)
    }
}

#[async_trait::async_trait]
impl SourceClient for WikipediaClient {
    async fn fetch_page(
        &self,
        source: Source,
        cursor: &PaginationCursor,
    ) -> std::result::Result<Page, FetchError> {
        let url = self.endpoints.page_url(source, cursor);
        tracing::info!(%source, continuation = ?cursor.token(), "Fetching page");

        let body = self.get_json(&url).await?;
        let page = parse_page(source, &body)?;

        tracing::debug!(
            %source,
            items = page.items.len(),
            next = ?page.next_cursor.token(),
            "Page fetched"
        );
        Ok(page)
    }
}
