//! Client for the remote document database's REST API.
//!
//! Lists documents of a collection with JSON-encoded `queries[]` parameters,
//! paging through results until the collection is exhausted.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{Document, Filter, RecordStore, StoreError};
use crate::config::Config;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// Bounds a single page request; the aggregator's optional read timeout bounds the whole read.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Documents requested per page.
/// The database caps pages, so larger collections are read with offsets.
const PAGE_SIZE: usize = 100;

/// Upper bound on pages per read, so a misbehaving `total` can't loop forever.
const MAX_PAGES: usize = 500;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

const PROJECT_HEADER: &str = "X-Appwrite-Project";
const KEY_HEADER: &str = "X-Appwrite-Key";

#[derive(Debug, Deserialize)]
struct DocumentList {
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    documents: Vec<Document>,
}

/// Record store backed by the document database REST API.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct RestRecordStore {
    client: Client,
    endpoint: String,
    project_id: String,
    database_id: String,
    api_key: Option<String>,
}

impl RestRecordStore {
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            database_id: config.database_id.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn documents_url(&self, collection_id: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.endpoint, self.database_id, collection_id
        )
    }

    fn headers(&self) -> Result<header::HeaderMap, StoreError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            PROJECT_HEADER,
            header::HeaderValue::from_str(&self.project_id)
                .map_err(|e| StoreError::InvalidResponse(format!("Invalid project id header: {}", e)))?,
        );
        if let Some(ref key) = self.api_key {
            headers.insert(
                KEY_HEADER,
                header::HeaderValue::from_str(key)
                    .map_err(|e| StoreError::InvalidResponse(format!("Invalid API key header: {}", e)))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>, StoreError> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(StoreError::from_status(status, &body))
        }
    }

    async fn fetch_page(&self, url: &str, queries: &[(&str, String)]) -> Result<DocumentList, StoreError> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .get(url)
                .headers(self.headers()?)
                .query(queries)
                .send()
                .await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    let text = response.text().await?;
                    return serde_json::from_str(&text).map_err(|e| {
                        StoreError::InvalidResponse(format!("Failed to parse document list from {}: {}", url, e))
                    });
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(StoreError::RateLimited);
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }
}

/// Build the `queries[]` parameters for one page.
/// A caller-supplied limit disables paging and is sent as-is.
fn page_queries(filters: &[Filter], offset: usize) -> (Vec<(&'static str, String)>, bool) {
    let mut queries: Vec<(&'static str, String)> = filters
        .iter()
        .filter(|f| !matches!(f, Filter::Offset(_)))
        .map(|f| ("queries[]", f.to_query()))
        .collect();

    let caller_limited = filters.iter().any(|f| matches!(f, Filter::Limit(_)));
    if !caller_limited {
        queries.push(("queries[]", Filter::Limit(PAGE_SIZE).to_query()));
        queries.push(("queries[]", Filter::Offset(offset).to_query()));
    }
    (queries, caller_limited)
}

#[async_trait]
impl RecordStore for RestRecordStore {
    async fn list(&self, collection_id: &str, filters: &[Filter]) -> Result<Vec<Document>, StoreError> {
        let url = self.documents_url(collection_id);
        let mut documents = Vec::new();

        for page in 0..MAX_PAGES {
            let (queries, caller_limited) = page_queries(filters, documents.len());
            let list = self.fetch_page(&url, &queries).await?;
            let received = list.documents.len();
            documents.extend(list.documents);

            debug!(collection = collection_id, page, received, total = ?list.total, "Fetched document page");

            let exhausted = received < PAGE_SIZE
                || list.total.is_some_and(|total| documents.len() as u64 >= total);
            if caller_limited || exhausted {
                return Ok(documents);
            }
        }

        warn!(collection = collection_id, pages = MAX_PAGES, "Page limit reached, returning partial collection");
        Ok(documents)
    }
}
