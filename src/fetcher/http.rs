//! JSON-over-HTTP page source.
//!
//! Every listing is a GET on `{base_url}/{kind endpoint}` answering with
//! `{"items": [...], "next_cursor": "...", "previous_cursor": "...", "total_count": n}`.
//! Cursor listings start at cursor `-1`; a next cursor of `0` ends the listing.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};

use crate::{
    error::SyncError,
    page::{Identified, Page},
    query::{Pagination, Query, Target},
    token::ContinuationToken,
};

use super::traits::PageFetcher;

const FIRST_CURSOR: &str = "-1";
const END_CURSOR: &str = "0";

/// Configuration for the HTTP page source.
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    /// Base URL without trailing slash.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_seconds: Option<u64>,
}

/// Page source backed by a JSON HTTP API.
///
/// The client uses `Arc` internally for configuration, making cloning cheap.
pub struct HttpPageFetcher<T> {
    pub config: Arc<HttpFetcherConfig>,
    pub client: Client,
    _items: PhantomData<fn() -> T>,
}

impl<T> Clone for HttpPageFetcher<T> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            client: self.client.clone(),
            _items: PhantomData,
        }
    }
}

#[derive(Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
struct Envelope<T> {
    items: Vec<T>,
    #[serde(default)]
    next_cursor: Option<String>,
    #[serde(default)]
    previous_cursor: Option<String>,
    #[serde(default)]
    total_count: Option<u64>,
}

impl<T> HttpPageFetcher<T> {
    pub fn new(
        base_url: impl Into<String>,
        timeout_seconds: Option<u64>,
    ) -> Result<Self, SyncError> {
        let mut builder = Client::builder();
        if let Some(sec) = timeout_seconds {
            builder = builder.timeout(Duration::from_secs(sec));
        }
        let client = builder.build()?;
        Ok(Self::with_client(client, base_url, timeout_seconds))
    }

    /// Creates a fetcher with a custom HTTP client.
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        timeout_seconds: Option<u64>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            config: Arc::new(HttpFetcherConfig {
                base_url,
                timeout_seconds,
            }),
            client,
            _items: PhantomData,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn params(query: &Query, token: Option<&ContinuationToken>) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("account_id", query.account_id.to_string()),
            ("count", query.page_size.to_string()),
        ];
        match &query.target {
            Some(Target::UserId(id)) => params.push(("user_id", id.to_string())),
            Some(Target::ScreenName(name)) => params.push(("screen_name", name.clone())),
            Some(Target::StatusId(id)) => params.push(("status_id", id.to_string())),
            Some(Target::ListId(id)) => params.push(("list_id", id.to_string())),
            Some(Target::ListSlug { owner, slug }) => {
                params.push(("owner_screen_name", owner.clone()));
                params.push(("slug", slug.clone()));
            }
            None => {}
        }
        if let Some(search) = &query.search {
            params.push(("q", search.clone()));
        }
        match (query.pagination(), token) {
            // The remote max_id is inclusive.
            (Pagination::Bound, Some(token)) => {
                if let Some(bound) = token.as_bound() {
                    params.push(("max_id", bound.saturating_sub(1).to_string()));
                }
            }
            (Pagination::Cursor, token) => {
                let cursor = token
                    .and_then(ContinuationToken::next_cursor)
                    .unwrap_or(FIRST_CURSOR);
                params.push(("cursor", cursor.to_string()));
            }
            (Pagination::Bound, None) => {}
        }
        params
    }
}

fn status_error(status: StatusCode, body: String) -> SyncError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SyncError::AuthFailure(format!("{status}: {body}"))
        }
        _ => SyncError::TransportFailure(format!("HTTP {status}: {body}")),
    }
}

fn live_cursor(cursor: Option<String>) -> Option<String> {
    cursor.filter(|c| !c.is_empty() && c != END_CURSOR)
}

#[async_trait]
impl<T> PageFetcher<T> for HttpPageFetcher<T>
where
    T: Identified<Id = i64> + DeserializeOwned + Send + 'static,
{
    async fn fetch(
        &self,
        query: &Query,
        token: Option<&ContinuationToken>,
    ) -> Result<Page<T>, SyncError> {
        if query.pagination() == Pagination::Bound && token.is_some_and(|t| !t.is_bound()) {
            return Err(SyncError::InvalidRequest(
                "Cursor token passed to a bound listing".to_string(),
            ));
        }
        let url = format!("{}/{}", self.config.base_url, query.kind.endpoint());
        let params = Self::params(query, token);
        log::trace!("GET {url} {params:?}");

        let resp = self.client.get(&url).query(&params).send().await?;
        log::debug!("{:?} page HTTP status: {}", query.kind, resp.status());

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(status_error(status, body));
        }
        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|err| SyncError::malformed(err.to_string(), body.clone()))?;

        let page = match query.pagination() {
            Pagination::Bound => Page::descending(envelope.items),
            Pagination::Cursor => Page::new(
                envelope.items,
                Some(ContinuationToken::cursor(
                    live_cursor(envelope.next_cursor),
                    live_cursor(envelope.previous_cursor),
                )),
            ),
        };
        Ok(match envelope.total_count {
            Some(total) if query.kind.reports_total_count() => page.with_total_hint(total),
            _ => page,
        })
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
