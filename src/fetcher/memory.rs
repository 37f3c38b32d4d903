use std::collections::VecDeque;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};
use std::time::Duration;

use async_trait::async_trait;

use crate::{
    error::SyncError,
    page::{Identified, Page},
    query::{Pagination, Query},
    token::ContinuationToken,
};

use super::traits::PageFetcher;

/// Serves a fixed collection with either pagination protocol.
///
/// Bound queries see the collection in descending id order; cursor queries see it in
/// insertion order with numeric offset cursors.
pub struct MemoryPageFetcher<T> {
    items: Vec<T>,
    latency: Option<Duration>,
    failures: Mutex<VecDeque<SyncError>>,
    calls: AtomicUsize,
}

impl<T> MemoryPageFetcher<T>
where
    T: Identified<Id = i64> + Clone,
{
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            latency: None,
            failures: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Delays every fetch, simulating network latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Makes the next fetch fail with `err` instead of serving a page.
    pub fn push_failure(&self, err: SyncError) {
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(err);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn take_failure(&self) -> Option<SyncError> {
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
    }

    fn bound_page(
        &self,
        query: &Query,
        token: Option<&ContinuationToken>,
    ) -> Result<Page<T>, SyncError> {
        let upper = match token {
            None => i64::MAX,
            Some(token) => token.as_bound().ok_or_else(|| {
                SyncError::InvalidRequest(format!("{token} does not fit a bound listing"))
            })?,
        };
        let mut older: Vec<T> = self
            .items
            .iter()
            .filter(|item| item.id() < upper)
            .cloned()
            .collect();
        older.sort_by_key(|item| std::cmp::Reverse(item.id()));
        older.truncate(query.page_size as usize);
        Ok(Page::descending(older))
    }

    fn cursor_page(
        &self,
        query: &Query,
        token: Option<&ContinuationToken>,
    ) -> Result<Page<T>, SyncError> {
        let offset = match token {
            None => 0,
            Some(token) => parse_offset(token)?,
        };
        let start = offset.min(self.items.len());
        let end = (start + query.page_size as usize).min(self.items.len());
        let next = (end < self.items.len()).then(|| end.to_string());
        let prev = (start > 0).then(|| start.to_string());
        Ok(Page::new(
            self.items[start..end].to_vec(),
            Some(ContinuationToken::cursor(next, prev)),
        ))
    }
}

fn parse_offset(token: &ContinuationToken) -> Result<usize, SyncError> {
    let Some(cursor) = token.next_cursor() else {
        return Err(SyncError::InvalidRequest(format!(
            "{token} has no forward cursor"
        )));
    };
    cursor
        .parse()
        .map_err(|_| SyncError::InvalidRequest(format!("Unknown cursor {cursor}")))
}

#[async_trait]
impl<T> PageFetcher<T> for MemoryPageFetcher<T>
where
    T: Identified<Id = i64> + Clone + Send + Sync + 'static,
{
    async fn fetch(
        &self,
        query: &Query,
        token: Option<&ContinuationToken>,
    ) -> Result<Page<T>, SyncError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        let page = match query.pagination() {
            Pagination::Bound => self.bound_page(query, token)?,
            Pagination::Cursor => self.cursor_page(query, token)?,
        };
        log::trace!(
            "Memory source served {} items for {:?}",
            page.items.len(),
            query.kind
        );
        if query.kind.reports_total_count() {
            return Ok(page.with_total_hint(self.items.len() as u64));
        }
        Ok(page)
    }
}
