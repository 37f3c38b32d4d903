use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::time::sleep;

use crate::{
    error::SyncError,
    fetcher::PageFetcher,
    page::Page,
    query::Query,
    token::ContinuationToken,
};

use super::config::ResilienceConfig;

/// Resilient wrapper that retries transient fetch failures using exponential backoff.
pub struct ResilientFetcher<T: Send + 'static> {
    inner: Arc<dyn PageFetcher<T>>,
    cfg: ResilienceConfig,
}

impl<T: Send + 'static> ResilientFetcher<T> {
    /// Creates a new resilient wrapper around an existing fetcher.
    pub fn new(inner: Arc<dyn PageFetcher<T>>, cfg: ResilienceConfig) -> Self {
        Self { inner, cfg }
    }

    fn is_retryable(err: &SyncError) -> bool {
        match err {
            SyncError::TransportFailure(_) => true,
            SyncError::MalformedResponse { .. } => true,
            SyncError::AuthFailure(_) => false,
            SyncError::OrderingViolation { .. } => false,
            SyncError::RequestSuperseded { .. } => false,
            SyncError::InvalidRequest(_) => false,
            SyncError::RetryExceeded { .. } => false,
            SyncError::Config(_) => false,
        }
    }

    async fn backoff_sleep(&self, attempt_index: usize) {
        let mut delay = self
            .cfg
            .base_delay_ms
            .saturating_mul(1u64 << attempt_index.min(16));
        delay = delay.min(self.cfg.max_delay_ms);
        if self.cfg.jitter {
            let span = (delay / 2).max(1);
            let jitter = rand::thread_rng().gen_range(0..span);
            delay = delay.saturating_sub(jitter);
        }
        log::debug!("Retrying fetch in {delay} ms");
        sleep(Duration::from_millis(delay)).await;
    }
}

#[async_trait]
impl<T: Send + 'static> PageFetcher<T> for ResilientFetcher<T> {
    async fn fetch(
        &self,
        query: &Query,
        token: Option<&ContinuationToken>,
    ) -> Result<Page<T>, SyncError> {
        let mut attempts_left = self.cfg.max_attempts;
        let mut idx = 0usize;
        let mut last_err: Option<SyncError> = None;

        while attempts_left > 0 {
            match self.inner.fetch(query, token).await {
                Ok(page) => return Ok(page),
                Err(err) => {
                    if attempts_left == 1 || !Self::is_retryable(&err) {
                        return Err(err);
                    }
                    log::warn!(
                        "Fetch attempt {} for {:?} failed: {err}",
                        idx + 1,
                        query.kind
                    );
                    last_err = Some(err);
                    self.backoff_sleep(idx).await;
                    attempts_left -= 1;
                    idx += 1;
                }
            }
        }

        Err(SyncError::RetryExceeded {
            attempts: self.cfg.max_attempts,
            last_error: last_err.map(|e| e.to_string()).unwrap_or_default(),
        })
    }
}
