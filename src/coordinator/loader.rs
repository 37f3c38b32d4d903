use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{broadcast, watch};

use crate::{
    config::SyncConfig,
    error::SyncError,
    fetcher::PageFetcher,
    merge::merge,
    page::{Identified, Page},
    query::Query,
    resilient_fetcher::ResilientFetcher,
    state::ListState,
    token::ContinuationToken,
};

use super::request::LoadRequest;

const FAILURE_CHANNEL_CAPACITY: usize = 16;

/// What happened to a completed request.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The page was merged into the list.
    Applied,
    /// A newer request exists; the result was dropped without a trace.
    Superseded,
    /// The fetch or merge failed; the list kept its last good value.
    Failed(SyncError),
}

/// Owns the list state of one screen and the single request allowed to change it.
///
/// Operations never wait on I/O: fetches run on spawned Tokio tasks, so `restart` and
/// `load_more` must be called from within a Tokio runtime. Cloning yields another
/// handle to the same coordinator.
pub struct LoadCoordinator<T: Send + 'static> {
    shared: Arc<Shared<T>>,
}

impl<T: Send + 'static> Clone for LoadCoordinator<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

struct Shared<T: Send + 'static> {
    query: Query,
    fetcher: Arc<dyn PageFetcher<T>>,
    fetch_timeout: Duration,
    control: Mutex<Control<T>>,
    states: watch::Sender<Arc<ListState<T>>>,
    failures: broadcast::Sender<SyncError>,
}

struct Control<T> {
    state: Arc<ListState<T>>,
    last_sequence: u64,
    active: Option<LoadRequest>,
}

impl<T> Control<T> {
    fn issue(&mut self, token: Option<ContinuationToken>, is_initial_load: bool) -> LoadRequest {
        if let Some(previous) = self.active.take() {
            log::debug!("Cancelling request #{}", previous.sequence());
            previous.cancel();
        }
        self.last_sequence += 1;
        let request = LoadRequest::new(self.last_sequence, token, is_initial_load);
        self.active = Some(request.clone());
        request
    }

    fn publish(&mut self, next: ListState<T>, states: &watch::Sender<Arc<ListState<T>>>) {
        self.state = Arc::new(next);
        states.send_replace(Arc::clone(&self.state));
    }

    fn is_active(&self, request: &LoadRequest) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.sequence() == request.sequence())
    }
}

impl<T> LoadCoordinator<T>
where
    T: Identified + Clone + Send + Sync + 'static,
{
    /// Creates a coordinator with default timeout and no retries.
    pub fn new(query: Query, fetcher: Arc<dyn PageFetcher<T>>) -> Self {
        Self::build(query, fetcher, SyncConfig::default().fetch_timeout())
    }

    /// Creates a coordinator honoring the timeout and retry settings of `config`.
    ///
    /// The timeout bounds a fetch including its retries.
    pub fn with_config(
        query: Query,
        fetcher: Arc<dyn PageFetcher<T>>,
        config: &SyncConfig,
    ) -> Self {
        let fetcher: Arc<dyn PageFetcher<T>> = if config.retry.max_attempts > 1 {
            Arc::new(ResilientFetcher::new(fetcher, config.retry.clone()))
        } else {
            fetcher
        };
        Self::build(query, fetcher, config.fetch_timeout())
    }

    fn build(query: Query, fetcher: Arc<dyn PageFetcher<T>>, fetch_timeout: Duration) -> Self {
        let state = Arc::new(ListState::new());
        let (states, _) = watch::channel(Arc::clone(&state));
        let (failures, _) = broadcast::channel(FAILURE_CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                query,
                fetcher,
                fetch_timeout,
                control: Mutex::new(Control {
                    state,
                    last_sequence: 0,
                    active: None,
                }),
                states,
                failures,
            }),
        }
    }

    pub fn query(&self) -> &Query {
        &self.shared.query
    }

    /// Drops whatever is loading and fetches the first page again.
    ///
    /// `loading` is set before this returns.
    pub fn restart(&self) -> LoadRequest {
        let request = {
            let mut control = self.lock();
            let request = control.issue(None, true);
            let next = control.state.with_loading(true);
            control.publish(next, &self.shared.states);
            request
        };
        log::debug!(
            "Restarting {:?} with request #{}",
            self.shared.query.kind,
            request.sequence()
        );
        self.spawn_fetch(request.clone());
        request
    }

    /// Fetches the page after the current tail.
    ///
    /// Returns `None` without doing anything while loading or when nothing is left.
    pub fn load_more(&self) -> Option<LoadRequest> {
        let request = {
            let mut control = self.lock();
            if control.state.loading || !control.state.has_more {
                return None;
            }
            let token = control.state.next_token.clone();
            let request = control.issue(token, false);
            let next = control.state.with_loading(true);
            control.publish(next, &self.shared.states);
            request
        };
        log::debug!(
            "Loading more {:?} with request #{} from {}",
            self.shared.query.kind,
            request.sequence(),
            request
                .token()
                .map_or_else(|| "start".to_string(), ToString::to_string)
        );
        self.spawn_fetch(request.clone());
        Some(request)
    }

    /// Applies the result of `request` if it is still the active one.
    ///
    /// Failures leave items, flags and the continuation token untouched so that the
    /// next `load_more` retries from the same place.
    pub fn on_request_completed(
        &self,
        request: &LoadRequest,
        result: Result<Page<T>, SyncError>,
    ) -> LoadOutcome {
        let mut control = self.lock();
        if !control.is_active(request) {
            log::debug!("Dropping result of stale request #{}", request.sequence());
            return LoadOutcome::Superseded;
        }
        control.active = None;

        let merged = result.and_then(|page| merge(&control.state, page, request.is_initial_load()));
        match merged {
            Ok(next) => {
                log::debug!(
                    "Request #{} applied: {} items, has_more={}, gap={}",
                    request.sequence(),
                    next.len(),
                    next.has_more(),
                    next.show_trailing_gap()
                );
                control.publish(next, &self.shared.states);
                LoadOutcome::Applied
            }
            Err(err) => {
                // Reported before loading clears so idle readers always see it.
                let reported = !err.is_superseded();
                if reported {
                    log::warn!("Request #{} failed: {err}", request.sequence());
                    let _ = self.shared.failures.send(err.clone());
                }
                let next = control.state.with_loading(false);
                control.publish(next, &self.shared.states);
                if reported {
                    LoadOutcome::Failed(err)
                } else {
                    LoadOutcome::Superseded
                }
            }
        }
    }

    /// Read-only snapshot of the list.
    pub fn current_state(&self) -> Arc<ListState<T>> {
        Arc::clone(&*self.shared.states.borrow())
    }

    /// Receiver notified on every state transition.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ListState<T>>> {
        self.shared.states.subscribe()
    }

    /// Receiver of failures worth showing to the user.
    pub fn failures(&self) -> broadcast::Receiver<SyncError> {
        self.shared.failures.subscribe()
    }

    /// Resolves with the first state that is not loading.
    pub async fn wait_idle(&self) -> Arc<ListState<T>> {
        let mut states = self.subscribe();
        let idle = match states.wait_for(|state| !state.loading).await {
            Ok(state) => Arc::clone(&*state),
            Err(_) => self.current_state(),
        };
        idle
    }

    /// Clears the loading flag without touching the active request.
    pub fn clear_loading(&self) {
        let mut control = self.lock();
        if control.state.loading {
            let next = control.state.with_loading(false);
            control.publish(next, &self.shared.states);
        }
    }

    /// Cancels the outstanding request, if any.
    pub fn cancel_active(&self) {
        let mut control = self.lock();
        let Some(request) = control.active.take() else {
            return;
        };
        log::debug!("Cancelling request #{}", request.sequence());
        request.cancel();
        let next = control.state.with_loading(false);
        control.publish(next, &self.shared.states);
    }

    /// Removes an item that disappeared remotely. Returns whether it was listed.
    pub fn remove_item(&self, id: &T::Id) -> bool {
        let mut control = self.lock();
        let Some(next) = control.state.without(id) else {
            return false;
        };
        control.publish(next, &self.shared.states);
        true
    }

    fn lock(&self) -> MutexGuard<'_, Control<T>> {
        self.shared
            .control
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn_fetch(&self, request: LoadRequest) {
        let coordinator = self.clone();
        tokio::spawn(async move {
            let result = coordinator.run_fetch(&request).await;
            coordinator.on_request_completed(&request, result);
        });
    }

    async fn run_fetch(&self, request: &LoadRequest) -> Result<Page<T>, SyncError> {
        let cancel = request.cancellation();
        let fetcher = Arc::clone(&self.shared.fetcher);
        let query = self.shared.query.clone();
        let token = request.token().cloned();
        // A panicking fetcher must still complete the request.
        let fetch = tokio::spawn(async move { fetcher.fetch(&query, token.as_ref()).await });
        let abort = fetch.abort_handle();
        let fetch = async move {
            fetch.await.unwrap_or_else(|err| {
                Err(SyncError::TransportFailure(format!("fetch task failed: {err}")))
            })
        };
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SyncError::RequestSuperseded {
                sequence: request.sequence(),
            }),
            result = tokio::time::timeout(self.shared.fetch_timeout, fetch) => match result {
                Ok(result) => result,
                Err(_) => Err(SyncError::TransportFailure(format!(
                    "fetch timed out after {} ms",
                    self.shared.fetch_timeout.as_millis()
                ))),
            },
        };
        abort.abort();
        result
    }
}
