use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::{coordinator::LoadCoordinator, page::Identified};

use super::events::{ListView, RefreshEvent, RouteAction};

/// Routes [`RefreshEvent`]s for one list screen.
pub struct RefreshTriggerRouter<T: Send + 'static> {
    coordinator: LoadCoordinator<T>,
    view: Arc<dyn ListView>,
    load_more_automatically: bool,
}

impl<T: Send + 'static> Clone for RefreshTriggerRouter<T> {
    fn clone(&self) -> Self {
        Self {
            coordinator: self.coordinator.clone(),
            view: Arc::clone(&self.view),
            load_more_automatically: self.load_more_automatically,
        }
    }
}

impl<T> RefreshTriggerRouter<T>
where
    T: Identified + Clone + Send + Sync + 'static,
{
    pub fn new(coordinator: LoadCoordinator<T>, view: Arc<dyn ListView>) -> Self {
        Self {
            coordinator,
            view,
            load_more_automatically: false,
        }
    }

    /// Lets `ReachedBottom` trigger `load_more`.
    pub fn load_more_automatically(mut self, enabled: bool) -> Self {
        self.load_more_automatically = enabled;
        self
    }

    pub fn coordinator(&self) -> &LoadCoordinator<T> {
        &self.coordinator
    }

    /// Decides what `event` means for this screen without acting on it.
    pub fn route(&self, event: &RefreshEvent<T::Id>) -> RouteAction<T::Id> {
        let query = self.coordinator.query();
        let kind = query.kind;
        match event {
            RefreshEvent::DataChanged { kind: changed, success } if *changed == kind => {
                if *success {
                    RouteAction::Restart
                } else {
                    RouteAction::ClearLoading
                }
            }
            RefreshEvent::DataChanged { .. } => RouteAction::Ignored,
            RefreshEvent::ScrollToTop => {
                if self.coordinator.current_state().is_empty() {
                    RouteAction::Ignored
                } else {
                    RouteAction::ScrollToTop
                }
            }
            RefreshEvent::PullToRefresh => RouteAction::Restart,
            RefreshEvent::NearTrailingGap => RouteAction::LoadMore,
            RefreshEvent::ReachedBottom if self.load_more_automatically => RouteAction::LoadMore,
            RefreshEvent::ReachedBottom => RouteAction::Ignored,
            RefreshEvent::ItemRemoved {
                kind: removed,
                target,
                id,
            } if *removed == kind && *target == query.target => RouteAction::RemoveItem(id.clone()),
            RefreshEvent::ItemRemoved { .. } => RouteAction::Ignored,
        }
    }

    /// Routes `event` and performs the resulting action.
    pub fn dispatch(&self, event: &RefreshEvent<T::Id>) -> RouteAction<T::Id> {
        let action = self.route(event);
        log::trace!("{event:?} -> {action:?}");
        match &action {
            RouteAction::Restart => {
                self.coordinator.restart();
            }
            RouteAction::LoadMore => {
                self.coordinator.load_more();
            }
            RouteAction::ClearLoading => self.coordinator.clear_loading(),
            RouteAction::ScrollToTop => self.view.scroll_to_top(),
            RouteAction::RemoveItem(id) => {
                self.coordinator.remove_item(id);
            }
            RouteAction::Ignored => {}
        }
        action
    }

    /// Starts listening on `events`. Only events sent after this call are seen.
    pub fn attach(&self, events: &broadcast::Sender<RefreshEvent<T::Id>>) -> Subscription {
        let mut receiver = events.subscribe();
        let router = self.clone();
        let handle = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        router.dispatch(&event);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        log::warn!("Refresh listener fell behind, skipped {skipped} events");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            log::debug!("Refresh listener stopped");
        });
        Subscription { handle }
    }
}

/// Live listener; dropping it stops the listener.
#[must_use = "dropping a subscription detaches the listener"]
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    pub fn is_attached(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stops the listener.
    pub fn detach(self) {
        self.handle.abort();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
