use serde::{Deserialize, Serialize};

use crate::query::{EntityKind, Target};

/// Notification that may require reloading or trimming a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RefreshEvent<I = i64> {
    /// A write for `kind` finished, successfully or not.
    DataChanged { kind: EntityKind, success: bool },
    ScrollToTop,
    PullToRefresh,
    /// The display is close to the trailing gap row.
    NearTrailingGap,
    /// The display hit the last item.
    ReachedBottom,
    /// An item disappeared from the `kind` listing scoped to `target`.
    ItemRemoved {
        kind: EntityKind,
        #[serde(default)]
        target: Option<Target>,
        id: I,
    },
}

/// What a router did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAction<I = i64> {
    Restart,
    LoadMore,
    ClearLoading,
    ScrollToTop,
    RemoveItem(I),
    Ignored,
}

/// Display hooks the router needs besides the list state.
pub trait ListView: Send + Sync {
    fn scroll_to_top(&self);
}
