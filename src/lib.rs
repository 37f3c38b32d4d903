//! Paginated list synchronization engine.
//!
//! A [`LoadCoordinator`] owns the visible [`ListState`] of one list screen. It pulls
//! pages through a [`PageFetcher`], folds them in with [`merge`], and makes sure that
//! only the most recently issued request can ever change the list. A
//! [`RefreshTriggerRouter`] turns external notifications into coordinator calls.

pub mod config;
pub mod coordinator;
pub mod entities;
pub mod error;
pub mod fetcher;
pub mod merge;
pub mod page;
pub mod query;
pub mod resilient_fetcher;
pub mod router;
pub mod state;
pub mod token;

pub use config::SyncConfig;
pub use coordinator::{LoadCoordinator, LoadOutcome, LoadRequest};
pub use error::SyncError;
pub use fetcher::PageFetcher;
pub use merge::merge;
pub use page::{Identified, Page};
pub use query::{EntityKind, Pagination, Query, QueryBuilder, Target};
pub use router::{ListView, RefreshEvent, RefreshTriggerRouter, RouteAction, Subscription};
pub use state::ListState;
pub use token::ContinuationToken;
