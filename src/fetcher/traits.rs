use async_trait::async_trait;

use crate::{error::SyncError, page::Page, query::Query, token::ContinuationToken};

/// Remote data source for one entity type.
///
/// `token` is `None` for the first page of a fresh load. Pages must not repeat an id
/// internally but may overlap items delivered earlier.
#[async_trait]
pub trait PageFetcher<T: Send + 'static>: Send + Sync {
    async fn fetch(
        &self,
        query: &Query,
        token: Option<&ContinuationToken>,
    ) -> Result<Page<T>, SyncError>;
}
