use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    error::SyncError,
    page::{Identified, Page},
    query::Query,
    token::ContinuationToken,
};

use super::traits::PageFetcher;

/// Sources that list ids first and hydrate them in batches.
#[async_trait]
pub trait IdLookup<T>: Send + Sync {
    /// Every id in the listing, in display order.
    async fn ids(&self, query: &Query) -> Result<Vec<i64>, SyncError>;

    /// Hydrates a batch of ids. Missing entities are allowed.
    async fn lookup(&self, query: &Query, ids: &[i64]) -> Result<Vec<T>, SyncError>;
}

/// Pages through an id listing with offset cursors.
///
/// The id list is fetched once per fresh load and reused for continuation pages of the
/// same query. The total-count hint is the id count minus the ids the lookup could not
/// hydrate so far.
pub struct IdListFetcher<L> {
    lookup: L,
    cache: Mutex<Option<IdListing>>,
}

struct IdListing {
    query: Query,
    ids: Arc<Vec<i64>>,
    /// Unhydrated ids per batch offset.
    missing: HashMap<usize, usize>,
}

impl IdListing {
    fn total_hint(&self) -> u64 {
        let missing: usize = self.missing.values().sum();
        self.ids.len().saturating_sub(missing) as u64
    }
}

impl<L> IdListFetcher<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            cache: Mutex::new(None),
        }
    }

    async fn id_list<T>(&self, query: &Query, fresh: bool) -> Result<Arc<Vec<i64>>, SyncError>
    where
        L: IdLookup<T>,
    {
        let mut cache = self.cache.lock().await;
        if !fresh {
            if let Some(listing) = cache.as_ref().filter(|listing| listing.query == *query) {
                return Ok(Arc::clone(&listing.ids));
            }
        }
        let ids = Arc::new(self.lookup.ids(query).await?);
        log::debug!("Loaded {} ids for {:?}", ids.len(), query.kind);
        *cache = Some(IdListing {
            query: query.clone(),
            ids: Arc::clone(&ids),
            missing: HashMap::new(),
        });
        Ok(ids)
    }

    /// Records how many ids of the batch at `start` were not hydrated and returns the
    /// adjusted total.
    async fn record_missing(
        &self,
        query: &Query,
        ids: &Arc<Vec<i64>>,
        start: usize,
        missing: usize,
    ) -> u64 {
        let mut cache = self.cache.lock().await;
        match cache
            .as_mut()
            .filter(|listing| listing.query == *query && Arc::ptr_eq(&listing.ids, ids))
        {
            Some(listing) => {
                listing.missing.insert(start, missing);
                listing.total_hint()
            }
            None => ids.len().saturating_sub(missing) as u64,
        }
    }
}

fn offset_of(token: &ContinuationToken) -> Result<usize, SyncError> {
    let cursor = token.next_cursor().ok_or_else(|| {
        SyncError::InvalidRequest(format!("{token} has no forward cursor"))
    })?;
    cursor
        .parse()
        .map_err(|_| SyncError::InvalidRequest(format!("Unknown cursor {cursor}")))
}

/// Restores id-list order; the lookup may answer in any order.
fn in_id_order<T: Identified<Id = i64>>(batch: &[i64], items: Vec<T>) -> Vec<T> {
    let mut by_id: HashMap<i64, T> = items.into_iter().map(|item| (item.id(), item)).collect();
    batch.iter().filter_map(|id| by_id.remove(id)).collect()
}

#[async_trait]
impl<T, L> PageFetcher<T> for IdListFetcher<L>
where
    T: Identified<Id = i64> + Send + 'static,
    L: IdLookup<T>,
{
    async fn fetch(
        &self,
        query: &Query,
        token: Option<&ContinuationToken>,
    ) -> Result<Page<T>, SyncError> {
        let offset = match token {
            None => 0,
            Some(token) => offset_of(token)?,
        };
        let ids = self.id_list::<T>(query, token.is_none()).await?;
        let start = offset.min(ids.len());
        let end = (start + query.page_size as usize).min(ids.len());
        let batch = &ids[start..end];
        let items = if batch.is_empty() {
            Vec::new()
        } else {
            in_id_order(batch, self.lookup.lookup(query, batch).await?)
        };
        let missing = batch.len() - items.len();
        if missing > 0 {
            log::debug!("{missing} of {} ids could not be hydrated", batch.len());
        }
        let total = self.record_missing(query, &ids, start, missing).await;
        let next = (end < ids.len()).then(|| end.to_string());
        let prev = (start > 0).then(|| start.to_string());
        Ok(Page::new(items, Some(ContinuationToken::cursor(next, prev))).with_total_hint(total))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::coordinator::LoadCoordinator;
    use crate::entities::User;
    use crate::query::{EntityKind, Target};

    struct Directory {
        ids_calls: AtomicUsize,
    }

    fn user(id: i64) -> User {
        User {
            id,
            screen_name: format!("u{id}"),
            name: format!("U {id}"),
            followers_count: 0,
            friends_count: 0,
            is_protected: false,
        }
    }

    #[async_trait]
    impl IdLookup<User> for Directory {
        async fn ids(&self, query: &Query) -> Result<Vec<i64>, SyncError> {
            self.ids_calls.fetch_add(1, Ordering::Relaxed);
            match query.target {
                Some(Target::UserId(8)) => Ok(vec![100, 200, 300, 400]),
                _ => Ok(vec![30, 10, 20, 40, 50]),
            }
        }

        async fn lookup(&self, _query: &Query, ids: &[i64]) -> Result<Vec<User>, SyncError> {
            let mut users: Vec<User> = ids
                .iter()
                .copied()
                .filter(|id| *id != 20)
                .map(user)
                .collect();
            users.reverse();
            Ok(users)
        }
    }

    fn friends_of(user_id: i64, page_size: u32) -> Query {
        Query::builder(EntityKind::Friends, 1)
            .target(Target::UserId(user_id))
            .page_size(page_size)
            .build()
            .expect("query")
    }

    fn query() -> Query {
        friends_of(7, 3)
    }

    fn directory() -> IdListFetcher<Directory> {
        IdListFetcher::new(Directory {
            ids_calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn pages_follow_id_list_order() {
        let fetcher = IdListFetcher::new(Directory {
            ids_calls: AtomicUsize::new(0),
        });
        let first: Page<User> = fetcher.fetch(&query(), None).await.expect("first");
        let ids: Vec<i64> = first.items.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![30, 10]);
        assert_eq!(first.total_hint, Some(4));
        assert_eq!(first.next.as_ref().and_then(|t| t.next_cursor()), Some("3"));

        let second: Page<User> = fetcher
            .fetch(&query(), first.next.as_ref())
            .await
            .expect("second");
        let ids: Vec<i64> = second.items.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![40, 50]);
        assert!(!second.has_more());
        assert_eq!(fetcher.lookup.ids_calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn fresh_load_refreshes_the_id_list() {
        let fetcher = IdListFetcher::new(Directory {
            ids_calls: AtomicUsize::new(0),
        });
        let _: Page<User> = fetcher.fetch(&query(), None).await.expect("first");
        let _: Page<User> = fetcher.fetch(&query(), None).await.expect("again");
        assert_eq!(fetcher.lookup.ids_calls.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn continuation_reads_the_id_list_of_its_own_query() {
        let fetcher = directory();
        let _: Page<User> = fetcher.fetch(&friends_of(7, 1), None).await.expect("7");
        let _: Page<User> = fetcher.fetch(&friends_of(8, 1), None).await.expect("8");

        let token = ContinuationToken::cursor(Some("1".into()), None);
        let page: Page<User> = fetcher
            .fetch(&friends_of(7, 1), Some(&token))
            .await
            .expect("7, page 2");
        let ids: Vec<i64> = page.items.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![10]);
        assert_eq!(page.total_hint, Some(5));
        assert_eq!(fetcher.lookup.ids_calls.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn unhydrated_ids_do_not_leave_a_gap() {
        let coordinator: LoadCoordinator<User> =
            LoadCoordinator::new(friends_of(7, 20), Arc::new(directory()));
        coordinator.restart();
        let state = coordinator.wait_idle().await;

        assert_eq!(state.len(), 4);
        assert_eq!(state.total_hint(), Some(4));
        assert!(!state.has_more());
        assert!(!state.show_trailing_gap());
    }

    #[tokio::test]
    async fn missing_ids_accumulate_across_pages() {
        let coordinator: LoadCoordinator<User> =
            LoadCoordinator::new(friends_of(7, 2), Arc::new(directory()));
        coordinator.restart();
        let state = coordinator.wait_idle().await;
        assert_eq!(state.total_hint(), Some(5));
        assert!(state.show_trailing_gap());

        coordinator.load_more().expect("second batch");
        let state = coordinator.wait_idle().await;
        assert_eq!(state.total_hint(), Some(4));
        assert!(state.show_trailing_gap());

        coordinator.load_more().expect("last batch");
        let state = coordinator.wait_idle().await;
        assert_eq!(state.len(), 4);
        assert!(!state.show_trailing_gap());
    }
}
