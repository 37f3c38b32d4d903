use serde::{Deserialize, Serialize};

use crate::error::SyncError;

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_STATUS_PAGE_SIZE: u32 = 200;
const MAX_USER_PAGE_SIZE: u32 = 100;

/// Pagination protocol spoken by a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pagination {
    /// Descending id bound, used by post feeds.
    Bound,
    /// Opaque cursor pair, used by bulk entity listings.
    Cursor,
}

/// What a list screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Mentions,
    Favorites,
    UserTimeline,
    ListTimeline,
    Search,
    Retweeters,
    Followers,
    Friends,
    Blocks,
    ListMembers,
    ListSubscribers,
    ListSubscriptions,
    ListMemberships,
}

impl EntityKind {
    pub fn pagination(self) -> Pagination {
        match self {
            EntityKind::Mentions
            | EntityKind::Favorites
            | EntityKind::UserTimeline
            | EntityKind::ListTimeline
            | EntityKind::Search => Pagination::Bound,
            EntityKind::Retweeters
            | EntityKind::Followers
            | EntityKind::Friends
            | EntityKind::Blocks
            | EntityKind::ListMembers
            | EntityKind::ListSubscribers
            | EntityKind::ListSubscriptions
            | EntityKind::ListMemberships => Pagination::Cursor,
        }
    }

    /// Kinds whose source reports the total number of items.
    pub fn reports_total_count(self) -> bool {
        matches!(
            self,
            EntityKind::Favorites | EntityKind::Followers | EntityKind::Friends
        )
    }

    pub fn max_page_size(self) -> u32 {
        match self.pagination() {
            Pagination::Bound => MAX_STATUS_PAGE_SIZE,
            Pagination::Cursor => MAX_USER_PAGE_SIZE,
        }
    }

    fn requires_target(self) -> bool {
        !matches!(self, EntityKind::Mentions | EntityKind::Blocks | EntityKind::Search)
    }

    /// Relative endpoint used by HTTP sources.
    pub fn endpoint(self) -> &'static str {
        match self {
            EntityKind::Mentions => "statuses/mentions",
            EntityKind::Favorites => "favorites/list",
            EntityKind::UserTimeline => "statuses/user_timeline",
            EntityKind::ListTimeline => "lists/statuses",
            EntityKind::Search => "search/statuses",
            EntityKind::Retweeters => "statuses/retweeters",
            EntityKind::Followers => "followers/list",
            EntityKind::Friends => "friends/list",
            EntityKind::Blocks => "blocks/list",
            EntityKind::ListMembers => "lists/members",
            EntityKind::ListSubscribers => "lists/subscribers",
            EntityKind::ListSubscriptions => "lists/subscriptions",
            EntityKind::ListMemberships => "lists/memberships",
        }
    }
}

/// Entity a listing is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    UserId(i64),
    ScreenName(String),
    StatusId(i64),
    ListId(i64),
    ListSlug { owner: String, slug: String },
}

/// Immutable description of what a coordinator lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub kind: EntityKind,
    pub account_id: i64,
    pub target: Option<Target>,
    pub search: Option<String>,
    pub page_size: u32,
}

impl Query {
    pub fn builder(kind: EntityKind, account_id: i64) -> QueryBuilder {
        QueryBuilder::new(kind, account_id)
    }

    pub fn pagination(&self) -> Pagination {
        self.kind.pagination()
    }
}

/// Builder pattern for Query.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    kind: EntityKind,
    account_id: i64,
    target: Option<Target>,
    search: Option<String>,
    page_size: u32,
}

impl QueryBuilder {
    pub fn new(kind: EntityKind, account_id: i64) -> Self {
        Self {
            kind,
            account_id,
            target: None,
            search: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    pub fn search(mut self, terms: impl Into<String>) -> Self {
        self.search = Some(terms.into());
        self
    }

    /// Sets the load item limit; clamped to what the kind allows.
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn build(self) -> Result<Query, SyncError> {
        if self.kind.requires_target() && self.target.is_none() {
            return Err(SyncError::InvalidRequest(format!(
                "{:?} listing requires a target",
                self.kind
            )));
        }
        if self.kind == EntityKind::Search
            && self.search.as_deref().map_or(true, |s| s.trim().is_empty())
        {
            return Err(SyncError::InvalidRequest(
                "Search terms cannot be empty".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(SyncError::InvalidRequest(
                "Page size must be greater than 0".to_string(),
            ));
        }
        let page_size = self.page_size.min(self.kind.max_page_size());
        if page_size != self.page_size {
            log::debug!(
                "Clamping page size {} to {} for {:?}",
                self.page_size,
                page_size,
                self.kind
            );
        }
        Ok(Query {
            kind: self.kind,
            account_id: self.account_id,
            target: self.target,
            search: self.search,
            page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn favorites_require_a_target() {
        assert!(Query::builder(EntityKind::Favorites, 1).build().is_err());
        let query = Query::builder(EntityKind::Favorites, 1)
            .target(Target::UserId(9))
            .build()
            .expect("query");
        assert_eq!(query.pagination(), Pagination::Bound);
    }

    #[test]
    fn search_rejects_blank_terms() {
        let result = Query::builder(EntityKind::Search, 1).search("  ").build();
        assert!(matches!(result, Err(SyncError::InvalidRequest(_))));
    }

    #[test]
    fn user_listings_clamp_page_size() {
        let query = Query::builder(EntityKind::Followers, 1)
            .target(Target::ScreenName("alice".into()))
            .page_size(500)
            .build()
            .expect("query");
        assert_eq!(query.page_size, 100);
        assert_eq!(query.pagination(), Pagination::Cursor);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let result = Query::builder(EntityKind::Blocks, 1).page_size(0).build();
        assert!(result.is_err());
    }
}
