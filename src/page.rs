use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::token::ContinuationToken;

/// Anything with a stable identity that can appear in a list.
pub trait Identified {
    type Id: Eq + Hash + Clone + Debug + Send + Sync + 'static;

    fn id(&self) -> Self::Id;
}

/// One page of fetched items plus the token for the following fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<ContinuationToken>,
    /// Total number of items the source reports, for kinds that expose it.
    pub total_hint: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next: Option<ContinuationToken>) -> Self {
        Self {
            items,
            next,
            total_hint: None,
        }
    }

    pub fn with_total_hint(mut self, total: u64) -> Self {
        self.total_hint = Some(total);
        self
    }

    /// True iff the page carries a token that leads somewhere.
    ///
    /// A bound token always has a next candidate while the page has items.
    pub fn has_more(&self) -> bool {
        match &self.next {
            Some(ContinuationToken::Cursor { next, .. }) => next.is_some(),
            Some(ContinuationToken::Bound { .. }) => !self.items.is_empty(),
            None => false,
        }
    }
}

impl<T> Page<T>
where
    T: Identified<Id = i64>,
{
    /// Builds a page for a descending-id feed; the next bound is the smallest id seen.
    pub fn descending(items: Vec<T>) -> Self {
        let next = items
            .iter()
            .map(Identified::id)
            .min()
            .map(ContinuationToken::bound);
        Self::new(items, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Row(i64);

    impl Identified for Row {
        type Id = i64;

        fn id(&self) -> i64 {
            self.0
        }
    }

    #[test]
    fn descending_page_uses_smallest_id_as_bound() {
        let page = Page::descending(vec![Row(30), Row(12), Row(20)]);
        assert_eq!(page.next, Some(ContinuationToken::bound(12)));
        assert!(page.has_more());
    }

    #[test]
    fn empty_descending_page_ends_the_feed() {
        let page: Page<Row> = Page::descending(Vec::new());
        assert_eq!(page.next, None);
        assert!(!page.has_more());
    }

    #[test]
    fn cursor_page_has_more_only_with_next_marker() {
        let open = Page::new(vec![Row(1)], Some(ContinuationToken::cursor(Some("5".into()), None)));
        let closed = Page::new(vec![Row(1)], Some(ContinuationToken::cursor(None, None)));
        assert!(open.has_more());
        assert!(!closed.has_more());
    }
}
