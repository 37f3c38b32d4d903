use serde::Serialize;

use crate::page::Identified;
use crate::token::ContinuationToken;

/// Screen-visible result of a paginated load.
///
/// Item ids are unique. Only the load coordinator produces new states; everyone else
/// reads shared snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListState<T> {
    pub(crate) items: Vec<T>,
    pub(crate) loading: bool,
    pub(crate) has_more: bool,
    pub(crate) show_trailing_gap: bool,
    pub(crate) next_token: Option<ContinuationToken>,
    pub(crate) total_hint: Option<u64>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            has_more: false,
            show_trailing_gap: false,
            next_token: None,
            total_hint: None,
        }
    }
}

impl<T> ListState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Whether a "more data likely exists" row belongs after the last item.
    pub fn show_trailing_gap(&self) -> bool {
        self.show_trailing_gap
    }

    /// Token the next `load_more` continues from.
    pub fn next_token(&self) -> Option<&ContinuationToken> {
        self.next_token.as_ref()
    }

    pub fn total_hint(&self) -> Option<u64> {
        self.total_hint
    }
}

impl<T: Clone> ListState<T> {
    pub(crate) fn with_loading(&self, loading: bool) -> Self {
        Self {
            loading,
            ..self.clone()
        }
    }
}

impl<T: Identified + Clone> ListState<T> {
    pub fn contains(&self, id: &T::Id) -> bool {
        self.items.iter().any(|item| item.id() == *id)
    }

    /// Copy of the state without the given item, or `None` when it is absent.
    pub(crate) fn without(&self, id: &T::Id) -> Option<Self> {
        let position = self.items.iter().position(|item| item.id() == *id)?;
        let mut next = self.clone();
        next.items.remove(position);
        if let Some(total) = next.total_hint {
            next.total_hint = Some(total.saturating_sub(1));
        }
        Some(next)
    }
}
