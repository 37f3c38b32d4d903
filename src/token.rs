use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker telling the remote source where the next page resumes.
///
/// A token only makes sense for the query that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContinuationToken {
    /// Fetch items with an id strictly below `exclusive_upper_id`.
    Bound { exclusive_upper_id: i64 },
    /// Opaque forward/backward markers; `next == None` means no further page.
    Cursor {
        next: Option<String>,
        prev: Option<String>,
    },
}

impl ContinuationToken {
    pub fn bound(exclusive_upper_id: i64) -> Self {
        ContinuationToken::Bound { exclusive_upper_id }
    }

    pub fn cursor(next: Option<String>, prev: Option<String>) -> Self {
        ContinuationToken::Cursor { next, prev }
    }

    /// Returns the exclusive upper id for bound tokens.
    pub fn as_bound(&self) -> Option<i64> {
        match self {
            ContinuationToken::Bound { exclusive_upper_id } => Some(*exclusive_upper_id),
            ContinuationToken::Cursor { .. } => None,
        }
    }

    /// Returns the forward cursor for cursor tokens.
    pub fn next_cursor(&self) -> Option<&str> {
        match self {
            ContinuationToken::Cursor { next, .. } => next.as_deref(),
            ContinuationToken::Bound { .. } => None,
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, ContinuationToken::Bound { .. })
    }

    pub(crate) fn same_kind(&self, other: &ContinuationToken) -> bool {
        self.is_bound() == other.is_bound()
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContinuationToken::Bound { exclusive_upper_id } => {
                write!(f, "bound(<{exclusive_upper_id})")
            }
            ContinuationToken::Cursor { next, prev } => write!(
                f,
                "cursor(next={}, prev={})",
                next.as_deref().unwrap_or("-"),
                prev.as_deref().unwrap_or("-")
            ),
        }
    }
}
