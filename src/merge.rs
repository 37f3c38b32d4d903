//! Folding a freshly fetched page into the accumulated list.

use std::collections::HashSet;

use crate::{
    error::SyncError,
    page::{Identified, Page},
    state::ListState,
    token::ContinuationToken,
};

/// Combines `page` with `previous` and returns the next state.
///
/// Initial loads start from an empty sequence. Items already present are skipped
/// (first seen wins), but the continuation token always advances to the page's.
/// The returned state has `loading` cleared.
pub fn merge<T>(
    previous: &ListState<T>,
    page: Page<T>,
    is_initial_load: bool,
) -> Result<ListState<T>, SyncError>
where
    T: Identified + Clone,
{
    if !is_initial_load {
        check_progress(previous.next_token.as_ref(), page.next.as_ref())?;
    }

    let has_more = page.has_more();
    let total_hint = if is_initial_load {
        page.total_hint
    } else {
        page.total_hint.or(previous.total_hint)
    };
    let mut items = if is_initial_load {
        Vec::new()
    } else {
        previous.items.clone()
    };

    if page.items.is_empty() && has_more && !is_initial_load {
        log::debug!("Empty page with more pending, keeping list as is");
        return Ok(ListState {
            items,
            loading: false,
            has_more: previous.has_more,
            show_trailing_gap: previous.show_trailing_gap,
            next_token: page.next,
            total_hint,
        });
    }

    append_unique(&mut items, page.items);
    let show_trailing_gap = trailing_gap(items.len(), total_hint, has_more);

    Ok(ListState {
        items,
        loading: false,
        has_more,
        show_trailing_gap,
        next_token: page.next,
        total_hint,
    })
}

fn append_unique<T: Identified>(items: &mut Vec<T>, incoming: Vec<T>) {
    let mut seen: HashSet<T::Id> = items.iter().map(Identified::id).collect();
    let before = items.len();
    let offered = incoming.len();
    for item in incoming {
        if seen.insert(item.id()) {
            items.push(item);
        }
    }
    let skipped = offered - (items.len() - before);
    if skipped > 0 {
        log::trace!("Skipped {skipped} already loaded items");
    }
}

fn trailing_gap(count: usize, total_hint: Option<u64>, has_more: bool) -> bool {
    match total_hint {
        Some(total) => (count as u64) < total,
        None => has_more,
    }
}

fn check_progress(
    previous: Option<&ContinuationToken>,
    next: Option<&ContinuationToken>,
) -> Result<(), SyncError> {
    let (Some(previous), Some(next)) = (previous, next) else {
        return Ok(());
    };
    if !previous.same_kind(next) {
        return Err(SyncError::malformed(
            "continuation token kind changed within one listing",
            format!("{previous} -> {next}"),
        ));
    }
    if let (Some(prev_bound), Some(next_bound)) = (previous.as_bound(), next.as_bound()) {
        if next_bound > prev_bound {
            return Err(SyncError::OrderingViolation {
                previous: prev_bound,
                next: next_bound,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
