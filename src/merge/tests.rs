use proptest::prelude::*;

use crate::{
    error::SyncError,
    merge,
    page::{Identified, Page},
    state::ListState,
    token::ContinuationToken,
};

#[derive(Debug, Clone, PartialEq)]
struct Item {
    id: i64,
    label: &'static str,
}

impl Identified for Item {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }
}

fn items(ids: &[i64]) -> Vec<Item> {
    ids.iter().map(|&id| Item { id, label: "a" }).collect()
}

fn ids(state: &ListState<Item>) -> Vec<i64> {
    state.items().iter().map(|item| item.id).collect()
}

fn cursor(next: Option<&str>) -> Option<ContinuationToken> {
    Some(ContinuationToken::cursor(next.map(str::to_string), None))
}

fn loaded(ids: &[i64], next: Option<ContinuationToken>) -> ListState<Item> {
    merge(&ListState::new(), Page::new(items(ids), next), true).expect("initial merge")
}

#[test]
fn initial_load_discards_previous_items() {
    let previous = loaded(&[9, 8, 7], cursor(Some("a")));
    let next = merge(&previous, Page::new(items(&[3, 2]), cursor(Some("b"))), true)
        .expect("merge");
    assert_eq!(ids(&next), vec![3, 2]);
    assert!(!next.is_loading());
}

#[test]
fn append_keeps_first_seen_entry() {
    let previous = loaded(&[5, 4], cursor(Some("a")));
    let page = Page::new(
        vec![
            Item { id: 4, label: "updated" },
            Item { id: 3, label: "new" },
        ],
        cursor(Some("b")),
    );
    let next = merge(&previous, page, false).expect("merge");
    assert_eq!(ids(&next), vec![5, 4, 3]);
    assert_eq!(next.items()[1].label, "a");
}

#[test]
fn already_seen_page_still_advances_token() {
    let previous = loaded(&[5, 4], cursor(Some("a")));
    let next = merge(&previous, Page::new(items(&[4, 5]), cursor(Some("b"))), false)
        .expect("merge");
    assert_eq!(ids(&next), ids(&previous));
    assert_eq!(next.next_token(), cursor(Some("b")).as_ref());
}

#[test]
fn cursor_without_next_terminates() {
    let previous = loaded(&[1], cursor(Some("a")));
    let next = merge(&previous, Page::new(items(&[2]), cursor(None)), false).expect("merge");
    assert!(!next.has_more());
    assert!(!next.show_trailing_gap());
}

#[test]
fn empty_terminal_page_ends_the_list() {
    let previous = loaded(&[10, 9], Some(ContinuationToken::bound(9)));
    let next = merge(&previous, Page::<Item>::descending(Vec::new()), false).expect("merge");
    assert_eq!(ids(&next), vec![10, 9]);
    assert!(!next.has_more());
    assert!(!next.show_trailing_gap());
}

#[test]
fn empty_page_with_more_leaves_flags_alone() {
    let previous = loaded(&[1, 2], cursor(Some("a")));
    let next = merge(&previous, Page::new(Vec::new(), cursor(Some("b"))), false)
        .expect("merge");
    assert_eq!(ids(&next), vec![1, 2]);
    assert!(next.has_more());
    assert_eq!(next.show_trailing_gap(), previous.show_trailing_gap());
    assert!(!next.is_loading());
}

#[test]
fn regressive_bound_is_an_ordering_violation() {
    let previous = loaded(&[50, 40], Some(ContinuationToken::bound(40)));
    let page = Page::new(items(&[60]), Some(ContinuationToken::bound(60)));
    let err = merge(&previous, page, false).expect_err("must reject");
    assert_eq!(
        err,
        SyncError::OrderingViolation {
            previous: 40,
            next: 60
        }
    );
}

#[test]
fn mixed_token_kinds_are_rejected() {
    let previous = loaded(&[50, 40], Some(ContinuationToken::bound(40)));
    let page = Page::new(items(&[30]), cursor(Some("x")));
    let err = merge(&previous, page, false).expect_err("must reject");
    assert!(matches!(err, SyncError::MalformedResponse { .. }));
}

#[test]
fn restart_ignores_previous_bound() {
    let previous = loaded(&[50, 40], Some(ContinuationToken::bound(40)));
    let next = merge(&previous, Page::descending(items(&[90, 80])), true).expect("merge");
    assert_eq!(next.next_token(), Some(&ContinuationToken::bound(80)));
}

#[test]
fn gap_follows_count_hint_not_has_more() {
    let first = merge(
        &ListState::new(),
        Page::new(items(&[1, 2, 3, 4, 5]), cursor(Some("a"))).with_total_hint(10),
        true,
    )
    .expect("merge");
    assert!(first.show_trailing_gap());

    let second = merge(
        &first,
        Page::new(items(&[6, 7, 8, 9, 10]), cursor(Some("b"))).with_total_hint(10),
        false,
    )
    .expect("merge");
    assert_eq!(second.len(), 10);
    assert!(second.has_more());
    assert!(!second.show_trailing_gap());
}

#[test]
fn hint_carries_over_pages_without_one() {
    let first = merge(
        &ListState::new(),
        Page::new(items(&[1, 2]), cursor(Some("a"))).with_total_hint(3),
        true,
    )
    .expect("merge");
    let second = merge(&first, Page::new(items(&[3]), cursor(Some("b"))), false)
        .expect("merge");
    assert_eq!(second.total_hint(), Some(3));
    assert!(!second.show_trailing_gap());
}

#[test]
fn favorites_scenario_tracks_hint_across_pages() {
    let page = |from: i64, count: i64| -> Page<Item> {
        let ids: Vec<i64> = (0..count).map(|i| 1_000 - from - i).collect();
        Page::descending(items(&ids)).with_total_hint(45)
    };

    let first = merge(&ListState::new(), page(0, 20), true).expect("first");
    assert!(first.has_more());
    assert!(first.show_trailing_gap());

    let second = merge(&first, page(20, 20), false).expect("second");
    assert_eq!(second.len(), 40);
    assert!(second.show_trailing_gap());

    let third = merge(&second, page(40, 5), false).expect("third");
    assert_eq!(third.len(), 45);
    assert!(!third.show_trailing_gap());
}

proptest! {
    #[test]
    fn merged_lists_never_hold_duplicate_ids(
        pages in prop::collection::vec(prop::collection::vec(0i64..40, 0..15), 1..8),
    ) {
        let mut state = ListState::new();
        for (idx, raw) in pages.iter().enumerate() {
            let mut unique = raw.clone();
            unique.sort_unstable();
            unique.dedup();
            let page = Page::new(items(&unique), cursor(Some(idx.to_string().as_str())));
            state = merge(&state, page, idx == 0).expect("merge");
            let mut seen = ids(&state);
            let len = seen.len();
            seen.sort_unstable();
            seen.dedup();
            prop_assert_eq!(seen.len(), len);
        }
    }

    #[test]
    fn merging_known_items_is_idempotent(
        loaded_ids in prop::collection::hash_set(0i64..100, 1..30),
        pick in prop::collection::vec(any::<prop::sample::Index>(), 0..10),
    ) {
        let loaded_ids: Vec<i64> = loaded_ids.into_iter().collect();
        let state = loaded(&loaded_ids, cursor(Some("first")));
        let mut subset: Vec<i64> = pick.iter().map(|ix| *ix.get(&loaded_ids)).collect();
        subset.sort_unstable();
        subset.dedup();

        let next = merge(&state, Page::new(items(&subset), cursor(Some("second"))), false)
            .expect("merge");
        prop_assert_eq!(ids(&next), ids(&state));
        let expected = cursor(Some("second"));
        prop_assert_eq!(next.next_token(), expected.as_ref());
    }
}
