use super::*;
use crate::state::test_helpers::line_item;

fn fulfilled(seq: u64, user: &str, items: Vec<LineItem>) -> CartAction {
    CartAction::FetchFulfilled { seq, user_id: Some(user.to_owned()), items }
}

// =============================================================
// Defaults
// =============================================================

#[test]
fn default_is_empty_and_idle() {
    let state = CartState::default();
    assert!(state.items.is_empty());
    assert!(state.owner.is_none());
    assert!(!state.loading);
    assert_eq!(state.latest_seq(), 0);
    assert_eq!(state.next_seq(), 1);
}

// =============================================================
// Single fetch
// =============================================================

#[test]
fn pending_then_fulfilled_replaces_items() {
    let mut state = CartState::default();
    assert!(state.apply(CartAction::FetchPending { seq: 1 }));
    assert!(state.loading);

    assert!(state.apply(fulfilled(1, "u1", vec![line_item("p1", 100.0, 90.0, 2)])));
    assert!(!state.loading);
    assert_eq!(state.owner.as_deref(), Some("u1"));
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.items[0].id, "p1");
}

#[test]
fn rejected_keeps_prior_items() {
    let mut state = CartState::default();
    state.apply(CartAction::FetchPending { seq: 1 });
    state.apply(fulfilled(1, "u1", vec![line_item("p1", 100.0, 90.0, 2)]));
    let before = state.items.clone();

    state.apply(CartAction::FetchPending { seq: 2 });
    assert!(state.apply(CartAction::FetchRejected { seq: 2, error: "request failed: reset".into() }));
    assert_eq!(state.items, before);
    assert_eq!(state.owner.as_deref(), Some("u1"));
    assert!(!state.loading);
    assert_eq!(state.last_error.as_deref(), Some("request failed: reset"));
}

#[test]
fn new_pending_clears_last_error() {
    let mut state = CartState::default();
    state.apply(CartAction::FetchPending { seq: 1 });
    state.apply(CartAction::FetchRejected { seq: 1, error: "x".into() });
    state.apply(CartAction::FetchPending { seq: 2 });
    assert!(state.last_error.is_none());
}

#[test]
fn fulfilled_keeps_server_order() {
    let mut state = CartState::default();
    state.apply(CartAction::FetchPending { seq: 1 });
    state.apply(fulfilled(
        1,
        "u1",
        vec![line_item("p3", 1.0, 100.0, 1), line_item("p1", 1.0, 100.0, 1), line_item("p2", 1.0, 100.0, 1)],
    ));
    let ids: Vec<&str> = state.items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["p3", "p1", "p2"]);
}

#[test]
fn fulfilled_drops_repeated_ids() {
    let mut state = CartState::default();
    state.apply(CartAction::FetchPending { seq: 1 });
    state.apply(fulfilled(1, "u1", vec![line_item("p1", 1.0, 100.0, 1), line_item("p1", 2.0, 100.0, 5)]));
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.items[0].quantity, 1);
}

// =============================================================
// Sequencing
// =============================================================

#[test]
fn out_of_order_settles_keep_latest_request() {
    let mut state = CartState::default();
    state.apply(CartAction::FetchPending { seq: 1 });
    state.apply(CartAction::FetchPending { seq: 2 });

    // Request 2 (user u2) resolves first, then the older request 1 (user u1).
    assert!(state.apply(fulfilled(2, "u2", vec![line_item("b", 1.0, 100.0, 1)])));
    assert!(!state.apply(fulfilled(1, "u1", vec![line_item("a", 1.0, 100.0, 1)])));

    assert_eq!(state.owner.as_deref(), Some("u2"));
    assert_eq!(state.items[0].id, "b");
}

#[test]
fn stale_rejection_is_ignored() {
    let mut state = CartState::default();
    state.apply(CartAction::FetchPending { seq: 1 });
    state.apply(CartAction::FetchPending { seq: 2 });
    assert!(!state.apply(CartAction::FetchRejected { seq: 1, error: "late".into() }));
    assert!(state.loading);
    assert!(state.last_error.is_none());
}

#[test]
fn stale_pending_is_ignored() {
    let mut state = CartState::default();
    state.apply(CartAction::FetchPending { seq: 3 });
    assert!(!state.apply(CartAction::FetchPending { seq: 2 }));
    assert_eq!(state.latest_seq(), 3);
}

#[test]
fn reset_empties_cart_and_supersedes_pending_fetch() {
    let mut state = CartState::default();
    state.apply(CartAction::FetchPending { seq: 1 });
    state.apply(fulfilled(1, "u1", vec![line_item("p1", 10.0, 100.0, 1)]));
    state.apply(CartAction::FetchPending { seq: 2 });

    assert!(state.apply(CartAction::Reset));
    assert!(state.items.is_empty());
    assert!(state.owner.is_none());
    assert!(!state.loading);
    assert_eq!(state.latest_seq(), 3);
    assert!(!state.apply(fulfilled(2, "u1", vec![line_item("p2", 10.0, 100.0, 1)])));
    assert!(state.items.is_empty());
}
