//! Pure read helpers over [`RootState`].
//!
//! Nothing here caches: every call recomputes from the current slices, so a
//! derived value can never drift from the items it was computed from.

#[cfg(test)]
#[path = "selectors_test.rs"]
mod selectors_test;

use super::RootState;
use crate::net::types::{LineItem, User};

#[must_use]
pub fn select_cart_items(state: &RootState) -> &[LineItem] {
    &state.cart.items
}

/// Sum of `unit_price * quantity * discount_percent / 100` over all items.
#[must_use]
pub fn select_cart_total_amount(state: &RootState) -> f64 {
    state.cart.items.iter().map(select_line_total).sum()
}

/// Number of distinct line items (the header badge count).
#[must_use]
pub fn select_cart_count(state: &RootState) -> usize {
    state.cart.items.len()
}

#[must_use]
pub fn select_line_total(item: &LineItem) -> f64 {
    item.line_total()
}

#[must_use]
pub fn select_is_logged_in(state: &RootState) -> bool {
    state.session.is_logged_in
}

#[must_use]
pub fn select_is_authenticating(state: &RootState) -> bool {
    state.session.is_authenticating
}

#[must_use]
pub fn select_current_user(state: &RootState) -> Option<&User> {
    state.session.current_user.as_ref()
}

#[must_use]
pub fn select_last_error(state: &RootState) -> Option<&str> {
    state.session.last_error.as_deref()
}
