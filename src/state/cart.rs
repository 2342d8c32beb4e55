//! Cart state for the current session's user.
//!
//! DESIGN
//! ======
//! Every fetch is tagged with a monotonically increasing `seq`. Only the
//! settle of the most recently issued fetch is applied, so two overlapping
//! fetches can resolve in any order and the cart still ends up holding the
//! answer to the latest request. The total is never stored; see
//! `selectors::select_cart_total_amount`.

#[cfg(test)]
#[path = "cart_test.rs"]
mod cart_test;

use std::collections::HashSet;

use crate::net::types::LineItem;

/// Cart line items and fetch status.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CartState {
    /// Line items from the last applied fetch, in server order, unique by id.
    pub items: Vec<LineItem>,
    /// User the items belong to; `None` for the anonymous (empty) cart.
    pub owner: Option<String>,
    pub loading: bool,
    pub last_error: Option<String>,
    latest_seq: u64,
}

/// State transitions of the cart slice.
#[derive(Clone, Debug, PartialEq)]
pub enum CartAction {
    FetchPending { seq: u64 },
    FetchFulfilled { seq: u64, user_id: Option<String>, items: Vec<LineItem> },
    FetchRejected { seq: u64, error: String },
    /// Session ended: empty the cart and supersede any fetch in flight.
    Reset,
}

impl CartState {
    /// Sequence number the next fetch should carry.
    #[must_use]
    pub fn next_seq(&self) -> u64 {
        self.latest_seq + 1
    }

    /// Sequence number of the most recently issued fetch (0 before any).
    #[must_use]
    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Apply one transition. Returns `false` when the action belongs to a
    /// superseded fetch and was discarded.
    pub fn apply(&mut self, action: CartAction) -> bool {
        match action {
            CartAction::FetchPending { seq } => {
                if seq <= self.latest_seq {
                    return false;
                }
                self.latest_seq = seq;
                self.loading = true;
                self.last_error = None;
                true
            }
            CartAction::FetchFulfilled { seq, user_id, items } => {
                if seq != self.latest_seq {
                    return false;
                }
                self.items = dedupe_by_id(items);
                self.owner = user_id;
                self.loading = false;
                self.last_error = None;
                true
            }
            CartAction::FetchRejected { seq, error } => {
                if seq != self.latest_seq {
                    return false;
                }
                self.loading = false;
                self.last_error = Some(error);
                true
            }
            CartAction::Reset => {
                *self = Self { latest_seq: self.latest_seq + 1, ..Self::default() };
                true
            }
        }
    }
}

/// Keep the first occurrence of each item id.
fn dedupe_by_id(items: Vec<LineItem>) -> Vec<LineItem> {
    let mut seen = HashSet::with_capacity(items.len());
    let before = items.len();
    let unique: Vec<LineItem> = items.into_iter().filter(|item| seen.insert(item.id.clone())).collect();
    if unique.len() != before {
        tracing::warn!(dropped = before - unique.len(), "cart response repeated item ids");
    }
    unique
}
