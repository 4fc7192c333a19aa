//! Helpers for the caller's local copy of the collection.
//!
//! Each helper takes the current collection and returns a new one; the
//! caller decides when to swap it in.

use crate::models::Action;
use std::cmp::Reverse;

/// Collection after a successful delete of `id`.
pub fn without(actions: &[Action], id: u64) -> Vec<Action> {
    actions.iter().filter(|action| action.id != id).cloned().collect()
}

/// Collection with `updated` spliced in place of the entry sharing its id,
/// or appended when no such entry exists.
pub fn with_upserted(actions: &[Action], updated: Action) -> Vec<Action> {
    let mut next = actions.to_vec();
    match next.iter_mut().find(|action| action.id == updated.id) {
        Some(slot) => *slot = updated,
        None => next.push(updated),
    }
    next
}

/// Most recent date first; newer ids first within a day.
pub fn sorted_for_display(actions: &[Action]) -> Vec<Action> {
    let mut sorted = actions.to_vec();
    sorted.sort_by_key(|action| (Reverse(action.date), Reverse(action.id)));
    sorted
}
