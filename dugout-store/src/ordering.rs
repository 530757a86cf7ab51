//! Ordering primitive
//!
//! Every ordered scope is kept as a contiguous permutation of `0..n-1`.
//! There is exactly one way to move an item: remove it at `from`, reinsert
//! it at `to`, renumber the whole scope. Single-step moves and row jumps in
//! grid layouts are both expressed by the caller choosing `to`.

use crate::error::{Error, Result};
use crate::model::{Category, Player, SoundButton, TeamEvent};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ordered entity
pub trait Ordered {
    fn order(&self) -> usize;
    fn set_order(&mut self, order: usize);
}

macro_rules! impl_ordered {
    ($($ty:ty),*) => {
        $(impl Ordered for $ty {
            fn order(&self) -> usize {
                self.order
            }

            fn set_order(&mut self, order: usize) {
                self.order = order;
            }
        })*
    };
}

impl_ordered!(TeamEvent, Category, SoundButton, Player);

/// A set of entities sharing one `order` sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "event_id", rename_all = "snake_case")]
pub enum OrderScope {
    /// All team events
    TeamEvents,
    /// Global categories (`None`) or one event's categories
    Categories(Option<Uuid>),
    /// Non-announcement buttons with the given event (`None` = global buttons)
    Buttons(Option<Uuid>),
    /// One team's lineup
    Players(Uuid),
}

/// Positions of in-scope items, sorted by current order
///
/// Ties (possible only in repaired snapshots) keep storage order.
pub(crate) fn scope_indices<T: Ordered>(items: &[T], in_scope: impl Fn(&T) -> bool) -> Vec<usize> {
    let mut indices: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| in_scope(item))
        .map(|(i, _)| i)
        .collect();
    indices.sort_by_key(|&i| items[i].order());
    indices
}

fn assign_orders<T: Ordered>(items: &mut [T], indices: &[usize]) {
    for (order, &i) in indices.iter().enumerate() {
        items[i].set_order(order);
    }
}

/// Renumber a scope to `0..n-1`, preserving relative order
pub(crate) fn compact<T: Ordered>(items: &mut [T], in_scope: impl Fn(&T) -> bool) {
    let indices = scope_indices(items, in_scope);
    assign_orders(items, &indices);
}

/// Order value for an item appended at the end of a scope
pub(crate) fn next_order<T: Ordered>(items: &[T], in_scope: impl Fn(&T) -> bool) -> usize {
    items.iter().filter(|item| in_scope(item)).count()
}

/// Move the item at position `from` to position `to` and renumber the scope
pub(crate) fn move_within<T: Ordered>(
    items: &mut [T],
    in_scope: impl Fn(&T) -> bool,
    from: usize,
    to: usize,
) -> Result<()> {
    let mut indices = scope_indices(items, in_scope);
    let len = indices.len();
    if from >= len {
        return Err(Error::IndexOutOfRange { index: from, len });
    }
    if to >= len {
        return Err(Error::IndexOutOfRange { index: to, len });
    }

    let moved = indices.remove(from);
    indices.insert(to, moved);
    assign_orders(items, &indices);
    Ok(())
}

/// True when `orders` is exactly `{0, …, n-1}`
pub fn is_dense(orders: impl IntoIterator<Item = usize>) -> bool {
    let mut orders: Vec<usize> = orders.into_iter().collect();
    orders.sort_unstable();
    orders.iter().enumerate().all(|(i, &o)| i == o)
}
