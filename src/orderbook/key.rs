//! Ordering keys for the four priority trees.
//!
//! Both the active-book and stop-book comparators share the same shape: order
//! first by a price-like field (direction depends on side), then by earlier
//! `created_at`, then by lower id. [`priority_cmp`] implements that shape once;
//! [`ActiveKey`] and [`StopKey`] each plug in their own price-like field.

use super::order::{Order, OrderId, Side};
use rust_decimal::Decimal;
use std::cmp::Ordering;

/// `Ordering::Greater` means "more eligible to be matched / triggered next" —
/// the tree's `peek_best` always returns the maximal key.
fn priority_cmp(
    side: Side,
    (self_rank, self_created_at, self_id): (Decimal, u64, OrderId),
    (other_rank, other_created_at, other_id): (Decimal, u64, OrderId),
) -> Ordering {
    if self_id == other_id {
        return Ordering::Equal;
    }
    let rank_cmp = match side {
        // Lower price/stop_price is better for the ask side.
        Side::Ask => self_rank.cmp(&other_rank).reverse(),
        // Higher price/stop_price is better for the bid side.
        Side::Bid => self_rank.cmp(&other_rank),
    };
    rank_cmp
        // Earlier created_at is better.
        .then_with(|| self_created_at.cmp(&other_created_at).reverse())
        // Lower id is better.
        .then_with(|| self_id.cmp(&other_id).reverse())
}

/// A key into this module's priority trees: knows its own side and id so a
/// tree entry can be removed again by a `cancel_index` lookup alone.
pub trait TreeKey: Ord + Copy + std::fmt::Debug {
    fn order_id(&self) -> OrderId;
    fn side(&self) -> Side;
}

/// Key for the two active-book trees (`bids`, `asks`), ordered by `price`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveKey {
    pub side: Side,
    pub price: Decimal,
    pub created_at: u64,
    pub id: OrderId,
}

impl ActiveKey {
    pub fn new(side: Side, price: Decimal, created_at: u64, id: OrderId) -> Self {
        ActiveKey {
            side,
            price,
            created_at,
            id,
        }
    }
}

impl PartialOrd for ActiveKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ActiveKey {
    fn cmp(&self, other: &Self) -> Ordering {
        debug_assert_eq!(
            self.side, other.side,
            "comparing active-book keys across sides is a programmer error"
        );
        priority_cmp(
            self.side,
            (self.price, self.created_at, self.id),
            (other.price, other.created_at, other.id),
        )
    }
}

impl TreeKey for ActiveKey {
    fn order_id(&self) -> OrderId {
        self.id
    }

    fn side(&self) -> Side {
        self.side
    }
}

/// Key for the two stop-book trees (`stop_bids`, `stop_asks`), ordered by
/// `stop_price`. Direction matches the active-book comparator per side:
/// confirmed against the reference implementation's `StopComparator`, which
/// mirrors the active comparator's per-side direction but keys on the stop
/// price instead of the limit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopKey {
    pub side: Side,
    pub stop_price: Decimal,
    pub created_at: u64,
    pub id: OrderId,
}

impl StopKey {
    pub fn new(side: Side, stop_price: Decimal, created_at: u64, id: OrderId) -> Self {
        StopKey {
            side,
            stop_price,
            created_at,
            id,
        }
    }
}

impl PartialOrd for StopKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StopKey {
    fn cmp(&self, other: &Self) -> Ordering {
        debug_assert_eq!(
            self.side, other.side,
            "comparing stop-book keys across sides is a programmer error"
        );
        priority_cmp(
            self.side,
            (self.stop_price, self.created_at, self.id),
            (other.stop_price, other.created_at, other.id),
        )
    }
}

impl TreeKey for StopKey {
    fn order_id(&self) -> OrderId {
        self.id
    }

    fn side(&self) -> Side {
        self.side
    }
}

impl From<&Order> for ActiveKey {
    fn from(order: &Order) -> Self {
        ActiveKey::new(order.side, order.price, order.created_at, order.id)
    }
}

impl From<&Order> for StopKey {
    fn from(order: &Order) -> Self {
        StopKey::new(order.side, order.stop_price, order.created_at, order.id)
    }
}
