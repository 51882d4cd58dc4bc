//! Aggregated per-price-level view of resting liquidity, mirrored from the
//! active trees in the same critical section as every book mutation.

use super::order::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A depth summary row. Two levels are identical when `(side, price)` match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub side: Side,
    pub price: Decimal,
    pub aggregate_quantity: Decimal,
    pub order_count: u64,
}

/// Point-in-time, best-first snapshot returned by `snapshot_depth`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DepthSnapshot {
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

/// Two ordered maps (bid-side, ask-side) from price to [`PriceLevel`].
#[derive(Debug, Default)]
pub struct DepthBook {
    bids: BTreeMap<Decimal, PriceLevel>,
    asks: BTreeMap<Decimal, PriceLevel>,
}

impl DepthBook {
    pub fn new() -> Self {
        DepthBook {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
        }
    }

    fn side_map(&mut self, side: Side) -> &mut BTreeMap<Decimal, PriceLevel> {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }

    /// Apply a signed delta to the level at `(side, price)`, creating it
    /// lazily and removing it once both fields reach zero.
    pub fn apply(&mut self, side: Side, price: Decimal, delta_quantity: Decimal, delta_count: i64) {
        let map = self.side_map(side);
        match map.get_mut(&price) {
            Some(level) => {
                level.aggregate_quantity += delta_quantity;
                level.order_count = apply_signed(level.order_count, delta_count);
                if level.order_count == 0 || level.aggregate_quantity.is_zero() {
                    map.remove(&price);
                }
            }
            None => {
                debug_assert!(
                    delta_quantity >= Decimal::ZERO && delta_count >= 0,
                    "negative delta on an absent depth level is a programmer error"
                );
                if delta_quantity > Decimal::ZERO && delta_count > 0 {
                    map.insert(
                        price,
                        PriceLevel {
                            side,
                            price,
                            aggregate_quantity: delta_quantity,
                            order_count: delta_count as u64,
                        },
                    );
                }
            }
        }
    }

    /// Best-first snapshot: bids descending by price, asks ascending by price.
    pub fn snapshot(&self) -> DepthSnapshot {
        DepthSnapshot {
            bids: self.bids.values().rev().copied().collect(),
            asks: self.asks.values().copied().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

fn apply_signed(count: u64, delta: i64) -> u64 {
    if delta >= 0 {
        count + delta as u64
    } else {
        count.saturating_sub((-delta) as u64)
    }
}
