//! The execution record produced by a match.

use super::order::OrderId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One execution between a resting maker and an incoming taker.
///
/// `price` is always the maker's resting price (the maker-price-rule); `quantity`
/// is the amount filled on both sides by this execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub price: Decimal,
    pub quantity: Decimal,
    pub taker_id: OrderId,
    pub maker_id: OrderId,
}
