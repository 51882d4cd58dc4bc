//! Order value type and the client-visible enums it is built from.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Client-assigned identifier, unique within a book while the order is resting.
pub type OrderId = u64;

/// Which side of the book an order rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Ask,
    Bid,
}

impl Side {
    /// The side an incoming order of this side matches against.
    pub fn opposite(self) -> Side {
        match self {
            Side::Ask => Side::Bid,
            Side::Bid => Side::Ask,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Ask => write!(f, "ASK"),
            Side::Bid => write!(f, "BID"),
        }
    }
}

/// Caller-supplied order parameters, before the engine assigns `created_at`.
///
/// `price == Decimal::ZERO` denotes a market order; `stop_price == Decimal::ZERO`
/// denotes a non-stop order. Validation of these fields is a boundary
/// responsibility (see [`crate::boundary`]) — by the time a `NewOrder` reaches
/// the book it is assumed well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrder {
    pub id: OrderId,
    pub side: Side,
    pub price: Decimal,
    pub stop_price: Decimal,
    pub quantity: Decimal,
    pub immediate_or_cancel: bool,
}

/// A resting or in-flight order, owned exclusively by the book that holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub price: Decimal,
    pub stop_price: Decimal,
    pub quantity: Decimal,
    pub filled_quantity: Decimal,
    pub created_at: u64,
    pub immediate_or_cancel: bool,
}

impl Order {
    /// Admit a `NewOrder` into the book, assigning it the engine's monotonic sequence.
    pub fn admit(new_order: NewOrder, created_at: u64) -> Self {
        Order {
            id: new_order.id,
            side: new_order.side,
            price: new_order.price,
            stop_price: new_order.stop_price,
            quantity: new_order.quantity,
            filled_quantity: Decimal::ZERO,
            created_at,
            immediate_or_cancel: new_order.immediate_or_cancel,
        }
    }

    /// Quantity still unfilled.
    pub fn pending(&self) -> Decimal {
        self.quantity - self.filled_quantity
    }

    /// Whether every unit of `quantity` has been filled.
    pub fn is_filled(&self) -> bool {
        self.pending().is_zero()
    }

    /// `price > 0`.
    pub fn is_limit(&self) -> bool {
        self.price > Decimal::ZERO
    }

    /// `price == 0`.
    pub fn is_market(&self) -> bool {
        self.price.is_zero()
    }

    /// `stop_price > 0`.
    pub fn is_stop(&self) -> bool {
        self.stop_price > Decimal::ZERO
    }

    /// Apply a fill, never exceeding `quantity`.
    pub fn fill(&mut self, quantity: Decimal) {
        debug_assert!(
            self.filled_quantity + quantity <= self.quantity,
            "fill would exceed order quantity: {} + {} > {}",
            self.filled_quantity,
            quantity,
            self.quantity
        );
        self.filled_quantity += quantity;
    }

    /// Disarm a triggered stop order, turning it into a plain active order.
    pub fn disarm(&mut self) {
        self.stop_price = Decimal::ZERO;
    }
}
