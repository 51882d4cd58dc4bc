//! Translates external, wire-shaped requests into engine operations.
//!
//! Every field here arrives as a string (decimal strings for prices and
//! quantities, a two-valued side enum) because that is what a real transport
//! hands this layer: JSON, protobuf, or a hand-rolled binary frame all agree
//! on "send money as a string, never a float." Validation happens entirely
//! in this module, before any book lock is ever acquired — invalid input
//! never mutates engine state.

use crate::orderbook::{DepthSnapshot, NewOrder, OrderBookError, OrderId, Registry, Side, Trade};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Errors surfaced to an external caller. Distinct from [`OrderBookError`]:
/// this enum covers everything the boundary rejects *before* the engine is
/// ever touched, plus a pass-through variant for the one engine error kind a
/// caller can still trigger (a duplicate id).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoundaryError {
    #[error("unknown pair: {0}")]
    UnknownPair(String),
    #[error("invalid price: {0}")]
    InvalidPrice(String),
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),
    #[error("invalid side: {0}")]
    InvalidSide(String),
    #[error(transparent)]
    Engine(#[from] OrderBookError),
}

/// The wire-level side enum: `{ASK, BID}`.
pub fn parse_side(raw: &str) -> Result<Side, BoundaryError> {
    match raw {
        "ASK" => Ok(Side::Ask),
        "BID" => Ok(Side::Bid),
        other => Err(BoundaryError::InvalidSide(other.to_string())),
    }
}

/// A price string must parse as a non-negative decimal (`0` means market).
fn parse_price(raw: &str) -> Result<Decimal, BoundaryError> {
    let value =
        Decimal::from_str(raw).map_err(|_| BoundaryError::InvalidPrice(raw.to_string()))?;
    if value < Decimal::ZERO {
        return Err(BoundaryError::InvalidPrice(raw.to_string()));
    }
    Ok(value)
}

/// A quantity string must parse as a strictly positive decimal.
fn parse_quantity(raw: &str) -> Result<Decimal, BoundaryError> {
    let value =
        Decimal::from_str(raw).map_err(|_| BoundaryError::InvalidQuantity(raw.to_string()))?;
    if value <= Decimal::ZERO {
        return Err(BoundaryError::InvalidQuantity(raw.to_string()));
    }
    Ok(value)
}

/// A stop-price string follows the same rule as a regular price: absent or
/// `"0"` means "not a stop order."
fn parse_stop_price(raw: Option<&str>) -> Result<Decimal, BoundaryError> {
    match raw {
        None => Ok(Decimal::ZERO),
        Some(raw) => parse_price(raw),
    }
}

/// The parsed, still-unvalidated-against-a-book shape of an insert request.
#[derive(Debug, Clone)]
pub struct InsertOrderRequest {
    pub pair: String,
    pub id: OrderId,
    pub side: String,
    pub price: String,
    pub quantity: String,
    pub stop_price: Option<String>,
    pub immediate_or_cancel: bool,
}

/// The four external operations, parameterized over a shared [`Registry`].
///
/// This is the seam a real transport (gRPC, a hand-rolled TCP framing,
/// whatever) attaches to; it does no I/O itself.
pub struct Boundary {
    registry: Arc<Registry>,
}

impl Boundary {
    pub fn new(registry: Arc<Registry>) -> Self {
        Boundary { registry }
    }

    /// Idempotent: creating an existing pair is a successful no-op.
    pub fn create_book(&self, pair: &str) {
        self.registry.create_book(pair);
    }

    pub fn insert_order(&self, request: &InsertOrderRequest) -> Result<Vec<Trade>, BoundaryError> {
        let book = self
            .registry
            .get(&request.pair)
            .ok_or_else(|| BoundaryError::UnknownPair(request.pair.clone()))?;

        let side = parse_side(&request.side)?;
        let price = parse_price(&request.price)?;
        let quantity = parse_quantity(&request.quantity)?;
        let stop_price = parse_stop_price(request.stop_price.as_deref())?;

        let new_order = NewOrder {
            id: request.id,
            side,
            price,
            stop_price,
            quantity,
            immediate_or_cancel: request.immediate_or_cancel,
        };

        match book.insert(new_order) {
            Ok(trades) => {
                info!(
                    pair = %request.pair,
                    id = request.id,
                    trade_count = trades.len(),
                    "order inserted"
                );
                Ok(trades)
            }
            Err(engine_error) => {
                error!(pair = %request.pair, id = request.id, %engine_error, "insert rejected");
                Err(BoundaryError::from(engine_error))
            }
        }
    }

    /// Idempotent: returns success whether or not the order was resting.
    pub fn cancel_order(&self, pair: &str, id: OrderId) -> Result<(), BoundaryError> {
        let book = self
            .registry
            .get(pair)
            .ok_or_else(|| BoundaryError::UnknownPair(pair.to_string()))?;
        book.cancel(id);
        Ok(())
    }

    pub fn get_depth(&self, pair: &str) -> Result<DepthSnapshot, BoundaryError> {
        let book = self
            .registry
            .get(pair)
            .ok_or_else(|| BoundaryError::UnknownPair(pair.to_string()))?;
        Ok(book.snapshot_depth())
    }
}
