//! Engine-internal error type.

use super::order::OrderId;
use thiserror::Error;

/// Errors the core engine itself can return. Everything else — malformed
/// wire input, unknown pairs — is rejected by [`crate::boundary`] before an
/// `OrderBook` is ever touched.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum OrderBookError {
    /// `order.id` is already resting, armed, or pending in this book.
    #[error("order {0} is already resting in this book")]
    DuplicateOrderId(OrderId),
}
