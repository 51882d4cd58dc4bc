//! Single-instrument limit order book: price/time priority matching, stop
//! order arming and triggering, and live depth aggregation behind a single
//! per-book lock.

mod book;
mod depth;
mod error;
mod key;
mod order;
mod registry;
mod trade;
mod tree;

pub use book::OrderBook;
pub use depth::{DepthSnapshot, PriceLevel};
pub use error::OrderBookError;
pub use order::{NewOrder, Order, OrderId, Side};
pub use registry::Registry;
pub use trade::Trade;
