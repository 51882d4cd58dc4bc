//! Convenient single-import surface for the common types.
//!
//! ```rust
//! use lob_engine::prelude::*;
//! ```

pub use crate::boundary::{Boundary, BoundaryError, InsertOrderRequest};
pub use crate::orderbook::{
    DepthSnapshot, NewOrder, Order, OrderBook, OrderBookError, OrderId, PriceLevel, Registry,
    Side, Trade,
};
pub use crate::shutdown::ShutdownController;
