//! # Limit Order Book Engine
//!
//! A single-instrument limit order book: price/time priority matching for
//! limit, market, and immediate-or-cancel orders, stop order arming and
//! cascading triggers, and a live aggregated depth view — all behind one
//! exclusive-write/shared-read lock per book.
//!
//! ## Key properties
//!
//! - **Exact arithmetic**: prices and quantities are [`rust_decimal::Decimal`],
//!   so `1.0` and `1.00` compare, hash, and order identically.
//! - **Price/time priority**: within a price level, earlier orders (lower
//!   `created_at`) fill first; across levels, better prices fill first.
//! - **Stop orders**: armed on arrival, never visible to the active book or
//!   to matching, and triggered by a crossing `last_price` move — but never
//!   by the very first trade a book ever prints.
//! - **One lock per book**: a write holds the lock for the full admit,
//!   match, and cascade sequence; trades are collected under the lock and
//!   streamed to the caller only after it is released.
//! - **Independent book registry**: creating or looking up a book's handle
//!   takes the registry's own lock, never a book's; distinct pairs then run
//!   fully in parallel.
//!
//! ## Layout
//!
//! - [`orderbook`] — the matching engine itself: [`orderbook::OrderBook`],
//!   [`orderbook::Registry`], and the order/trade/depth value types.
//! - [`boundary`] — translates wire-shaped requests (decimal strings, a
//!   two-valued side enum) into calls against the engine, rejecting
//!   malformed input before any book lock is touched.
//! - [`shutdown`] — graceful-drain coordination for the hosting process;
//!   has no awareness of the engine itself.
//!
//! ## Non-goals
//!
//! Fee computation, self-trade prevention, price collars, cross-instrument
//! atomicity, replay/recovery journaling, iceberg/post-only/pegged/trailing
//! orders, and transport-level pub/sub are out of scope for this crate.

pub mod boundary;
pub mod orderbook;
pub mod prelude;
pub mod shutdown;
