//! The per-instrument matching engine: both active trees, both stop trees,
//! the cancel index, the pending cascade queue, depth, and the single lock
//! that serializes every operation on this book.

use super::depth::{DepthBook, DepthSnapshot};
use super::error::OrderBookError;
use super::key::{ActiveKey, StopKey, TreeKey};
use super::order::{NewOrder, Order, OrderId, Side};
use super::trade::Trade;
use super::tree::PriorityTree;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};
use tracing::{info, trace};

/// Everything the book's lock protects. Kept as a plain struct, separate
/// from the lock itself, so `OrderBook::new` can construct it without
/// touching synchronization primitives.
struct BookState {
    bids: PriorityTree<ActiveKey>,
    asks: PriorityTree<ActiveKey>,
    stop_bids: PriorityTree<StopKey>,
    stop_asks: PriorityTree<StopKey>,
    depth: DepthBook,
    /// id -> location in the active tree. Never populated for stop or
    /// pending entries (see `armed_index` for those) — this is the
    /// deliberate cancel-stop limitation documented in the design notes.
    cancel_index: HashMap<OrderId, ActiveKey>,
    /// id -> location in a stop tree. Exists only so duplicate-id detection
    /// can see armed stops too; `cancel` never consults it.
    armed_index: HashMap<OrderId, StopKey>,
    pending: VecDeque<Order>,
    last_price: Decimal,
    sequence: u64,
}

impl BookState {
    fn new() -> Self {
        BookState {
            bids: PriorityTree::new(),
            asks: PriorityTree::new(),
            stop_bids: PriorityTree::new(),
            stop_asks: PriorityTree::new(),
            depth: DepthBook::new(),
            cancel_index: HashMap::new(),
            armed_index: HashMap::new(),
            pending: VecDeque::new(),
            last_price: Decimal::ZERO,
            sequence: 0,
        }
    }

    fn next_sequence(&mut self) -> u64 {
        let seq = self.sequence;
        self.sequence += 1;
        seq
    }

    fn is_resting_anywhere(&self, id: OrderId) -> bool {
        self.cancel_index.contains_key(&id) || self.armed_index.contains_key(&id)
    }

    fn insert_order(&mut self, new_order: NewOrder) -> Result<Vec<Trade>, OrderBookError> {
        if self.is_resting_anywhere(new_order.id) {
            return Err(OrderBookError::DuplicateOrderId(new_order.id));
        }

        let created_at = self.next_sequence();
        let order = Order::admit(new_order, created_at);

        if order.is_stop() {
            self.arm_stop(order);
            return Ok(Vec::new());
        }

        let mut trades = Vec::new();
        self.process_taker(order, &mut trades);
        self.drain_pending(&mut trades);
        debug_assert!(
            self.pending.is_empty(),
            "pending queue must be fully drained before insert() returns"
        );
        Ok(trades)
    }

    fn arm_stop(&mut self, order: Order) {
        let key = StopKey::from(&order);
        self.armed_index.insert(order.id, key);
        trace!(id = order.id, side = %order.side, stop_price = %order.stop_price, "stop order armed");
        match order.side {
            Side::Bid => self.stop_bids.insert(key, order),
            Side::Ask => self.stop_asks.insert(key, order),
        }
    }

    /// Runs the matching loop for `taker`, then either discards, rests, or
    /// drops its remainder. Does not drain `pending` — callers at the top
    /// of the recursion (`insert_order`/`drain_pending`) own that.
    fn process_taker(&mut self, mut taker: Order, trades: &mut Vec<Trade>) {
        self.run_matching_loop(&mut taker, trades);
        self.settle_remainder(taker);
    }

    fn drain_pending(&mut self, trades: &mut Vec<Trade>) {
        while let Some(next) = self.pending.pop_front() {
            self.process_taker(next, trades);
        }
    }

    fn active_tree(&self, side: Side) -> &PriorityTree<ActiveKey> {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    fn run_matching_loop(&mut self, taker: &mut Order, trades: &mut Vec<Trade>) {
        loop {
            if taker.is_filled() {
                break;
            }
            let maker_side = taker.side.opposite();

            let step = {
                let maker_tree = match maker_side {
                    Side::Bid => &mut self.bids,
                    Side::Ask => &mut self.asks,
                };
                let Some((best_key, best_order)) = maker_tree.peek_best_mut() else {
                    break;
                };

                let can_match = if taker.is_limit() {
                    match taker.side {
                        Side::Bid => taker.price >= best_order.price,
                        Side::Ask => taker.price <= best_order.price,
                    }
                } else {
                    true
                };
                if !can_match {
                    break;
                }

                let fill = taker.pending().min(best_order.pending());
                best_order.fill(fill);
                taker.fill(fill);
                let maker_price = best_order.price;
                let maker_id = best_order.id;
                let maker_filled = best_order.is_filled();
                if maker_filled {
                    maker_tree.remove(&best_key);
                }
                (fill, maker_price, maker_id, maker_filled)
            };
            let (fill, maker_price, maker_id, maker_filled) = step;

            let trade = Trade {
                price: maker_price,
                quantity: fill,
                taker_id: taker.id,
                maker_id,
            };
            if maker_filled {
                self.cancel_index.remove(&maker_id);
                // Quantity and count deltas land in the same `apply` call so
                // the level is never observed (or removed) mid-update: a
                // separate `(-fill, 0)` step would zero `aggregate_quantity`
                // and remove the level itself whenever `best` was the only
                // order resting there, leaving the following `(0, -1)` call
                // to hit the absent-level branch with a negative delta.
                self.depth.apply(maker_side, maker_price, -fill, -1);
            } else {
                self.depth.apply(maker_side, maker_price, -fill, 0);
            }
            trace!(taker = taker.id, maker = maker_id, price = %trade.price, quantity = %trade.quantity, "trade");
            trades.push(trade);

            let prev = self.last_price;
            self.last_price = trade.price;
            self.arm_triggered_stops(prev, trade.price);
        }
    }

    fn settle_remainder(&mut self, taker: Order) {
        if taker.is_filled() {
            return;
        }
        if taker.immediate_or_cancel {
            trace!(id = taker.id, pending = %taker.pending(), "IOC remainder discarded");
            return;
        }
        if taker.is_market() {
            trace!(id = taker.id, pending = %taker.pending(), "market remainder dropped, no liquidity left");
            return;
        }
        let key = ActiveKey::from(&taker);
        self.depth.apply(taker.side, taker.price, taker.pending(), 1);
        self.cancel_index.insert(taker.id, key);
        trace!(id = taker.id, price = %taker.price, pending = %taker.pending(), "order rests");
        match taker.side {
            Side::Bid => self.bids.insert(key, taker),
            Side::Ask => self.asks.insert(key, taker),
        }
    }

    /// Scans the stop book opposite the direction of the price move and
    /// defers every triggered order onto `pending`. No trades are produced
    /// here — triggered orders re-enter via `process_taker` from the
    /// caller's drain loop.
    fn arm_triggered_stops(&mut self, prev: Decimal, next: Decimal) {
        if next == prev || prev.is_zero() {
            return;
        }
        if next < prev {
            loop {
                let Some((key, order)) = self.stop_bids.peek_best_mut() else {
                    break;
                };
                if order.stop_price < next {
                    break;
                }
                let mut triggered = self
                    .stop_bids
                    .remove(&key)
                    .expect("just-peeked stop-bid key must still be present");
                self.armed_index.remove(&triggered.id);
                triggered.disarm();
                info!(id = triggered.id, trigger_price = %next, "stop-bid triggered");
                self.pending.push_back(triggered);
            }
        } else {
            loop {
                let Some((key, order)) = self.stop_asks.peek_best_mut() else {
                    break;
                };
                if order.stop_price > next {
                    break;
                }
                let mut triggered = self
                    .stop_asks
                    .remove(&key)
                    .expect("just-peeked stop-ask key must still be present");
                self.armed_index.remove(&triggered.id);
                triggered.disarm();
                info!(id = triggered.id, trigger_price = %next, "stop-ask triggered");
                self.pending.push_back(triggered);
            }
        }
    }

    fn cancel(&mut self, id: OrderId) {
        let Some(key) = self.cancel_index.remove(&id) else {
            trace!(id, "cancel on absent order, no-op");
            return;
        };
        let tree = match key.side() {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        };
        if let Some(order) = tree.remove(&key) {
            self.depth
                .apply(order.side, order.price, -order.pending(), -1);
        }
        info!(id, "order cancelled");
    }
}

/// A single instrument's order book: the matching engine.
///
/// Every operation takes the book's exclusive (write) lock except
/// [`OrderBook::snapshot_depth`] and the best-price readers, which take a
/// shared (read) lock. Nothing inside the lock ever awaits, so a plain
/// synchronous reader-writer lock is the right tool — see `parking_lot`.
pub struct OrderBook {
    pair: String,
    state: RwLock<BookState>,
}

impl OrderBook {
    pub fn new(pair: impl Into<String>) -> Self {
        let pair = pair.into();
        info!(pair = %pair, "book created");
        OrderBook {
            pair,
            state: RwLock::new(BookState::new()),
        }
    }

    pub fn pair(&self) -> &str {
        &self.pair
    }

    /// Insert an order. Stop orders are armed and return no trades; active
    /// orders run the matching loop and any stop cascade it triggers,
    /// returning every trade produced in execution order.
    pub fn insert(&self, new_order: NewOrder) -> Result<Vec<Trade>, OrderBookError> {
        self.state.write().insert_order(new_order)
    }

    /// Idempotent: a no-op if `id` is not currently resting in an active tree.
    pub fn cancel(&self, id: OrderId) {
        self.state.write().cancel(id);
    }

    /// A point-in-time, best-first snapshot of both sides.
    pub fn snapshot_depth(&self) -> DepthSnapshot {
        self.state.read().depth.snapshot()
    }

    /// Zero until the first trade, otherwise the most recently traded price.
    pub fn last_price(&self) -> Decimal {
        self.state.read().last_price
    }

    pub fn best_bid(&self) -> Option<Decimal> {
        self.state
            .read()
            .active_tree(Side::Bid)
            .peek_best()
            .map(|(key, _)| key.price)
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.state
            .read()
            .active_tree(Side::Ask)
            .peek_best()
            .map(|(key, _)| key.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn limit(id: OrderId, side: Side, price: Decimal, quantity: Decimal) -> NewOrder {
        NewOrder {
            id,
            side,
            price,
            stop_price: Decimal::ZERO,
            quantity,
            immediate_or_cancel: false,
        }
    }

    fn ioc(id: OrderId, side: Side, price: Decimal, quantity: Decimal) -> NewOrder {
        NewOrder {
            immediate_or_cancel: true,
            ..limit(id, side, price, quantity)
        }
    }

    fn stop(id: OrderId, side: Side, price: Decimal, stop_price: Decimal, quantity: Decimal) -> NewOrder {
        NewOrder {
            id,
            side,
            price,
            stop_price,
            quantity,
            immediate_or_cancel: false,
        }
    }

    #[test]
    fn crossing_orders_produce_one_trade_and_empty_both_books() {
        let book = OrderBook::new("BTC-USDT");
        let trades1 = book
            .insert(limit(1, Side::Ask, dec!(2.0), dec!(3.0)))
            .unwrap();
        assert!(trades1.is_empty());
        let trades2 = book
            .insert(limit(2, Side::Bid, dec!(2.1), dec!(3.0)))
            .unwrap();
        assert_eq!(
            trades2,
            vec![Trade {
                price: dec!(2.0),
                quantity: dec!(3.0),
                taker_id: 2,
                maker_id: 1
            }]
        );
        assert!(book.snapshot_depth().bids.is_empty());
        assert!(book.snapshot_depth().asks.is_empty());
    }

    #[test]
    fn non_crossing_orders_both_rest() {
        let book = OrderBook::new("BTC-USDT");
        book.insert(limit(1, Side::Ask, dec!(3.0), dec!(3.0)))
            .unwrap();
        let trades = book
            .insert(limit(2, Side::Bid, dec!(2.1), dec!(3.0)))
            .unwrap();
        assert!(trades.is_empty());
        let depth = book.snapshot_depth();
        assert_eq!(depth.asks.len(), 1);
        assert_eq!(depth.bids.len(), 1);
    }

    #[test]
    fn ioc_with_no_liquidity_discards_fully() {
        let book = OrderBook::new("BTC-USDT");
        let trades = book
            .insert(ioc(1, Side::Bid, dec!(10.0), dec!(30.0)))
            .unwrap();
        assert!(trades.is_empty());
        assert!(book.snapshot_depth().bids.is_empty());
        assert!(book.snapshot_depth().asks.is_empty());
    }

    #[test]
    fn cancel_is_idempotent() {
        let book = OrderBook::new("BTC-USDT");
        book.insert(limit(1, Side::Bid, dec!(10.0), dec!(5.0)))
            .unwrap();
        book.cancel(1);
        book.cancel(1);
        assert!(book.snapshot_depth().bids.is_empty());
    }

    #[test]
    fn time_priority_fills_older_order_first() {
        let book = OrderBook::new("BTC-USDT");
        book.insert(limit(1, Side::Ask, dec!(2.0), dec!(5.0)))
            .unwrap();
        book.insert(limit(2, Side::Ask, dec!(2.0), dec!(3.0)))
            .unwrap();
        let trades = book
            .insert(limit(3, Side::Bid, dec!(2.0), dec!(6.0)))
            .unwrap();
        assert_eq!(
            trades,
            vec![
                Trade {
                    price: dec!(2.0),
                    quantity: dec!(5.0),
                    taker_id: 3,
                    maker_id: 1
                },
                Trade {
                    price: dec!(2.0),
                    quantity: dec!(1.0),
                    taker_id: 3,
                    maker_id: 2
                },
            ]
        );
        let depth = book.snapshot_depth();
        assert_eq!(depth.asks.len(), 1);
        assert_eq!(depth.asks[0].aggregate_quantity, dec!(2.0));
    }

    #[test]
    fn price_decline_cascades_into_triggered_stop_bid() {
        let book = OrderBook::new("BTC-USDT");
        // Prime the book with an unrelated first trade: the first-ever trade
        // is exempt from triggering stops (see
        // `first_trade_never_triggers_stops`), so the cascade below needs a
        // prior print before it can move `last_price` through a live stop.
        book.insert(limit(0, Side::Ask, dec!(1.0), dec!(1.0)))
            .unwrap();
        book.insert(limit(9, Side::Bid, dec!(1.0), dec!(1.0)))
            .unwrap();

        book.insert(limit(1, Side::Ask, dec!(3.0), dec!(1.0)))
            .unwrap();
        book.insert(stop(2, Side::Bid, dec!(5.0), dec!(2.5), dec!(1.0)))
            .unwrap();
        book.insert(limit(3, Side::Ask, dec!(2.0), dec!(1.0)))
            .unwrap();
        let trades = book
            .insert(limit(4, Side::Bid, dec!(2.0), dec!(1.0)))
            .unwrap();
        assert_eq!(
            trades,
            vec![
                Trade {
                    price: dec!(2.0),
                    quantity: dec!(1.0),
                    taker_id: 4,
                    maker_id: 3
                },
                Trade {
                    price: dec!(3.0),
                    quantity: dec!(1.0),
                    taker_id: 2,
                    maker_id: 1
                },
            ]
        );
        assert_eq!(book.last_price(), dec!(3.0));
        assert!(book.snapshot_depth().asks.is_empty());
        assert!(book.snapshot_depth().bids.is_empty());
    }

    #[test]
    fn duplicate_order_id_is_rejected() {
        let book = OrderBook::new("BTC-USDT");
        book.insert(limit(1, Side::Bid, dec!(2.0), dec!(1.0)))
            .unwrap();
        let err = book
            .insert(limit(1, Side::Ask, dec!(2.0), dec!(1.0)))
            .unwrap_err();
        assert_eq!(err, OrderBookError::DuplicateOrderId(1));
    }

    #[test]
    fn market_order_remainder_is_dropped_not_rested() {
        let book = OrderBook::new("BTC-USDT");
        let market_order = limit(1, Side::Bid, Decimal::ZERO, dec!(5.0));
        let trades = book.insert(market_order).unwrap();
        assert!(trades.is_empty());
        assert!(book.snapshot_depth().bids.is_empty());
    }

    #[test]
    fn stop_order_arms_without_trading_and_cannot_be_cancelled_by_id() {
        let book = OrderBook::new("BTC-USDT");
        let trades = book
            .insert(stop(1, Side::Bid, dec!(5.0), dec!(2.5), dec!(1.0)))
            .unwrap();
        assert!(trades.is_empty());
        assert!(book.snapshot_depth().bids.is_empty());
        // The cancel-index limitation is intentional: armed stops cannot be
        // reached by cancel(), so this is a no-op rather than a removal.
        book.cancel(1);
        assert!(book.snapshot_depth().bids.is_empty());
    }

    #[test]
    fn first_trade_never_triggers_stops() {
        let book = OrderBook::new("BTC-USDT");
        // stop_price 0.5 would satisfy a stop-ask trigger against almost any
        // first print, but the first-ever trade is exempt regardless.
        book.insert(stop(1, Side::Ask, dec!(5.0), dec!(0.5), dec!(1.0)))
            .unwrap();
        book.insert(limit(2, Side::Ask, dec!(2.0), dec!(1.0)))
            .unwrap();
        let first_trades = book
            .insert(limit(3, Side::Bid, dec!(2.0), dec!(1.0)))
            .unwrap();
        assert_eq!(first_trades.len(), 1, "no cascade on the first-ever trade");
        assert_eq!(book.last_price(), dec!(2.0));

        // A later, non-first rise does trigger it: stop order 1 disarms,
        // rests as a plain ask at 5.0, and matches nothing (no resting bid).
        book.insert(limit(4, Side::Ask, dec!(2.2), dec!(1.0)))
            .unwrap();
        let second_trades = book
            .insert(limit(5, Side::Bid, dec!(2.2), dec!(1.0)))
            .unwrap();
        assert_eq!(second_trades.len(), 1, "only the direct trade, stop order 1 rests without matching");
        let depth = book.snapshot_depth();
        assert!(depth.asks.iter().any(|level| level.price == dec!(5.0)));
    }

    /// Rebuilds the depth a side's active tree *should* show by summing
    /// `pending()` and counting entries grouped by price, independent of
    /// `DepthBook` itself — the reference this property test checks against.
    fn reaggregate(tree: &PriorityTree<ActiveKey>) -> std::collections::BTreeMap<Decimal, (Decimal, u64)> {
        let mut levels = std::collections::BTreeMap::new();
        for (_, order) in tree.iter_best_first() {
            let entry: &mut (Decimal, u64) = levels.entry(order.price).or_insert((Decimal::ZERO, 0));
            entry.0 += order.pending();
            entry.1 += 1;
        }
        levels
    }

    /// One `insert` or one `cancel` against a small, collision-prone id/price
    /// space — small enough that random sequences routinely cross, rest, and
    /// re-cancel the same levels.
    fn op_strategy() -> impl proptest::strategy::Strategy<Value = (u64, Side, i64, i64, bool)> {
        use proptest::prelude::*;
        (1u64..12, any::<bool>(), 1i64..6, 1i64..6, any::<bool>()).prop_map(
            |(id, is_bid, price, qty, is_cancel)| {
                (id, if is_bid { Side::Bid } else { Side::Ask }, price, qty, is_cancel)
            },
        )
    }

    proptest::proptest! {
        /// Depth always equals the re-aggregation of the corresponding
        /// active tree by price. Runs random insert/cancel sequences (no
        /// stops — this checks the active-tree/depth link, not the cascade)
        /// and rebuilds depth independently after every operation.
        #[test]
        fn depth_always_matches_reaggregated_active_trees(
            ops in proptest::collection::vec(op_strategy(), 1..60)
        ) {
            let book = OrderBook::new("BTC-USDT");
            for (id, side, price, qty, is_cancel) in ops {
                if is_cancel {
                    book.cancel(id);
                } else {
                    let _ = book.insert(limit(id, side, Decimal::from(price), Decimal::from(qty)));
                }

                let state = book.state.read();
                let expected_bids = reaggregate(&state.bids);
                let expected_asks = reaggregate(&state.asks);
                let snapshot = state.depth.snapshot();

                proptest::prop_assert_eq!(snapshot.bids.len(), expected_bids.len());
                for level in &snapshot.bids {
                    let (qty, count) = expected_bids[&level.price];
                    proptest::prop_assert_eq!(level.aggregate_quantity, qty);
                    proptest::prop_assert_eq!(level.order_count, count);
                }
                proptest::prop_assert_eq!(snapshot.asks.len(), expected_asks.len());
                for level in &snapshot.asks {
                    let (qty, count) = expected_asks[&level.price];
                    proptest::prop_assert_eq!(level.aggregate_quantity, qty);
                    proptest::prop_assert_eq!(level.order_count, count);
                }
            }
        }

        /// `cancel_index` always holds exactly the union of both active
        /// trees' order ids — never more, never less.
        #[test]
        fn cancel_index_matches_union_of_active_tree_ids(
            ops in proptest::collection::vec(op_strategy(), 1..60)
        ) {
            let book = OrderBook::new("BTC-USDT");
            for (id, side, price, qty, is_cancel) in ops {
                if is_cancel {
                    book.cancel(id);
                } else {
                    let _ = book.insert(limit(id, side, Decimal::from(price), Decimal::from(qty)));
                }

                let state = book.state.read();
                let mut tree_ids: Vec<OrderId> = state
                    .bids
                    .iter_best_first()
                    .chain(state.asks.iter_best_first())
                    .map(|(_, order)| order.id)
                    .collect();
                let mut index_ids: Vec<OrderId> = state.cancel_index.keys().copied().collect();
                tree_ids.sort_unstable();
                index_ids.sort_unstable();
                proptest::prop_assert_eq!(tree_ids, index_ids);
            }
        }
    }
}
