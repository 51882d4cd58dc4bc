//! Ordered container of orders keyed by price/time/id priority.
//!
//! Backed by [`std::collections::BTreeMap`] — the same ordered, O(log n)
//! insert/remove/extremum guarantees a red-black tree gives, without a
//! hand-rolled balanced tree. The comparator lives entirely on the key type
//! ([`super::key::ActiveKey`] / [`super::key::StopKey`]), so there is no
//! runtime type inspection anywhere on the matching path.

use super::key::TreeKey;
use super::order::Order;
use std::collections::BTreeMap;

/// An ordered set of orders for one side of one tree (e.g. `bids`, `stop_asks`).
#[derive(Debug, Default)]
pub struct PriorityTree<K: TreeKey> {
    entries: BTreeMap<K, Order>,
}

impl<K: TreeKey> PriorityTree<K> {
    pub fn new() -> Self {
        PriorityTree {
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, key: K, order: Order) {
        self.entries.insert(key, order);
    }

    pub fn remove(&mut self, key: &K) -> Option<Order> {
        self.entries.remove(key)
    }

    /// The most eligible resting order, without removing it.
    pub fn peek_best(&self) -> Option<(K, &Order)> {
        self.entries.iter().next_back().map(|(k, v)| (*k, v))
    }

    /// The most eligible resting order, mutably, without removing it.
    pub fn peek_best_mut(&mut self) -> Option<(K, &mut Order)> {
        self.entries.iter_mut().next_back().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resting orders from best to worst.
    pub fn iter_best_first(&self) -> impl Iterator<Item = (&K, &Order)> {
        self.entries.iter().rev()
    }
}
