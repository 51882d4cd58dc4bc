//! Maps pair names to their [`OrderBook`], creating them on demand.
//!
//! The registry has its own lock, independent of any individual book's lock:
//! creation takes the exclusive (write) side, lookups take the shared (read)
//! side. Different pairs then run fully in parallel — the registry is only
//! ever touched again when a brand-new pair shows up.

use super::book::OrderBook;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Owns every book for this process. Safe to share across threads/tasks via
/// `Arc<Registry>`.
#[derive(Default)]
pub struct Registry {
    books: RwLock<HashMap<String, Arc<OrderBook>>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            books: RwLock::new(HashMap::new()),
        }
    }

    /// Idempotent: creating an existing pair is a successful no-op.
    pub fn create_book(&self, pair: &str) {
        if self.books.read().contains_key(pair) {
            return;
        }
        let mut books = self.books.write();
        books
            .entry(pair.to_string())
            .or_insert_with(|| Arc::new(OrderBook::new(pair)));
        info!(pair, "registry: book ensured");
    }

    /// `None` if no book has been created for this pair yet.
    pub fn get(&self, pair: &str) -> Option<Arc<OrderBook>> {
        self.books.read().get(pair).cloned()
    }

    pub fn pairs(&self) -> Vec<String> {
        self.books.read().keys().cloned().collect()
    }

    pub fn book_count(&self) -> usize {
        self.books.read().len()
    }

    pub fn has_book(&self, pair: &str) -> bool {
        self.books.read().contains_key(pair)
    }
}
