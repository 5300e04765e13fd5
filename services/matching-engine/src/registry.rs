//! Book registry
//!
//! Maps instrument names to their order books and creates books lazily.
//! Creation happens exactly once per name even when several threads
//! reference a new instrument at the same moment.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::info;
use types::ids::InstrumentId;

use crate::book::OrderBook;

/// Shared handle to one instrument's book
///
/// The mutex is the book's serialization discipline: one operation holds it
/// from start to finish.
pub type BookHandle = Arc<Mutex<OrderBook>>;

/// Concurrent instrument -> book map
#[derive(Debug, Default)]
pub struct BookRegistry {
    books: DashMap<String, BookHandle>,
    /// Number of books created, for diagnostics
    created: AtomicU64,
}

impl BookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the book for `instrument`, creating it on first reference
    ///
    /// Every call with the same name returns a handle to the same book.
    pub fn get_or_create(&self, instrument: &str) -> BookHandle {
        if let Some(book) = self.books.get(instrument) {
            return Arc::clone(book.value());
        }

        // The entry holds the shard lock, so only one caller builds the book
        let entry = self.books.entry(instrument.to_string()).or_insert_with(|| {
            let total = self.created.fetch_add(1, Ordering::Relaxed) + 1;
            info!(instrument, books = total, "Order book created");
            Arc::new(Mutex::new(OrderBook::new(InstrumentId::new(instrument))))
        });
        Arc::clone(entry.value())
    }

    /// Return the book for `instrument` only if it already exists
    pub fn get(&self, instrument: &str) -> Option<BookHandle> {
        self.books.get(instrument).map(|book| Arc::clone(book.value()))
    }

    /// Known instrument names, sorted
    pub fn instruments(&self) -> Vec<String> {
        let mut names: Vec<String> = self.books.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Total books ever created
    pub fn books_created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }
}
