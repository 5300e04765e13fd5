//! Order id allocation
//!
//! A single atomic counter hands out ids to every submission path. Ids are
//! strictly increasing, never repeat and never equal 0.

use std::sync::atomic::{AtomicU64, Ordering};
use types::ids::OrderId;

/// Lock-free order id allocator
#[derive(Debug)]
pub struct OrderIdAllocator {
    next: AtomicU64,
}

impl OrderIdAllocator {
    /// Create an allocator whose first id is `first`
    ///
    /// # Panics
    /// Panics if `first` is 0, the reserved "absent" id
    pub fn starting_at(first: u64) -> Self {
        assert!(first != 0, "Order id 0 is reserved");
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Issue the next id
    ///
    /// # Panics
    /// Panics if the id space is exhausted rather than wrapping to 0
    pub fn next(&self) -> OrderId {
        let raw = self.next.fetch_add(1, Ordering::Relaxed);
        assert!(raw != u64::MAX, "Order id space exhausted");
        OrderId::new(raw)
    }

    /// The id the next call to `next` would return
    pub fn peek(&self) -> OrderId {
        OrderId::new(self.next.load(Ordering::Relaxed))
    }
}

impl Default for OrderIdAllocator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}
