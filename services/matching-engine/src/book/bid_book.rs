//! Bid (buy-side) order book
//!
//! Maintains buy orders sorted by price descending (best bid first).
//! Uses BTreeMap for deterministic iteration order.

use std::collections::BTreeMap;
use types::numeric::Price;
use types::order::Side;

use super::price_level::PriceLevel;
use super::side::BookSide;

/// Bid (buy) side order book
///
/// The highest bid is best. At each price level, orders are maintained in
/// FIFO order.
#[derive(Debug, Clone, Default)]
pub struct BidBook {
    /// BTreeMap iterates ascending, so the best bid is the last key
    levels: BTreeMap<Price, PriceLevel>,
}

impl BidBook {
    /// Create a new empty bid book
    pub fn new() -> Self {
        Self::default()
    }
}

impl BookSide for BidBook {
    const SIDE: Side = Side::BUY;

    fn best_level(&self) -> Option<&PriceLevel> {
        self.levels.values().next_back()
    }

    fn best_level_mut(&mut self) -> Option<&mut PriceLevel> {
        self.levels.values_mut().next_back()
    }

    fn level_at(&mut self, price: Price) -> &mut PriceLevel {
        self.levels
            .entry(price)
            .or_insert_with(|| PriceLevel::new(price))
    }

    fn level(&self, price: Price) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    fn level_mut(&mut self, price: Price) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&price)
    }

    fn remove_level_if_empty(&mut self, price: Price) -> bool {
        if self.levels.get(&price).is_some_and(PriceLevel::is_empty) {
            self.levels.remove(&price);
            true
        } else {
            false
        }
    }

    fn levels(&self) -> Box<dyn Iterator<Item = &PriceLevel> + '_> {
        // Reverse to get highest prices first
        Box::new(self.levels.values().rev())
    }

    fn level_count(&self) -> usize {
        self.levels.len()
    }
}
