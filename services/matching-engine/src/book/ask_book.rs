//! Ask (sell-side) order book
//!
//! Maintains sell orders sorted by price ascending (best ask first).
//! Uses BTreeMap for deterministic iteration order.

use std::collections::BTreeMap;
use types::numeric::Price;
use types::order::Side;

use super::price_level::PriceLevel;
use super::side::BookSide;

/// Ask (sell) side order book
///
/// The lowest ask is best. At each price level, orders are maintained in
/// FIFO order.
#[derive(Debug, Clone, Default)]
pub struct AskBook {
    /// Price levels sorted ascending (lowest price first)
    levels: BTreeMap<Price, PriceLevel>,
}

impl AskBook {
    /// Create a new empty ask book
    pub fn new() -> Self {
        Self::default()
    }
}

impl BookSide for AskBook {
    const SIDE: Side = Side::SELL;

    fn best_level(&self) -> Option<&PriceLevel> {
        self.levels.values().next()
    }

    fn best_level_mut(&mut self) -> Option<&mut PriceLevel> {
        self.levels.values_mut().next()
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
        Box::new(self.levels.values())
    }

    fn level_count(&self) -> usize {
        self.levels.len()
    }
}
