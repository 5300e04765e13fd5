//! Immutable book views returned by Status

use serde::{Deserialize, Serialize};
use types::ids::InstrumentId;
use types::numeric::{Price, Quantity};

use super::price_level::PriceLevel;

/// Aggregate view of one price level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub price: Price,
    /// Sum of remaining quantity at this price
    pub quantity: Quantity,
    pub order_count: usize,
}

impl LevelSnapshot {
    pub fn from_level(level: &PriceLevel) -> Self {
        Self {
            price: level.price(),
            quantity: level.total_quantity(),
            order_count: level.order_count(),
        }
    }
}

/// Point-in-time view of both sides of a book, best level first
///
/// Two snapshots compare equal exactly when every level's price, quantity
/// and order count match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub instrument: InstrumentId,
    pub bids: Vec<LevelSnapshot>,
    pub asks: Vec<LevelSnapshot>,
    /// Number of resting orders across both sides
    pub resting_orders: usize,
}

impl BookSnapshot {
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|level| level.price)
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|level| level.price)
    }

    /// True if the best bid is at or above the best ask
    pub fn is_crossed(&self) -> bool {
        matches!((self.best_bid(), self.best_ask()), (Some(bid), Some(ask)) if bid >= ask)
    }
}
