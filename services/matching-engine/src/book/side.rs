//! The book-side seam
//!
//! Both halves of a book are price-keyed collections of FIFO levels; they
//! differ only in which end of the price range is "best". The matching loop
//! is written once against this trait.

use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};

use super::price_level::PriceLevel;
use super::snapshot::LevelSnapshot;

/// One side (bids or asks) of an order book
///
/// Implementations keep at most one level per price and never keep an empty
/// level once a removal path has run.
pub trait BookSide {
    /// Which side of the market this collection holds
    const SIDE: Side;

    /// Top-of-book level, or None when there is no resting liquidity
    fn best_level(&self) -> Option<&PriceLevel>;

    /// Mutable top-of-book level
    fn best_level_mut(&mut self) -> Option<&mut PriceLevel>;

    /// Fetch the level at `price`, creating it if absent
    fn level_at(&mut self, price: Price) -> &mut PriceLevel;

    /// Existing level at `price`
    fn level(&self, price: Price) -> Option<&PriceLevel>;

    fn level_mut(&mut self, price: Price) -> Option<&mut PriceLevel>;

    /// Drop the level at `price` if it holds no orders
    ///
    /// Returns true if a level was removed.
    fn remove_level_if_empty(&mut self, price: Price) -> bool;

    /// Levels in priority order (best first)
    fn levels(&self) -> Box<dyn Iterator<Item = &PriceLevel> + '_>;

    /// Number of price levels
    fn level_count(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.level_count() == 0
    }

    /// Append an order to the tail of its price level
    fn insert(&mut self, order: Order) {
        debug_assert_eq!(order.side, Self::SIDE, "Order inserted on the wrong side");
        self.level_at(order.price).insert(order);
    }

    /// Remove an order resting at `price`, dropping the level if it empties
    fn remove(&mut self, order_id: OrderId, price: Price) -> Option<Order> {
        let order = self.level_mut(price)?.remove(order_id)?;
        self.remove_level_if_empty(price);
        Some(order)
    }

    /// Best price and the aggregate quantity there
    fn best(&self) -> Option<(Price, Quantity)> {
        self.best_level()
            .map(|level| (level.price(), level.total_quantity()))
    }

    fn best_price(&self) -> Option<Price> {
        self.best_level().map(PriceLevel::price)
    }

    /// Aggregated view of the top `depth` levels
    fn depth_snapshot(&self, depth: usize) -> Vec<LevelSnapshot> {
        self.levels()
            .take(depth)
            .map(LevelSnapshot::from_level)
            .collect()
    }

    /// Total resting quantity across all levels
    fn total_quantity(&self) -> Quantity {
        self.levels()
            .fold(Quantity::zero(), |acc, level| acc.saturating_add(level.total_quantity()))
    }
}
