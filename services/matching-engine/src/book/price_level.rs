//! Price level implementation with FIFO queue
//!
//! A price level contains all resting orders at one exact price.
//! Orders are kept in arrival order to enforce time priority: the front of
//! the queue always matches first.

use std::collections::VecDeque;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::Order;

/// A price level containing orders at a specific price
///
/// `total_quantity` is always the sum of the members' remaining quantities.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    price: Price,
    /// Queue of orders at this price level (FIFO order)
    orders: VecDeque<Order>,
    /// Total remaining quantity available at this level
    total_quantity: Quantity,
}

impl PriceLevel {
    /// Create a new empty price level
    pub fn new(price: Price) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
            total_quantity: Quantity::zero(),
        }
    }

    pub fn price(&self) -> Price {
        self.price
    }

    /// Insert an order at the back of the queue (time priority)
    pub fn insert(&mut self, order: Order) {
        debug_assert_eq!(order.price, self.price, "Order inserted at the wrong level");
        debug_assert!(
            self.orders.back().map_or(true, |last| last.sequence < order.sequence),
            "Orders must arrive in sequence order"
        );
        self.total_quantity += order.remaining_quantity;
        self.orders.push_back(order);
    }

    /// Remove an order from the queue by OrderId
    ///
    /// Linear in the depth of the level. Returns the removed order, or None
    /// if it is not at this level.
    pub fn remove(&mut self, order_id: OrderId) -> Option<Order> {
        let position = self.orders.iter().position(|order| order.order_id == order_id)?;
        let order = self.orders.remove(position)?;
        self.total_quantity -= order.remaining_quantity;
        Some(order)
    }

    /// Peek at the oldest order without removing it
    pub fn peek_front(&self) -> Option<&Order> {
        self.orders.front()
    }

    /// Remove and return the oldest order
    pub fn pop_front(&mut self) -> Option<Order> {
        let order = self.orders.pop_front()?;
        self.total_quantity -= order.remaining_quantity;
        Some(order)
    }

    /// Fill the oldest order by `quantity`
    ///
    /// If that completes the order it is popped and returned; otherwise it
    /// stays at the front with reduced quantity and None is returned.
    ///
    /// # Panics
    /// Panics if the level is empty or the fill exceeds the front order.
    pub fn fill_front(&mut self, quantity: Quantity) -> Option<Order> {
        let front = self
            .orders
            .front_mut()
            .unwrap_or_else(|| panic!("fill_front on empty level {}", self.price));
        front.fill(quantity);
        self.total_quantity -= quantity;

        if front.is_filled() {
            self.orders.pop_front()
        } else {
            None
        }
    }

    /// Look up a member order
    pub fn get(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| order.order_id == order_id)
    }

    /// Iterate orders in time priority
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    /// Check if the price level is empty
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Get the total quantity at this price level
    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    /// Get the number of orders at this level
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}
