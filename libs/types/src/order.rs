//! Order lifecycle types
//!
//! An order is created on Add, loses quantity only through fills, and ends
//! either fully filled or cancelled. Fill-or-kill orders that cannot be
//! satisfied never become orders in the book at all.

use crate::errors::EngineError;
use crate::ids::{InstrumentId, OrderId};
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    BUY,
    /// Sell order (ask)
    SELL,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::BUY => Side::SELL,
            Side::SELL => Side::BUY,
        }
    }
}

impl FromStr for Side {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BUY" => Ok(Side::BUY),
            "SELL" => Ok(Side::SELL),
            other => Err(EngineError::InvalidOrder(format!("unknown side: {other}"))),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::BUY => write!(f, "BUY"),
            Side::SELL => write!(f, "SELL"),
        }
    }
}

/// Time-in-force policy for orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// Good-Till-Cancel: rests until filled or explicitly cancelled
    #[serde(rename = "GTC", alias = "GOODTILLCANCEL")]
    GTC,
    /// Immediate-Or-Cancel: match what crosses now, discard the remainder
    #[serde(rename = "IOC", alias = "FILLANDKILL")]
    IOC,
    /// Fill-Or-Kill: full immediate match or reject with no effect
    #[serde(rename = "FOK", alias = "FILLORKILL")]
    FOK,
}

impl OrderType {
    /// Whether a remainder left after matching goes into the book
    pub fn rests(&self) -> bool {
        matches!(self, OrderType::GTC)
    }
}

impl FromStr for OrderType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GTC" | "GOODTILLCANCEL" => Ok(OrderType::GTC),
            "IOC" | "FILLANDKILL" => Ok(OrderType::IOC),
            "FOK" | "FILLORKILL" => Ok(OrderType::FOK),
            other => Err(EngineError::InvalidOrder(format!("unknown order type: {other}"))),
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderType::GTC => "GTC",
            OrderType::IOC => "IOC",
            OrderType::FOK => "FOK",
        };
        f.write_str(label)
    }
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason")]
pub enum OrderStatus {
    /// Accepted, not yet matched or rested
    #[serde(rename = "NEW")]
    New,

    /// In the book awaiting a counterparty (possibly after partial fills)
    #[serde(rename = "RESTING")]
    Resting,

    /// Completely matched (terminal)
    #[serde(rename = "FILLED")]
    Filled,

    /// Removed with quantity still open (terminal)
    #[serde(rename = "CANCELLED")]
    Cancelled(CancelReason),
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled(_))
    }
}

/// Why an order left the book with quantity still open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancelReason {
    /// Explicit cancel request
    UserRequested,
    /// IOC remainder discarded after matching
    UnfilledRemainder,
    /// Removed by a cancel-replace
    Replaced,
}

/// A limit order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub instrument: InstrumentId,
    pub side: Side,
    pub order_type: OrderType,
    pub price: Price,
    pub quantity: Quantity,
    pub remaining_quantity: Quantity,
    /// Arrival sequence within the book, the time-priority tie-break
    pub sequence: u64,
    pub status: OrderStatus,
}

impl Order {
    /// Create a new, unfilled order
    pub fn new(
        order_id: OrderId,
        instrument: InstrumentId,
        side: Side,
        order_type: OrderType,
        price: Price,
        quantity: Quantity,
        sequence: u64,
    ) -> Self {
        Self {
            order_id,
            instrument,
            side,
            order_type,
            price,
            quantity,
            remaining_quantity: quantity,
            sequence,
            status: OrderStatus::New,
        }
    }

    /// Quantity executed so far
    pub fn filled_quantity(&self) -> Quantity {
        self.quantity - self.remaining_quantity
    }

    /// Check if order is completely filled
    pub fn is_filled(&self) -> bool {
        self.remaining_quantity.is_zero()
    }

    /// Apply a fill
    ///
    /// # Panics
    /// Panics if the fill exceeds the remaining quantity
    pub fn fill(&mut self, quantity: Quantity) {
        assert!(
            quantity <= self.remaining_quantity,
            "Order {} cannot be filled for more than its remaining quantity",
            self.order_id
        );

        self.remaining_quantity -= quantity;
        if self.is_filled() {
            self.status = OrderStatus::Filled;
        }
    }

    /// Mark the order as resting in the book
    pub fn rest(&mut self) {
        debug_assert!(!self.is_filled(), "A filled order cannot rest");
        self.status = OrderStatus::Resting;
    }

    /// Cancel the order
    ///
    /// # Panics
    /// Panics if order is already in terminal state
    pub fn cancel(&mut self, reason: CancelReason) {
        assert!(!self.status.is_terminal(), "Cannot cancel terminal order");
        self.status = OrderStatus::Cancelled(reason);
    }
}
