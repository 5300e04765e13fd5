//! Trade execution records
//!
//! A trade is produced for every individual match between an incoming
//! (taker) order and a resting (maker) order.

use crate::ids::{InstrumentId, OrderId};
use crate::numeric::{Price, Quantity};
use crate::order::Side;
use serde::{Deserialize, Serialize};

/// A single fill between a maker and a taker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Per-instrument monotonic trade sequence, starting at 1
    pub sequence: u64,
    pub instrument: InstrumentId,

    // Order references
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,

    /// Side of the taker (the aggressor)
    pub taker_side: Side,
    /// Execution price, always the maker's resting price
    pub price: Price,
    pub quantity: Quantity,

    pub executed_at: i64, // Unix nanos
}

impl Trade {
    /// Create a new trade record
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: u64,
        instrument: InstrumentId,
        maker_order_id: OrderId,
        taker_order_id: OrderId,
        taker_side: Side,
        price: Price,
        quantity: Quantity,
        executed_at: i64,
    ) -> Self {
        Self {
            sequence,
            instrument,
            maker_order_id,
            taker_order_id,
            taker_side,
            price,
            quantity,
            executed_at,
        }
    }

    /// Order id on the buy side of this trade
    pub fn buy_order_id(&self) -> OrderId {
        match self.taker_side {
            Side::BUY => self.taker_order_id,
            Side::SELL => self.maker_order_id,
        }
    }

    /// Order id on the sell side of this trade
    pub fn sell_order_id(&self) -> OrderId {
        match self.taker_side {
            Side::BUY => self.maker_order_id,
            Side::SELL => self.taker_order_id,
        }
    }

    /// Notional value in ticks × lots
    pub fn notional(&self) -> u128 {
        self.price.ticks() as u128 * self.quantity.lots() as u128
    }
}
