//! Trade execution logic
//!
//! Turns individual matches into trade records carrying a per-book
//! sequence number.

use types::ids::{InstrumentId, OrderId};
use types::numeric::{Price, Quantity};
use types::order::Side;
use types::trade::Trade;

/// Match executor for handling trade generation
#[derive(Debug, Clone)]
pub struct MatchExecutor {
    instrument: InstrumentId,
    sequence_counter: u64,
}

impl MatchExecutor {
    /// Create a new match executor with starting sequence number
    pub fn new(instrument: InstrumentId, starting_sequence: u64) -> Self {
        Self {
            instrument,
            sequence_counter: starting_sequence,
        }
    }

    /// Get next sequence number (monotonically increasing)
    fn next_sequence(&mut self) -> u64 {
        let seq = self.sequence_counter;
        self.sequence_counter += 1;
        seq
    }

    /// Sequence number the next trade will carry
    pub fn peek_sequence(&self) -> u64 {
        self.sequence_counter
    }

    /// Record a trade between a resting maker and an incoming taker
    ///
    /// `price` must be the maker's resting price.
    pub fn execute_trade(
        &mut self,
        maker_order_id: OrderId,
        taker_order_id: OrderId,
        taker_side: Side,
        price: Price,
        quantity: Quantity,
        timestamp: i64,
    ) -> Trade {
        debug_assert!(!quantity.is_zero(), "Zero-quantity trade");

        Trade::new(
            self.next_sequence(),
            self.instrument.clone(),
            maker_order_id,
            taker_order_id,
            taker_side,
            price,
            quantity,
            timestamp,
        )
    }
}
