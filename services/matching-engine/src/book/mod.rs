//! Order book infrastructure module
//!
//! Contains price levels, the bid and ask sides, and the per-instrument
//! order book that owns them.

pub mod price_level;
pub mod side;
pub mod bid_book;
pub mod ask_book;
pub mod order_book;
pub mod snapshot;

pub use price_level::PriceLevel;
pub use side::BookSide;
pub use bid_book::BidBook;
pub use ask_book::AskBook;
pub use order_book::{AddOutcome, OrderBook, OrderLocation};
pub use snapshot::{BookSnapshot, LevelSnapshot};
