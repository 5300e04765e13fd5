//! Matching Engine Service
//!
//! In-memory limit order matching engine with strict price-time priority.
//! One order book per instrument, created on first reference; operations
//! on a book are serialized, books are independent of each other.
//!
//! **Order types:**
//! - GTC: rests until filled or cancelled
//! - IOC: matches what crosses now, discards the rest
//! - FOK: fills in full immediately or is rejected with no effect
//!
//! **Key Invariants:**
//! - Price-time priority strictly enforced
//! - Trades execute at the resting order's price
//! - The book is never crossed at rest
//! - No empty price level survives a removal

pub mod allocator;
pub mod book;
pub mod config;
pub mod engine;
pub mod matching;
pub mod protocol;
pub mod registry;

pub use allocator::OrderIdAllocator;
pub use book::{BookSnapshot, LevelSnapshot, OrderBook};
pub use config::{ConfigError, EngineConfig};
pub use engine::{
    AddOrderRequest, AddOrderResponse, CancelOrderRequest, CancelOrderResponse, MatchingEngine,
    ModifyOrderRequest,
};
pub use registry::{BookHandle, BookRegistry};
