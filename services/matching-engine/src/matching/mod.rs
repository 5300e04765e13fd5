//! Matching logic module
//!
//! Price-time priority building blocks: the crossing rule, the fill-or-kill
//! liquidity dry-run and trade record generation.

pub mod crossing;
pub mod liquidity;
pub mod executor;

pub use crossing::{can_match, incoming_can_match};
pub use executor::MatchExecutor;
pub use liquidity::crossing_liquidity;
