//! Types library for the matching engine
//!
//! Shared vocabulary between the matching engine and anything that talks to
//! it: identifiers, tick-denominated prices and quantities, orders, trades
//! and the error taxonomy.
//!
//! # Modules
//! - `ids`: Identifiers (OrderId, InstrumentId)
//! - `numeric`: Integer tick types (Price, Quantity)
//! - `order`: Order lifecycle types
//! - `trade`: Trade execution records
//! - `errors`: Error taxonomy

// Public modules
pub mod ids;
pub mod numeric;
pub mod order;
pub mod trade;
pub mod errors;

/// Current wall-clock time as Unix nanoseconds.
///
/// Used only for stamping trades. Never used to derive identifiers.
pub fn now_nanos() -> i64 {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
}
