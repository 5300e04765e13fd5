//! Error types for the matching engine
//!
//! Every failure the engine reports is one of these. None of them is
//! retried internally; the caller decides what to do.

use crate::ids::OrderId;
use crate::numeric::Quantity;
use thiserror::Error;

/// Top-level engine error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Caller error: bad price, quantity, order id or order type
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// A fill-or-kill order could not be filled in full right now
    #[error("Fill-or-kill order unfulfillable: requested {requested}, available {available}")]
    Unfulfillable {
        requested: Quantity,
        available: Quantity,
    },

    /// Cancel or modify of an id that is not resting in the book
    #[error("Order not found: {order_id}")]
    OrderNotFound { order_id: OrderId },
}

impl EngineError {
    /// Stable machine-readable code for the wire
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidOrder(_) => "INVALID_ORDER",
            EngineError::Unfulfillable { .. } => "UNFULFILLABLE",
            EngineError::OrderNotFound { .. } => "ORDER_NOT_FOUND",
        }
    }

    /// Whether this is an expected business outcome rather than a caller mistake
    pub fn is_business_rejection(&self) -> bool {
        matches!(self, EngineError::Unfulfillable { .. })
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
