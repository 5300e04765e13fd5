//! Matching engine core
//!
//! The single entry point the gateway talks to. Each operation resolves
//! its book through the registry and runs under that book's lock from
//! start to finish, so operations on one instrument are serialized while
//! different instruments proceed in parallel. No operation ever touches
//! two books.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use types::errors::{EngineError, EngineResult};
use types::ids::{InstrumentId, OrderId};
use types::numeric::{Price, Quantity};
use types::order::{OrderStatus, OrderType, Side};
use types::trade::Trade;

use crate::allocator::OrderIdAllocator;
use crate::book::order_book::NewOrder;
use crate::book::{AddOutcome, BookSnapshot};
use crate::config::{ConfigError, EngineConfig};
use crate::registry::BookRegistry;

/// AddOrder request as decoded from the gateway
///
/// Price and quantity are signed so that non-positive values reach the
/// engine and are rejected as `InvalidOrder` rather than failing to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOrderRequest {
    #[serde(alias = "name")]
    pub instrument: String,
    pub side: Side,
    #[serde(alias = "type", alias = "tradetype")]
    pub order_type: OrderType,
    pub price: i64,
    pub quantity: i64,
}

/// CancelOrder request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOrderRequest {
    #[serde(alias = "name", alias = "book")]
    pub instrument: String,
    #[serde(alias = "orderId")]
    pub order_id: u64,
}

/// ModifyOrder (cancel-replace) request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyOrderRequest {
    #[serde(alias = "name")]
    pub instrument: String,
    #[serde(alias = "orderId")]
    pub order_id: u64,
    pub side: Side,
    pub price: i64,
    pub quantity: i64,
}

/// Result of AddOrder or ModifyOrder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOrderResponse {
    /// Id to use for a later Cancel or Modify
    pub order_id: OrderId,
    pub instrument: InstrumentId,
    pub side: Side,
    pub order_type: OrderType,
    pub price: Price,
    /// Resting, Filled, or Cancelled for an IOC remainder
    pub status: OrderStatus,
    pub filled_quantity: Quantity,
    /// Quantity left in the book (0 unless resting)
    pub resting_quantity: Quantity,
    pub trades: Vec<Trade>,
}

impl From<AddOutcome> for AddOrderResponse {
    fn from(outcome: AddOutcome) -> Self {
        let order = outcome.order;
        let resting_quantity = if order.status == OrderStatus::Resting {
            order.remaining_quantity
        } else {
            Quantity::zero()
        };

        Self {
            order_id: order.order_id,
            filled_quantity: order.filled_quantity(),
            instrument: order.instrument,
            side: order.side,
            order_type: order.order_type,
            price: order.price,
            status: order.status,
            resting_quantity,
            trades: outcome.trades,
        }
    }
}

/// Acknowledgment of a successful cancel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOrderResponse {
    pub order_id: OrderId,
    pub instrument: InstrumentId,
    /// Quantity that was still open when the order was removed
    pub cancelled_quantity: Quantity,
}

/// Main matching engine
#[derive(Debug)]
pub struct MatchingEngine {
    allocator: OrderIdAllocator,
    registry: BookRegistry,
    config: EngineConfig,
}

impl MatchingEngine {
    /// Create an engine from a validated configuration
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            allocator: OrderIdAllocator::starting_at(config.first_order_id),
            registry: BookRegistry::new(),
            config,
        })
    }

    /// Create an engine with default configuration
    pub fn with_defaults() -> Self {
        Self {
            allocator: OrderIdAllocator::default(),
            registry: BookRegistry::new(),
            config: EngineConfig::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &BookRegistry {
        &self.registry
    }

    /// Submit an order
    ///
    /// Validates the request, assigns an id and runs the matching loop on
    /// the instrument's book, creating the book on first use.
    pub fn add_order(&self, request: AddOrderRequest) -> EngineResult<AddOrderResponse> {
        let price = parse_price(request.price)?;
        let quantity = self.parse_quantity(request.quantity)?;

        let new_order = NewOrder {
            side: request.side,
            order_type: request.order_type,
            price,
            quantity,
        };

        let handle = self.registry.get_or_create(&request.instrument);
        let result = {
            let mut book = handle.lock();
            // Allocated under the book lock so ids on one book follow arrival order
            let order_id = self.allocator.next();
            book.add(order_id, new_order, types::now_nanos())
        };
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) if err.is_business_rejection() => {
                debug!(instrument = %request.instrument, error = %err, "Order rejected");
                return Err(err);
            }
            Err(err) => {
                warn!(instrument = %request.instrument, error = %err, "Order refused");
                return Err(err);
            }
        };

        debug!(
            instrument = %request.instrument,
            order_id = %outcome.order.order_id,
            order_type = %request.order_type,
            trades = outcome.trades.len(),
            "Order processed"
        );
        Ok(outcome.into())
    }

    /// Cancel a resting order
    pub fn cancel_order(&self, request: CancelOrderRequest) -> EngineResult<CancelOrderResponse> {
        let order_id = parse_order_id(request.order_id)?;

        let Some(handle) = self.registry.get(&request.instrument) else {
            warn!(instrument = %request.instrument, order_id = %order_id, "Cancel for unknown instrument");
            return Err(EngineError::OrderNotFound { order_id });
        };

        let result = handle.lock().cancel(order_id);
        match result {
            Ok(order) => Ok(CancelOrderResponse {
                order_id,
                instrument: order.instrument,
                cancelled_quantity: order.remaining_quantity,
            }),
            Err(err) => {
                warn!(instrument = %request.instrument, order_id = %order_id, error = %err, "Cancel rejected");
                Err(err)
            }
        }
    }

    /// Cancel-replace a resting order, keeping its id
    pub fn modify_order(&self, request: ModifyOrderRequest) -> EngineResult<AddOrderResponse> {
        let order_id = parse_order_id(request.order_id)?;
        let price = parse_price(request.price)?;
        let quantity = self.parse_quantity(request.quantity)?;

        let handle = self
            .registry
            .get(&request.instrument)
            .ok_or(EngineError::OrderNotFound { order_id })?;

        let outcome = handle
            .lock()
            .modify(order_id, request.side, price, quantity, types::now_nanos())?;
        Ok(outcome.into())
    }

    /// Snapshot of an instrument's book
    ///
    /// An instrument with no orders yields an empty snapshot, not an error.
    pub fn get_status(&self, instrument: &str) -> BookSnapshot {
        let handle = self.registry.get_or_create(instrument);
        let snapshot = handle.lock().snapshot(self.config.status_depth);
        snapshot
    }

    /// Known instrument names, sorted
    pub fn instruments(&self) -> Vec<String> {
        self.registry.instruments()
    }

    fn parse_quantity(&self, raw: i64) -> EngineResult<Quantity> {
        let quantity = Quantity::try_from_i64(raw)
            .ok_or_else(|| EngineError::InvalidOrder(format!("quantity must be positive, got {raw}")))?;

        let max = self.config.max_order_quantity.unwrap_or(Quantity::MAX.lots());
        if quantity.lots() > max {
            return Err(EngineError::InvalidOrder(format!(
                "quantity {quantity} exceeds maximum {max}"
            )));
        }
        Ok(quantity)
    }
}

fn parse_price(raw: i64) -> EngineResult<Price> {
    let price = Price::try_from_i64(raw)
        .ok_or_else(|| EngineError::InvalidOrder(format!("price must be positive, got {raw}")))?;

    if price > Price::MAX {
        return Err(EngineError::InvalidOrder(format!(
            "price {price} exceeds maximum {}",
            Price::MAX
        )));
    }
    Ok(price)
}

fn parse_order_id(raw: u64) -> EngineResult<OrderId> {
    OrderId::try_new(raw).ok_or_else(|| EngineError::InvalidOrder("order id must be non-zero".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::LevelSnapshot;

    fn add(instrument: &str, side: Side, order_type: OrderType, price: i64, quantity: i64) -> AddOrderRequest {
        AddOrderRequest {
            instrument: instrument.to_string(),
            side,
            order_type,
            price,
            quantity,
        }
    }

    fn cancel(instrument: &str, order_id: OrderId) -> CancelOrderRequest {
        CancelOrderRequest {
            instrument: instrument.to_string(),
            order_id: order_id.as_u64(),
        }
    }

    #[test]
    fn test_engine_resting_order() {
        let engine = MatchingEngine::with_defaults();
        let response = engine.add_order(add("X", Side::BUY, OrderType::GTC, 100, 10)).unwrap();

        assert_eq!(response.order_id, OrderId::new(1));
        assert_eq!(response.status, OrderStatus::Resting);
        assert_eq!(response.resting_quantity, Quantity::from_u64(10));
        assert!(response.trades.is_empty());
    }

    #[test]
    fn test_engine_partial_match() {
        let engine = MatchingEngine::with_defaults();
        let buy = engine.add_order(add("X", Side::BUY, OrderType::GTC, 100, 10)).unwrap();
        let sell = engine.add_order(add("X", Side::SELL, OrderType::GTC, 100, 4)).unwrap();

        assert_eq!(sell.status, OrderStatus::Filled);
        assert_eq!(sell.filled_quantity, Quantity::from_u64(4));
        assert_eq!(sell.resting_quantity, Quantity::zero());
        assert_eq!(sell.trades.len(), 1);
        assert_eq!(sell.trades[0].maker_order_id, buy.order_id);

        let status = engine.get_status("X");
        assert_eq!(
            status.bids,
            vec![LevelSnapshot {
                price: Price::from_u64(100),
                quantity: Quantity::from_u64(6),
                order_count: 1,
            }]
        );
        assert!(status.asks.is_empty());
    }

    #[test]
    fn test_engine_no_cross() {
        let engine = MatchingEngine::with_defaults();
        engine.add_order(add("X", Side::SELL, OrderType::GTC, 51, 1)).unwrap();
        let buy = engine.add_order(add("X", Side::BUY, OrderType::GTC, 50, 1)).unwrap();

        assert_eq!(buy.status, OrderStatus::Resting);
        assert!(buy.trades.is_empty());
    }

    #[test]
    fn test_negative_values_are_invalid() {
        let engine = MatchingEngine::with_defaults();
        assert!(matches!(
            engine.add_order(add("X", Side::BUY, OrderType::GTC, -1, 10)),
            Err(EngineError::InvalidOrder(_))
        ));
        assert!(matches!(
            engine.add_order(add("X", Side::BUY, OrderType::GTC, 10, -3)),
            Err(EngineError::InvalidOrder(_))
        ));
        // Rejected requests never touch the registry
        assert!(engine.instruments().is_empty());
    }

    #[test]
    fn test_cancel_zero_id_invalid() {
        let engine = MatchingEngine::with_defaults();
        let result = engine.cancel_order(CancelOrderRequest {
            instrument: "X".to_string(),
            order_id: 0,
        });
        assert!(matches!(result, Err(EngineError::InvalidOrder(_))));
    }

    #[test]
    fn test_cancel_then_status_empty() {
        let engine = MatchingEngine::with_defaults();
        let buy = engine.add_order(add("X", Side::BUY, OrderType::GTC, 10, 5)).unwrap();

        let ack = engine.cancel_order(cancel("X", buy.order_id)).unwrap();
        assert_eq!(ack.cancelled_quantity, Quantity::from_u64(5));
        assert!(engine.get_status("X").is_empty());

        assert_eq!(
            engine.cancel_order(cancel("X", buy.order_id)),
            Err(EngineError::OrderNotFound { order_id: buy.order_id })
        );
    }

    #[test]
    fn test_cancel_on_other_instrument_not_found() {
        let engine = MatchingEngine::with_defaults();
        let buy = engine.add_order(add("X", Side::BUY, OrderType::GTC, 10, 5)).unwrap();
        engine.get_status("Y");

        assert!(matches!(
            engine.cancel_order(cancel("Y", buy.order_id)),
            Err(EngineError::OrderNotFound { .. })
        ));
        assert!(matches!(
            engine.cancel_order(cancel("UNKNOWN", buy.order_id)),
            Err(EngineError::OrderNotFound { .. })
        ));
        assert_eq!(engine.get_status("X").resting_orders, 1);
    }

    #[test]
    fn test_status_creates_empty_book() {
        let engine = MatchingEngine::with_defaults();
        let status = engine.get_status("NEW");
        assert!(status.is_empty());
        assert_eq!(status.instrument, InstrumentId::new("NEW"));
        assert_eq!(engine.instruments(), vec!["NEW"]);
    }

    #[test]
    fn test_ids_increase_across_instruments() {
        let engine = MatchingEngine::with_defaults();
        let a = engine.add_order(add("A", Side::BUY, OrderType::GTC, 10, 1)).unwrap();
        let b = engine.add_order(add("B", Side::BUY, OrderType::GTC, 10, 1)).unwrap();
        assert!(a.order_id < b.order_id);
    }

    #[test]
    fn test_config_first_order_id_and_depth() {
        let engine = MatchingEngine::new(EngineConfig {
            first_order_id: 500,
            status_depth: Some(1),
            max_order_quantity: Some(100),
        })
        .unwrap();

        let first = engine.add_order(add("X", Side::BUY, OrderType::GTC, 10, 1)).unwrap();
        engine.add_order(add("X", Side::BUY, OrderType::GTC, 9, 1)).unwrap();
        assert_eq!(first.order_id, OrderId::new(500));
        assert_eq!(engine.get_status("X").bids.len(), 1);

        assert!(matches!(
            engine.add_order(add("X", Side::BUY, OrderType::GTC, 10, 101)),
            Err(EngineError::InvalidOrder(_))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig {
            first_order_id: 0,
            ..EngineConfig::default()
        };
        assert!(MatchingEngine::new(config).is_err());
    }

    #[test]
    fn test_modify_keeps_id() {
        let engine = MatchingEngine::with_defaults();
        let buy = engine.add_order(add("X", Side::BUY, OrderType::GTC, 10, 5)).unwrap();

        let modified = engine
            .modify_order(ModifyOrderRequest {
                instrument: "X".to_string(),
                order_id: buy.order_id.as_u64(),
                side: Side::BUY,
                price: 12,
                quantity: 3,
            })
            .unwrap();
        assert_eq!(modified.order_id, buy.order_id);
        assert_eq!(modified.resting_quantity, Quantity::from_u64(3));
        assert_eq!(engine.get_status("X").best_bid(), Some(Price::from_u64(12)));
    }

    #[test]
    fn test_oversized_quantity_rejected_without_touching_book() {
        let engine = MatchingEngine::with_defaults();
        for _ in 0..3 {
            let result = engine.add_order(add("X", Side::BUY, OrderType::GTC, 100, i64::MAX));
            assert!(matches!(result, Err(EngineError::InvalidOrder(_))));
        }

        let status = engine.get_status("X");
        assert!(status.is_empty());
        assert_eq!(status.resting_orders, 0);
        let handle = engine.registry().get("X").unwrap();
        assert!(handle.lock().check_integrity().is_ok());
    }

    #[test]
    fn test_oversized_price_rejected() {
        let engine = MatchingEngine::with_defaults();
        let result = engine.add_order(add("X", Side::SELL, OrderType::GTC, i64::MAX, 1));
        assert!(matches!(result, Err(EngineError::InvalidOrder(_))));

        let buy = engine.add_order(add("X", Side::BUY, OrderType::GTC, 10, 5)).unwrap();
        let result = engine.modify_order(ModifyOrderRequest {
            instrument: "X".to_string(),
            order_id: buy.order_id.as_u64(),
            side: Side::BUY,
            price: Price::MAX.ticks() as i64 + 1,
            quantity: 5,
        });
        assert!(matches!(result, Err(EngineError::InvalidOrder(_))));
        assert_eq!(engine.get_status("X").best_bid(), Some(Price::from_u64(10)));
    }

    #[test]
    fn test_quantity_at_cap_aggregates_exactly() {
        let engine = MatchingEngine::with_defaults();
        let max = Quantity::MAX.lots();
        for _ in 0..3 {
            engine
                .add_order(add("X", Side::BUY, OrderType::GTC, 100, max as i64))
                .unwrap();
        }

        let status = engine.get_status("X");
        assert_eq!(status.bids, vec![LevelSnapshot {
            price: Price::from_u64(100),
            quantity: Quantity::from_u64(3 * max),
            order_count: 3,
        }]);

        let sell = engine
            .add_order(add("X", Side::SELL, OrderType::IOC, 100, max as i64))
            .unwrap();
        assert_eq!(sell.filled_quantity, Quantity::MAX);
        assert_eq!(engine.get_status("X").bids[0].quantity, Quantity::from_u64(2 * max));
    }

    #[test]
    fn test_fok_rejection_is_typed() {
        let engine = MatchingEngine::with_defaults();
        engine.add_order(add("X", Side::SELL, OrderType::GTC, 50, 15)).unwrap();
        let before = engine.get_status("X");

        let result = engine.add_order(add("X", Side::BUY, OrderType::FOK, 50, 20));
        assert_eq!(
            result,
            Err(EngineError::Unfulfillable {
                requested: Quantity::from_u64(20),
                available: Quantity::from_u64(15),
            })
        );
        assert_eq!(engine.get_status("X"), before);
    }
}
