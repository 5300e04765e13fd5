//! Order book for a single instrument
//!
//! Owns both sides, the id index and the trade executor. Every public
//! mutation runs the full matching loop before returning, so the book is
//! never crossed at rest.
//!
//! The book itself is not synchronized; callers serialize access (the
//! engine wraps each book in its own mutex).

use std::collections::HashMap;

use tracing::{debug, info};
use types::errors::{EngineError, EngineResult};
use types::ids::{InstrumentId, OrderId};
use types::numeric::{Price, Quantity};
use types::order::{CancelReason, Order, OrderType, Side};
use types::trade::Trade;

use super::ask_book::AskBook;
use super::bid_book::BidBook;
use super::side::BookSide;
use super::snapshot::BookSnapshot;
use crate::matching::{crossing, liquidity, MatchExecutor};

/// Where a resting order lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLocation {
    pub side: Side,
    pub price: Price,
}

/// The fields of an order before it has an id or a sequence number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrder {
    pub side: Side,
    pub order_type: OrderType,
    pub price: Price,
    pub quantity: Quantity,
}

/// Result of an Add or Modify
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    /// The order in its final state for this call: Resting, Filled, or
    /// Cancelled (IOC remainder)
    pub order: Order,
    /// Fills in execution order
    pub trades: Vec<Trade>,
}

/// Order book for a single instrument
#[derive(Debug, Clone)]
pub struct OrderBook {
    instrument: InstrumentId,
    bids: BidBook,
    asks: AskBook,
    /// Resting order id -> side and price, for cancel-by-id
    index: HashMap<OrderId, OrderLocation>,
    /// Trade executor with sequence generation
    executor: MatchExecutor,
    /// Arrival sequence for time priority
    next_sequence: u64,
}

impl OrderBook {
    pub fn new(instrument: InstrumentId) -> Self {
        Self {
            executor: MatchExecutor::new(instrument.clone(), 1),
            instrument,
            bids: BidBook::new(),
            asks: AskBook::new(),
            index: HashMap::new(),
            next_sequence: 1,
        }
    }

    pub fn instrument(&self) -> &InstrumentId {
        &self.instrument
    }

    /// Add an order, matching it against the opposite side first
    ///
    /// GTC remainders rest at their limit price; IOC remainders are
    /// discarded. A FOK order that cannot be filled in full fails with
    /// `Unfulfillable` and leaves the book untouched.
    pub fn add(&mut self, order_id: OrderId, request: NewOrder, timestamp: i64) -> EngineResult<AddOutcome> {
        validate_order_id(order_id)?;
        validate_new_order(&request)?;
        if self.index.contains_key(&order_id) {
            return Err(EngineError::InvalidOrder(format!(
                "order {order_id} is already resting"
            )));
        }

        if request.order_type == OrderType::FOK {
            self.ensure_fillable(&request)?;
        }

        Ok(self.execute(order_id, request, timestamp))
    }

    /// Cancel a resting order
    ///
    /// Returns the order as it was removed. A second cancel of the same id
    /// fails with `OrderNotFound`.
    pub fn cancel(&mut self, order_id: OrderId) -> EngineResult<Order> {
        validate_order_id(order_id)?;
        let mut order = self.unlink(order_id)?;
        order.cancel(CancelReason::UserRequested);

        debug!(
            instrument = %self.instrument,
            order_id = %order_id,
            side = %order.side,
            price = %order.price,
            remaining = %order.remaining_quantity,
            "Order cancelled"
        );
        Ok(order)
    }

    /// Cancel-replace a resting order
    ///
    /// The order keeps its id and order type but takes the new side, price
    /// and quantity, a fresh sequence number (it loses time priority) and
    /// goes through matching again. On error the book is unchanged.
    pub fn modify(
        &mut self,
        order_id: OrderId,
        side: Side,
        price: Price,
        quantity: Quantity,
        timestamp: i64,
    ) -> EngineResult<AddOutcome> {
        validate_order_id(order_id)?;
        let order_type = self
            .order(order_id)
            .map(|order| order.order_type)
            .ok_or(EngineError::OrderNotFound { order_id })?;
        let request = NewOrder {
            side,
            order_type,
            price,
            quantity,
        };
        validate_new_order(&request)?;

        let mut original = self.unlink(order_id)?;
        original.cancel(CancelReason::Replaced);
        debug!(
            instrument = %self.instrument,
            order_id = %order_id,
            old_price = %original.price,
            new_price = %price,
            "Order replaced"
        );

        Ok(self.execute(order_id, request, timestamp))
    }

    /// Aggregated view of both sides, limited to `depth` levels per side
    pub fn snapshot(&self, depth: Option<usize>) -> BookSnapshot {
        let depth = depth.unwrap_or(usize::MAX);
        BookSnapshot {
            instrument: self.instrument.clone(),
            bids: self.bids.depth_snapshot(depth),
            asks: self.asks.depth_snapshot(depth),
            resting_orders: self.index.len(),
        }
    }

    /// Look up a resting order
    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        let location = self.index.get(&order_id)?;
        let level = match location.side {
            Side::BUY => self.bids.level(location.price),
            Side::SELL => self.asks.level(location.price),
        };
        level.and_then(|level| level.get(order_id))
    }

    /// Number of resting orders
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn best_bid(&self) -> Option<(Price, Quantity)> {
        self.bids.best()
    }

    pub fn best_ask(&self) -> Option<(Price, Quantity)> {
        self.asks.best()
    }

    /// Best ask minus best bid, when both sides are populated
    pub fn spread(&self) -> Option<u64> {
        let bid = self.bids.best_price()?;
        let ask = self.asks.best_price()?;
        Some(ask.ticks().saturating_sub(bid.ticks()))
    }

    /// Sequence number the next trade on this book will carry
    pub fn next_trade_sequence(&self) -> u64 {
        self.executor.peek_sequence()
    }

    /// Verify the structural invariants
    ///
    /// Checks that the book is uncrossed, no level is empty, level totals
    /// equal the sum of their orders, every order sits on the right side at
    /// the right price, and the index matches the levels exactly.
    pub fn check_integrity(&self) -> Result<(), String> {
        if let (Some(bid), Some(ask)) = (self.bids.best_price(), self.asks.best_price()) {
            if crossing::can_match(bid, ask) {
                return Err(format!("book crossed: bid {bid} >= ask {ask}"));
            }
        }

        let mut seen = 0usize;
        check_side(&self.bids, &self.index, &mut seen)?;
        check_side(&self.asks, &self.index, &mut seen)?;

        if seen != self.index.len() {
            return Err(format!(
                "index holds {} orders but levels hold {seen}",
                self.index.len()
            ));
        }
        Ok(())
    }

    /// Reject a FOK order whose full quantity is not available right now
    fn ensure_fillable(&self, request: &NewOrder) -> EngineResult<()> {
        let available = match request.side {
            Side::BUY => liquidity::crossing_liquidity(&self.asks, Side::BUY, request.price, request.quantity),
            Side::SELL => liquidity::crossing_liquidity(&self.bids, Side::SELL, request.price, request.quantity),
        };

        if available < request.quantity {
            info!(
                instrument = %self.instrument,
                side = %request.side,
                price = %request.price,
                requested = %request.quantity,
                available = %available,
                "Fill-or-kill order rejected"
            );
            return Err(EngineError::Unfulfillable {
                requested: request.quantity,
                available,
            });
        }
        Ok(())
    }

    /// Match a validated order and dispose of any remainder
    fn execute(&mut self, order_id: OrderId, request: NewOrder, timestamp: i64) -> AddOutcome {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let mut order = Order::new(
            order_id,
            self.instrument.clone(),
            request.side,
            request.order_type,
            request.price,
            request.quantity,
            sequence,
        );

        let trades = match order.side {
            Side::BUY => sweep(&mut self.asks, &mut self.index, &mut self.executor, &mut order, timestamp),
            Side::SELL => sweep(&mut self.bids, &mut self.index, &mut self.executor, &mut order, timestamp),
        };

        if order.is_filled() {
            debug!(
                instrument = %self.instrument,
                order_id = %order_id,
                fills = trades.len(),
                "Order filled on arrival"
            );
        } else if order.order_type.rests() {
            order.rest();
            match order.side {
                Side::BUY => self.bids.insert(order.clone()),
                Side::SELL => self.asks.insert(order.clone()),
            }
            self.index.insert(
                order_id,
                OrderLocation {
                    side: order.side,
                    price: order.price,
                },
            );
            debug!(
                instrument = %self.instrument,
                order_id = %order_id,
                side = %order.side,
                price = %order.price,
                remaining = %order.remaining_quantity,
                fills = trades.len(),
                "Order resting"
            );
        } else {
            assert!(
                order.order_type != OrderType::FOK,
                "Fill-or-kill order {order_id} left unfilled after feasibility check"
            );
            order.cancel(CancelReason::UnfilledRemainder);
            debug!(
                instrument = %self.instrument,
                order_id = %order_id,
                unfilled = %order.remaining_quantity,
                fills = trades.len(),
                "Immediate-or-cancel remainder discarded"
            );
        }

        AddOutcome { order, trades }
    }

    /// Remove a resting order from the index and its level
    ///
    /// # Panics
    /// Panics if the index points at an order that is not in the book
    fn unlink(&mut self, order_id: OrderId) -> EngineResult<Order> {
        let location = self
            .index
            .remove(&order_id)
            .ok_or(EngineError::OrderNotFound { order_id })?;

        let removed = match location.side {
            Side::BUY => self.bids.remove(order_id, location.price),
            Side::SELL => self.asks.remove(order_id, location.price),
        };

        Ok(removed.unwrap_or_else(|| {
            panic!(
                "Order index corrupted: {order_id} indexed at {:?} {} but not found there",
                location.side, location.price
            )
        }))
    }
}

/// Match `taker` against the best levels of `opposite` while prices cross
///
/// Each step fills the oldest order at the best price for
/// `min(taker remaining, maker remaining)` at the maker's price. Filled
/// makers leave their level and the index; emptied levels leave the side.
fn sweep<S: BookSide>(
    opposite: &mut S,
    index: &mut HashMap<OrderId, OrderLocation>,
    executor: &mut MatchExecutor,
    taker: &mut Order,
    timestamp: i64,
) -> Vec<Trade> {
    let mut trades = Vec::new();

    while !taker.is_filled() {
        let Some(level) = opposite.best_level_mut() else {
            break;
        };
        let level_price = level.price();
        if !crossing::incoming_can_match(taker.side, taker.price, level_price) {
            break;
        }

        let (maker_id, maker_remaining) = level
            .peek_front()
            .map(|maker| (maker.order_id, maker.remaining_quantity))
            .unwrap_or_else(|| panic!("Empty level {level_price} left in book"));
        let quantity = taker.remaining_quantity.min(maker_remaining);

        taker.fill(quantity);
        if let Some(filled) = level.fill_front(quantity) {
            index.remove(&filled.order_id);
        }
        opposite.remove_level_if_empty(level_price);

        let trade = executor.execute_trade(maker_id, taker.order_id, taker.side, level_price, quantity, timestamp);
        debug!(
            instrument = %trade.instrument,
            sequence = trade.sequence,
            maker = %maker_id,
            taker = %taker.order_id,
            buy = %trade.buy_order_id(),
            sell = %trade.sell_order_id(),
            price = %level_price,
            quantity = %quantity,
            notional = %trade.notional(),
            "Trade executed"
        );
        trades.push(trade);
    }

    trades
}

fn check_side<S: BookSide>(
    side: &S,
    index: &HashMap<OrderId, OrderLocation>,
    seen: &mut usize,
) -> Result<(), String> {
    for level in side.levels() {
        if level.is_empty() {
            return Err(format!("empty level {} on {:?}", level.price(), S::SIDE));
        }

        let mut total = Quantity::zero();
        let mut last_sequence = 0;
        for order in level.iter() {
            if order.side != S::SIDE || order.price != level.price() {
                return Err(format!("order {} misplaced", order.order_id));
            }
            if order.remaining_quantity.is_zero() {
                return Err(format!("order {} resting with zero quantity", order.order_id));
            }
            if order.sequence <= last_sequence {
                return Err(format!("order {} out of time priority", order.order_id));
            }
            let expected = OrderLocation {
                side: S::SIDE,
                price: level.price(),
            };
            if index.get(&order.order_id) != Some(&expected) {
                return Err(format!("order {} missing from index", order.order_id));
            }
            last_sequence = order.sequence;
            total = total
                .checked_add(order.remaining_quantity)
                .ok_or_else(|| format!("level {} total overflows", level.price()))?;
            *seen += 1;
        }

        if total != level.total_quantity() {
            return Err(format!(
                "level {} total {} != sum of orders {total}",
                level.price(),
                level.total_quantity()
            ));
        }
    }
    Ok(())
}

fn validate_order_id(order_id: OrderId) -> EngineResult<()> {
    if order_id.is_none() {
        return Err(EngineError::InvalidOrder("order id must be non-zero".to_string()));
    }
    Ok(())
}

fn validate_new_order(request: &NewOrder) -> EngineResult<()> {
    if request.price.is_zero() {
        return Err(EngineError::InvalidOrder("price must be positive".to_string()));
    }
    if request.price > Price::MAX {
        return Err(EngineError::InvalidOrder(format!(
            "price {} exceeds maximum {}",
            request.price,
            Price::MAX
        )));
    }
    if request.quantity.is_zero() {
        return Err(EngineError::InvalidOrder("quantity must be positive".to_string()));
    }
    if request.quantity > Quantity::MAX {
        return Err(EngineError::InvalidOrder(format!(
            "quantity {} exceeds maximum {}",
            request.quantity,
            Quantity::MAX
        )));
    }
    Ok(())
}
