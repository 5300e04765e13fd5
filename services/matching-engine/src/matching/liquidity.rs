//! Fill-or-kill feasibility
//!
//! A read-only walk over the opposite side that sums the quantity an
//! incoming order could take right now. Nothing is mutated, so a rejected
//! fill-or-kill leaves no trace in the book.

use types::numeric::{Price, Quantity};
use types::order::Side;

use crate::book::BookSide;
use super::crossing::incoming_can_match;

/// Quantity available to an incoming order at crossing prices
///
/// Walks levels best-first and stops at the first level that does not
/// cross or once `needed` is covered. The result is at least `needed`
/// exactly when a sweep would fill the whole order.
pub fn crossing_liquidity<S: BookSide>(
    opposite: &S,
    incoming_side: Side,
    limit_price: Price,
    needed: Quantity,
) -> Quantity {
    debug_assert_eq!(S::SIDE, incoming_side.opposite());

    let mut available = Quantity::zero();
    for level in opposite.levels() {
        if available >= needed || !incoming_can_match(incoming_side, limit_price, level.price()) {
            break;
        }
        available = available.saturating_add(level.total_quantity());
    }
    available
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::AskBook;
    use types::ids::{InstrumentId, OrderId};
    use types::order::{Order, OrderType};

    fn asks(levels: &[(u64, u64)]) -> AskBook {
        let mut book = AskBook::new();
        for (i, &(price, qty)) in levels.iter().enumerate() {
            book.insert(Order::new(
                OrderId::new(i as u64 + 1),
                InstrumentId::new("X"),
                Side::SELL,
                OrderType::GTC,
                Price::from_u64(price),
                Quantity::from_u64(qty),
                i as u64 + 1,
            ));
        }
        book
    }

    #[test]
    fn test_sums_only_crossing_levels() {
        let book = asks(&[(40, 5), (50, 10), (51, 100)]);
        let available = crossing_liquidity(&book, Side::BUY, Price::from_u64(50), Quantity::from_u64(20));
        assert_eq!(available, Quantity::from_u64(15));
    }

    #[test]
    fn test_stops_once_covered() {
        let book = asks(&[(40, 5), (45, 10), (50, 10)]);
        let available = crossing_liquidity(&book, Side::BUY, Price::from_u64(50), Quantity::from_u64(12));
        assert!(available >= Quantity::from_u64(12));
        assert_eq!(available, Quantity::from_u64(15));
    }

    #[test]
    fn test_empty_side_has_no_liquidity() {
        let book = AskBook::new();
        let available = crossing_liquidity(&book, Side::BUY, Price::from_u64(50), Quantity::from_u64(1));
        assert!(available.is_zero());
    }
}
