//! Multi-threaded engine tests
//!
//! Many submitters against shared and separate instruments. Checks that
//! identifiers are unique, every book stays consistent, and quantity is
//! conserved across concurrent matching.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use matching_engine::{AddOrderRequest, CancelOrderRequest, MatchingEngine};
use types::errors::EngineError;
use types::order::{OrderType, Side};

const THREADS: usize = 8;
const ORDERS_PER_THREAD: usize = 250;

fn request(instrument: &str, side: Side, order_type: OrderType, price: i64, quantity: i64) -> AddOrderRequest {
    AddOrderRequest {
        instrument: instrument.to_string(),
        side,
        order_type,
        price,
        quantity,
    }
}

fn assert_books_consistent(engine: &MatchingEngine) {
    for instrument in engine.instruments() {
        let handle = engine.registry().get(&instrument).unwrap();
        let book = handle.lock();
        book.check_integrity()
            .unwrap_or_else(|violation| panic!("{instrument}: {violation}"));
    }
}

#[test]
fn test_concurrent_submitters_on_one_instrument() {
    let engine = Arc::new(MatchingEngine::with_defaults());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut results = Vec::with_capacity(ORDERS_PER_THREAD);
                for i in 0..ORDERS_PER_THREAD {
                    let side = if (t + i) % 2 == 0 { Side::BUY } else { Side::SELL };
                    let order_type = match i % 5 {
                        3 => OrderType::IOC,
                        4 => OrderType::FOK,
                        _ => OrderType::GTC,
                    };
                    let price = 95 + ((t * 7 + i * 3) % 11) as i64;
                    let quantity = 1 + (i % 9) as i64;
                    results.push(engine.add_order(request("SHARED", side, order_type, price, quantity)));
                }
                results
            })
        })
        .collect();

    let mut ids = HashSet::new();
    let mut parked = 0u64;
    let mut traded = 0u64;
    let mut rejected = 0usize;

    for handle in handles {
        for result in handle.join().unwrap() {
            match result {
                Ok(response) => {
                    assert!(ids.insert(response.order_id), "duplicate id {}", response.order_id);
                    assert!(!response.order_id.is_none());
                    let taken: u64 = response.trades.iter().map(|t| t.quantity.lots()).sum();
                    assert_eq!(taken, response.filled_quantity.lots());
                    parked += response.resting_quantity.lots();
                    traded += taken;
                }
                Err(EngineError::Unfulfillable { .. }) => rejected += 1,
                Err(other) => panic!("unexpected error {other}"),
            }
        }
    }

    assert_eq!(ids.len() + rejected, THREADS * ORDERS_PER_THREAD);
    assert_books_consistent(&engine);

    // Every traded lot came out of a parked order
    let status = engine.get_status("SHARED");
    assert!(!status.is_crossed());
    let resting: u64 = status
        .bids
        .iter()
        .chain(status.asks.iter())
        .map(|l| l.quantity.lots())
        .sum();
    assert_eq!(resting, parked - traded);
}

#[test]
fn test_separate_instruments_do_not_interact() {
    let engine = Arc::new(MatchingEngine::with_defaults());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let instrument = format!("INST-{t}");
                barrier.wait();
                for i in 0..ORDERS_PER_THREAD {
                    // Non-crossing ladder: bids below 100, asks above
                    let (side, price) = if i % 2 == 0 {
                        (Side::BUY, 99 - (i % 10) as i64)
                    } else {
                        (Side::SELL, 101 + (i % 10) as i64)
                    };
                    let response = engine
                        .add_order(request(&instrument, side, OrderType::GTC, price, 1))
                        .unwrap();
                    assert!(response.trades.is_empty());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(engine.instruments().len(), THREADS);
    for t in 0..THREADS {
        let status = engine.get_status(&format!("INST-{t}"));
        assert_eq!(status.resting_orders, ORDERS_PER_THREAD);
        assert_eq!(status.best_bid().map(|p| p.ticks()), Some(99));
        assert_eq!(status.best_ask().map(|p| p.ticks()), Some(101));
    }
    assert_books_consistent(&engine);
}

#[test]
fn test_concurrent_cancels_remove_each_order_once() {
    let engine = Arc::new(MatchingEngine::with_defaults());
    let ids: Vec<u64> = (0..200)
        .map(|i| {
            engine
                .add_order(request("CXL", Side::BUY, OrderType::GTC, 10 + (i % 5), 1))
                .unwrap()
                .order_id
                .as_u64()
        })
        .collect();
    let ids = Arc::new(ids);
    let barrier = Arc::new(Barrier::new(THREADS));

    // Every thread tries to cancel every order; exactly one wins each
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let ids = Arc::clone(&ids);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut won = 0usize;
                for &order_id in ids.iter() {
                    let result = engine.cancel_order(CancelOrderRequest {
                        instrument: "CXL".to_string(),
                        order_id,
                    });
                    match result {
                        Ok(_) => won += 1,
                        Err(EngineError::OrderNotFound { .. }) => {}
                        Err(other) => panic!("unexpected error {other}"),
                    }
                }
                won
            })
        })
        .collect();

    let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, ids.len());

    let status = engine.get_status("CXL");
    assert!(status.is_empty());
    assert_books_consistent(&engine);
}

#[test]
fn test_concurrent_first_reference_creates_one_book() {
    let engine = Arc::new(MatchingEngine::with_defaults());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let side = if t % 2 == 0 { Side::BUY } else { Side::SELL };
                let price = if side == Side::BUY { 10 } else { 20 };
                engine
                    .add_order(request("FRESH", side, OrderType::GTC, price, 1))
                    .unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(engine.registry().books_created(), 1);
    assert_eq!(engine.get_status("FRESH").resting_orders, THREADS);
}
