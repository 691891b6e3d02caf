//! Stress tests for the order book.
//!
//! These tests verify:
//! 1. Throughput under a long random order flow
//! 2. Determinism: the same seeded flow yields the same state root
//! 3. Consistency of all indexes under heavy add/cancel churn
//! 4. Capacity limits hold under load
//!
//! ## Running Stress Tests
//!
//! ```bash
//! # Run all stress tests (release mode recommended)
//! cargo test --release --test stress_test -- --nocapture
//!
//! # Run specific test
//! cargo test --release --test stress_test stress_1m_orders -- --nocapture
//! ```

use std::time::Instant;

use lob_core::{BookConfig, BookError, Order, OrderBook, OrderId, Side};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST CONSTANTS
// ============================================================================

/// Number of orders for the 1M stress test
const STRESS_ORDER_COUNT: usize = 1_000_000;

/// Target throughput (orders per second), release builds only
const TARGET_THROUGHPUT: f64 = 100_000.0;

/// Reference price in ticks
const MID: u64 = 10_000;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Generate a deterministic order flow. Same seed, same orders.
fn generate_deterministic_orders(count: usize, seed: u64, spread: u64) -> Vec<Order> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    (0..count)
        .map(|i| {
            let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
            let price = rng.gen_range(MID - spread..=MID + spread);
            let quantity = rng.gen_range(1..=100);
            Order::new((i + 1) as u64, side, price, quantity, i as u64)
        })
        .collect()
}

/// Replay a seeded flow with cancellations and return the final state root.
fn run_deterministic_sequence(seed: u64, count: usize) -> [u8; 32] {
    let mut rng = ChaCha8Rng::seed_from_u64(seed ^ 0xC0FFEE);
    let mut book = OrderBook::new();
    let mut resting: Vec<OrderId> = Vec::new();

    for order in generate_deterministic_orders(count, seed, 100) {
        if !resting.is_empty() && rng.gen_bool(0.2) {
            let id = resting.swap_remove(rng.gen_range(0..resting.len()));
            book.cancel_order(id);
        }
        let id = order.id;
        if book.add_order(order).unwrap().resting.is_some() {
            resting.push(id);
        }
    }

    book.check_invariants().unwrap();
    book.compute_state_root()
}

// ============================================================================
// STRESS TESTS
// ============================================================================

/// Process 1 million orders and check the throughput target.
#[test]
#[cfg_attr(debug_assertions, ignore = "throughput is only meaningful in release builds")]
fn stress_1m_orders() {
    println!("\n=== STRESS TEST: 1 Million Orders ===\n");

    let orders = generate_deterministic_orders(STRESS_ORDER_COUNT, 42, 1_000);
    let mut book = OrderBook::new();

    let start = Instant::now();
    let mut trade_count = 0;
    for order in orders {
        trade_count += book.add_order(order).unwrap().trades.len();
    }
    let elapsed = start.elapsed();
    let throughput = STRESS_ORDER_COUNT as f64 / elapsed.as_secs_f64();

    println!("  Orders processed:  {:>12}", STRESS_ORDER_COUNT);
    println!("  Trades generated:  {:>12}", trade_count);
    println!("  Final book size:   {:>12}", book.order_count());
    println!("  Bid levels:        {:>12}", book.bid_levels());
    println!("  Ask levels:        {:>12}", book.ask_levels());
    println!("  Elapsed time:      {:>12.2?}", elapsed);
    println!("  Throughput:        {:>12.0} orders/sec", throughput);
    println!("  State root:        {}", book.state_root_hex());

    assert!(
        throughput >= TARGET_THROUGHPUT,
        "Throughput {:.0} orders/sec below target {:.0}",
        throughput,
        TARGET_THROUGHPUT
    );
    assert!(trade_count > 0, "Expected some trades to occur");
    assert_eq!(book.stats().trade_count, trade_count as u64);
}

/// Same sequence, same state root; different seed, different root.
#[test]
fn verify_determinism() {
    const TEST_COUNT: usize = 10_000;
    const SEED: u64 = 12345;

    let root1 = run_deterministic_sequence(SEED, TEST_COUNT);
    let root2 = run_deterministic_sequence(SEED, TEST_COUNT);
    println!("  Run 1 state root: {}", hex::encode(root1));
    println!("  Run 2 state root: {}", hex::encode(root2));
    assert_eq!(root1, root2, "State roots must match for determinism");

    let root3 = run_deterministic_sequence(SEED + 1, TEST_COUNT);
    assert_ne!(root1, root3, "Different seeds should produce different roots");
}

/// Heavy add/cancel churn, checking every structure periodically.
#[test]
fn stress_cancellations() {
    const ORDER_COUNT: usize = 50_000;
    const CANCEL_RATE: f64 = 0.3;

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    // Small fixed-size index to force long chains
    let config = BookConfig {
        order_index_buckets: 16,
        max_load_factor: None,
        ..BookConfig::default()
    };
    let mut book = OrderBook::with_config(config);

    let mut orders_cancelled = 0;
    let mut stale_cancels = 0;
    let mut resting: Vec<OrderId> = Vec::new();

    for (i, order) in generate_deterministic_orders(ORDER_COUNT, 7, 200).into_iter().enumerate() {
        if !resting.is_empty() && rng.gen_bool(CANCEL_RATE) {
            let order_id = resting.swap_remove(rng.gen_range(0..resting.len()));
            match book.cancel_order(order_id) {
                Some(cancelled) => {
                    assert_eq!(cancelled.id, order_id);
                    assert!(!book.contains_order(order_id));
                    orders_cancelled += 1;
                }
                // Consumed by matching since it was placed
                None => stale_cancels += 1,
            }
        }

        let order_id = order.id;
        let exec = book.add_order(order).unwrap();
        if exec.resting.is_some() {
            resting.push(order_id);
        }

        if i % 1_000 == 0 {
            book.check_invariants().unwrap();
        }
    }

    println!("  Orders cancelled:  {:>12}", orders_cancelled);
    println!("  Stale cancels:     {:>12}", stale_cancels);
    println!("  Final book size:   {:>12}", book.order_count());
    println!("  Longest chain:     {:>12}", book.order_index().longest_chain());

    assert!(orders_cancelled > 0);
    assert_eq!(book.order_index().bucket_count(), 16);
    book.check_invariants().unwrap();

    // Drain everything that is left
    let left: Vec<OrderId> = book.order_index().iter().map(|(id, _)| id).collect();
    for id in left {
        assert!(book.cancel_order(id).is_some());
    }
    assert!(book.is_empty());
    assert_eq!(book.bid_levels() + book.ask_levels(), 0);
    book.check_invariants().unwrap();
}

/// Capacity limits are never exceeded and rejections leave the book intact.
#[test]
fn stress_bounded_book() {
    const ITERATIONS: usize = 50_000;
    const MAX_ORDERS: usize = 2_000;
    const MAX_LEVELS: usize = 64;

    let config = BookConfig {
        max_orders: MAX_ORDERS,
        max_levels_per_side: MAX_LEVELS,
        ..BookConfig::default()
    };
    let mut book = OrderBook::with_config(config);
    let mut rejected = 0;

    for order in generate_deterministic_orders(ITERATIONS, 99, 150) {
        match book.add_order(order) {
            Ok(_) => {}
            Err(BookError::CapacityExhausted { .. }) => rejected += 1,
            Err(e) => panic!("unexpected rejection: {e}"),
        }

        assert!(book.order_count() <= MAX_ORDERS);
        assert!(book.bid_levels() <= MAX_LEVELS);
        assert!(book.ask_levels() <= MAX_LEVELS);
    }

    println!("  Rejected:          {:>12}", rejected);
    println!("  Final book size:   {:>12}", book.order_count());
    assert!(rejected > 0, "limits should have been reached");
    book.check_invariants().unwrap();
}
