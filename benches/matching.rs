//! Benchmarks for the order book and matcher.
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Run one group
//! cargo bench -- single_match
//! ```
//!
//! Results are saved to `target/criterion/` with HTML reports.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use lob_core::orderbook::{OrderIndex, PriceIndex};
use lob_core::{BookConfig, MatchingEngine, Order, OrderBook, Side, Trade};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

const MID: u64 = 100_000;

/// Book with `levels` ask levels above MID and `levels` bid levels below,
/// `per_level` orders each. Ids start at 1.
fn populated_book(levels: u64, per_level: u64) -> OrderBook {
    let mut book = OrderBook::new();
    let mut id = 1;
    for level in 1..=levels {
        for _ in 0..per_level {
            book.add_order(Order::new(id, Side::Sell, MID + level, 10, id)).unwrap();
            book.add_order(Order::new(id + 1, Side::Buy, MID - level, 10, id + 1)).unwrap();
            id += 2;
        }
    }
    book
}

/// Deterministic mixed order flow around MID.
fn generate_order_batch(count: usize, seed: u64) -> Vec<Order> {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
            let price = rng.gen_range(MID - 500..=MID + 500);
            Order::new((i + 1) as u64, side, price, rng.gen_range(1..=100), i as u64)
        })
        .collect()
}

// ============================================================================
// BENCHMARK: Single Match Latency
// ============================================================================

fn bench_single_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_match");
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("top_of_book_1k_levels", |b| {
        b.iter_batched(
            || (populated_book(1_000, 1), vec![Trade::default(); 16]),
            |(mut book, mut trades)| {
                let mut incoming = Order::new(u64::MAX, Side::Buy, MID + 1, 10, 0);
                black_box(MatchingEngine::match_order(&mut book, &mut incoming, &mut trades, 16))
            },
            BatchSize::LargeInput,
        );
    });

    group.bench_function("sweep_10_levels", |b| {
        b.iter_batched(
            || (populated_book(100, 4), vec![Trade::default(); 64]),
            |(mut book, mut trades)| {
                let mut incoming = Order::new(u64::MAX, Side::Sell, MID - 10, 400, 0);
                black_box(MatchingEngine::match_order(&mut book, &mut incoming, &mut trades, 64))
            },
            BatchSize::LargeInput,
        );
    });

    group.bench_function("preview_sweep_10_levels", |b| {
        let book = populated_book(100, 4);
        let incoming = Order::new(u64::MAX, Side::Sell, MID - 10, 400, 0);
        b.iter(|| black_box(MatchingEngine::preview(&book, &incoming, 64)));
    });

    group.finish();
}

// ============================================================================
// BENCHMARK: Add / Cancel
// ============================================================================

fn bench_order_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_operations");
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("add_rest_new_level", |b| {
        b.iter_batched(
            || populated_book(1_000, 1),
            |mut book| black_box(book.add_order(Order::new(u64::MAX, Side::Buy, 1, 10, 0))),
            BatchSize::LargeInput,
        );
    });

    group.bench_function("add_cancel_round_trip", |b| {
        let mut book = populated_book(1_000, 1);
        b.iter(|| {
            book.add_order(Order::new(u64::MAX, Side::Buy, MID - 500, 10, 0)).unwrap();
            black_box(book.cancel_order(u64::MAX))
        });
    });

    group.finish();
}

// ============================================================================
// BENCHMARK: Index structures
// ============================================================================

fn bench_indexes(c: &mut Criterion) {
    let mut group = c.benchmark_group("indexes");

    for size in [1_000u64, 100_000] {
        group.bench_with_input(BenchmarkId::new("price_index_insert_remove", size), &size, |b, &size| {
            let mut tree = PriceIndex::new();
            for price in 0..size {
                tree.insert(price * 2, ()).unwrap();
            }
            b.iter(|| {
                tree.insert(size + 1, ()).unwrap();
                black_box(tree.remove(size + 1))
            });
        });

        group.bench_with_input(BenchmarkId::new("order_index_find", size), &size, |b, &size| {
            let book = populated_book(size / 2, 1);
            let index: &OrderIndex = book.order_index();
            let mut id = 0;
            b.iter(|| {
                id = (id + 7) % size + 1;
                black_box(index.find(id))
            });
        });
    }

    group.finish();
}

// ============================================================================
// BENCHMARK: Throughput
// ============================================================================

fn bench_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("throughput");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(30);

    for batch_size in [1_000usize, 10_000, 100_000] {
        group.throughput(Throughput::Elements(batch_size as u64));
        group.bench_with_input(BenchmarkId::new("mixed_flow", batch_size), &batch_size, |b, &size| {
            let orders = generate_order_batch(size, 42);
            b.iter_batched(
                || (OrderBook::with_config(BookConfig::default()), orders.clone()),
                |(mut book, orders)| {
                    for order in orders {
                        let _ = black_box(book.add_order(order));
                    }
                    book.order_count()
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_state_root(c: &mut Criterion) {
    let book = populated_book(1_000, 5);
    c.bench_function("state_root_10k_orders", |b| b.iter(|| black_box(book.compute_state_root())));
}

criterion_group!(
    benches,
    bench_single_match,
    bench_order_operations,
    bench_indexes,
    bench_throughput,
    bench_state_root
);
criterion_main!(benches);
