//! lob-core demo binary
//!
//! Replays a seeded random order flow through one book and prints
//! top-of-book snapshots, running statistics and the final state root.
//! Settings come from `lob.toml` and `LOB_*` environment variables; log
//! verbosity from `RUST_LOG`.

use std::error::Error;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use tracing::{info, warn};

use lob_core::config::{DemoSettings, Settings};
use lob_core::types::price::{format_ticks, mid_price, parse_tick_size};
use lob_core::{Order, OrderBook, OrderId, Side};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "lob_core=info".into()),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let settings = Settings::load()?;
    let demo = &settings.demo;
    let tick = parse_tick_size(&demo.tick_size).ok_or_else(|| format!("invalid tick size {:?}", demo.tick_size))?;

    info!(seed = demo.seed, ticks = demo.ticks, "replaying order flow");

    let mut book = OrderBook::with_config(settings.book.clone());
    let mut rng = ChaCha8Rng::seed_from_u64(demo.seed);
    let mut live: Vec<OrderId> = Vec::new();
    let mut rejected = 0u64;

    for ts in 1..=demo.ticks {
        if !live.is_empty() && rng.gen_bool(0.3) {
            let id = live.swap_remove(rng.gen_range(0..live.len()));
            book.cancel_order(id);
        } else {
            let order = random_order(&mut rng, ts, demo);
            let id = order.id;
            match book.add_order(order) {
                Ok(exec) if exec.resting.is_some() => live.push(id),
                Ok(_) => {}
                Err(e) => {
                    warn!(order_id = id, error = %e, "order rejected");
                    rejected += 1;
                }
            }
        }

        if demo.snapshot_every > 0 && ts % demo.snapshot_every == 0 {
            print_snapshot(&book, ts, tick, demo.display_levels);
        }
    }

    let stats = book.stats();
    println!("===========================================");
    println!("  trades:       {}", stats.trade_count);
    println!("  volume:       {}", stats.total_volume);
    println!(
        "  last price:   {}",
        stats.last_price.map_or_else(|| "-".to_string(), |p| format_ticks(p, tick))
    );
    println!("  resting:      {} ({} bids / {} asks)", book.order_count(), book.bid_count(), book.ask_count());
    println!("  rejected:     {}", rejected);
    println!(
        "  index:        {} buckets, longest chain {}",
        book.order_index().bucket_count(),
        book.order_index().longest_chain()
    );
    println!("  state root:   {}", book.state_root_hex());
    println!("===========================================");

    book.check_invariants()?;
    Ok(())
}

fn random_order(rng: &mut ChaCha8Rng, ts: u64, demo: &DemoSettings) -> Order {
    let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
    // Mostly passive, with some orders reaching across the mid
    let offset = rng.gen_range(0..50u64);
    let aggressive = rng.gen_bool(0.15);
    let price = match (side, aggressive) {
        (Side::Buy, false) | (Side::Sell, true) => demo.mid_price.saturating_sub(offset).max(1),
        (Side::Sell, false) | (Side::Buy, true) => demo.mid_price + offset,
    };
    let quantity = rng.gen_range(1..=100);
    Order::new(ts, side, price, quantity, ts)
}

fn print_snapshot(book: &OrderBook, ts: u64, tick: Decimal, levels: usize) {
    let mid = mid_price(book.best_bid(), book.best_ask(), tick);
    println!(
        "--- t={} mid={} spread={}",
        ts,
        mid.map_or_else(|| "-".to_string(), |m| m.to_string()),
        book.spread().map_or_else(|| "-".to_string(), |s| format_ticks(s, tick)),
    );

    let mut asks = book.depth(Side::Sell, levels);
    asks.reverse();
    for level in asks {
        println!("  ask {:>12} {:>8} ({})", format_ticks(level.price, tick), level.total_quantity, level.order_count);
    }
    for level in book.depth(Side::Buy, levels) {
        println!("  bid {:>12} {:>8} ({})", format_ticks(level.price, tick), level.total_quantity, level.order_count);
    }
}
