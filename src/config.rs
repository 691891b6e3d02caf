//! Runtime configuration.
//!
//! [`BookConfig`] sizes a single book. [`Settings`] wraps it together with
//! the demo binary's knobs and loads from defaults, an optional `lob.toml`,
//! and environment variables prefixed with `LOB_` (nested fields separated
//! with `__`), e.g. `LOB_BOOK__MAX_ORDERS=50000`.
//!
//! A `book.max_load_factor` of `0` (or any non-positive value) selects a
//! fixed-size order index, e.g. `LOB_BOOK__MAX_LOAD_FACTOR=0`.

use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;

/// Default bucket count for the order index.
pub const DEFAULT_ORDER_INDEX_BUCKETS: usize = 1024;

/// Default maximum number of resting orders.
pub const DEFAULT_MAX_ORDERS: usize = 1_000_000;

/// Default maximum number of price levels per side.
pub const DEFAULT_MAX_LEVELS_PER_SIDE: usize = 100_000;

/// Default trade buffer size used by `OrderBook::add_order`.
pub const DEFAULT_MAX_TRADES_PER_ORDER: usize = 1024;

/// Capacity parameters for one order book.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    /// Initial bucket count of the order index (rounded up to a power of two)
    pub order_index_buckets: usize,

    /// Load factor above which the order index doubles its buckets.
    /// `None` or a value `<= 0` keeps the bucket count fixed.
    pub max_load_factor: Option<f64>,

    /// Maximum number of orders resting in the book
    pub max_orders: usize,

    /// Maximum number of price levels on each side
    pub max_levels_per_side: usize,

    /// Trade buffer size for a single `add_order` call
    pub max_trades_per_order: usize,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            order_index_buckets: DEFAULT_ORDER_INDEX_BUCKETS,
            max_load_factor: Some(4.0),
            max_orders: DEFAULT_MAX_ORDERS,
            max_levels_per_side: DEFAULT_MAX_LEVELS_PER_SIDE,
            max_trades_per_order: DEFAULT_MAX_TRADES_PER_ORDER,
        }
    }
}

/// Settings consumed by the demo binary.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub book: BookConfig,
    pub demo: DemoSettings,
}

/// Order flow replayed by the demo binary.
#[derive(Debug, Clone, Deserialize)]
pub struct DemoSettings {
    /// Number of orders submitted
    pub ticks: u64,
    /// RNG seed for the order flow
    pub seed: u64,
    /// Decimal value of one price tick
    pub tick_size: String,
    /// Reference price in ticks around which orders are placed
    pub mid_price: u64,
    /// Levels printed per side in each snapshot
    pub display_levels: usize,
    /// Print a snapshot every this many orders
    pub snapshot_every: u64,
}

impl Settings {
    /// Load settings from defaults, `lob.toml` (optional), and environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::with_defaults()?
            .add_source(config::File::with_name("lob").required(false))
            .add_source(
                config::Environment::with_prefix("LOB")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    /// Load settings from defaults overlaid with a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, config::ConfigError> {
        Self::with_defaults()?
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    fn with_defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
        let defaults = BookConfig::default();
        config::Config::builder()
            .set_default("book.order_index_buckets", defaults.order_index_buckets as i64)?
            .set_default("book.max_load_factor", defaults.max_load_factor.unwrap_or(0.0))?
            .set_default("book.max_orders", defaults.max_orders as i64)?
            .set_default("book.max_levels_per_side", defaults.max_levels_per_side as i64)?
            .set_default("book.max_trades_per_order", defaults.max_trades_per_order as i64)?
            .set_default("demo.ticks", 5_000i64)?
            .set_default("demo.seed", 42i64)?
            .set_default("demo.tick_size", "0.01")?
            .set_default("demo.mid_price", 10_000i64)?
            .set_default("demo.display_levels", 5i64)?
            .set_default("demo.snapshot_every", 1_000i64)
    }
}
