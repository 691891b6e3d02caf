//! # lob-core
//!
//! In-memory limit order book with price-time priority matching.
//!
//! ## Architecture
//!
//! - **Types**: `Order`, `Trade`, side and tick helpers
//! - **OrderBook**: red-black price indexes, intrusive FIFO levels on a slab,
//!   and a hash index from order id to queue position
//! - **Engine**: stateless matcher writing fills into a caller buffer
//! - **Config**: capacity limits and demo settings, loadable from file and
//!   environment
//!
//! ## Design Principles
//!
//! 1. **Determinism**: identical inputs give identical books and trades,
//!    checkable through [`OrderBook::compute_state_root`]
//! 2. **No Floating Point**: prices and quantities are integers; decimals only
//!    appear at the display edge
//! 3. **Pre-allocated Memory**: one slab for every resting order
//! 4. **Single Threaded**: a book is owned by one caller at a time
//!
//! ## Example
//!
//! ```
//! use lob_core::{Order, OrderBook, Side};
//!
//! let mut book = OrderBook::new();
//! book.add_order(Order::new(1, Side::Sell, 100, 5, 0)).unwrap();
//!
//! let exec = book.add_order(Order::new(2, Side::Buy, 100, 8, 1)).unwrap();
//! assert_eq!(exec.filled_quantity(), 5);
//! assert_eq!(book.best_bid(), Some(100));
//! ```

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: Order, Trade, tick conversion
pub mod types;

/// Order book: price indexes, level queues, order index
pub mod orderbook;

/// Matching engine: price-time priority matching
pub mod engine;

/// Book capacities and runtime settings
pub mod config;

/// Error and invariant-violation types
pub mod error;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::{BookConfig, Settings};
pub use engine::{MatchPreview, MatchingEngine};
pub use error::{BookError, InvariantViolation};
pub use orderbook::{Execution, LevelSnapshot, Locator, MarketStats, OrderBook, OrderHandle, Placement};
pub use types::{Order, OrderId, OrderType, Price, Quantity, Side, Trade};
