//! Matching engine.
//!
//! ## Design Principles
//!
//! 1. **Determinism**: the same book and the same incoming order always
//!    produce the same trades
//! 2. **Integer Math**: prices are ticks, quantities are lots
//! 3. **Synchronous Execution**: no async or locking in the hot path
//! 4. **Price-Time Priority**: best price first, then FIFO within a level
//!
//! ## Matching Rules
//!
//! - **Buy orders** match against asks (lowest price first)
//! - **Sell orders** match against bids (highest price first)
//! - **Execution price** is the resting order's price
//! - **Partial fills** are supported on both sides
//! - **Unfilled quantity** is returned to the caller, who rests it
//!
//! ## Example
//!
//! ```
//! use lob_core::engine::MatchingEngine;
//! use lob_core::orderbook::OrderBook;
//! use lob_core::types::{Order, Side, Trade};
//!
//! let mut book = OrderBook::new();
//! book.add_order(Order::new(1, Side::Sell, 100, 10, 0)).unwrap();
//!
//! let mut incoming = Order::new(2, Side::Buy, 101, 10, 1);
//! let mut trades = vec![Trade::default(); 8];
//! let n = MatchingEngine::match_order(&mut book, &mut incoming, &mut trades, 8);
//!
//! assert_eq!(n, 1);
//! assert_eq!(trades[0].price, 100);
//! assert_eq!(incoming.remaining, 0);
//! assert!(book.best_ask().is_none());
//! ```

pub mod matcher;

pub use matcher::{MatchPreview, MatchingEngine};
