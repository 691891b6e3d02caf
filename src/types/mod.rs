//! Core data types for the order book
//!
//! - [`Order`]: A limit order
//! - [`Side`]: Buy or Sell
//! - [`OrderType`]: Type of order (Limit only)
//! - [`Trade`]: A fill between an incoming and a resting order
//!
//! Prices are integer ticks and quantities integer lots; [`price`] converts
//! ticks to and from decimal strings.

mod order;
mod trade;
pub mod price;

pub use order::{Order, OrderId, OrderType, Price, Quantity, Side};
pub use trade::Trade;
