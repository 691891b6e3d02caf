//! Trade record emitted by the matching engine.
//!
//! A `Trade` is a transient output written into a caller-supplied buffer;
//! the book does not retain it.

use ssz_rs::prelude::*;

use crate::types::order::{OrderId, Price, Quantity, Side};

/// A single fill between an incoming order and a resting order.
///
/// The execution price is always the resting order's price. Trade ids are
/// sequential from 0 within one matching call; callers that need globally
/// unique ids renumber them.
///
/// ## Example
///
/// ```
/// use lob_core::types::Trade;
///
/// let trade = Trade::new(0, 2, 1, 100, 10, 0);
/// assert_eq!(trade.buy_order_id, 2);
/// assert_eq!(trade.sell_order_id, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Trade {
    /// Sequence number within the matching call that produced it
    pub id: u64,

    /// Buyer's order id
    pub buy_order_id: u64,

    /// Seller's order id
    pub sell_order_id: u64,

    /// Execution price in ticks (the resting order's price)
    pub price: u64,

    /// Executed quantity
    pub quantity: u64,

    /// Timestamp of the incoming order that triggered the fill
    pub timestamp: u64,
}

impl Trade {
    /// Create a new trade
    pub fn new(
        id: u64,
        buy_order_id: OrderId,
        sell_order_id: OrderId,
        price: Price,
        quantity: Quantity,
        timestamp: u64,
    ) -> Self {
        Self {
            id,
            buy_order_id,
            sell_order_id,
            price,
            quantity,
            timestamp,
        }
    }

    /// Build a trade from the aggressor's point of view, assigning buyer and
    /// seller ids according to the incoming side.
    pub fn from_fill(
        id: u64,
        incoming_side: Side,
        incoming_id: OrderId,
        resting_id: OrderId,
        price: Price,
        quantity: Quantity,
        timestamp: u64,
    ) -> Self {
        let (buy_order_id, sell_order_id) = match incoming_side {
            Side::Buy => (incoming_id, resting_id),
            Side::Sell => (resting_id, incoming_id),
        };
        Self::new(id, buy_order_id, sell_order_id, price, quantity, timestamp)
    }

    /// Notional value (price * quantity) in tick-lots.
    pub fn notional(&self) -> u128 {
        (self.price as u128) * (self.quantity as u128)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_from_fill_buy_aggressor() {
        let trade = Trade::from_fill(0, Side::Buy, 2, 1, 100, 10, 55);

        assert_eq!(trade.buy_order_id, 2);
        assert_eq!(trade.sell_order_id, 1);
        assert_eq!(trade.price, 100);
        assert_eq!(trade.quantity, 10);
        assert_eq!(trade.timestamp, 55);
    }

    #[test]
    fn test_trade_from_fill_sell_aggressor() {
        let trade = Trade::from_fill(3, Side::Sell, 9, 4, 101, 2, 0);

        assert_eq!(trade.id, 3);
        assert_eq!(trade.buy_order_id, 4);
        assert_eq!(trade.sell_order_id, 9);
    }

    #[test]
    fn test_trade_notional() {
        let trade = Trade::new(0, 1, 2, u64::MAX, 2, 0);
        assert_eq!(trade.notional(), (u64::MAX as u128) * 2);
    }

    #[test]
    fn test_trade_ssz_size() {
        let trade = Trade::new(0, 1, 2, 100, 10, 0);
        let bytes = ssz_rs::serialize(&trade).expect("Failed to serialize");

        // 6 fields * 8 bytes
        assert_eq!(bytes.len(), 48);
    }
}
