//! Order types for the limit order book.
//!
//! ## Encoding
//!
//! `Order` derives `SimpleSerialize` from ssz_rs so that resting orders hash
//! into a deterministic state root. SSZ has no enums, so side and kind are
//! stored as single-byte tags and read back through [`Order::side`] and
//! [`Order::order_type`].
//!
//! ## Units
//!
//! Prices are integer ticks and quantities are integer lots. Use
//! [`crate::types::price`] to convert to and from decimal strings.

use ssz_rs::prelude::*;

/// Price in integer ticks.
pub type Price = u64;

/// Quantity in integer lots.
pub type Quantity = u64;

/// Caller-assigned order identifier.
pub type OrderId = u64;

// ============================================================================
// Side
// ============================================================================

/// Which side of the book an order belongs to. Tag 0 is buy, 1 is sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    /// Bid
    #[default]
    Buy,
    /// Ask
    Sell,
}

impl From<Side> for u8 {
    fn from(side: Side) -> u8 {
        match side {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }
}

impl TryFrom<u8> for Side {
    type Error = u8;

    fn try_from(tag: u8) -> Result<Self, u8> {
        match tag {
            0 => Ok(Side::Buy),
            1 => Ok(Side::Sell),
            other => Err(other),
        }
    }
}

impl Side {
    /// The side this order trades against
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Whether an order on this side at `limit` may trade against a resting
    /// order at `resting`. Equal prices cross.
    #[inline]
    pub fn crosses(self, limit: Price, resting: Price) -> bool {
        match self {
            Side::Buy => limit >= resting,
            Side::Sell => limit <= resting,
        }
    }
}

// ============================================================================
// OrderType
// ============================================================================

/// Order kind. Only resting limit orders are modeled; tag 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderType {
    #[default]
    Limit,
}

impl From<OrderType> for u8 {
    fn from(kind: OrderType) -> u8 {
        match kind {
            OrderType::Limit => 0,
        }
    }
}

impl TryFrom<u8> for OrderType {
    type Error = u8;

    fn try_from(tag: u8) -> Result<Self, u8> {
        match tag {
            0 => Ok(OrderType::Limit),
            other => Err(other),
        }
    }
}

// ============================================================================
// Order
// ============================================================================

/// A limit order.
///
/// `quantity` is the size at submission; `remaining` decreases as the order
/// is matched. Ownership moves into the book on
/// [`OrderBook::add_order`](crate::orderbook::OrderBook::add_order).
///
/// ## Example
///
/// ```
/// use lob_core::types::{Order, Side};
///
/// let mut order = Order::new(1, Side::Buy, 100, 10, 0);
/// order.fill(4);
/// assert_eq!(order.side(), Side::Buy);
/// assert_eq!((order.remaining, order.filled_quantity()), (6, 4));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Order {
    /// Caller-assigned identifier, unique among resting orders
    pub id: u64,

    /// Side tag, see [`Side`]
    pub side_raw: u8,

    /// Limit price in ticks
    pub price: u64,

    /// Quantity at submission
    pub quantity: u64,

    /// Unfilled quantity
    pub remaining: u64,

    /// Submission timestamp (caller clock)
    pub timestamp: u64,

    /// Kind tag, see [`OrderType`]
    pub order_type_raw: u8,
}

impl Order {
    /// Limit order with nothing filled yet.
    pub fn new(id: OrderId, side: Side, price: Price, quantity: Quantity, timestamp: u64) -> Self {
        Self {
            id,
            side_raw: side.into(),
            price,
            quantity,
            remaining: quantity,
            timestamp,
            order_type_raw: OrderType::Limit.into(),
        }
    }

    /// Decoded side. An unknown tag reads as buy.
    #[inline]
    pub fn side(&self) -> Side {
        Side::try_from(self.side_raw).unwrap_or_default()
    }

    #[inline]
    pub fn order_type(&self) -> OrderType {
        OrderType::try_from(self.order_type_raw).unwrap_or_default()
    }

    #[inline]
    pub fn is_filled(&self) -> bool {
        self.remaining == 0
    }

    pub fn filled_quantity(&self) -> Quantity {
        self.quantity.saturating_sub(self.remaining)
    }

    /// Reduce `remaining` by up to `amount`, returning what was taken.
    pub fn fill(&mut self, amount: Quantity) -> Quantity {
        let taken = amount.min(self.remaining);
        self.remaining -= taken;
        taken
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
