//! Error types for book operations.
//!
//! Not-found outcomes (cancelling an unknown id, looking up an absent price)
//! are reported through `Option`, never through these errors.

use thiserror::Error;

use crate::types::{OrderId, Price, Side};

/// Reasons an order book operation was rejected.
///
/// Every rejection leaves the bid index, the ask index and the order index
/// exactly as they were before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    /// The order has zero quantity or zero price
    #[error("invalid order {id}: price and quantity must be non-zero")]
    InvalidOrder { id: OrderId },

    /// An order with this id is already resting in the book
    #[error("order {0} is already resting in the book")]
    DuplicateOrderId(OrderId),

    /// The caller's trade buffer has no room for a single fill
    #[error("order {id}: trade buffer has no capacity")]
    EmptyTradeBuffer { id: OrderId },

    /// A price index already holds this key
    #[error("price level {0} already exists")]
    DuplicatePrice(Price),

    /// Resting the remainder would exceed a configured capacity
    #[error("{resource} capacity exhausted on {side:?} side (limit {limit})")]
    CapacityExhausted {
        resource: &'static str,
        side: Side,
        limit: usize,
    },
}

/// A structural inconsistency found by an invariant check.
///
/// Only produced by the `check_invariants` family of methods; a healthy book
/// never yields one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("price index root is red")]
    RedRoot,

    #[error("red node at price {0} has a red child")]
    RedRed(Price),

    #[error("black height mismatch under price {price}: {left} vs {right}")]
    BlackHeight { price: Price, left: usize, right: usize },

    #[error("keys out of order: {prev} is not below {next}")]
    Ordering { prev: Price, next: Price },

    #[error("broken parent link at price {0}")]
    ParentLink(Price),

    #[error("price index holds {actual} nodes but reports {reported}")]
    Size { reported: usize, actual: usize },

    #[error("empty price level {0} is still indexed")]
    EmptyLevel(Price),

    #[error("level {price} aggregate {reported} does not match member sum {actual}")]
    LevelQuantity { price: Price, reported: u64, actual: u64 },

    #[error("level {price} reports {reported} orders but links {actual}")]
    LevelCount { price: Price, reported: usize, actual: usize },

    #[error("broken queue link in level {0}")]
    QueueLink(Price),

    #[error("order {0} rests in a level but its locator is missing or stale")]
    Locator(OrderId),

    #[error("order index holds {indexed} entries but {resting} orders rest in levels")]
    IndexCount { indexed: usize, resting: usize },
}
