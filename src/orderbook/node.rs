//! Slab entry for a resting order.
//!
//! Each level queue is a doubly linked list threaded through the book's
//! `Slab<OrderNode>`: `prev` and `next` are slab keys of the neighbouring
//! orders at the same price. Slab keys are reused after removal, so a raw
//! key is only handed out wrapped in an [`OrderHandle`].

use crate::types::{Order, OrderId, Price, Quantity};

/// Opaque position of a resting order inside its price level's queue.
///
/// A handle is only meaningful while the order it was issued for is still
/// resting; the order index drops its copy the moment the order leaves the
/// book, so no live locator ever names a reused slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderHandle(pub(crate) usize);

impl OrderHandle {
    /// Raw slab key, for diagnostics.
    #[inline]
    pub fn key(self) -> usize {
        self.0
    }
}

/// A queued order plus its neighbours' slab keys.
#[derive(Debug, Clone)]
pub struct OrderNode {
    /// The resting order
    pub order: Order,

    /// Next (newer) order in the level queue; None at the tail
    pub next: Option<usize>,

    /// Previous (older) order in the level queue; None at the head
    pub prev: Option<usize>,
}

impl OrderNode {
    /// Node not yet linked into any queue
    #[inline]
    pub fn new(order: Order) -> Self {
        Self {
            order,
            next: None,
            prev: None,
        }
    }

    /// No neighbour on either side: the node is alone in its queue or not
    /// queued at all.
    #[inline]
    pub fn is_unlinked(&self) -> bool {
        self.next.is_none() && self.prev.is_none()
    }

    #[inline]
    pub fn order_id(&self) -> OrderId {
        self.order.id
    }

    #[inline]
    pub fn price(&self) -> Price {
        self.order.price
    }

    #[inline]
    pub fn remaining(&self) -> Quantity {
        self.order.remaining
    }
}
