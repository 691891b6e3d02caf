//! FIFO queue of the resting orders at one price.
//!
//! ```text
//! head (first to fill) <-> ... <-> tail (last arrival)
//! ```
//!
//! Arrivals link in at the tail and fills take from the head, which gives
//! time priority inside a price. Because every node carries both links, a
//! cancel can unlink any member through its [`OrderHandle`] without walking
//! the queue.
//!
//! A level stores no orders itself, only the queue ends, the member count
//! and the sum of remaining quantities. The nodes live in the book's slab.

use slab::Slab;

use crate::orderbook::{OrderHandle, OrderNode};
use crate::types::{Order, Price, Quantity};

/// Queue metadata and aggregate quantity for one price on one side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceLevel {
    /// Price for this level, in ticks
    pub price: Price,

    /// Sum of the remaining quantities of all queued orders
    pub total_quantity: Quantity,

    /// Oldest order (slab key), first to be matched
    pub head: Option<usize>,

    /// Newest order (slab key)
    pub tail: Option<usize>,

    /// Number of orders in the queue
    pub order_count: usize,
}

/// Read-only view of a level for display and telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSnapshot {
    pub price: Price,
    pub total_quantity: Quantity,
    pub order_count: usize,
}

impl PriceLevel {
    /// Empty level at `price`
    pub fn new(price: Price) -> Self {
        Self {
            price,
            total_quantity: 0,
            head: None,
            tail: None,
            order_count: 0,
        }
    }

    /// No orders queued
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Number of queued orders
    #[inline]
    pub fn len(&self) -> usize {
        self.order_count
    }

    /// Aggregate view of this level
    #[inline]
    pub fn snapshot(&self) -> LevelSnapshot {
        LevelSnapshot {
            price: self.price,
            total_quantity: self.total_quantity,
            order_count: self.order_count,
        }
    }

    /// Store `order` in the slab and append it to the tail of the queue.
    ///
    /// Returns the handle used for later O(1) removal.
    pub fn push_back(&mut self, orders: &mut Slab<OrderNode>, order: Order) -> OrderHandle {
        debug_assert_eq!(order.price, self.price);

        let quantity = order.remaining;
        let mut node = OrderNode::new(order);
        node.prev = self.tail;
        let key = orders.insert(node);

        match self.tail {
            Some(tail_key) => orders[tail_key].next = Some(key),
            None => self.head = Some(key),
        }

        self.tail = Some(key);
        self.order_count += 1;
        self.total_quantity = self.total_quantity.saturating_add(quantity);

        OrderHandle(key)
    }

    /// Handle of the head order (oldest), if any
    #[inline]
    pub fn peek_handle(&self) -> Option<OrderHandle> {
        self.head.map(OrderHandle)
    }

    /// The head order without removing it
    pub fn peek<'a>(&self, orders: &'a Slab<OrderNode>) -> Option<&'a Order> {
        self.head.and_then(|key| orders.get(key)).map(|node| &node.order)
    }

    /// Remove and return the head order
    pub fn pop_front(&mut self, orders: &mut Slab<OrderNode>) -> Option<Order> {
        let head = self.peek_handle()?;
        self.remove(orders, head)
    }

    /// Unlink the order at `handle` from anywhere in the queue and release
    /// its slab slot.
    ///
    /// Returns `None` if the handle does not name an order at this price.
    pub fn remove(&mut self, orders: &mut Slab<OrderNode>, handle: OrderHandle) -> Option<Order> {
        let key = handle.0;
        let (prev_key, next_key) = match orders.get(key) {
            Some(node) if node.price() == self.price => (node.prev, node.next),
            _ => return None,
        };

        match prev_key {
            Some(prev) => orders[prev].next = next_key,
            None => self.head = next_key,
        }
        match next_key {
            Some(next) => orders[next].prev = prev_key,
            None => self.tail = prev_key,
        }

        let node = orders.remove(key);
        self.order_count -= 1;
        self.total_quantity = self.total_quantity.saturating_sub(node.remaining());

        Some(node.order)
    }

    /// Update the aggregate after a partial fill of a queued order
    #[inline]
    pub fn reduce_quantity(&mut self, filled_quantity: Quantity) {
        debug_assert!(filled_quantity <= self.total_quantity);
        self.total_quantity = self.total_quantity.saturating_sub(filled_quantity);
    }

    /// Iterate queued orders from head (oldest) to tail
    pub fn iter<'a>(&self, orders: &'a Slab<OrderNode>) -> LevelIter<'a> {
        LevelIter {
            orders,
            cursor: self.head,
        }
    }
}

/// FIFO iterator over the orders of one level.
pub struct LevelIter<'a> {
    orders: &'a Slab<OrderNode>,
    cursor: Option<usize>,
}

impl<'a> Iterator for LevelIter<'a> {
    type Item = (OrderHandle, &'a Order);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.cursor?;
        let node = self.orders.get(key)?;
        self.cursor = node.next;
        Some((OrderHandle(key), &node.order))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
