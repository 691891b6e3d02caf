//! Limit order book: two price indexes and an order index kept in lockstep.
//!
//! ## Architecture
//!
//! - **Slab**: arena for every resting order node (O(1) insert/remove)
//! - **PriceIndex**: red-black tree of price levels per side
//! - **OrderIndex**: order id to [`Locator`] for O(1) cancel
//!
//! The book is the only component that creates or releases a
//! [`PriceLevel`]. The matching engine walks levels through the crate-private
//! methods below and asks the book to release a level once it is empty.
//!
//! ## Price Ordering
//!
//! Both trees order ascending by price. The best bid is the bid tree's
//! maximum and the best ask is the ask tree's minimum.
//!
//! ## Example
//!
//! ```
//! use lob_core::orderbook::OrderBook;
//! use lob_core::types::{Order, Side};
//!
//! let mut book = OrderBook::new();
//!
//! book.add_order(Order::new(1, Side::Buy, 99, 10, 0)).unwrap();
//! book.add_order(Order::new(2, Side::Sell, 101, 10, 0)).unwrap();
//!
//! assert_eq!(book.best_bid(), Some(99));
//! assert_eq!(book.best_ask(), Some(101));
//! assert_eq!(book.spread(), Some(2));
//! ```

use sha2::{Digest, Sha256};
use slab::Slab;
use tracing::{debug, trace, warn};

use crate::config::BookConfig;
use crate::engine::MatchingEngine;
use crate::error::{BookError, InvariantViolation};
use crate::orderbook::{LevelSnapshot, Locator, OrderHandle, OrderIndex, OrderNode, PriceIndex, PriceLevel};
use crate::types::{Order, OrderId, Price, Quantity, Side, Trade};

/// Outcome of [`OrderBook::add_order_into`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Number of trades written to the caller's buffer
    pub trades: usize,
    /// Quantity left after matching
    pub remaining: Quantity,
    /// Handle of the resting remainder, if any
    pub resting: Option<OrderHandle>,
}

/// Outcome of [`OrderBook::add_order`], with the trades collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub trades: Vec<Trade>,
    pub remaining: Quantity,
    pub resting: Option<OrderHandle>,
}

impl Execution {
    /// The incoming order never entered the book
    pub fn is_fully_filled(&self) -> bool {
        self.remaining == 0
    }

    /// Total quantity traded
    pub fn filled_quantity(&self) -> Quantity {
        self.trades.iter().map(|t| t.quantity).sum()
    }
}

/// Running trade statistics for one book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarketStats {
    pub last_price: Option<Price>,
    pub total_volume: Quantity,
    pub trade_count: u64,
}

impl MarketStats {
    fn record(&mut self, price: Price, quantity: Quantity) {
        self.last_price = Some(price);
        self.total_volume = self.total_volume.saturating_add(quantity);
        self.trade_count += 1;
    }
}

/// One fill against the head of a level, reported back to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HeadFill {
    pub resting_id: OrderId,
    pub price: Price,
    pub quantity: Quantity,
    pub level_empty: bool,
}

/// In-memory limit order book.
#[derive(Debug)]
pub struct OrderBook {
    /// Resting order nodes, linked into level queues
    orders: Slab<OrderNode>,

    /// Bid levels keyed by price
    bids: PriceIndex<PriceLevel>,

    /// Ask levels keyed by price
    asks: PriceIndex<PriceLevel>,

    /// Order id to locator
    index: OrderIndex,

    config: BookConfig,
    stats: MarketStats,

    /// Reused trade buffer for `add_order`
    scratch: Vec<Trade>,

    bid_count: usize,
    ask_count: usize,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    /// Create an empty book with default capacities
    pub fn new() -> Self {
        Self::with_config(BookConfig::default())
    }

    /// Create an empty book sized by `config`
    pub fn with_config(config: BookConfig) -> Self {
        let preallocate = config.max_orders.min(config.order_index_buckets.saturating_mul(4));
        Self {
            orders: Slab::with_capacity(preallocate),
            bids: PriceIndex::new(),
            asks: PriceIndex::new(),
            index: OrderIndex::new(config.order_index_buckets, config.max_load_factor),
            scratch: vec![Trade::default(); config.max_trades_per_order.max(1)],
            config,
            stats: MarketStats::default(),
            bid_count: 0,
            ask_count: 0,
        }
    }

    // ========================================================================
    // Size
    // ========================================================================

    /// Total number of resting orders
    #[inline]
    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn bid_count(&self) -> usize {
        self.bid_count
    }

    #[inline]
    pub fn ask_count(&self) -> usize {
        self.ask_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of bid price levels
    #[inline]
    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    /// Number of ask price levels
    #[inline]
    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    #[inline]
    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    #[inline]
    pub fn stats(&self) -> MarketStats {
        self.stats
    }

    /// The id index, for capacity telemetry
    #[inline]
    pub fn order_index(&self) -> &OrderIndex {
        &self.index
    }

    // ========================================================================
    // Order Management
    // ========================================================================

    /// Submit `order`, collecting trades into an owned vector.
    ///
    /// Uses a buffer of `config.max_trades_per_order` trades. See
    /// [`add_order_into`](Self::add_order_into) for the semantics.
    pub fn add_order(&mut self, order: Order) -> Result<Execution, BookError> {
        let mut buffer = std::mem::take(&mut self.scratch);
        let result = self.add_order_into(order, &mut buffer);
        let execution = result.map(|placement| Execution {
            trades: buffer[..placement.trades].to_vec(),
            remaining: placement.remaining,
            resting: placement.resting,
        });
        self.scratch = buffer;
        execution
    }

    /// Submit `order`, writing trades into `trades`.
    ///
    /// 1. The order is matched against the opposite side, at most
    ///    `trades.len()` fills.
    /// 2. A fully filled order is dropped and never enters the book.
    /// 3. Otherwise the remainder rests at its limit price, creating the
    ///    level if needed, and is registered in the order index.
    ///
    /// Rejections (`InvalidOrder`, `DuplicateOrderId`, `EmptyTradeBuffer`,
    /// `CapacityExhausted`) happen before any state changes. An empty
    /// `trades` slice is rejected since the order could neither match nor
    /// safely rest against a crossing book.
    pub fn add_order_into(&mut self, mut order: Order, trades: &mut [Trade]) -> Result<Placement, BookError> {
        let side = order.side();

        if order.remaining == 0 || order.price == 0 {
            warn!(order_id = order.id, "rejected order with zero price or quantity");
            return Err(BookError::InvalidOrder { id: order.id });
        }
        if self.index.contains(order.id) {
            warn!(order_id = order.id, "rejected duplicate order id");
            return Err(BookError::DuplicateOrderId(order.id));
        }
        if trades.is_empty() {
            warn!(order_id = order.id, "rejected order with no trade buffer");
            return Err(BookError::EmptyTradeBuffer { id: order.id });
        }
        let budget = trades.len();
        self.check_capacity(&order, budget)?;

        let written = MatchingEngine::match_order(self, &mut order, trades, budget);

        if order.is_filled() {
            debug!(order_id = order.id, ?side, trades = written, "order filled on entry");
            return Ok(Placement {
                trades: written,
                remaining: 0,
                resting: None,
            });
        }

        let remaining = order.remaining;
        let handle = self.rest(order)?;
        Ok(Placement {
            trades: written,
            remaining,
            resting: Some(handle),
        })
    }

    /// Reject before matching if the remainder could not be rested.
    fn check_capacity(&self, order: &Order, max_trades: usize) -> Result<(), BookError> {
        let side = order.side();
        let needs_level = !self.tree(side).contains(order.price);
        let level_full = needs_level && self.tree(side).len() >= self.config.max_levels_per_side;
        let orders_full = self.index.len() >= self.config.max_orders;
        if !level_full && !orders_full {
            return Ok(());
        }

        let preview = MatchingEngine::preview(self, order, max_trades);
        if preview.remaining == 0 {
            return Ok(());
        }

        if level_full {
            warn!(order_id = order.id, ?side, price = order.price, "price level capacity exhausted");
            return Err(BookError::CapacityExhausted {
                resource: "price level",
                side,
                limit: self.config.max_levels_per_side,
            });
        }
        if self.index.len() - preview.consumed_orders >= self.config.max_orders {
            warn!(order_id = order.id, ?side, "order capacity exhausted");
            return Err(BookError::CapacityExhausted {
                resource: "order",
                side,
                limit: self.config.max_orders,
            });
        }
        Ok(())
    }

    /// Place an unmatched remainder at its price level.
    fn rest(&mut self, order: Order) -> Result<OrderHandle, BookError> {
        let side = order.side();
        let (id, price) = (order.id, order.price);

        let tree = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        if !tree.contains(price) {
            tree.insert(price, PriceLevel::new(price))?;
            trace!(?side, price, "price level created");
        }
        let Some(level) = tree.find_mut(price) else {
            return Err(BookError::DuplicatePrice(price));
        };
        let handle = level.push_back(&mut self.orders, order);

        if let Err(err) = self.index.insert(id, Locator { side, price, handle }) {
            level.remove(&mut self.orders, handle);
            self.release_empty_level(side, price);
            return Err(err);
        }

        match side {
            Side::Buy => self.bid_count += 1,
            Side::Sell => self.ask_count += 1,
        }
        debug!(order_id = id, ?side, price, "order resting");
        Ok(handle)
    }

    /// Cancel a resting order by id.
    ///
    /// Returns the cancelled order, or `None` if no order with this id is
    /// resting. The queue, the price index and the order index are updated
    /// together.
    pub fn cancel_order(&mut self, order_id: OrderId) -> Option<Order> {
        let locator = *self.index.find(order_id)?;

        let tree = match locator.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let level = tree.find_mut(locator.price)?;
        let order = level.remove(&mut self.orders, locator.handle)?;

        self.release_empty_level(locator.side, locator.price);
        self.index.remove(order_id);
        match locator.side {
            Side::Buy => self.bid_count -= 1,
            Side::Sell => self.ask_count -= 1,
        }

        debug!(order_id, side = ?locator.side, price = locator.price, "order cancelled");
        Some(order)
    }

    /// Remove every order and level
    pub fn clear(&mut self) {
        self.orders.clear();
        self.bids.clear();
        self.asks.clear();
        self.index.clear();
        self.stats = MarketStats::default();
        self.bid_count = 0;
        self.ask_count = 0;
    }

    // ========================================================================
    // Matching support (crate-private)
    // ========================================================================

    #[inline]
    pub(crate) fn tree(&self, side: Side) -> &PriceIndex<PriceLevel> {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    #[inline]
    pub(crate) fn order_slab(&self) -> &Slab<OrderNode> {
        &self.orders
    }

    /// Best price on `side`: highest bid or lowest ask.
    #[inline]
    pub(crate) fn best_price(&self, side: Side) -> Option<Price> {
        match side {
            Side::Buy => self.bids.max_key(),
            Side::Sell => self.asks.min_key(),
        }
    }

    /// Fill the head order of the level at `price` on `side` by up to
    /// `max_quantity`.
    ///
    /// A resting order that reaches zero is unlinked from its queue and
    /// dropped from the order index in the same step. The level itself is
    /// left in place; the caller releases it through
    /// [`release_empty_level`](Self::release_empty_level).
    pub(crate) fn fill_head(&mut self, side: Side, price: Price, max_quantity: Quantity) -> Option<HeadFill> {
        let tree = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let level = tree.find_mut(price)?;
        let head = level.peek_handle()?;

        let node = self.orders.get_mut(head.key())?;
        let quantity = node.order.fill(max_quantity);
        let resting_id = node.order.id;
        let consumed = node.order.is_filled();
        level.reduce_quantity(quantity);
        self.stats.record(price, quantity);

        if consumed {
            level.remove(&mut self.orders, head);
            self.index.remove(resting_id);
            match side {
                Side::Buy => self.bid_count -= 1,
                Side::Sell => self.ask_count -= 1,
            }
            trace!(order_id = resting_id, ?side, price, "resting order consumed");
        }

        Some(HeadFill {
            resting_id,
            price,
            quantity,
            level_empty: level.is_empty(),
        })
    }

    /// Remove the level at `price` on `side` if its queue is empty.
    ///
    /// This is the only place a level is released.
    pub(crate) fn release_empty_level(&mut self, side: Side, price: Price) -> bool {
        let tree = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        if !tree.find(price).is_some_and(PriceLevel::is_empty) {
            return false;
        }
        tree.remove(price);
        trace!(?side, price, "price level released");
        true
    }

    // ========================================================================
    // Read-only queries
    // ========================================================================

    /// Highest resting buy price
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.max_key()
    }

    /// Lowest resting sell price
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.min_key()
    }

    /// best_ask - best_bid, when both sides exist and the book is not crossed
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) if ask >= bid => Some(ask - bid),
            _ => None,
        }
    }

    pub fn best_bid_level(&self) -> Option<LevelSnapshot> {
        self.bids.max().map(PriceLevel::snapshot)
    }

    pub fn best_ask_level(&self) -> Option<LevelSnapshot> {
        self.asks.min().map(PriceLevel::snapshot)
    }

    /// Level at `price` on `side`
    pub fn level(&self, side: Side, price: Price) -> Option<LevelSnapshot> {
        self.tree(side).find(price).map(PriceLevel::snapshot)
    }

    /// Levels on `side`, best first
    pub fn levels(&self, side: Side) -> impl Iterator<Item = LevelSnapshot> + '_ {
        let iter = match side {
            Side::Buy => self.bids.iter_rev(),
            Side::Sell => self.asks.iter(),
        };
        iter.map(|(_, level)| level.snapshot())
    }

    /// Up to `limit` levels on `side`, best first
    pub fn depth(&self, side: Side, limit: usize) -> Vec<LevelSnapshot> {
        self.levels(side).take(limit).collect()
    }

    /// Resting orders at `price` on `side`, in time priority
    pub fn orders_at(&self, side: Side, price: Price) -> impl Iterator<Item = &Order> + '_ {
        self.tree(side)
            .find(price)
            .into_iter()
            .flat_map(move |level| level.iter(&self.orders).map(|(_, order)| order))
    }

    /// A resting order by id
    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        let locator = self.index.find(order_id)?;
        self.orders.get(locator.handle.key()).map(|node| &node.order)
    }

    /// Locator of a resting order
    pub fn locate(&self, order_id: OrderId) -> Option<Locator> {
        self.index.find(order_id).copied()
    }

    #[inline]
    pub fn contains_order(&self, order_id: OrderId) -> bool {
        self.index.contains(order_id)
    }

    /// SHA-256 over the SSZ encoding of every resting order, bids best
    /// first then asks best first, each level in time priority.
    pub fn compute_state_root(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        let sides = [(Side::Buy, self.bids.iter_rev()), (Side::Sell, self.asks.iter())];

        for (side, levels) in sides {
            hasher.update([u8::from(side)]);
            for (price, level) in levels {
                hasher.update(price.to_le_bytes());
                for (_, order) in level.iter(&self.orders) {
                    match ssz_rs::serialize(order) {
                        Ok(bytes) => hasher.update(&bytes),
                        Err(err) => warn!(order_id = order.id, ?err, "order skipped in state root"),
                    }
                }
            }
        }

        hasher.finalize().into()
    }

    /// [`compute_state_root`](Self::compute_state_root) as lowercase hex
    pub fn state_root_hex(&self) -> String {
        hex::encode(self.compute_state_root())
    }

    /// Verify that both price indexes, every level queue and the order
    /// index agree with each other.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut resting = 0;

        for (side, tree, reported) in [
            (Side::Buy, &self.bids, self.bid_count),
            (Side::Sell, &self.asks, self.ask_count),
        ] {
            tree.check_invariants()?;
            let mut side_total = 0;

            for (price, level) in tree.iter() {
                if level.is_empty() {
                    return Err(InvariantViolation::EmptyLevel(price));
                }

                let mut sum = 0;
                let mut count = 0;
                let mut prev: Option<usize> = None;
                for (handle, order) in level.iter(&self.orders) {
                    if self.orders[handle.key()].prev != prev || order.price != price || order.side() != side {
                        return Err(InvariantViolation::QueueLink(price));
                    }
                    let expected = Locator { side, price, handle };
                    if self.index.find(order.id) != Some(&expected) {
                        return Err(InvariantViolation::Locator(order.id));
                    }
                    sum += order.remaining;
                    count += 1;
                    prev = Some(handle.key());
                }

                if level.tail != prev {
                    return Err(InvariantViolation::QueueLink(price));
                }
                // A lone member must not point anywhere
                if count == 1 && level.head.is_some_and(|key| !self.orders[key].is_unlinked()) {
                    return Err(InvariantViolation::QueueLink(price));
                }
                if sum != level.total_quantity {
                    return Err(InvariantViolation::LevelQuantity {
                        price,
                        reported: level.total_quantity,
                        actual: sum,
                    });
                }
                if count != level.order_count {
                    return Err(InvariantViolation::LevelCount {
                        price,
                        reported: level.order_count,
                        actual: count,
                    });
                }
                side_total += count;
            }

            if side_total != reported {
                return Err(InvariantViolation::IndexCount {
                    indexed: reported,
                    resting: side_total,
                });
            }
            resting += side_total;
        }

        if self.index.len() != resting || self.orders.len() != resting {
            return Err(InvariantViolation::IndexCount {
                indexed: self.index.len(),
                resting,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
