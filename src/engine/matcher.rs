//! Price-time priority matching of one incoming order against a book.
//!
//! The engine holds no state. Each call walks the opposite side best price
//! first, consuming each level's queue from the head, and writes at most
//! `max_trades` fills into the caller's buffer.

use tracing::trace;

use crate::orderbook::OrderBook;
use crate::types::{Order, Quantity, Side, Trade};

/// Stateless matcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchingEngine;

/// What a match would do, computed without touching the book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchPreview {
    /// Quantity that would trade
    pub filled: Quantity,
    /// Quantity that would be left to rest
    pub remaining: Quantity,
    /// Number of trades that would be written
    pub trades: usize,
    /// Resting orders that would be fully consumed
    pub consumed_orders: usize,
    /// Levels that would be emptied and released
    pub exhausted_levels: usize,
}

impl MatchingEngine {
    /// Match `incoming` against the opposite side of `book`.
    ///
    /// Fills are written to `trades[0..n]` and `n` is returned. The budget is
    /// `min(max_trades, trades.len())`; when it runs out, matching stops and
    /// the rest of `incoming.remaining` is left for the caller even if it
    /// still crosses. Every trade executes at the resting order's price,
    /// carries the incoming order's timestamp and is numbered from 0.
    ///
    /// Resting orders that reach zero leave the book during the call and
    /// emptied levels are released through the book. Each fill is also
    /// folded into the book's [`MarketStats`](crate::orderbook::MarketStats).
    pub fn match_order(book: &mut OrderBook, incoming: &mut Order, trades: &mut [Trade], max_trades: usize) -> usize {
        let budget = max_trades.min(trades.len());
        if budget == 0 || incoming.remaining == 0 {
            return 0;
        }

        let side = incoming.side();
        let resting_side = side.opposite();
        let mut written = 0;

        while incoming.remaining > 0 && written < budget {
            let Some(level_price) = book.best_price(resting_side) else {
                break;
            };
            if !side.crosses(incoming.price, level_price) {
                break;
            }

            while incoming.remaining > 0 && written < budget {
                let Some(fill) = book.fill_head(resting_side, level_price, incoming.remaining) else {
                    break;
                };
                incoming.fill(fill.quantity);

                trades[written] = Trade::from_fill(
                    written as u64,
                    side,
                    incoming.id,
                    fill.resting_id,
                    fill.price,
                    fill.quantity,
                    incoming.timestamp,
                );
                written += 1;

                trace!(
                    incoming = incoming.id,
                    resting = fill.resting_id,
                    price = fill.price,
                    quantity = fill.quantity,
                    "fill"
                );

                if fill.level_empty {
                    break;
                }
            }

            if !book.release_empty_level(resting_side, level_price) {
                // Level still has orders, so the budget or the incoming
                // quantity ran out.
                break;
            }
        }

        written
    }

    /// Simulate [`match_order`](Self::match_order) without mutating `book`.
    pub fn preview(book: &OrderBook, incoming: &Order, max_trades: usize) -> MatchPreview {
        let mut preview = MatchPreview {
            remaining: incoming.remaining,
            ..MatchPreview::default()
        };
        if max_trades == 0 || incoming.remaining == 0 {
            return preview;
        }

        let side = incoming.side();
        let resting_side = side.opposite();
        let levels = match side {
            Side::Buy => book.tree(resting_side).iter(),
            Side::Sell => book.tree(resting_side).iter_rev(),
        };

        for (price, level) in levels {
            if !side.crosses(incoming.price, price) {
                break;
            }

            let mut consumed = 0;
            for (_, resting) in level.iter(book.order_slab()) {
                if preview.remaining == 0 || preview.trades == max_trades {
                    break;
                }
                let quantity = resting.remaining.min(preview.remaining);
                preview.remaining -= quantity;
                preview.filled += quantity;
                preview.trades += 1;
                if quantity == resting.remaining {
                    consumed += 1;
                }
            }

            preview.consumed_orders += consumed;
            if consumed < level.order_count {
                break;
            }
            preview.exhausted_levels += 1;
        }

        preview
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
