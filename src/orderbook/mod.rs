//! Order book storage: price indexes, level queues and the order index.
//!
//! ## Architecture
//!
//! - **Slab-based storage**: every resting order lives in one arena, linked
//!   into its level's queue by slab keys
//! - **Price levels**: one [`PriceLevel`] per distinct price per side, held
//!   as the value of a red-black [`PriceIndex`]
//! - **Order index**: chained hash from order id to [`Locator`]
//!
//! ## Components
//!
//! - [`OrderNode`]: `Order` plus queue links
//! - [`PriceLevel`]: FIFO queue and aggregate quantity at one price
//! - [`PriceIndex`]: ordered map from price to level
//! - [`OrderIndex`]: id lookup for cancellation
//! - [`OrderBook`]: owns all of the above and keeps them consistent
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Add order (no match) | O(log L) |
//! | Cancel order by ID | O(1) expected + O(log L) if the level empties |
//! | Best bid/ask | O(log L) |
//! | Match order | O(k + e log L) for k fills and e emptied levels |
//!
//! L is the number of levels on one side.

pub mod node;
pub mod level;
pub mod price_index;
pub mod order_index;
pub mod book;

pub use node::{OrderHandle, OrderNode};
pub use level::{LevelIter, LevelSnapshot, PriceLevel};
pub use price_index::PriceIndex;
pub use order_index::{Locator, OrderIndex};
pub use book::{Execution, MarketStats, OrderBook, Placement};
