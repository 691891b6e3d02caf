//! Order id to locator map for O(1) cancellation.
//!
//! Separate chaining over a power-of-two bucket array with Fibonacci
//! hashing of the id. The bucket count is a capacity parameter: with
//! `max_load_factor = None` the table never resizes and chains lengthen
//! under load; with a load factor set, the table doubles and rehashes once
//! `len / buckets` exceeds it. Lookups are correct either way.

use tracing::debug;

use crate::error::BookError;
use crate::orderbook::OrderHandle;
use crate::types::{OrderId, Price, Side};

/// 2^64 / golden ratio, for multiplicative hashing
const GOLDEN: u64 = 0x9E37_79B9_7F4A_7C15;

/// Where a resting order lives: its side, its level's price, and its
/// position in that level's queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locator {
    pub side: Side,
    pub price: Price,
    pub handle: OrderHandle,
}

#[derive(Debug, Clone)]
struct Entry {
    id: OrderId,
    locator: Locator,
}

/// Chained hash map from order id to [`Locator`].
#[derive(Debug, Clone)]
pub struct OrderIndex {
    buckets: Vec<Vec<Entry>>,
    mask: usize,
    count: usize,
    max_load_factor: Option<f64>,
}

impl Default for OrderIndex {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_ORDER_INDEX_BUCKETS, Some(4.0))
    }
}

impl OrderIndex {
    /// Create an index with at least `buckets` buckets (rounded up to a
    /// power of two).
    pub fn new(buckets: usize, max_load_factor: Option<f64>) -> Self {
        let size = buckets.max(1).next_power_of_two();
        Self {
            buckets: (0..size).map(|_| Vec::new()).collect(),
            mask: size - 1,
            count: 0,
            max_load_factor: max_load_factor.filter(|lf| *lf > 0.0),
        }
    }

    /// Create a fixed-size index that never resizes
    pub fn fixed(buckets: usize) -> Self {
        Self::new(buckets, None)
    }

    #[inline]
    fn bucket_of(&self, id: OrderId) -> usize {
        (id.wrapping_mul(GOLDEN) >> 32) as usize & self.mask
    }

    /// Register `id`. Fails if the id is already present.
    pub fn insert(&mut self, id: OrderId, locator: Locator) -> Result<(), BookError> {
        if self.contains(id) {
            return Err(BookError::DuplicateOrderId(id));
        }

        let bucket = self.bucket_of(id);
        self.buckets[bucket].push(Entry { id, locator });
        self.count += 1;
        self.maybe_grow();
        Ok(())
    }

    pub fn find(&self, id: OrderId) -> Option<&Locator> {
        self.buckets[self.bucket_of(id)]
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| &entry.locator)
    }

    pub fn find_mut(&mut self, id: OrderId) -> Option<&mut Locator> {
        let bucket = self.bucket_of(id);
        self.buckets[bucket]
            .iter_mut()
            .find(|entry| entry.id == id)
            .map(|entry| &mut entry.locator)
    }

    #[inline]
    pub fn contains(&self, id: OrderId) -> bool {
        self.find(id).is_some()
    }

    /// Remove `id`, returning its locator if it was present.
    pub fn remove(&mut self, id: OrderId) -> Option<Locator> {
        let bucket = self.bucket_of(id);
        let chain = &mut self.buckets[bucket];
        let pos = chain.iter().position(|entry| entry.id == id)?;
        self.count -= 1;
        Some(chain.swap_remove(pos).locator)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.count as f64 / self.buckets.len() as f64
    }

    /// Length of the longest chain, a skew indicator for capacity tuning.
    pub fn longest_chain(&self) -> usize {
        self.buckets.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// All `(id, locator)` pairs in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (OrderId, &Locator)> + '_ {
        self.buckets
            .iter()
            .flat_map(|chain| chain.iter().map(|entry| (entry.id, &entry.locator)))
    }

    /// Remove every entry, keeping the current bucket count
    pub fn clear(&mut self) {
        self.buckets.iter_mut().for_each(Vec::clear);
        self.count = 0;
    }

    fn maybe_grow(&mut self) {
        let Some(limit) = self.max_load_factor else {
            return;
        };
        if self.load_factor() <= limit {
            return;
        }

        let size = self.buckets.len() * 2;
        let old = std::mem::replace(&mut self.buckets, (0..size).map(|_| Vec::new()).collect());
        self.mask = size - 1;
        for entry in old.into_iter().flatten() {
            let bucket = self.bucket_of(entry.id);
            self.buckets[bucket].push(entry);
        }

        debug!(buckets = size, entries = self.count, "order index resized");
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
