//! Red-black tree keyed by price.
//!
//! ## Design
//!
//! Nodes live in a `Slab` and refer to each other by slab key. Slot
//! [`NIL`] holds a shared black sentinel that stands in for every leaf and
//! for the root's parent, so rotations and the delete fixup never special
//! case a missing child. The sentinel's parent link is scratch space during
//! removal, exactly as in the textbook algorithm.
//!
//! The tree orders purely by numeric price. Bids use [`PriceIndex::max`] as
//! their best level and asks use [`PriceIndex::min`].
//!
//! ## Invariants
//!
//! After every `insert` and `remove`:
//! - the root is black
//! - no red node has a red child
//! - every root-to-leaf path crosses the same number of black nodes
//!
//! [`PriceIndex::check_invariants`] verifies all of these plus key order and
//! parent links.

use std::cmp::Ordering;

use slab::Slab;

use crate::error::{BookError, InvariantViolation};
use crate::types::Price;

/// Slab key of the sentinel leaf.
const NIL: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

#[derive(Debug, Clone)]
struct TreeNode<V> {
    key: Price,
    /// `None` only for the sentinel
    value: Option<V>,
    color: Color,
    left: usize,
    right: usize,
    parent: usize,
}

impl<V> TreeNode<V> {
    fn sentinel() -> Self {
        Self {
            key: 0,
            value: None,
            color: Color::Black,
            left: NIL,
            right: NIL,
            parent: NIL,
        }
    }
}

/// Balanced ordered map from price to `V`.
///
/// Inserting an existing key is rejected rather than overwritten, so callers
/// look up before inserting.
///
/// ## Example
///
/// ```
/// use lob_core::orderbook::PriceIndex;
///
/// let mut index = PriceIndex::new();
/// index.insert(101, "b").unwrap();
/// index.insert(99, "a").unwrap();
///
/// assert_eq!(index.min_key(), Some(99));
/// assert_eq!(index.max(), Some(&"b"));
/// assert!(index.insert(99, "dup").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct PriceIndex<V> {
    nodes: Slab<TreeNode<V>>,
    root: usize,
    len: usize,
}

impl<V> Default for PriceIndex<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> PriceIndex<V> {
    /// Create an empty index
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty index with room for `capacity` keys
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Slab::with_capacity(capacity + 1);
        let nil = nodes.insert(TreeNode::sentinel());
        debug_assert_eq!(nil, NIL);
        Self { nodes, root: NIL, len: 0 }
    }

    /// Number of keys
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remove every key
    pub fn clear(&mut self) {
        self.nodes.clear();
        let nil = self.nodes.insert(TreeNode::sentinel());
        debug_assert_eq!(nil, NIL);
        self.root = NIL;
        self.len = 0;
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    fn find_node(&self, price: Price) -> usize {
        let mut x = self.root;
        while x != NIL {
            let node = &self.nodes[x];
            match price.cmp(&node.key) {
                Ordering::Less => x = node.left,
                Ordering::Greater => x = node.right,
                Ordering::Equal => return x,
            }
        }
        NIL
    }

    /// Value stored at `price`
    pub fn find(&self, price: Price) -> Option<&V> {
        self.value(self.find_node(price))
    }

    /// Mutable value stored at `price`
    pub fn find_mut(&mut self, price: Price) -> Option<&mut V> {
        let x = self.find_node(price);
        self.value_mut(x)
    }

    pub fn contains(&self, price: Price) -> bool {
        self.find_node(price) != NIL
    }

    fn value(&self, x: usize) -> Option<&V> {
        if x == NIL {
            return None;
        }
        self.nodes.get(x).and_then(|node| node.value.as_ref())
    }

    fn value_mut(&mut self, x: usize) -> Option<&mut V> {
        if x == NIL {
            return None;
        }
        self.nodes.get_mut(x).and_then(|node| node.value.as_mut())
    }

    fn minimum(&self, mut x: usize) -> usize {
        if x == NIL {
            return NIL;
        }
        while self.nodes[x].left != NIL {
            x = self.nodes[x].left;
        }
        x
    }

    fn maximum(&self, mut x: usize) -> usize {
        if x == NIL {
            return NIL;
        }
        while self.nodes[x].right != NIL {
            x = self.nodes[x].right;
        }
        x
    }

    /// Value at the lowest price
    pub fn min(&self) -> Option<&V> {
        self.value(self.minimum(self.root))
    }

    /// Value at the highest price
    pub fn max(&self) -> Option<&V> {
        self.value(self.maximum(self.root))
    }

    pub fn min_mut(&mut self) -> Option<&mut V> {
        let x = self.minimum(self.root);
        self.value_mut(x)
    }

    pub fn max_mut(&mut self) -> Option<&mut V> {
        let x = self.maximum(self.root);
        self.value_mut(x)
    }

    /// Lowest price key
    pub fn min_key(&self) -> Option<Price> {
        let x = self.minimum(self.root);
        (x != NIL).then(|| self.nodes[x].key)
    }

    /// Highest price key
    pub fn max_key(&self) -> Option<Price> {
        let x = self.maximum(self.root);
        (x != NIL).then(|| self.nodes[x].key)
    }

    // ========================================================================
    // Rotations
    // ========================================================================

    fn rotate_left(&mut self, x: usize) {
        let y = self.nodes[x].right;
        let y_left = self.nodes[y].left;

        self.nodes[x].right = y_left;
        if y_left != NIL {
            self.nodes[y_left].parent = x;
        }

        let x_parent = self.nodes[x].parent;
        self.nodes[y].parent = x_parent;
        if x_parent == NIL {
            self.root = y;
        } else if x == self.nodes[x_parent].left {
            self.nodes[x_parent].left = y;
        } else {
            self.nodes[x_parent].right = y;
        }

        self.nodes[y].left = x;
        self.nodes[x].parent = y;
    }

    fn rotate_right(&mut self, x: usize) {
        let y = self.nodes[x].left;
        let y_right = self.nodes[y].right;

        self.nodes[x].left = y_right;
        if y_right != NIL {
            self.nodes[y_right].parent = x;
        }

        let x_parent = self.nodes[x].parent;
        self.nodes[y].parent = x_parent;
        if x_parent == NIL {
            self.root = y;
        } else if x == self.nodes[x_parent].right {
            self.nodes[x_parent].right = y;
        } else {
            self.nodes[x_parent].left = y;
        }

        self.nodes[y].right = x;
        self.nodes[x].parent = y;
    }

    // ========================================================================
    // Insert
    // ========================================================================

    /// Insert `value` at `price`.
    ///
    /// Fails with [`BookError::DuplicatePrice`] if the key is already
    /// present; the existing value is left untouched.
    pub fn insert(&mut self, price: Price, value: V) -> Result<(), BookError> {
        let mut parent = NIL;
        let mut x = self.root;
        while x != NIL {
            parent = x;
            let node = &self.nodes[x];
            match price.cmp(&node.key) {
                Ordering::Less => x = node.left,
                Ordering::Greater => x = node.right,
                Ordering::Equal => return Err(BookError::DuplicatePrice(price)),
            }
        }

        let z = self.nodes.insert(TreeNode {
            key: price,
            value: Some(value),
            color: Color::Red,
            left: NIL,
            right: NIL,
            parent,
        });

        if parent == NIL {
            self.root = z;
        } else if price < self.nodes[parent].key {
            self.nodes[parent].left = z;
        } else {
            self.nodes[parent].right = z;
        }

        self.len += 1;
        self.insert_fixup(z);
        Ok(())
    }

    fn insert_fixup(&mut self, mut z: usize) {
        while self.nodes[self.nodes[z].parent].color == Color::Red {
            let p = self.nodes[z].parent;
            let g = self.nodes[p].parent;

            if p == self.nodes[g].left {
                let uncle = self.nodes[g].right;
                if self.nodes[uncle].color == Color::Red {
                    self.nodes[p].color = Color::Black;
                    self.nodes[uncle].color = Color::Black;
                    self.nodes[g].color = Color::Red;
                    z = g;
                } else {
                    if z == self.nodes[p].right {
                        z = p;
                        self.rotate_left(z);
                    }
                    let p = self.nodes[z].parent;
                    let g = self.nodes[p].parent;
                    self.nodes[p].color = Color::Black;
                    self.nodes[g].color = Color::Red;
                    self.rotate_right(g);
                }
            } else {
                let uncle = self.nodes[g].left;
                if self.nodes[uncle].color == Color::Red {
                    self.nodes[p].color = Color::Black;
                    self.nodes[uncle].color = Color::Black;
                    self.nodes[g].color = Color::Red;
                    z = g;
                } else {
                    if z == self.nodes[p].left {
                        z = p;
                        self.rotate_right(z);
                    }
                    let p = self.nodes[z].parent;
                    let g = self.nodes[p].parent;
                    self.nodes[p].color = Color::Black;
                    self.nodes[g].color = Color::Red;
                    self.rotate_left(g);
                }
            }
        }
        let root = self.root;
        self.nodes[root].color = Color::Black;
    }

    // ========================================================================
    // Remove
    // ========================================================================

    /// Replace the subtree rooted at `u` with the one rooted at `v`.
    fn transplant(&mut self, u: usize, v: usize) {
        let u_parent = self.nodes[u].parent;
        if u_parent == NIL {
            self.root = v;
        } else if u == self.nodes[u_parent].left {
            self.nodes[u_parent].left = v;
        } else {
            self.nodes[u_parent].right = v;
        }
        // May write the sentinel's parent; the fixup walk reads it.
        self.nodes[v].parent = u_parent;
    }

    /// Remove the key at `price`, returning its value.
    pub fn remove(&mut self, price: Price) -> Option<V> {
        let z = self.find_node(price);
        if z == NIL {
            return None;
        }

        let z_left = self.nodes[z].left;
        let z_right = self.nodes[z].right;
        let mut removed_color = self.nodes[z].color;
        let x;

        if z_left == NIL {
            x = z_right;
            self.transplant(z, z_right);
        } else if z_right == NIL {
            x = z_left;
            self.transplant(z, z_left);
        } else {
            // Two children: promote the in-order successor.
            let y = self.minimum(z_right);
            removed_color = self.nodes[y].color;
            x = self.nodes[y].right;

            if self.nodes[y].parent == z {
                self.nodes[x].parent = y;
            } else {
                self.transplant(y, x);
                self.nodes[y].right = z_right;
                self.nodes[z_right].parent = y;
            }

            self.transplant(z, y);
            self.nodes[y].left = z_left;
            self.nodes[z_left].parent = y;
            self.nodes[y].color = self.nodes[z].color;
        }

        if removed_color == Color::Black {
            self.delete_fixup(x);
        }

        self.nodes[NIL].parent = NIL;
        self.len -= 1;
        self.nodes.remove(z).value
    }

    fn delete_fixup(&mut self, mut x: usize) {
        while x != self.root && self.nodes[x].color == Color::Black {
            let p = self.nodes[x].parent;

            if x == self.nodes[p].left {
                let mut w = self.nodes[p].right;
                if self.nodes[w].color == Color::Red {
                    self.nodes[w].color = Color::Black;
                    self.nodes[p].color = Color::Red;
                    self.rotate_left(p);
                    w = self.nodes[self.nodes[x].parent].right;
                }

                let w_left = self.nodes[w].left;
                let w_right = self.nodes[w].right;
                if self.nodes[w_left].color == Color::Black && self.nodes[w_right].color == Color::Black {
                    self.nodes[w].color = Color::Red;
                    x = self.nodes[x].parent;
                } else {
                    if self.nodes[w_right].color == Color::Black {
                        self.nodes[w_left].color = Color::Black;
                        self.nodes[w].color = Color::Red;
                        self.rotate_right(w);
                        w = self.nodes[self.nodes[x].parent].right;
                    }
                    let p = self.nodes[x].parent;
                    self.nodes[w].color = self.nodes[p].color;
                    self.nodes[p].color = Color::Black;
                    let w_right = self.nodes[w].right;
                    self.nodes[w_right].color = Color::Black;
                    self.rotate_left(p);
                    x = self.root;
                }
            } else {
                let mut w = self.nodes[p].left;
                if self.nodes[w].color == Color::Red {
                    self.nodes[w].color = Color::Black;
                    self.nodes[p].color = Color::Red;
                    self.rotate_right(p);
                    w = self.nodes[self.nodes[x].parent].left;
                }

                let w_left = self.nodes[w].left;
                let w_right = self.nodes[w].right;
                if self.nodes[w_right].color == Color::Black && self.nodes[w_left].color == Color::Black {
                    self.nodes[w].color = Color::Red;
                    x = self.nodes[x].parent;
                } else {
                    if self.nodes[w_left].color == Color::Black {
                        self.nodes[w_right].color = Color::Black;
                        self.nodes[w].color = Color::Red;
                        self.rotate_left(w);
                        w = self.nodes[self.nodes[x].parent].left;
                    }
                    let p = self.nodes[x].parent;
                    self.nodes[w].color = self.nodes[p].color;
                    self.nodes[p].color = Color::Black;
                    let w_left = self.nodes[w].left;
                    self.nodes[w_left].color = Color::Black;
                    self.rotate_right(p);
                    x = self.root;
                }
            }
        }
        self.nodes[x].color = Color::Black;
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    fn successor(&self, mut x: usize) -> usize {
        if self.nodes[x].right != NIL {
            return self.minimum(self.nodes[x].right);
        }
        let mut y = self.nodes[x].parent;
        while y != NIL && x == self.nodes[y].right {
            x = y;
            y = self.nodes[y].parent;
        }
        y
    }

    fn predecessor(&self, mut x: usize) -> usize {
        if self.nodes[x].left != NIL {
            return self.maximum(self.nodes[x].left);
        }
        let mut y = self.nodes[x].parent;
        while y != NIL && x == self.nodes[y].left {
            x = y;
            y = self.nodes[y].parent;
        }
        y
    }

    /// Entries in ascending price order
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            index: self,
            cursor: self.minimum(self.root),
            ascending: true,
        }
    }

    /// Entries in descending price order
    pub fn iter_rev(&self) -> Iter<'_, V> {
        Iter {
            index: self,
            cursor: self.maximum(self.root),
            ascending: false,
        }
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Verify the red-black and ordering invariants.
    ///
    /// Returns the black height of the tree (sentinel leaves count as one).
    pub fn check_invariants(&self) -> Result<usize, InvariantViolation> {
        if self.nodes[NIL].color != Color::Black {
            return Err(InvariantViolation::RedRoot);
        }
        if self.nodes[self.root].color != Color::Black {
            return Err(InvariantViolation::RedRoot);
        }
        if self.root != NIL && self.nodes[self.root].parent != NIL {
            return Err(InvariantViolation::ParentLink(self.nodes[self.root].key));
        }

        let black_height = self.check_subtree(self.root)?;

        let mut count = 0;
        let mut prev: Option<Price> = None;
        for (key, _) in self.iter() {
            if let Some(prev) = prev {
                if prev >= key {
                    return Err(InvariantViolation::Ordering { prev, next: key });
                }
            }
            prev = Some(key);
            count += 1;
        }
        if count != self.len || self.nodes.len() != self.len + 1 {
            return Err(InvariantViolation::Size {
                reported: self.len,
                actual: count,
            });
        }

        Ok(black_height)
    }

    fn check_subtree(&self, x: usize) -> Result<usize, InvariantViolation> {
        if x == NIL {
            return Ok(1);
        }
        let node = &self.nodes[x];

        for child in [node.left, node.right] {
            if child == NIL {
                continue;
            }
            if self.nodes[child].parent != x {
                return Err(InvariantViolation::ParentLink(self.nodes[child].key));
            }
            if node.color == Color::Red && self.nodes[child].color == Color::Red {
                return Err(InvariantViolation::RedRed(node.key));
            }
        }

        let left = self.check_subtree(node.left)?;
        let right = self.check_subtree(node.right)?;
        if left != right {
            return Err(InvariantViolation::BlackHeight {
                price: node.key,
                left,
                right,
            });
        }

        Ok(left + usize::from(node.color == Color::Black))
    }

    /// Longest root-to-leaf path, in nodes.
    pub fn height(&self) -> usize {
        fn walk<V>(index: &PriceIndex<V>, x: usize) -> usize {
            if x == NIL {
                return 0;
            }
            let node = &index.nodes[x];
            1 + walk(index, node.left).max(walk(index, node.right))
        }
        walk(self, self.root)
    }
}

/// In-order iterator over `(price, &value)`.
pub struct Iter<'a, V> {
    index: &'a PriceIndex<V>,
    cursor: usize,
    ascending: bool,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (Price, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL {
            return None;
        }
        let x = self.cursor;
        self.cursor = if self.ascending {
            self.index.successor(x)
        } else {
            self.index.predecessor(x)
        };

        let node = &self.index.nodes[x];
        node.value.as_ref().map(|value| (node.key, value))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
