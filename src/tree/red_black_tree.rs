//! Mutable red-black tree with parent links and duplicate counting.
//!
//! # Overview
//!
//! [`RedBlackTree`] is an ordered container that keeps itself balanced using
//! the classical red-black discipline:
//!
//! 1. Every node is either red or black
//! 2. The root is black
//! 3. A red node has no red child (absent children count as black)
//! 4. Every path from a node down to an absent child passes through the same
//!    number of black nodes
//! 5. Parent and child links agree, and the root has no parent
//!
//! These invariants keep the height below `2 * log2(n + 1)`.
//!
//! Inserting a value equal to one already stored does not create a node; it
//! bumps that node's duplicate count instead.
//!
//! # Internal Structure
//!
//! Nodes live in an arena of slots addressed by [`NodeId`]. Child links are
//! `Option<NodeId>` and each node keeps a back-reference to its parent, which
//! gives the rebalancing procedures O(1) upward steps without reference
//! cycles. Slots freed by [`RedBlackTree::delete`] are recycled.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

use log::{debug, trace};

use super::iter::{IntoIter, Iter, Nodes};
use super::node::{Color, Node, NodeId, NodeRef, Side};

/// Default number of values produced by
/// [`RedBlackTree::generate_sequential`] in tests and benchmarks.
pub const DEFAULT_TREE_SIZE: usize = 15;

// =============================================================================
// RedBlackTree Definition
// =============================================================================

/// A self-balancing ordered container based on a red-black tree.
///
/// Values must implement `Ord`. Each distinct value occupies one node;
/// repeated insertions of an equal value are counted on that node.
///
/// # Time Complexity
///
/// | Operation          | Complexity |
/// |--------------------|------------|
/// | `new`              | O(1)       |
/// | `insert`           | O(log N)   |
/// | `find`/`contains`  | O(log N)   |
/// | `delete`           | O(log N)   |
/// | `min`/`max`        | O(log N)   |
/// | `height`           | O(N)       |
/// | `size`/`len`       | O(1)       |
///
/// # Examples
///
/// ```rust
/// use redblack::tree::RedBlackTree;
///
/// let mut tree = RedBlackTree::new();
/// tree.insert(3);
/// tree.insert(1);
/// tree.insert(2);
/// tree.insert(2);
///
/// assert!(tree.contains(&2));
/// assert_eq!(tree.find(&2).unwrap().duplicate_count(), 2);
/// assert_eq!(tree.size(), 4);
/// assert_eq!(tree.len(), 3);
/// assert_eq!(tree.iter().collect::<Vec<_>>(), vec![&1, &2, &3]);
/// ```
#[derive(Clone)]
pub struct RedBlackTree<T> {
    /// Node arena; `None` marks a vacant slot
    slots: Vec<Option<Node<T>>>,
    /// Vacant slots available for reuse
    vacant: Vec<NodeId>,
    root: Option<NodeId>,
    /// Insertions currently represented, duplicates included
    size: usize,
    /// Number of distinct nodes
    length: usize,
}

impl<T> RedBlackTree<T> {
    /// Creates a new empty tree.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use redblack::tree::RedBlackTree;
    ///
    /// let tree: RedBlackTree<i32> = RedBlackTree::new();
    /// assert!(tree.is_empty());
    /// assert_eq!(tree.height(), 0);
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
            root: None,
            size: 0,
            length: 0,
        }
    }

    /// Returns the number of insertions the tree represents, counting every
    /// duplicate.
    ///
    /// Deleting a value subtracts its whole duplicate count.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use redblack::tree::RedBlackTree;
    ///
    /// let tree = RedBlackTree::from([4, 4, 4, 7]);
    /// assert_eq!(tree.size(), 4);
    /// ```
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns the number of distinct values (nodes) in the tree.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the tree holds no values.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of nodes on the longest root-to-leaf path.
    ///
    /// An empty tree has height 0 and a single node has height 1.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use redblack::tree::RedBlackTree;
    ///
    /// let tree = RedBlackTree::generate_sequential(7);
    /// assert_eq!(tree.height(), 4);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.height_from(self.root)
    }

    /// Recursive helper for height.
    fn height_from(&self, node: Option<NodeId>) -> usize {
        node.map_or(0, |id| {
            let node = self.node(id);
            1 + self.height_from(node.left).max(self.height_from(node.right))
        })
    }

    /// Returns a view of the root node.
    #[must_use]
    pub fn root(&self) -> Option<NodeRef<'_, T>> {
        self.root.map(|id| NodeRef::new(self, id))
    }

    /// Returns the smallest value.
    #[must_use]
    pub fn min(&self) -> Option<&T> {
        self.root
            .map(|root| &self.node(self.extreme(root, Side::Left)).value)
    }

    /// Returns the largest value.
    #[must_use]
    pub fn max(&self) -> Option<&T> {
        self.root
            .map(|root| &self.node(self.extreme(root, Side::Right)).value)
    }

    /// Returns an iterator over distinct values in ascending order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use redblack::tree::RedBlackTree;
    ///
    /// let tree = RedBlackTree::from([3, 1, 2, 1]);
    /// let values: Vec<&i32> = tree.iter().collect();
    /// assert_eq!(values, vec![&1, &2, &3]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.nodes())
    }

    /// Returns an iterator over node views in ascending order.
    #[must_use]
    pub fn nodes(&self) -> Nodes<'_, T> {
        Nodes::new(self, self.root, self.length)
    }

    // =========================================================================
    // Arena Access
    // =========================================================================

    pub(crate) fn node(&self, id: NodeId) -> &Node<T> {
        match self.slots.get(id.index()) {
            Some(Some(node)) => node,
            _ => panic!("dangling node handle {id:?}"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        match self.slots.get_mut(id.index()) {
            Some(Some(node)) => node,
            _ => panic!("dangling node handle {id:?}"),
        }
    }

    pub(crate) const fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    /// Stores a node in a vacant slot, or a new one.
    fn allocate(&mut self, node: Node<T>) -> NodeId {
        if let Some(id) = self.vacant.pop() {
            debug!("reusing vacant slot {id:?}");
            self.slots[id.index()] = Some(node);
            id
        } else {
            self.slots.push(Some(node));
            NodeId::new(self.slots.len() - 1)
        }
    }

    /// Takes a node out of its slot and marks the slot vacant.
    fn release(&mut self, id: NodeId) -> Node<T> {
        match self.slots.get_mut(id.index()).and_then(Option::take) {
            Some(node) => {
                self.vacant.push(id);
                node
            }
            None => panic!("released vacant slot {id:?}"),
        }
    }

    fn is_red(&self, id: Option<NodeId>) -> bool {
        id.is_some_and(|id| self.node(id).is_red())
    }

    fn set_color(&mut self, id: NodeId, color: Color) {
        self.node_mut(id).color = color;
    }

    #[cfg(test)]
    pub(crate) fn paint(&mut self, id: NodeId, color: Color) {
        self.set_color(id, color);
    }

    /// Returns which side of `parent` holds `child`.
    pub(crate) fn side_of(&self, child: NodeId, parent: NodeId) -> Side {
        let parent_node = self.node(parent);
        if parent_node.left == Some(child) {
            Side::Left
        } else {
            debug_assert_eq!(parent_node.right, Some(child), "stale parent link");
            Side::Right
        }
    }

    /// Follows `side` links from `id` until the last node on that spine.
    fn extreme(&self, mut id: NodeId, side: Side) -> NodeId {
        while let Some(next) = self.node(id).child(side) {
            id = next;
        }
        id
    }

    /// Points whatever held `old` (its parent, or the root slot) at `new`.
    ///
    /// `old` must still be linked under `parent` when this is called.
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            Some(parent) => {
                let side = self.side_of(old, parent);
                self.node_mut(parent).set_child(side, new);
            }
            None => {
                debug!("root replaced: {:?} -> {new:?}", self.root);
                self.root = new;
            }
        }
    }

    // =========================================================================
    // Rotation
    // =========================================================================

    /// Rotates around `pivot` in the given direction.
    ///
    /// A left rotation lifts the pivot's right child into the pivot's place
    /// and hangs the pivot as that child's left child; the child's former
    /// left subtree becomes the pivot's right subtree. A right rotation is
    /// the mirror image. Colors are left untouched and the in-order sequence
    /// is preserved.
    ///
    /// # Panics
    ///
    /// Panics, before changing anything, if the child to be lifted is absent.
    pub(crate) fn rotate(&mut self, pivot: NodeId, direction: Side) {
        let lifted_side = direction.opposite();
        let Some(child) = self.node(pivot).child(lifted_side) else {
            panic!("cannot rotate {direction:?} around {pivot:?}: no {lifted_side:?} child");
        };
        trace!("rotate {direction:?} around {pivot:?}, lifting {child:?}");

        let parent = self.node(pivot).parent;
        let inner = self.node(child).child(direction);

        self.node_mut(pivot).set_child(lifted_side, inner);
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(pivot);
        }

        self.replace_child(parent, pivot, Some(child));
        self.node_mut(child).parent = parent;

        self.node_mut(child).set_child(direction, Some(pivot));
        self.node_mut(pivot).parent = Some(child);
    }

    // =========================================================================
    // Insert Rebalancing
    // =========================================================================

    /// Restores the invariants after `node` was attached as a red leaf.
    ///
    /// Walks upward while the current node and its parent are both red. A
    /// red ommer is handled by recoloring and continuing at the grandparent;
    /// a black or absent ommer is resolved here with at most two rotations.
    pub(crate) fn rebalance_after_insert(&mut self, mut node: NodeId) {
        loop {
            let Some(parent) = self.node(node).parent else {
                break;
            };
            if !self.node(parent).is_red() {
                break;
            }
            // A red parent is never the root.
            let Some(grandparent) = self.node(parent).parent else {
                break;
            };
            let parent_side = self.side_of(parent, grandparent);
            let ommer = self.node(grandparent).child(parent_side.opposite());

            if let Some(ommer) = ommer.filter(|&id| self.node(id).is_red()) {
                trace!("recolor around {grandparent:?}: red ommer {ommer:?}");
                self.set_color(parent, Color::Black);
                self.set_color(ommer, Color::Black);
                self.set_color(grandparent, Color::Red);
                node = grandparent;
                continue;
            }

            // Straighten a zig-zag into a line before the outer rotation.
            let mut top = parent;
            if self.side_of(node, parent) != parent_side {
                self.rotate(parent, parent_side);
                top = node;
            }
            self.rotate(grandparent, parent_side.opposite());
            self.set_color(top, Color::Black);
            self.set_color(grandparent, Color::Red);
            break;
        }

        if let Some(root) = self.root {
            self.set_color(root, Color::Black);
        }
    }

    // =========================================================================
    // Delete Rebalancing
    // =========================================================================

    /// Detaches a node with at most one child and repairs the colors.
    fn unlink(&mut self, id: NodeId) -> Node<T> {
        let (child, parent, color) = {
            let node = self.node(id);
            debug_assert!(node.left.is_none() || node.right.is_none());
            (node.left.or(node.right), node.parent, node.color)
        };
        let side = parent.map(|parent| self.side_of(id, parent));

        self.replace_child(parent, id, child);
        if let Some(child) = child {
            self.node_mut(child).parent = parent;
        }
        let removed = self.release(id);

        if color == Color::Black {
            match (child, parent.zip(side)) {
                (Some(child), _) if self.node(child).is_red() => {
                    self.set_color(child, Color::Black);
                }
                (_, Some((parent, side))) => self.rebalance_after_delete(parent, side),
                _ => {}
            }
        }
        removed
    }

    /// Repairs a subtree that is one black node short.
    ///
    /// The short subtree hangs on `side` of `parent` and may be empty. Each
    /// round either resolves the deficit with rotations or pushes it one
    /// level up by recoloring the sibling red.
    fn rebalance_after_delete(&mut self, mut parent: NodeId, mut side: Side) {
        loop {
            let Some(mut sibling) = self.node(parent).child(side.opposite()) else {
                unreachable!("doubly black position under {parent:?} has no sibling");
            };

            if self.node(sibling).is_red() {
                trace!("red sibling {sibling:?}: rotate {side:?} around {parent:?}");
                self.set_color(sibling, Color::Black);
                self.set_color(parent, Color::Red);
                self.rotate(parent, side);
                let Some(next) = self.node(parent).child(side.opposite()) else {
                    unreachable!("red sibling without black children under {parent:?}");
                };
                sibling = next;
            }

            let near = self.node(sibling).child(side);
            let far = self.node(sibling).child(side.opposite());
            let near_red = near.filter(|&id| self.node(id).is_red());

            if !self.is_red(far) {
                if let Some(near) = near_red {
                    trace!("near red nephew {near:?}: rotate around {sibling:?}");
                    self.set_color(near, Color::Black);
                    self.set_color(sibling, Color::Red);
                    self.rotate(sibling, side.opposite());
                    sibling = near;
                } else {
                    trace!("black nephews: recolor {sibling:?} red");
                    self.set_color(sibling, Color::Red);
                    if self.node(parent).is_red() {
                        self.set_color(parent, Color::Black);
                        return;
                    }
                    match self.node(parent).parent {
                        Some(grandparent) => {
                            side = self.side_of(parent, grandparent);
                            parent = grandparent;
                            continue;
                        }
                        None => return,
                    }
                }
            }

            trace!("far red nephew: rotate {side:?} around {parent:?}");
            let parent_color = self.node(parent).color;
            self.set_color(sibling, parent_color);
            self.set_color(parent, Color::Black);
            if let Some(far) = self.node(sibling).child(side.opposite()) {
                self.set_color(far, Color::Black);
            }
            self.rotate(parent, side);
            return;
        }
    }

    /// Consumes the tree, returning `(value, duplicate_count)` pairs in
    /// ascending order.
    pub(crate) fn drain_in_order(mut self) -> Vec<(T, usize)> {
        let mut entries = Vec::with_capacity(self.length);
        let mut stack: Vec<NodeId> = Vec::new();
        let mut current = self.root;
        // Links stay readable until each node is taken.
        loop {
            while let Some(id) = current {
                stack.push(id);
                current = self.node(id).left;
            }
            let Some(id) = stack.pop() else {
                break;
            };
            current = self.node(id).right;
            let node = self.release(id);
            entries.push((node.value, node.duplicate_count));
        }
        entries
    }

    /// Exchanges the payloads (value and duplicate count) of two nodes,
    /// leaving links and colors in place.
    fn swap_payload(&mut self, first: NodeId, second: NodeId) {
        let (low, high) = if first.index() < second.index() {
            (first, second)
        } else {
            (second, first)
        };
        assert_ne!(low, high, "cannot swap a node with itself");
        let (head, tail) = self.slots.split_at_mut(high.index());
        match (head[low.index()].as_mut(), tail[0].as_mut()) {
            (Some(low_node), Some(high_node)) => {
                std::mem::swap(&mut low_node.value, &mut high_node.value);
                std::mem::swap(&mut low_node.duplicate_count, &mut high_node.duplicate_count);
            }
            _ => panic!("dangling node handle in swap of {first:?} and {second:?}"),
        }
    }
}

impl<T: Ord> RedBlackTree<T> {
    /// Inserts a value.
    ///
    /// If an equal value is already stored, its duplicate count is
    /// incremented, the new value is dropped, and the shape of the tree is
    /// unchanged. Otherwise a red node is attached below the last node
    /// visited and the tree is rebalanced.
    ///
    /// Returns `true` if a new node was created.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use redblack::tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// assert!(tree.insert(5));
    /// assert!(!tree.insert(5));
    /// assert_eq!(tree.find(&5).unwrap().duplicate_count(), 2);
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        self.insert_counted(value, 1)
    }

    /// Inserts `count` copies of `value` in one step.
    pub(crate) fn insert_counted(&mut self, value: T, count: usize) -> bool {
        debug_assert!(count > 0);
        self.size += count;

        let Some(mut current) = self.root else {
            let mut node = Node::new(value, Color::Black);
            node.duplicate_count = count;
            self.root = Some(self.allocate(node));
            self.length += 1;
            return true;
        };

        loop {
            let side = match value.cmp(&self.node(current).value) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => {
                    self.node_mut(current).duplicate_count += count;
                    return false;
                }
            };
            match self.node(current).child(side) {
                Some(next) => current = next,
                None => {
                    let mut node = Node::new_red(value);
                    node.duplicate_count = count;
                    node.parent = Some(current);
                    let id = self.allocate(node);
                    self.node_mut(current).set_child(side, Some(id));
                    self.length += 1;
                    self.rebalance_after_insert(id);
                    return true;
                }
            }
        }
    }

    /// Returns a view of the node holding a value equal to `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use redblack::tree::RedBlackTree;
    ///
    /// let tree = RedBlackTree::from(["b".to_string(), "a".to_string()]);
    /// assert_eq!(tree.find("a").map(|node| node.value().as_str()), Some("a"));
    /// assert!(tree.find("z").is_none());
    /// ```
    #[must_use]
    pub fn find<Q>(&self, key: &Q) -> Option<NodeRef<'_, T>>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_id(key).map(|id| NodeRef::new(self, id))
    }

    fn find_id<Q>(&self, key: &Q) -> Option<NodeId>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(id) = current {
            let node = self.node(id);
            current = match key.cmp(node.value.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    /// Returns `true` if a value equal to `key` is stored.
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_id(key).is_some()
    }

    /// Returns how many times a value equal to `key` is stored (0 if absent).
    #[must_use]
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_id(key)
            .map_or(0, |id| self.node(id).duplicate_count)
    }

    /// Removes the node holding a value equal to `key`, returning its value.
    ///
    /// The whole node goes, whatever its duplicate count, and
    /// [`size`](Self::size) drops by that count. A node with two children
    /// takes the payload of its in-order successor, which is then removed
    /// in its place. Returns `None` and leaves the tree untouched if the key
    /// is absent.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use redblack::tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::generate_sequential(7);
    /// assert_eq!(tree.delete(&99_999), None);
    /// assert_eq!(tree.delete(&6), Some(6));
    /// assert_eq!(tree.delete(&1), Some(1));
    /// assert!(!tree.contains(&1));
    /// assert!(tree.validate().is_ok());
    /// ```
    pub fn delete<Q>(&mut self, key: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let target = self.find_id(key)?;
        let doomed = match (self.node(target).left, self.node(target).right) {
            (Some(_), Some(right)) => {
                let successor = self.extreme(right, Side::Left);
                self.swap_payload(target, successor);
                successor
            }
            _ => target,
        };

        let removed = self.unlink(doomed);
        self.size -= removed.duplicate_count;
        self.length -= 1;
        if self.root.is_none() {
            self.slots.clear();
            self.vacant.clear();
        }
        Some(removed.value)
    }

    /// Removes every value.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl RedBlackTree<usize> {
    /// Builds a tree holding `0..count`, inserted in ascending order.
    ///
    /// Ascending insertion is the worst case for an unbalanced search tree,
    /// which makes this a convenient fixture for tests and benchmarks.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use redblack::tree::{DEFAULT_TREE_SIZE, RedBlackTree};
    ///
    /// let tree = RedBlackTree::generate_sequential(DEFAULT_TREE_SIZE);
    /// assert_eq!(tree.size(), 15);
    /// assert_eq!(tree.min(), Some(&0));
    /// assert_eq!(tree.max(), Some(&14));
    /// ```
    #[must_use]
    pub fn generate_sequential(count: usize) -> Self {
        (0..count).collect()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for RedBlackTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> FromIterator<T> for RedBlackTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord> Extend<T> for RedBlackTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for RedBlackTree<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T> IntoIterator for RedBlackTree<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(
            self.drain_in_order()
                .into_iter()
                .map(|(value, _)| value)
                .collect(),
        )
    }
}

impl<'a, T> IntoIterator for &'a RedBlackTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq> PartialEq for RedBlackTree<T> {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size
            && self.length == other.length
            && self.nodes().zip(other.nodes()).all(|(left, right)| {
                left.value() == right.value() && left.duplicate_count() == right.duplicate_count()
            })
    }
}

impl<T: Eq> Eq for RedBlackTree<T> {}

impl<T: fmt::Debug> fmt::Debug for RedBlackTree<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_map()
            .entries(self.nodes().map(|node| (node.value(), node.duplicate_count())))
            .finish()
    }
}

/// Level-order dump: one line per depth, nodes left to right.
impl<T: fmt::Display> fmt::Display for RedBlackTree<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut level: Vec<NodeRef<'_, T>> = self.root().into_iter().collect();
        while !level.is_empty() {
            for (position, node) in level.iter().enumerate() {
                if position > 0 {
                    write!(formatter, " ")?;
                }
                write!(formatter, "{node}")?;
            }
            writeln!(formatter)?;
            level = level
                .iter()
                .flat_map(|node| node.left().into_iter().chain(node.right()))
                .collect();
        }
        Ok(())
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for RedBlackTree<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;

        let mut sequence = serializer.serialize_seq(Some(self.size))?;
        for node in self.nodes() {
            for _ in 0..node.duplicate_count() {
                sequence.serialize_element(node.value())?;
            }
        }
        sequence.end()
    }
}

#[cfg(feature = "serde")]
struct RedBlackTreeVisitor<T> {
    marker: std::marker::PhantomData<T>,
}

#[cfg(feature = "serde")]
impl<T> RedBlackTreeVisitor<T> {
    const fn new() -> Self {
        Self {
            marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::de::Visitor<'de> for RedBlackTreeVisitor<T>
where
    T: serde::Deserialize<'de> + Ord,
{
    type Value = RedBlackTree<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut tree = RedBlackTree::new();
        while let Some(value) = access.next_element()? {
            tree.insert(value);
        }
        Ok(tree)
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for RedBlackTree<T>
where
    T: serde::Deserialize<'de> + Ord,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(RedBlackTreeVisitor::new())
    }
}

static_assertions::assert_impl_all!(RedBlackTree<i32>: Send, Sync, Clone, Default);
static_assertions::assert_impl_all!(RedBlackTree<String>: Send, Sync);

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn in_order(tree: &RedBlackTree<i32>) -> Vec<i32> {
        tree.iter().copied().collect()
    }

    fn id_of(tree: &RedBlackTree<i32>, value: i32) -> NodeId {
        tree.find(&value).unwrap().id()
    }

    fn shape(tree: &RedBlackTree<i32>) -> String {
        format!("{tree}")
    }

    /// Builds a tree of black nodes from (value, parent value, side) triples,
    /// bypassing rebalancing so rotations can be exercised on fixed shapes.
    fn build_unbalanced(root: i32, children: &[(i32, i32, Side)]) -> RedBlackTree<i32> {
        let mut tree = RedBlackTree::new();
        let root_id = tree.allocate(Node::new(root, Color::Black));
        tree.root = Some(root_id);
        tree.size = 1;
        tree.length = 1;
        for &(value, parent, side) in children {
            let parent_id = id_of(&tree, parent);
            let mut node = Node::new(value, Color::Black);
            node.parent = Some(parent_id);
            let id = tree.allocate(node);
            tree.node_mut(parent_id).set_child(side, Some(id));
            tree.size += 1;
            tree.length += 1;
        }
        tree
    }

    // =========================================================================
    // Rotation Tests
    // =========================================================================

    #[rstest]
    fn test_rotate_left_at_root_promotes_right_child() {
        // 2(1, 4(3, 5))
        let mut tree = build_unbalanced(
            2,
            &[
                (1, 2, Side::Left),
                (4, 2, Side::Right),
                (3, 4, Side::Left),
                (5, 4, Side::Right),
            ],
        );
        let before = in_order(&tree);
        tree.rotate(id_of(&tree, 2), Side::Left);

        let root = tree.root().unwrap();
        assert_eq!(*root.value(), 4);
        assert!(root.parent().is_none());
        let two = root.left().unwrap();
        assert_eq!(*two.value(), 2);
        assert_eq!(two.parent(), Some(root));
        assert_eq!(*two.right().unwrap().value(), 3);
        assert_eq!(two.right().unwrap().parent(), Some(two));
        assert_eq!(*root.right().unwrap().value(), 5);
        assert_eq!(in_order(&tree), before);
    }

    #[rstest]
    fn test_rotate_right_below_root_reattaches_to_parent() {
        // 10(-, 8(6(5, 7), 9))
        let mut tree = build_unbalanced(
            10,
            &[
                (8, 10, Side::Left),
                (6, 8, Side::Left),
                (9, 8, Side::Right),
                (5, 6, Side::Left),
                (7, 6, Side::Right),
            ],
        );
        let before = in_order(&tree);
        tree.rotate(id_of(&tree, 8), Side::Right);

        let root = tree.root().unwrap();
        assert_eq!(*root.value(), 10);
        let six = root.left().unwrap();
        assert_eq!(*six.value(), 6);
        assert_eq!(six.parent(), Some(root));
        let eight = six.right().unwrap();
        assert_eq!(*eight.value(), 8);
        assert_eq!(eight.parent(), Some(six));
        assert_eq!(*eight.left().unwrap().value(), 7);
        assert_eq!(eight.left().unwrap().parent(), Some(eight));
        assert_eq!(*eight.right().unwrap().value(), 9);
        assert_eq!(in_order(&tree), before);
    }

    #[rstest]
    fn test_rotate_without_inner_subtree() {
        let mut tree = build_unbalanced(1, &[(2, 1, Side::Right)]);
        tree.rotate(id_of(&tree, 1), Side::Left);

        let root = tree.root().unwrap();
        assert_eq!(*root.value(), 2);
        assert_eq!(*root.left().unwrap().value(), 1);
        assert!(root.left().unwrap().is_leaf());
        assert!(root.right().is_none());
    }

    #[rstest]
    fn test_rotate_is_reversible() {
        let mut tree = RedBlackTree::from([4, 2, 6, 1, 3, 5, 7]);
        let before = shape(&tree);
        let pivot = tree.root_id().unwrap();
        tree.rotate(pivot, Side::Right);
        assert_ne!(shape(&tree), before);
        tree.rotate(tree.root_id().unwrap(), Side::Left);
        assert_eq!(shape(&tree), before);
    }

    #[rstest]
    #[should_panic(expected = "cannot rotate Left")]
    fn test_rotate_without_child_panics() {
        let mut tree = RedBlackTree::from([2, 1]);
        let root = tree.root_id().unwrap();
        tree.rotate(root, Side::Left);
    }

    #[rstest]
    fn test_rotate_keeps_colors() {
        let mut tree = RedBlackTree::from([2, 1, 3]);
        let root = tree.root_id().unwrap();
        tree.rotate(root, Side::Left);
        assert_eq!(tree.find(&2).unwrap().color(), Color::Black);
        assert_eq!(tree.find(&3).unwrap().color(), Color::Red);
    }

    /// Asserts that every child points back at its parent and the root has none.
    fn assert_parent_links(tree: &RedBlackTree<i32>) {
        if let Some(root) = tree.root() {
            assert_eq!(root.parent(), None);
        }
        for node in tree.nodes() {
            for child in [node.left(), node.right()].into_iter().flatten() {
                assert_eq!(child.parent(), Some(node));
            }
        }
    }

    proptest! {
        /// Any legal rotation keeps the in-order sequence and parent links
        /// intact, and the opposite rotation around the lifted child undoes it.
        #[test]
        fn prop_rotation_preserves_order(
            values in prop::collection::btree_set(-500_i32..500, 2..80),
            pick in any::<prop::sample::Index>()
        ) {
            let mut tree: RedBlackTree<i32> = values.into_iter().collect();
            let candidates: Vec<(NodeId, Side)> = tree
                .nodes()
                .flat_map(|node| {
                    [Side::Left, Side::Right]
                        .into_iter()
                        .filter(move |direction| node.child(direction.opposite()).is_some())
                        .map(move |direction| (node.id(), direction))
                })
                .collect();
            let (pivot, direction) = *pick.get(&candidates);

            let order_before = in_order(&tree);
            let shape_before = shape(&tree);
            let length_before = tree.nodes().count();

            tree.rotate(pivot, direction);
            prop_assert_eq!(in_order(&tree), order_before);
            prop_assert_eq!(tree.nodes().count(), length_before);
            assert_parent_links(&tree);

            let Some(lifted) = tree.node(pivot).parent else {
                panic!("rotated pivot lost its parent");
            };
            tree.rotate(lifted, direction.opposite());
            prop_assert_eq!(shape(&tree), shape_before);
            assert_parent_links(&tree);
        }
    }

    // =========================================================================
    // Insert Tests
    // =========================================================================

    #[rstest]
    fn test_insert_into_empty_makes_black_root() {
        let mut tree = RedBlackTree::new();
        assert!(tree.insert(1));
        assert_eq!(shape(&tree), "1:B\n");
    }

    #[rstest]
    fn test_insert_second_value_is_red_right_child() {
        let tree = RedBlackTree::from([1, 2]);
        assert_eq!(shape(&tree), "1:B\n2:R\n");
    }

    #[rstest]
    #[case::straight_right(vec![1, 2, 3], "2:B\n1:R 3:R\n")]
    #[case::straight_left(vec![3, 2, 1], "2:B\n1:R 3:R\n")]
    #[case::zig_zag_left(vec![3, 1, 2], "2:B\n1:R 3:R\n")]
    #[case::zig_zag_right(vec![1, 3, 2], "2:B\n1:R 3:R\n")]
    fn test_insert_black_ommer_rotations(#[case] values: Vec<i32>, #[case] expected: &str) {
        let tree: RedBlackTree<i32> = values.into_iter().collect();
        assert_eq!(shape(&tree), expected);
        assert_eq!(tree.validate(), Ok(()));
    }

    #[rstest]
    fn test_insert_red_ommer_recolors() {
        let tree = RedBlackTree::from([2, 1, 3, 4]);
        assert_eq!(shape(&tree), "2:B\n1:B 3:B\n4:R\n");
    }

    #[rstest]
    fn test_insert_red_ommer_propagates_upward() {
        let tree = RedBlackTree::generate_sequential(7);
        assert_eq!(shape_usize(&tree), "1:B\n0:B 3:R\n2:B 5:B\n4:R 6:R\n");
        let tree = RedBlackTree::generate_sequential(8);
        // 7 recolors 4 and 6, then 5 meets red 3 with black ommer 0.
        assert_eq!(
            shape_usize(&tree),
            "3:B\n1:R 5:R\n0:B 2:B 4:B 6:B\n7:R\n"
        );
    }

    fn shape_usize(tree: &RedBlackTree<usize>) -> String {
        format!("{tree}")
    }

    #[rstest]
    fn test_insert_duplicate_keeps_shape() {
        let mut tree = RedBlackTree::from([2, 1, 3]);
        let before = shape(&tree);
        assert!(!tree.insert(1));
        assert_eq!(tree.size(), 4);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.count(&1), 2);
        assert_eq!(shape(&tree), before.replace("1:R", "1:Rx2"));
    }

    // =========================================================================
    // Delete Tests
    // =========================================================================

    #[rstest]
    fn test_delete_red_leaf() {
        let mut tree = RedBlackTree::from([2, 1, 3]);
        assert_eq!(tree.delete(&3), Some(3));
        assert_eq!(shape(&tree), "2:B\n1:R\n");
    }

    #[rstest]
    fn test_delete_black_node_with_red_child() {
        let mut tree = RedBlackTree::from([2, 1, 3, 4]);
        assert_eq!(tree.delete(&3), Some(3));
        assert_eq!(shape(&tree), "2:B\n1:B 4:B\n");
        assert_eq!(tree.validate(), Ok(()));
    }

    #[rstest]
    fn test_delete_root_with_two_children_uses_successor() {
        let mut tree = RedBlackTree::from([2, 1, 3]);
        assert_eq!(tree.delete(&2), Some(2));
        assert_eq!(shape(&tree), "3:B\n1:R\n");
    }

    #[rstest]
    fn test_delete_black_leaf_with_black_nephews() {
        let mut tree = RedBlackTree::from([2, 1, 3, 4]);
        tree.delete(&4);
        // 2B(1B, 3B): removing 1 leaves a double black, sibling 3 turns red.
        assert_eq!(tree.delete(&1), Some(1));
        assert_eq!(shape(&tree), "2:B\n3:R\n");
        assert_eq!(tree.validate(), Ok(()));
    }

    #[rstest]
    fn test_delete_black_leaf_with_far_red_nephew() {
        let mut tree = RedBlackTree::from([2, 1, 3, 4]);
        assert_eq!(tree.delete(&1), Some(1));
        assert_eq!(shape(&tree), "3:B\n2:B 4:B\n");
    }

    #[rstest]
    fn test_delete_black_leaf_with_near_red_nephew() {
        // 2B(1B, 4B(3R, -))
        let mut tree = RedBlackTree::from([2, 1, 4, 3]);
        assert_eq!(shape(&tree), "2:B\n1:B 4:B\n3:R\n");
        assert_eq!(tree.delete(&1), Some(1));
        assert_eq!(shape(&tree), "3:B\n2:B 4:B\n");
    }

    #[rstest]
    fn test_delete_black_leaf_with_red_sibling() {
        // 1B(0B, 3R(2B, 5B(4R, 6R)))
        let mut tree = RedBlackTree::generate_sequential(7);
        assert_eq!(tree.delete(&0), Some(0));
        assert_eq!(tree.validate(), Ok(()));
        assert_eq!(
            tree.iter().copied().collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5, 6]
        );
    }

    #[rstest]
    fn test_delete_last_value_empties_arena() {
        let mut tree = RedBlackTree::from([1]);
        assert_eq!(tree.delete(&1), Some(1));
        assert!(tree.is_empty());
        assert!(tree.slots.is_empty());
        assert_eq!(shape(&tree), "");
    }

    #[rstest]
    fn test_delete_reuses_vacant_slots() {
        let mut tree = RedBlackTree::from([1, 2, 3, 4]);
        tree.delete(&4);
        tree.insert(5);
        assert_eq!(tree.slots.len(), 4);
        assert!(tree.vacant.is_empty());
    }

    #[rstest]
    fn test_delete_drops_whole_duplicate_count() {
        let mut tree = RedBlackTree::from([7, 7, 7, 8]);
        assert_eq!(tree.delete(&7), Some(7));
        assert_eq!(tree.size(), 1);
        assert_eq!(tree.len(), 1);
    }

    #[rstest]
    fn test_swap_payload_moves_counts() {
        let mut tree = RedBlackTree::from([1, 2, 2]);
        let (one, two) = (id_of(&tree, 1), id_of(&tree, 2));
        tree.swap_payload(one, two);
        assert_eq!(tree.node(one).value, 2);
        assert_eq!(tree.node(one).duplicate_count, 2);
        assert_eq!(tree.node(two).value, 1);
    }

    #[rstest]
    fn test_into_iter_yields_sorted_values() {
        let tree = RedBlackTree::from([5, 3, 8, 1, 4]);
        assert_eq!(tree.into_iter().collect::<Vec<_>>(), vec![1, 3, 4, 5, 8]);
    }

    #[rstest]
    fn test_debug_lists_counts() {
        let tree = RedBlackTree::from([2, 1, 2]);
        assert_eq!(format!("{tree:?}"), "{1: 1, 2: 2}");
    }

    #[rstest]
    fn test_eq_ignores_shape() {
        let ascending = RedBlackTree::from([1, 2, 3, 4, 5]);
        let mixed = RedBlackTree::from([4, 2, 5, 1, 3]);
        assert_ne!(shape(&ascending), shape(&mixed));
        assert_eq!(ascending, mixed);
        assert_ne!(ascending, RedBlackTree::from([1, 2, 3, 4, 5, 5]));
    }

    #[rstest]
    fn test_clear() {
        let mut tree = RedBlackTree::from([1, 2, 3]);
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.size(), 0);
    }
}
