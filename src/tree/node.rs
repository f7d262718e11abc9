//! Nodes of the red-black tree and read-only views onto them.
//!
//! Nodes are stored in the arena owned by [`RedBlackTree`] and address each
//! other through [`NodeId`] handles. A node owns its children in the sense
//! that a child is only reachable through its parent's `left`/`right` link;
//! the `parent` link is a plain back-reference.

use std::fmt;

use super::RedBlackTree;

// =============================================================================
// Color and Side
// =============================================================================

/// The color of a red-black tree node.
///
/// Absent children are conceptual black "nil" leaves and have no color value
/// of their own.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Color {
    /// A red node. Never the root, never the parent of another red node.
    Red,
    /// A black node. Counted by the black-height.
    Black,
}

impl Color {
    /// Returns `true` for [`Color::Red`].
    #[inline]
    #[must_use]
    pub const fn is_red(self) -> bool {
        matches!(self, Self::Red)
    }

    /// The single-letter tag used by the level-order dump.
    pub(crate) const fn tag(self) -> char {
        match self {
            Self::Red => 'R',
            Self::Black => 'B',
        }
    }
}

/// A child position, also used as the direction of a rotation.
///
/// A rotation to the [`Side::Left`] lifts the pivot's right child, so the
/// pivot ends up as the left child of its former right child.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Side {
    /// The left child, or a left rotation.
    Left,
    /// The right child, or a right rotation.
    Right,
}

impl Side {
    /// Returns the other side.
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

// =============================================================================
// Node Definition
// =============================================================================

/// Stable handle of a node slot in the tree's arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct NodeId(usize);

impl NodeId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    pub(crate) const fn index(self) -> usize {
        self.0
    }
}

/// Internal node structure for the red-black tree.
#[derive(Clone, Debug)]
pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) color: Color,
    /// Number of equal insertions collapsed into this node, always >= 1.
    pub(crate) duplicate_count: usize,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    pub(crate) parent: Option<NodeId>,
}

impl<T> Node<T> {
    /// Creates a detached node with no children.
    pub(crate) const fn new(value: T, color: Color) -> Self {
        Self {
            value,
            color,
            duplicate_count: 1,
            left: None,
            right: None,
            parent: None,
        }
    }

    /// Creates a detached red node, the color every fresh insertion starts with.
    pub(crate) const fn new_red(value: T) -> Self {
        Self::new(value, Color::Red)
    }

    pub(crate) const fn is_red(&self) -> bool {
        self.color.is_red()
    }

    pub(crate) const fn child(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) const fn set_child(&mut self, side: Side, child: Option<NodeId>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    pub(crate) const fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

// =============================================================================
// NodeRef Definition
// =============================================================================

/// A read-only view of a node inside a [`RedBlackTree`].
///
/// Views are returned by [`RedBlackTree::find`] and [`RedBlackTree::root`] and
/// allow walking the structure in every direction, including upward through
/// the parent back-reference.
///
/// # Examples
///
/// ```rust
/// use redblack::tree::{Color, RedBlackTree};
///
/// let tree = RedBlackTree::from([1, 2]);
/// let root = tree.root().unwrap();
/// let right = root.right().unwrap();
///
/// assert_eq!(*root.value(), 1);
/// assert_eq!(root.color(), Color::Black);
/// assert_eq!(*right.value(), 2);
/// assert_eq!(right.color(), Color::Red);
/// assert_eq!(right.parent(), Some(root));
/// ```
pub struct NodeRef<'a, T> {
    tree: &'a RedBlackTree<T>,
    id: NodeId,
}

impl<'a, T> NodeRef<'a, T> {
    pub(crate) const fn new(tree: &'a RedBlackTree<T>, id: NodeId) -> Self {
        Self { tree, id }
    }

    pub(crate) const fn id(&self) -> NodeId {
        self.id
    }

    fn node(&self) -> &'a Node<T> {
        self.tree.node(self.id)
    }

    fn view(&self, id: Option<NodeId>) -> Option<Self> {
        id.map(|id| Self::new(self.tree, id))
    }

    /// Returns the value stored in this node.
    #[must_use]
    pub fn value(&self) -> &'a T {
        &self.node().value
    }

    /// Returns the color of this node.
    #[must_use]
    pub fn color(&self) -> Color {
        self.node().color
    }

    /// Returns `true` if this node is red.
    #[must_use]
    pub fn is_red(&self) -> bool {
        self.node().is_red()
    }

    /// Returns how many equal values were inserted into this node.
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.node().duplicate_count
    }

    /// Returns the structural parent, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.view(self.node().parent)
    }

    /// Returns the left child.
    #[must_use]
    pub fn left(&self) -> Option<Self> {
        self.view(self.node().left)
    }

    /// Returns the right child.
    #[must_use]
    pub fn right(&self) -> Option<Self> {
        self.view(self.node().right)
    }

    /// Returns the child on the given side.
    #[must_use]
    pub fn child(&self, side: Side) -> Option<Self> {
        self.view(self.node().child(side))
    }

    /// Returns the parent's parent.
    #[must_use]
    pub fn grandparent(&self) -> Option<Self> {
        self.parent().and_then(|parent| parent.parent())
    }

    /// Returns the other child of this node's parent.
    #[must_use]
    pub fn sibling(&self) -> Option<Self> {
        let parent = self.parent()?;
        let side = self.tree.side_of(self.id, parent.id());
        parent.child(side.opposite())
    }

    /// Returns the sibling of this node's parent (the classical "uncle").
    #[must_use]
    pub fn ommer(&self) -> Option<Self> {
        self.parent().and_then(|parent| parent.sibling())
    }

    /// Returns the side of its parent this node hangs on, or `None` for the root.
    #[must_use]
    pub fn side(&self) -> Option<Side> {
        self.node()
            .parent
            .map(|parent| self.tree.side_of(self.id, parent))
    }

    /// Returns `true` if both children are absent.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.node().is_leaf()
    }

    /// Returns `true` if this node is the root of its tree.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.node().parent.is_none()
    }
}

impl<T> Clone for NodeRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NodeRef<'_, T> {}

impl<T> PartialEq for NodeRef<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl<T> Eq for NodeRef<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for NodeRef<'_, T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("NodeRef")
            .field("value", self.value())
            .field("color", &self.color())
            .field("duplicate_count", &self.duplicate_count())
            .finish()
    }
}

impl<T: fmt::Display> fmt::Display for NodeRef<'_, T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.value(), self.color().tag())?;
        match self.duplicate_count() {
            1 => Ok(()),
            count => write!(formatter, "x{count}"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Side::Left, Side::Right)]
    #[case(Side::Right, Side::Left)]
    fn test_side_opposite(#[case] side: Side, #[case] expected: Side) {
        assert_eq!(side.opposite(), expected);
        assert_eq!(side.opposite().opposite(), side);
    }

    #[rstest]
    fn test_new_red_node_is_detached() {
        let node = Node::new_red(7);
        assert!(node.is_red());
        assert!(node.is_leaf());
        assert_eq!(node.duplicate_count, 1);
        assert_eq!(node.parent, None);
    }

    #[rstest]
    fn test_set_child_by_side() {
        let mut node = Node::new(0, Color::Black);
        node.set_child(Side::Right, Some(NodeId::new(3)));
        assert_eq!(node.child(Side::Right), Some(NodeId::new(3)));
        assert_eq!(node.child(Side::Left), None);
        assert!(!node.is_leaf());
    }

    #[rstest]
    fn test_node_ref_navigation() {
        // 1B(0B, 3R(2B, 5B(4R, 6R)))
        let tree = RedBlackTree::generate_sequential(7);
        let root = tree.root().unwrap();
        let four = tree.find(&4).unwrap();

        assert_eq!(*four.parent().unwrap().value(), 5);
        assert_eq!(*four.grandparent().unwrap().value(), 3);
        assert_eq!(*four.sibling().unwrap().value(), 6);
        assert_eq!(*four.ommer().unwrap().value(), 2);
        assert_eq!(four.side(), Some(Side::Left));
        assert!(four.is_leaf());
        assert!(root.is_root());
        assert_eq!(root.side(), None);
        assert_eq!(root.sibling(), None);
        assert_eq!(root.ommer(), None);
    }

    #[rstest]
    fn test_node_ref_equality_is_identity() {
        let first = RedBlackTree::from([1]);
        let second = RedBlackTree::from([1]);
        assert_eq!(first.root(), first.find(&1));
        assert_ne!(first.root(), second.root());
    }

    #[rstest]
    #[case(1, "5:B")]
    #[case(3, "5:Bx3")]
    fn test_node_ref_display(#[case] insertions: usize, #[case] expected: &str) {
        let tree: RedBlackTree<i32> = std::iter::repeat_n(5, insertions).collect();
        assert_eq!(format!("{}", tree.root().unwrap()), expected);
    }
}
