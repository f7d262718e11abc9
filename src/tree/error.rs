//! Error types for tree operations.
//!
//! Missing keys are not errors in this crate: lookups return `Option`.
//! The types here cover the ordering precondition of
//! [`RedBlackTree::join`](super::RedBlackTree::join) and the report produced
//! by [`RedBlackTree::validate`](super::RedBlackTree::validate).

use std::fmt;

/// Represents a failed [`RedBlackTree::join`](super::RedBlackTree::join).
///
/// Joining requires every value of the left tree to be smaller than the
/// pivot and every value of the right tree to be greater than it.
///
/// # Examples
///
/// ```rust
/// use redblack::tree::{JoinError, RedBlackTree};
///
/// let lower = RedBlackTree::from([1, 2, 9]);
/// let upper = RedBlackTree::from([6, 7]);
/// assert_eq!(
///     RedBlackTree::join(lower, 5, upper),
///     Err(JoinError::LeftNotBelowPivot)
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinError {
    /// The largest value of the left tree is not smaller than the pivot.
    LeftNotBelowPivot,
    /// The smallest value of the right tree is not greater than the pivot.
    RightNotAbovePivot,
}

impl fmt::Display for JoinError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LeftNotBelowPivot => write!(
                formatter,
                "join: the left tree holds a value not smaller than the pivot"
            ),
            Self::RightNotAbovePivot => write!(
                formatter,
                "join: the right tree holds a value not greater than the pivot"
            ),
        }
    }
}

impl std::error::Error for JoinError {}

/// Describes the first broken red-black or bookkeeping invariant found by
/// [`RedBlackTree::validate`](super::RedBlackTree::validate).
///
/// `depth` fields count edges from the root, so the root is at depth 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The root node is red.
    RedRoot,
    /// The root node has a parent link.
    RootHasParent,
    /// A red node has a red child.
    RedChildOfRed {
        /// Depth of the red child.
        depth: usize,
    },
    /// Two downward paths reach a nil leaf through different numbers of
    /// black nodes.
    BlackHeightMismatch {
        /// Black-height of the left subtree.
        left: usize,
        /// Black-height of the right subtree.
        right: usize,
        /// Depth of the node whose subtrees disagree.
        depth: usize,
    },
    /// A child's parent link does not point back at the node holding it.
    BrokenParentLink {
        /// Depth of the child with the wrong back-reference.
        depth: usize,
    },
    /// An in-order neighbour pair is not strictly increasing.
    OutOfOrder {
        /// Position of the offending value in in-order sequence.
        position: usize,
    },
    /// A node records a duplicate count of zero.
    ZeroDuplicateCount {
        /// Depth of the offending node.
        depth: usize,
    },
    /// The cached counters disagree with the nodes actually reachable.
    CountMismatch {
        /// Cached (`size`, `len`).
        recorded: (usize, usize),
        /// Counted (`size`, `len`).
        counted: (usize, usize),
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RedRoot => write!(formatter, "the root is red"),
            Self::RootHasParent => write!(formatter, "the root has a parent link"),
            Self::RedChildOfRed { depth } => {
                write!(formatter, "red node at depth {depth} has a red parent")
            }
            Self::BlackHeightMismatch { left, right, depth } => write!(
                formatter,
                "black-height mismatch at depth {depth}: left {left}, right {right}"
            ),
            Self::BrokenParentLink { depth } => {
                write!(formatter, "node at depth {depth} has a stale parent link")
            }
            Self::OutOfOrder { position } => {
                write!(formatter, "in-order sequence breaks at position {position}")
            }
            Self::ZeroDuplicateCount { depth } => {
                write!(formatter, "node at depth {depth} has a zero duplicate count")
            }
            Self::CountMismatch { recorded, counted } => write!(
                formatter,
                "recorded size/len {}/{} but found {}/{}",
                recorded.0, recorded.1, counted.0, counted.1
            ),
        }
    }
}

impl std::error::Error for InvariantViolation {}
