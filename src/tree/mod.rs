//! Red-black tree.
//!
//! This module provides a mutable, self-balancing ordered container:
//!
//! - [`RedBlackTree`]: the tree itself, with insert, search and delete
//! - [`NodeRef`]: a read-only view of one node and its relatives
//! - [`Iter`], [`Nodes`], [`IntoIter`]: in-order iterators
//! - [`JoinError`], [`InvariantViolation`]: error types
//!
//! # Duplicate Counting
//!
//! Each distinct value occupies exactly one node. Inserting a value that
//! compares equal to a stored one increments that node's duplicate count;
//! deleting a value removes its node whatever the count.
//!
//! # Examples
//!
//! ## Insert and Search
//!
//! ```rust
//! use redblack::tree::{Color, RedBlackTree};
//!
//! let mut tree = RedBlackTree::new();
//! for value in [5, 3, 8, 3] {
//!     tree.insert(value);
//! }
//!
//! let three = tree.find(&3).unwrap();
//! assert_eq!(three.duplicate_count(), 2);
//! assert_eq!(tree.root().unwrap().color(), Color::Black);
//! ```
//!
//! ## Delete
//!
//! ```rust
//! use redblack::tree::RedBlackTree;
//!
//! let mut tree = RedBlackTree::generate_sequential(10);
//! assert_eq!(tree.delete(&4), Some(4));
//! assert_eq!(tree.delete(&4), None);
//! assert!(tree.validate().is_ok());
//! ```
//!
//! ## Level-Order Dump
//!
//! ```rust
//! use redblack::tree::RedBlackTree;
//!
//! let tree = RedBlackTree::from([1, 2, 3]);
//! assert_eq!(tree.to_string(), "2:B\n1:R 3:R\n");
//! ```

mod error;
mod invariants;
mod iter;
mod node;
mod red_black_tree;
mod set_ops;

pub use error::InvariantViolation;
pub use error::JoinError;
pub use iter::IntoIter;
pub use iter::Iter;
pub use iter::Nodes;
pub use node::Color;
pub use node::NodeRef;
pub use node::Side;
pub use red_black_tree::DEFAULT_TREE_SIZE;
pub use red_black_tree::RedBlackTree;
