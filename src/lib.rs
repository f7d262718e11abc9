//! # redblack
//!
//! A mutable red-black tree with parent links and duplicate counting.
//!
//! ## Overview
//!
//! - **Balanced search**: insert, find and delete in O(log N), with the
//!   height kept below `2 * log2(n + 1)`
//! - **Duplicate counting**: equal values share one node and bump its count
//! - **Node views**: navigate parents, siblings and ommers through [`tree::NodeRef`]
//! - **Set operations**: union, intersection, difference, split and join
//! - **Self-check**: [`tree::RedBlackTree::validate`] reports the first broken invariant
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` for [`tree::RedBlackTree`]
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use redblack::prelude::*;
//!
//! let mut tree: RedBlackTree<u32> = (1..=10).collect();
//! tree.delete(&5);
//! assert_eq!(tree.len(), 9);
//! assert!(tree.validate().is_ok());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use redblack::prelude::*;
/// ```
pub mod prelude {
    pub use crate::tree::*;
}

pub mod tree;
