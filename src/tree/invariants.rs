//! Structural self-check for [`RedBlackTree`].

use super::RedBlackTree;
use super::error::InvariantViolation;
use super::node::{Color, NodeId};

/// Totals gathered while walking the tree.
#[derive(Default)]
struct Tally {
    size: usize,
    length: usize,
}

impl<T: Ord> RedBlackTree<T> {
    /// Checks every red-black invariant and the bookkeeping counters.
    ///
    /// Verifies that the root is black and has no parent, that no red node
    /// has a red child, that all paths to a nil leaf carry the same number of
    /// black nodes, that every parent link mirrors the child link pointing
    /// at it, that values are strictly increasing in order, and that
    /// [`size`](Self::size) and [`len`](Self::len) match the nodes present.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] encountered.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use redblack::tree::RedBlackTree;
    ///
    /// let tree: RedBlackTree<u32> = (0..100).rev().collect();
    /// assert_eq!(tree.validate(), Ok(()));
    /// ```
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let mut tally = Tally::default();
        if let Some(root) = self.root_id() {
            let node = self.node(root);
            if node.parent.is_some() {
                return Err(InvariantViolation::RootHasParent);
            }
            if node.color == Color::Red {
                return Err(InvariantViolation::RedRoot);
            }
            self.check_subtree(root, 0, &mut tally)?;
        }

        let recorded = (self.size(), self.len());
        let counted = (tally.size, tally.length);
        if recorded != counted {
            return Err(InvariantViolation::CountMismatch { recorded, counted });
        }

        self.check_order()
    }

    /// Returns the black-height of the subtree rooted at `id`.
    fn check_subtree(
        &self,
        id: NodeId,
        depth: usize,
        tally: &mut Tally,
    ) -> Result<usize, InvariantViolation> {
        let node = self.node(id);
        if node.duplicate_count == 0 {
            return Err(InvariantViolation::ZeroDuplicateCount { depth });
        }
        tally.size += node.duplicate_count;
        tally.length += 1;

        let mut heights = [0; 2];
        for (slot, child) in [node.left, node.right].into_iter().enumerate() {
            let Some(child) = child else {
                continue;
            };
            let child_node = self.node(child);
            if child_node.parent != Some(id) {
                return Err(InvariantViolation::BrokenParentLink { depth: depth + 1 });
            }
            if node.is_red() && child_node.is_red() {
                return Err(InvariantViolation::RedChildOfRed { depth: depth + 1 });
            }
            heights[slot] = self.check_subtree(child, depth + 1, tally)?;
        }

        let [left, right] = heights;
        if left != right {
            return Err(InvariantViolation::BlackHeightMismatch { left, right, depth });
        }
        Ok(left + usize::from(node.color == Color::Black))
    }

    fn check_order(&self) -> Result<(), InvariantViolation> {
        self.iter()
            .zip(self.iter().skip(1))
            .position(|(previous, next)| previous >= next)
            .map_or(Ok(()), |position| {
                Err(InvariantViolation::OutOfOrder {
                    position: position + 1,
                })
            })
    }
}
