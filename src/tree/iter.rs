//! In-order iterators over a [`RedBlackTree`].

use std::iter::FusedIterator;

use smallvec::SmallVec;

use super::RedBlackTree;
use super::node::{NodeId, NodeRef};

/// Inline capacity of the traversal stack.
///
/// The stack never holds more than the tree height, which stays below
/// `2 * log2(n + 1)`, so 32 entries cover trees of about 65k values
/// without spilling to the heap.
const INLINE_STACK: usize = 32;

/// An iterator over node views in ascending value order.
///
/// Created by [`RedBlackTree::nodes`].
pub struct Nodes<'a, T> {
    tree: &'a RedBlackTree<T>,
    /// Ancestors whose value has not been yielded yet
    stack: SmallVec<[NodeId; INLINE_STACK]>,
    remaining: usize,
}

impl<'a, T> Nodes<'a, T> {
    pub(crate) fn new(tree: &'a RedBlackTree<T>, root: Option<NodeId>, remaining: usize) -> Self {
        let mut nodes = Self {
            tree,
            stack: SmallVec::new(),
            remaining,
        };
        nodes.push_left_spine(root);
        nodes
    }

    fn push_left_spine(&mut self, mut current: Option<NodeId>) {
        while let Some(id) = current {
            self.stack.push(id);
            current = self.tree.node(id).left;
        }
    }
}

impl<'a, T> Iterator for Nodes<'a, T> {
    type Item = NodeRef<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.push_left_spine(self.tree.node(id).right);
        self.remaining -= 1;
        Some(NodeRef::new(self.tree, id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Nodes<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for Nodes<'_, T> {}

/// An iterator over distinct values in ascending order.
///
/// Created by [`RedBlackTree::iter`].
pub struct Iter<'a, T> {
    nodes: Nodes<'a, T>,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) const fn new(nodes: Nodes<'a, T>) -> Self {
        Self { nodes }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.nodes.next().map(|node| node.value())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.nodes.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.nodes.len()
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

/// An owning iterator over distinct values in ascending order.
///
/// Created by `RedBlackTree::into_iter`; duplicate counts are dropped.
pub struct IntoIter<T> {
    values: std::vec::IntoIter<T>,
}

impl<T> IntoIter<T> {
    pub(crate) fn new(values: Vec<T>) -> Self {
        Self {
            values: values.into_iter(),
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.values.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.values.size_hint()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.values.len()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.values.next_back()
    }
}
