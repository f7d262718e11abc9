//! Set-style operations producing new trees.
//!
//! [`union`](RedBlackTree::union), [`intersection`](RedBlackTree::intersection),
//! [`difference`](RedBlackTree::difference) and
//! [`symmetric_difference`](RedBlackTree::symmetric_difference) look at each
//! distinct value once, so every node of their result has a duplicate count
//! of 1. [`split`](RedBlackTree::split) and [`join`](RedBlackTree::join)
//! move whole nodes and keep their counts.
//!
//! All of them walk their inputs in order and rebuild through the ordinary
//! insert path, so results satisfy every red-black invariant.

use std::cmp::Ordering;
use std::iter::Peekable;

use super::RedBlackTree;
use super::error::JoinError;
use super::iter::Iter;

/// Where a value met during a merge walk lives.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Membership {
    Left,
    Right,
    Both,
}

/// Walks two sorted trees in lockstep, yielding each distinct value once.
struct MergeWalk<'a, T> {
    left: Peekable<Iter<'a, T>>,
    right: Peekable<Iter<'a, T>>,
}

impl<'a, T: Ord> MergeWalk<'a, T> {
    fn new(left: &'a RedBlackTree<T>, right: &'a RedBlackTree<T>) -> Self {
        Self {
            left: left.iter().peekable(),
            right: right.iter().peekable(),
        }
    }
}

impl<'a, T: Ord> Iterator for MergeWalk<'a, T> {
    type Item = (&'a T, Membership);

    fn next(&mut self) -> Option<Self::Item> {
        let ordering = match (self.left.peek(), self.right.peek()) {
            (None, None) => return None,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(left), Some(right)) => left.cmp(right),
        };
        match ordering {
            Ordering::Less => self.left.next().map(|value| (value, Membership::Left)),
            Ordering::Greater => self.right.next().map(|value| (value, Membership::Right)),
            Ordering::Equal => {
                self.right.next();
                self.left.next().map(|value| (value, Membership::Both))
            }
        }
    }
}

impl<T: Ord + Clone> RedBlackTree<T> {
    fn merge_filtered<F>(&self, other: &Self, keep: F) -> Self
    where
        F: Fn(Membership) -> bool,
    {
        MergeWalk::new(self, other)
            .filter(|(_, membership)| keep(*membership))
            .map(|(value, _)| value.clone())
            .collect()
    }

    /// Returns a tree with every value present in either tree.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use redblack::tree::RedBlackTree;
    ///
    /// let left = RedBlackTree::from([1, 2, 3]);
    /// let right = RedBlackTree::from([3, 4]);
    /// let union = left.union(&right);
    /// assert_eq!(union.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    /// ```
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        self.merge_filtered(other, |_| true)
    }

    /// Returns a tree with the values present in both trees.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        self.merge_filtered(other, |membership| membership == Membership::Both)
    }

    /// Returns a tree with the values of `self` absent from `other`.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        self.merge_filtered(other, |membership| membership == Membership::Left)
    }

    /// Returns a tree with the values present in exactly one of the trees.
    #[must_use]
    pub fn symmetric_difference(&self, other: &Self) -> Self {
        self.merge_filtered(other, |membership| membership != Membership::Both)
    }

    /// Splits the tree around `pivot`.
    ///
    /// Returns the values smaller than the pivot, whether a value equal to
    /// the pivot is stored, and the values greater than the pivot. Duplicate
    /// counts carry over to the halves.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use redblack::tree::RedBlackTree;
    ///
    /// let tree = RedBlackTree::generate_sequential(10);
    /// let (lower, found, upper) = tree.split(&4);
    /// assert!(found);
    /// assert_eq!(lower.max(), Some(&3));
    /// assert_eq!(upper.min(), Some(&5));
    /// ```
    #[must_use]
    pub fn split(&self, pivot: &T) -> (Self, bool, Self) {
        let mut lower = Self::new();
        let mut upper = Self::new();
        let mut found = false;
        for node in self.nodes() {
            match node.value().cmp(pivot) {
                Ordering::Less => {
                    lower.insert_counted(node.value().clone(), node.duplicate_count());
                }
                Ordering::Greater => {
                    upper.insert_counted(node.value().clone(), node.duplicate_count());
                }
                Ordering::Equal => found = true,
            }
        }
        (lower, found, upper)
    }
}

impl<T: Ord> RedBlackTree<T> {
    /// Joins two trees separated by a pivot value into one tree.
    ///
    /// Every value of `lower` must be smaller than `pivot` and every value
    /// of `upper` greater than it. Entries of the smaller tree are moved
    /// into the larger one, keeping their duplicate counts.
    ///
    /// # Errors
    ///
    /// Returns [`JoinError`] if the ordering precondition does not hold; both
    /// trees are dropped in that case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use redblack::tree::RedBlackTree;
    ///
    /// let lower = RedBlackTree::from([1, 2]);
    /// let upper = RedBlackTree::from([8, 9, 9]);
    /// let joined = RedBlackTree::join(lower, 5, upper).unwrap();
    /// assert_eq!(joined.iter().copied().collect::<Vec<_>>(), vec![1, 2, 5, 8, 9]);
    /// assert_eq!(joined.size(), 6);
    /// ```
    pub fn join(lower: Self, pivot: T, upper: Self) -> Result<Self, JoinError> {
        if lower.max().is_some_and(|max| *max >= pivot) {
            return Err(JoinError::LeftNotBelowPivot);
        }
        if upper.min().is_some_and(|min| *min <= pivot) {
            return Err(JoinError::RightNotAbovePivot);
        }

        let (mut base, donor) = if lower.len() >= upper.len() {
            (lower, upper)
        } else {
            (upper, lower)
        };
        base.insert(pivot);
        for (value, count) in donor.drain_in_order() {
            base.insert_counted(value, count);
        }
        Ok(base)
    }
}
