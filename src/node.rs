//! Node layer of the B+ tree.
//!
//! Two node variants share a common shape:
//!
//! ```text
//! Internal node                      Leaf node
//! +--------------------------+      +--------------------------+
//! | keys:     [k0, k1, k2]   |      | keys:   [k0, k1, k2]     |
//! | branches: [b0 b1 b2 b3]  |      | values: [v0, v1, v2]     |
//! +--------------------------+      +--------------------------+
//!   branches.len() == keys.len()+1    values.len() == keys.len()
//! ```
//!
//! Branch `i` of an internal node holds keys in the open interval between
//! `keys[i-1]` and `keys[i]` (unbounded at the edges). Nodes own their
//! children outright; the node graph is a tree, never shared.
//!
//! A node knows how to split itself in half when the tree layer detects
//! overflow; everything else (routing, ordering, occupancy bounds) is
//! driven from [`crate::tree`].

use crate::error::{Error, Result};

/// Bounds-checked slot storage.
///
/// A thin wrapper over `Vec` whose accessors fail with
/// [`Error::IndexOutOfRange`] instead of panicking. Insertion shifts
/// subsequent slots right and never re-sorts; callers are responsible for
/// choosing a position that preserves key order.
#[derive(Debug)]
pub(crate) struct Slots<T>(Vec<T>);

impl<T> Slots<T> {
    pub(crate) fn new() -> Self {
        Slots(Vec::new())
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the slot at `index`.
    pub(crate) fn get(&self, index: usize) -> Result<&T> {
        self.0.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.0.len(),
        })
    }

    /// Returns the slot at `index` mutably.
    pub(crate) fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.0.len();
        self.0
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })
    }

    /// Replaces the slot at `index`, returning the previous occupant.
    pub(crate) fn set(&mut self, index: usize, value: T) -> Result<T> {
        let slot = self.get_mut(index)?;
        Ok(std::mem::replace(slot, value))
    }

    /// Inserts `value` at `index`, shifting later slots right.
    ///
    /// `index == len` appends.
    pub(crate) fn insert(&mut self, index: usize, value: T) -> Result<()> {
        if index > self.0.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.0.len(),
            });
        }
        self.0.insert(index, value);
        Ok(())
    }

    /// Splits off the tail starting at `at`. Callers guarantee `at <= len`.
    fn split_off(&mut self, at: usize) -> Slots<T> {
        Slots(self.0.split_off(at))
    }

    fn pop(&mut self) -> Option<T> {
        self.0.pop()
    }

    pub(crate) fn first(&self) -> Option<&T> {
        self.0.first()
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub(crate) fn as_slice(&self) -> &[T] {
        &self.0
    }
}

/// Outcome of a node split: the key promoted to the parent and the newly
/// created right sibling. The original node keeps the left half.
#[derive(Debug)]
pub(crate) struct SplitHalf<K, V> {
    pub(crate) separator: K,
    pub(crate) sibling: Node<K, V>,
}

/// A data node: parallel runs of keys and values, kept sorted by the tree
/// layer's position scan.
#[derive(Debug)]
pub(crate) struct LeafNode<K, V> {
    pub(crate) keys: Slots<K>,
    pub(crate) values: Slots<V>,
}

impl<K, V> LeafNode<K, V> {
    pub(crate) fn new() -> Self {
        LeafNode {
            keys: Slots::new(),
            values: Slots::new(),
        }
    }

    /// Splits this leaf at the midpoint.
    ///
    /// The promoted key is the key at `len / 2`; that key and everything
    /// after it (keys and values both) move to the new sibling. Unlike an
    /// internal split, the promoted key stays in the sibling - leaves own
    /// the data, separators only route. The promotion is therefore a clone.
    pub(crate) fn split(&mut self) -> Result<SplitHalf<K, V>>
    where
        K: Clone,
    {
        let mid = self.keys.len() / 2;
        let sibling_keys = self.keys.split_off(mid);
        let sibling_values = self.values.split_off(mid);

        let separator = sibling_keys
            .first()
            .cloned()
            .ok_or(Error::Corrupted("leaf split produced an empty sibling"))?;

        Ok(SplitHalf {
            separator,
            sibling: Node::Leaf(LeafNode {
                keys: sibling_keys,
                values: sibling_values,
            }),
        })
    }
}

/// A routing node: `keys.len() + 1` owned child branches delimited by
/// separator keys.
#[derive(Debug)]
pub(crate) struct InternalNode<K, V> {
    pub(crate) keys: Slots<K>,
    pub(crate) branches: Slots<Node<K, V>>,
}

impl<K, V> InternalNode<K, V> {
    /// Builds the node created by a root split: one separator, two branches.
    pub(crate) fn from_split(separator: K, left: Node<K, V>, right: Node<K, V>) -> Self {
        InternalNode {
            keys: Slots(vec![separator]),
            branches: Slots(vec![left, right]),
        }
    }

    /// Splits this internal node at the midpoint.
    ///
    /// The key at `len / 2` is removed and promoted - it becomes the parent
    /// separator and appears in neither half. Keys after it and branches
    /// after position `len / 2` move to the sibling, leaving both halves
    /// with one more branch than keys.
    pub(crate) fn split(&mut self) -> Result<SplitHalf<K, V>> {
        // With fewer than 3 keys one half would end up with no keys (or a
        // single branch). Reachable only at branching factor 2, where the
        // algorithm cannot sustain a second internal level.
        if self.keys.len() < 3 {
            return Err(Error::Corrupted(
                "internal split would leave too few keys or branches",
            ));
        }
        let mid = self.keys.len() / 2;
        let sibling_keys = self.keys.split_off(mid + 1);
        let sibling_branches = self.branches.split_off(mid + 1);
        let separator = self
            .keys
            .pop()
            .ok_or(Error::Corrupted("internal split lost its separator"))?;

        Ok(SplitHalf {
            separator,
            sibling: Node::Internal(InternalNode {
                keys: sibling_keys,
                branches: sibling_branches,
            }),
        })
    }
}

/// A tree node, either routing (internal) or data-bearing (leaf).
#[derive(Debug)]
pub(crate) enum Node<K, V> {
    Internal(InternalNode<K, V>),
    Leaf(LeafNode<K, V>),
}

impl<K, V> Node<K, V> {
    /// Number of keys currently held.
    pub(crate) fn num_keys(&self) -> usize {
        match self {
            Node::Internal(node) => node.keys.len(),
            Node::Leaf(leaf) => leaf.keys.len(),
        }
    }

    /// Splits the node in half, returning the promoted separator and the
    /// new right sibling.
    pub(crate) fn split(&mut self) -> Result<SplitHalf<K, V>>
    where
        K: Clone,
    {
        match self {
            Node::Internal(node) => node.split(),
            Node::Leaf(leaf) => leaf.split(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_with(keys: &[i32]) -> LeafNode<i32, String> {
        let mut leaf = LeafNode::new();
        for (pos, &k) in keys.iter().enumerate() {
            leaf.keys.insert(pos, k).unwrap();
            leaf.values.insert(pos, k.to_string()).unwrap();
        }
        leaf
    }

    #[test]
    fn test_slots_get_bounds() {
        let mut slots = Slots::new();
        slots.insert(0, 10).unwrap();

        assert_eq!(slots.get(0).unwrap(), &10);
        assert_eq!(
            slots.get(1),
            Err(Error::IndexOutOfRange { index: 1, len: 1 })
        );
    }

    #[test]
    fn test_slots_insert_bounds() {
        let mut slots = Slots::new();
        slots.insert(0, 'a').unwrap();
        slots.insert(1, 'c').unwrap();
        // Middle insert shifts the tail right.
        slots.insert(1, 'b').unwrap();

        assert_eq!(slots.as_slice(), &['a', 'b', 'c']);
        assert_eq!(
            slots.insert(5, 'x'),
            Err(Error::IndexOutOfRange { index: 5, len: 3 })
        );
    }

    #[test]
    fn test_slots_set_returns_previous() {
        let mut slots = Slots::new();
        slots.insert(0, "old").unwrap();

        assert_eq!(slots.set(0, "new").unwrap(), "old");
        assert_eq!(slots.get(0).unwrap(), &"new");
        assert!(slots.set(3, "nope").is_err());
    }

    #[test]
    fn test_leaf_split_even() {
        let mut leaf = leaf_with(&[1, 2, 3, 4]);
        let half = leaf.split().unwrap();

        // Promoted key stays in the sibling.
        assert_eq!(half.separator, 3);
        assert_eq!(leaf.keys.as_slice(), &[1, 2]);
        match half.sibling {
            Node::Leaf(sibling) => {
                assert_eq!(sibling.keys.as_slice(), &[3, 4]);
                assert_eq!(sibling.values.as_slice(), &["3", "4"]);
            }
            Node::Internal(_) => panic!("leaf split must produce a leaf"),
        }
    }

    #[test]
    fn test_leaf_split_odd() {
        let mut leaf = leaf_with(&[10, 20, 30, 40, 50]);
        let half = leaf.split().unwrap();

        assert_eq!(half.separator, 30);
        assert_eq!(leaf.keys.as_slice(), &[10, 20]);
        assert_eq!(half.sibling.num_keys(), 3);
    }

    #[test]
    fn test_internal_split_removes_separator() {
        let branches = [&[1][..], &[2][..], &[3][..], &[4, 5][..]];
        let mut node = InternalNode {
            keys: Slots(vec![2, 3, 4]),
            branches: Slots(branches.iter().map(|ks| Node::Leaf(leaf_with(ks))).collect()),
        };

        let half = node.split().unwrap();

        // Separator 3 is promoted and lives in neither half.
        assert_eq!(half.separator, 3);
        assert_eq!(node.keys.as_slice(), &[2]);
        assert_eq!(node.branches.len(), 2);
        match half.sibling {
            Node::Internal(sibling) => {
                assert_eq!(sibling.keys.as_slice(), &[4]);
                assert_eq!(sibling.branches.len(), 2);
            }
            Node::Leaf(_) => panic!("internal split must produce an internal node"),
        }
    }

    #[test]
    fn test_internal_split_underflow_is_fatal() {
        let mut node: InternalNode<i32, String> = InternalNode {
            keys: Slots(vec![1, 2]),
            branches: Slots(vec![
                Node::Leaf(leaf_with(&[0])),
                Node::Leaf(leaf_with(&[1])),
                Node::Leaf(leaf_with(&[2])),
            ]),
        };

        match node.split() {
            Err(Error::Corrupted(reason)) => {
                assert_eq!(reason, "internal split would leave too few keys or branches");
            }
            other => panic!("expected corruption error, got {:?}", other),
        }
    }
}
