//! Tree layer of the B+ tree.
//!
//! [`BPlusTree`] owns the root node and coordinates the recursive
//! insert/update/search passes. Every mutation is a single
//! root-to-leaf-and-back traversal: descend to the position the comparator
//! picks, recurse, and on the way back up apply whatever split the child
//! reported. When the root itself splits, a new internal root adopts the old
//! root and its sibling and the tree grows one level.
//!
//! Keys live in sorted order in the leaves; internal nodes hold separator
//! keys that only route. A node may hold at most `branching_factor - 1` keys
//! and (root aside) at least `ceil(branching_factor / 2) - 1`. Splitting at
//! the midpoint preserves both bounds, which keeps every leaf at the same
//! depth - the tree is perfectly height-balanced by construction.

use std::cmp::Ordering;

use crate::compare::{Comparator, NaturalOrder};
use crate::error::{Error, Result};
use crate::node::{InternalNode, LeafNode, Node, SplitHalf};

/// Construction options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeOptions {
    /// When true, inserting an existing key overwrites its value in place
    /// instead of failing with [`Error::DuplicateKey`].
    pub soft_update: bool,
}

/// What a recursive insert call reports back to its parent.
struct InsertOutcome<K, V> {
    /// The split to apply at the parent, if this node overflowed.
    split: Option<SplitHalf<K, V>>,
    /// Whether a new entry was stored (false for soft-update overwrites).
    new_entry: bool,
}

/// An ordered key/value map backed by a B+ tree.
///
/// Keys are unique and ordered by a pluggable [`Comparator`]; values are
/// opaque. The tree supports insertion (with optional overwrite-on-duplicate
/// semantics, see [`TreeOptions`]), in-place updates, point lookups, and a
/// full sorted traversal. There is no deletion.
///
/// Not safe for concurrent mutation - wrap the whole tree in a single lock
/// if multiple threads need it.
///
/// # Example
/// ```
/// use bptree::BPlusTree;
///
/// let mut tree = BPlusTree::ordered(5)?;
/// tree.insert(20, "twenty")?;
/// tree.insert(10, "ten")?;
/// tree.insert(30, "thirty")?;
///
/// assert_eq!(tree.search(&10), Some(&"ten"));
/// assert_eq!(tree.search(&99), None);
/// assert_eq!(
///     tree.entries(),
///     vec![(&10, &"ten"), (&20, &"twenty"), (&30, &"thirty")]
/// );
/// # Ok::<(), bptree::Error>(())
/// ```
#[derive(Debug)]
pub struct BPlusTree<K, V, C = NaturalOrder> {
    root: Node<K, V>,
    branching_factor: usize,
    height: usize,
    num_entries: usize,
    comparator: C,
    options: TreeOptions,
}

impl<K: Ord, V> BPlusTree<K, V> {
    /// Creates a tree ordered by the key type's own [`Ord`] implementation.
    pub fn ordered(branching_factor: usize) -> Result<Self> {
        Self::new(branching_factor, NaturalOrder)
    }
}

impl<K, V, C> BPlusTree<K, V, C>
where
    C: Comparator<K>,
{
    /// Creates an empty tree with the default options.
    ///
    /// Fails with [`Error::InvalidBranchingFactor`] for factors below 2.
    pub fn new(branching_factor: usize, comparator: C) -> Result<Self> {
        Self::with_options(branching_factor, comparator, TreeOptions::default())
    }

    /// Creates an empty tree with explicit [`TreeOptions`].
    ///
    /// The root starts as an empty leaf: `height` is 1 and the tree holds
    /// no entries.
    pub fn with_options(
        branching_factor: usize,
        comparator: C,
        options: TreeOptions,
    ) -> Result<Self> {
        if branching_factor < 2 {
            return Err(Error::InvalidBranchingFactor(branching_factor));
        }
        Ok(BPlusTree {
            root: Node::Leaf(LeafNode::new()),
            branching_factor,
            height: 1,
            num_entries: 0,
            comparator,
            options,
        })
    }

    /// Maximum number of children an internal node may have before splitting.
    pub fn branching_factor(&self) -> usize {
        self.branching_factor
    }

    /// Number of node levels from the root down to any leaf.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of entries stored across all leaves.
    pub fn len(&self) -> usize {
        self.num_entries
    }

    /// Whether the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.num_entries == 0
    }

    /// Maximum keys a node may hold: `branching_factor - 1`.
    pub fn allowed_max_keys(&self) -> usize {
        self.branching_factor - 1
    }

    /// Minimum keys a non-root node must hold:
    /// `ceil(branching_factor / 2) - 1`.
    pub fn allowed_min_keys(&self) -> usize {
        self.branching_factor.div_ceil(2) - 1
    }

    /// Inserts a key/value entry.
    ///
    /// Duplicate keys fail with [`Error::DuplicateKey`] unless
    /// [`TreeOptions::soft_update`] is set, in which case the existing value
    /// is overwritten in place with no structural change. The duplicate
    /// check happens before any node on the path is touched, so a failed
    /// insert leaves the tree exactly as it was.
    pub fn insert(&mut self, key: K, value: V) -> Result<()>
    where
        K: Clone,
    {
        let max_keys = self.allowed_max_keys();
        let outcome = Self::insert_into(
            &self.comparator,
            self.options,
            max_keys,
            &mut self.root,
            key,
            value,
        )?;
        if outcome.new_entry {
            self.num_entries += 1;
        }
        if let Some(half) = outcome.split {
            // Root split: the old root and the new sibling become the two
            // branches of a fresh internal root.
            let old_root = std::mem::replace(&mut self.root, Node::Leaf(LeafNode::new()));
            self.root = Node::Internal(InternalNode::from_split(
                half.separator,
                old_root,
                half.sibling,
            ));
            self.height += 1;
        }
        Ok(())
    }

    fn insert_into(
        comparator: &C,
        options: TreeOptions,
        max_keys: usize,
        node: &mut Node<K, V>,
        key: K,
        value: V,
    ) -> Result<InsertOutcome<K, V>>
    where
        K: Clone,
    {
        let new_entry = match node {
            Node::Leaf(leaf) => {
                let mut pos = leaf.keys.len();
                for (i, slot) in leaf.keys.iter().enumerate() {
                    match comparator.compare(&key, slot) {
                        Ordering::Less => {
                            pos = i;
                            break;
                        }
                        Ordering::Equal => {
                            if options.soft_update {
                                leaf.values.set(i, value)?;
                                return Ok(InsertOutcome {
                                    split: None,
                                    new_entry: false,
                                });
                            }
                            return Err(Error::DuplicateKey);
                        }
                        Ordering::Greater => {}
                    }
                }
                leaf.keys.insert(pos, key)?;
                leaf.values.insert(pos, value)?;
                true
            }
            Node::Internal(internal) => {
                let pos = Self::scan_branch(comparator, internal, &key);
                let child = internal.branches.get_mut(pos)?;
                let child_outcome =
                    Self::insert_into(comparator, options, max_keys, child, key, value)?;
                if let Some(half) = child_outcome.split {
                    internal.keys.insert(pos, half.separator)?;
                    internal.branches.insert(pos + 1, half.sibling)?;
                }
                child_outcome.new_entry
            }
        };

        let split = if node.num_keys() > max_keys {
            Some(node.split()?)
        } else {
            None
        };
        Ok(InsertOutcome { split, new_entry })
    }

    /// Position of the branch to descend into: the first separator greater
    /// than `key`, or the rightmost branch. An equal separator routes right,
    /// since leaf splits keep the promoted key in the right sibling.
    fn scan_branch(comparator: &C, internal: &InternalNode<K, V>, key: &K) -> usize {
        internal
            .keys
            .iter()
            .position(|slot| comparator.compare(key, slot) == Ordering::Less)
            .unwrap_or(internal.keys.len())
    }

    /// Replaces the value stored under `key`, returning the previous value.
    ///
    /// Fails with [`Error::KeyNotFound`] when the descent reaches a leaf
    /// without an equal key.
    pub fn update(&mut self, key: &K, value: V) -> Result<V> {
        Self::update_in(&self.comparator, &mut self.root, key, value)
    }

    fn update_in(comparator: &C, node: &mut Node<K, V>, key: &K, value: V) -> Result<V> {
        match node {
            Node::Leaf(leaf) => {
                for (pos, slot) in leaf.keys.iter().enumerate() {
                    match comparator.compare(key, slot) {
                        Ordering::Equal => return leaf.values.set(pos, value),
                        Ordering::Less => break,
                        Ordering::Greater => {}
                    }
                }
                Err(Error::KeyNotFound)
            }
            Node::Internal(internal) => {
                let pos = Self::scan_branch(comparator, internal, key);
                let child = internal.branches.get_mut(pos)?;
                Self::update_in(comparator, child, key, value)
            }
        }
    }

    /// Looks up the value stored under `key`.
    ///
    /// A missing key is a query result, not an error.
    pub fn search(&self, key: &K) -> Option<&V> {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf(leaf) => {
                    let pos = leaf
                        .keys
                        .iter()
                        .position(|slot| self.comparator.compare(key, slot) == Ordering::Equal)?;
                    return leaf.values.as_slice().get(pos);
                }
                Node::Internal(internal) => {
                    let pos = Self::scan_branch(&self.comparator, internal, key);
                    node = internal.branches.as_slice().get(pos)?;
                }
            }
        }
    }

    /// All entries in comparator order, leftmost leaf to rightmost.
    pub fn entries(&self) -> Vec<(&K, &V)> {
        let mut out = Vec::with_capacity(self.num_entries);
        Self::collect_entries(&self.root, &mut out);
        out
    }

    fn collect_entries<'a>(node: &'a Node<K, V>, out: &mut Vec<(&'a K, &'a V)>) {
        match node {
            Node::Internal(internal) => {
                for branch in internal.branches.iter() {
                    Self::collect_entries(branch, out);
                }
            }
            Node::Leaf(leaf) => {
                out.extend(leaf.keys.iter().zip(leaf.values.iter()));
            }
        }
    }

    /// Removes every entry, returning the tree to its freshly constructed
    /// state: an empty leaf root, height 1, zero entries.
    pub fn clear(&mut self) {
        self.root = Node::Leaf(LeafNode::new());
        self.height = 1;
        self.num_entries = 0;
    }

    /// Verifies the structural invariants of the whole tree.
    ///
    /// Walks every node and checks:
    /// - all leaves sit at depth `height`;
    /// - internal nodes hold exactly one more branch than keys, leaves hold
    ///   one value per key;
    /// - no node exceeds [`allowed_max_keys`](Self::allowed_max_keys) and no
    ///   non-root node falls below
    ///   [`allowed_min_keys`](Self::allowed_min_keys);
    /// - every separator key equals the smallest key of its right subtree;
    /// - [`entries`](Self::entries) is strictly increasing and its length
    ///   matches [`len`](Self::len).
    ///
    /// Cheap enough for tests; a correct tree never fails this.
    pub fn check_integrity(&self) -> Result<()> {
        let mut leaf_entries = 0usize;
        self.check_node(&self.root, 1, true, &mut leaf_entries)?;
        if leaf_entries != self.num_entries {
            return Err(Error::Corrupted("entry count does not match leaf contents"));
        }

        let entries = self.entries();
        for pair in entries.windows(2) {
            if self.comparator.compare(pair[0].0, pair[1].0) != Ordering::Less {
                return Err(Error::Corrupted("entries are not strictly increasing"));
            }
        }
        Ok(())
    }

    fn check_node(
        &self,
        node: &Node<K, V>,
        depth: usize,
        is_root: bool,
        leaf_entries: &mut usize,
    ) -> Result<()> {
        if node.num_keys() > self.allowed_max_keys() {
            return Err(Error::Corrupted("node exceeds the maximum key count"));
        }
        if !is_root && node.num_keys() < self.allowed_min_keys() {
            return Err(Error::Corrupted("non-root node is below the minimum key count"));
        }
        match node {
            Node::Leaf(leaf) => {
                if depth != self.height {
                    return Err(Error::Corrupted("leaf depth does not match tree height"));
                }
                if leaf.values.len() != leaf.keys.len() {
                    return Err(Error::Corrupted("leaf keys and values diverge"));
                }
                *leaf_entries += leaf.keys.len();
            }
            Node::Internal(internal) => {
                if internal.branches.len() != internal.keys.len() + 1 {
                    return Err(Error::Corrupted("internal branch count is not keys + 1"));
                }
                for (i, key) in internal.keys.iter().enumerate() {
                    let right = internal.branches.get(i + 1)?;
                    match Self::leftmost_key(right) {
                        Some(first) if self.comparator.compare(key, first) == Ordering::Equal => {}
                        _ => {
                            return Err(Error::Corrupted(
                                "separator key missing from its right subtree",
                            ))
                        }
                    }
                }
                for branch in internal.branches.iter() {
                    self.check_node(branch, depth + 1, false, leaf_entries)?;
                }
            }
        }
        Ok(())
    }

    fn leftmost_key(node: &Node<K, V>) -> Option<&K> {
        match node {
            Node::Leaf(leaf) => leaf.keys.first(),
            Node::Internal(internal) => Self::leftmost_key(internal.branches.first()?),
        }
    }
}
