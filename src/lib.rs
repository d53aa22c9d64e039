//! bptree - an in-memory B+ tree with pluggable key comparators.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                       BPlusTree                         │
//! │  recursive insert/update/search, root promotion,        │
//! │  height + entry counters, integrity checks   (tree)     │
//! ├─────────────────────────────────────────────────────────┤
//! │                     Node layer                          │
//! │  Internal (separators + owned branches)                 │
//! │  Leaf     (keys + parallel values)                      │
//! │  split-on-overflow                            (node)    │
//! ├─────────────────────────────────────────────────────────┤
//! │  Comparator (three-way ordering seam)        (compare)  │
//! │  Error / Result                              (error)    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`tree`] - The [`BPlusTree`] map and its [`TreeOptions`]
//! - [`compare`] - The [`Comparator`] ordering seam and [`NaturalOrder`]
//! - [`error`] - Unified [`Error`] type and [`Result`] alias
//!
//! # Quick Start
//! ```
//! use bptree::{BPlusTree, TreeOptions};
//!
//! // Keys that implement Ord can use the natural ordering.
//! let mut tree = BPlusTree::ordered(4)?;
//! for (key, value) in [(3, "three"), (1, "one"), (2, "two")] {
//!     tree.insert(key, value)?;
//! }
//! assert_eq!(tree.search(&2), Some(&"two"));
//!
//! // entries() is always sorted, whatever the insertion order.
//! let keys: Vec<i32> = tree.entries().into_iter().map(|(k, _)| *k).collect();
//! assert_eq!(keys, vec![1, 2, 3]);
//! # Ok::<(), bptree::Error>(())
//! ```
//!
//! The tree is single-threaded by design: no internal locking, no I/O, no
//! suspension points. Callers that need shared access should wrap the whole
//! tree in one mutex.

pub mod compare;
pub mod error;
mod node;
pub mod tree;

// Re-export commonly used items at crate root for convenience
pub use compare::{Comparator, FnComparator, NaturalOrder};
pub use error::{Error, Result};
pub use tree::{BPlusTree, TreeOptions};
