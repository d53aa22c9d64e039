//! Error types for the B+ tree.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
/// This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors raised by tree operations.
///
/// A single error type keeps handling consistent across the node and tree
/// layers. Construction and structural errors are fatal; `DuplicateKey` and
/// `KeyNotFound` are recoverable by the caller (e.g. switch between `insert`
/// and `update`).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The requested branching factor cannot form a valid tree.
    ///
    /// A node needs at least two children to split, so factors below 2 are
    /// rejected at construction.
    #[error("invalid branching factor {0}: must be at least 2")]
    InvalidBranchingFactor(usize),

    /// Inserted a key that already exists while soft updates are disabled.
    ///
    /// The tree is left unchanged; the caller may retry with `update`.
    #[error("duplicate key, insertion failed")]
    DuplicateKey,

    /// Updated a key that is not present in the tree.
    #[error("key not found in the tree")]
    KeyNotFound,

    /// A slot accessor was called with an out-of-range position.
    ///
    /// This indicates a bug in the tree layer - positions are always derived
    /// from a scan of the same node.
    #[error("index {index} out of range for node with {len} slots")]
    IndexOutOfRange {
        /// The requested position.
        index: usize,
        /// Number of occupied slots at the time of the access.
        len: usize,
    },

    /// A structural invariant no longer holds.
    ///
    /// Raised when a split would leave a node without the minimum key or
    /// branch count, or when an integrity check fails.
    #[error("tree corrupted: {0}")]
    Corrupted(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidBranchingFactor(1);
        assert_eq!(
            format!("{}", err),
            "invalid branching factor 1: must be at least 2"
        );

        let err = Error::IndexOutOfRange { index: 5, len: 3 };
        assert_eq!(
            format!("{}", err),
            "index 5 out of range for node with 3 slots"
        );

        let err = Error::DuplicateKey;
        assert_eq!(format!("{}", err), "duplicate key, insertion failed");
    }

    #[test]
    fn test_result_type_alias() {
        fn might_fail() -> Result<u32> {
            Ok(42)
        }

        assert_eq!(might_fail().unwrap(), 42);
    }

    #[test]
    fn test_error_is_std_error() {
        fn assert_std_error<E: std::error::Error>() {}
        assert_std_error::<Error>();
    }
}
