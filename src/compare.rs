//! Key ordering abstraction.
//!
//! The tree never imposes an ordering on key types. All comparisons go
//! through a [`Comparator`], which must implement a strict total order
//! (antisymmetric and transitive). [`NaturalOrder`] adapts types that
//! already implement [`Ord`]; [`FnComparator`] adapts any three-way
//! comparison closure.

use std::cmp::Ordering;

/// Three-way comparison between two keys.
///
/// Implementations must form a strict total order: `compare(a, b)` is the
/// inverse of `compare(b, a)`, and `a < b < c` implies `a < c`. The tree
/// relies on this when routing through separator keys.
pub trait Comparator<K> {
    /// Compare `a` against `b`, returning `Less` when `a` sorts first.
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Comparator that uses the key type's own [`Ord`] implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<K: Ord> Comparator<K> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

/// Comparator backed by a closure.
///
/// # Example
/// ```
/// use std::cmp::Ordering;
/// use bptree::{Comparator, FnComparator};
///
/// // Sort in reverse.
/// let reverse = FnComparator(|a: &i32, b: &i32| b.cmp(a));
/// assert_eq!(reverse.compare(&1, &2), Ordering::Greater);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FnComparator<F>(pub F);

impl<K, F> Comparator<K> for FnComparator<F>
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        (self.0)(a, b)
    }
}
