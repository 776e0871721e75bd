//! Operations over a possibly-absent bit array.
//!
//! A `BitArray` always has a positive length; "no array" is `None`. Callers
//! that keep an `Option<BitArray>` (for instance, "no votes seen yet") use
//! these functions to get the defined fallback for every operation instead of
//! matching on the option at each call site:
//!
//! | operation       | absent receiver                |
//! |-----------------|--------------------------------|
//! | `size`          | `0`                            |
//! | `get` / `set`   | `false`                        |
//! | `or`            | copy of `other`                |
//! | `and` / `not`   | `None`                         |
//! | `sub`           | `None`                         |
//! | `is_empty`      | `true`                         |
//! | `is_full`       | `true`                         |
//! | `pick_random`   | `None`                         |
//! | `bytes`         | empty                          |
//! | `update`        | no-op                          |
//!
//! An absent array is both empty and full. That is kept as-is for callers
//! that already depend on it; do not build new logic on the "full" half.
//!
//! An absent `other` contributes nothing to `or`. It makes `and` absent, and
//! `sub` too, since `sub` reduces to `and` of the absent `not(other)`.
//!
//! # Examples
//!
//! ```
//! use sharedbits::{maybe, BitArray};
//!
//! let seen: Option<BitArray> = None;
//! let vote = BitArray::new(4).unwrap();
//! vote.set(2, true);
//!
//! let seen = maybe::or(seen.as_ref(), Some(&vote));
//! assert_eq!(maybe::size(seen.as_ref()), 4);
//! assert!(maybe::get(seen.as_ref(), 2));
//! ```

use rand::Rng;

use crate::bitarray::BitArray;

/// Length, or 0 when absent.
pub fn size(ba: Option<&BitArray>) -> usize {
    ba.map_or(0, BitArray::size)
}

/// Bit `i`, or `false` when absent.
pub fn get(ba: Option<&BitArray>, i: usize) -> bool {
    ba.map_or(false, |ba| ba.get(i))
}

/// Assign bit `i`; `false` when absent or out of range.
pub fn set(ba: Option<&BitArray>, i: usize, v: bool) -> bool {
    ba.map_or(false, |ba| ba.set(i, v))
}

/// Deep copy, or `None` when absent.
pub fn copy(ba: Option<&BitArray>) -> Option<BitArray> {
    ba.map(BitArray::copy)
}

/// Set bit count, or 0 when absent.
pub fn num_bits_set(ba: Option<&BitArray>) -> usize {
    ba.map_or(0, BitArray::num_bits_set)
}

/// Union; an absent side contributes nothing.
pub fn or(ba: Option<&BitArray>, other: Option<&BitArray>) -> Option<BitArray> {
    match (ba, other) {
        (Some(ba), Some(other)) => Some(ba.or(other)),
        (Some(ba), None) => Some(ba.copy()),
        (None, other) => copy(other),
    }
}

/// Intersection; absent if either side is absent.
pub fn and(ba: Option<&BitArray>, other: Option<&BitArray>) -> Option<BitArray> {
    Some(ba?.and(other?))
}

/// Complement, or `None` when absent.
pub fn not(ba: Option<&BitArray>) -> Option<BitArray> {
    ba.map(BitArray::not)
}

/// Difference; absent if either side is absent.
pub fn sub(ba: Option<&BitArray>, other: Option<&BitArray>) -> Option<BitArray> {
    Some(ba?.sub(other?))
}

/// Emptiness; absent counts as empty.
pub fn is_empty(ba: Option<&BitArray>) -> bool {
    ba.map_or(true, BitArray::is_empty)
}

/// Fullness; absent counts as full.
pub fn is_full(ba: Option<&BitArray>) -> bool {
    ba.map_or(true, BitArray::is_full)
}

/// Random set bit using the thread-local RNG; `None` when absent.
pub fn pick_random(ba: Option<&BitArray>) -> Option<usize> {
    ba?.pick_random()
}

/// Random set bit using `rng`; `None` when absent.
pub fn pick_random_with<R: Rng>(ba: Option<&BitArray>, rng: &mut R) -> Option<usize> {
    ba?.pick_random_with(rng)
}

/// Packed bytes; empty when absent.
pub fn bytes(ba: Option<&BitArray>) -> Vec<u8> {
    ba.map(BitArray::bytes).unwrap_or_default()
}

/// Bulk overwrite from `other`; no-op when either side is absent.
pub fn update(ba: Option<&BitArray>, other: Option<&BitArray>) {
    if let (Some(ba), Some(other)) = (ba, other) {
        ba.update(other);
    }
}

/// Text rendering; `nil-BitArray` when absent.
pub fn describe(ba: Option<&BitArray>, indent: &str) -> String {
    match ba {
        Some(ba) => ba.describe(indent),
        None => "nil-BitArray".to_string(),
    }
}
