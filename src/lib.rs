//! Sharedbits - Concurrency-Safe Variable-Length Bit Sets
//!
//! Sharedbits provides [`BitArray`], a fixed-length bit set guarded by its own
//! lock, for tracking membership in a shared population: which participants
//! have reported, which peers have a piece, which validators have voted.
//!
//! # Key Characteristics
//!
//! - Every operation takes `&self` and is safe to call from any thread
//! - Boolean algebra between arrays of **different** lengths
//! - Random selection of a set bit
//! - Stable little-endian byte packing
//!
//! # Architecture
//!
//! - **BitArray** ([`bitarray`]): storage, point access, algebra, random pick
//! - **Absent arrays** ([`maybe`]): fallback rules for `Option<&BitArray>`
//! - **Codec** ([`codec`]): self-describing bincode form
//! - **Errors** ([`error`]): failures on the decoding paths
//!
//! # Length Rules for Algebra
//!
//! | operation | result length              |
//! |-----------|----------------------------|
//! | `or`      | longer of the two          |
//! | `and`     | shorter of the two         |
//! | `not`     | unchanged                  |
//! | `sub`     | unchanged (receiver's)     |
//!
//! # Examples
//!
//! ```
//! use sharedbits::BitArray;
//!
//! let seen = BitArray::new(10).unwrap();
//! for i in [2, 5, 9] {
//!     seen.set(i, true);
//! }
//! assert_eq!(seen.num_bits_set(), 3);
//! assert!(!seen.is_full());
//!
//! let late = BitArray::new(12).unwrap();
//! late.set(11, true);
//!
//! let all = &seen | &late;
//! assert_eq!(all.size(), 12);
//! assert_eq!(all.set_indices(), vec![2, 5, 9, 11]);
//! ```
//!
//! # Safety
//!
//! No `unsafe`. Locks are `parking_lot` mutexes released by guard drop on every
//! exit path, and no operation holds more than one lock at a time.

// Module declarations
pub mod bitarray;
pub mod codec;
pub mod error;
pub mod maybe;

// Re-exports for convenient access
pub use bitarray::{BitArray, Word, BITS_PER_WORD};
pub use error::{BitsError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = "Sharedbits";

/// Get version string
pub fn version() -> String {
    format!("{} v{}", NAME, VERSION)
}
