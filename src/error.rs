//! Error types for sharedbits.
//!
//! The bit set's own operation surface never fails: absent arrays and
//! out-of-range indices have defined fallback results. Errors only arise on
//! the decoding paths (raw bytes, bincode, serde), where untrusted input has
//! to be turned back into a valid `BitArray`.

use thiserror::Error;

/// The main error type for sharedbits operations.
#[derive(Error, Debug)]
pub enum BitsError {
    /// A zero-length array was requested; absence is `None`, never a zero-length array
    #[error("BitArray length must be positive - use None for no array")]
    ZeroLength,

    /// Byte buffer does not match the packed size for the requested length
    #[error("Invalid byte length: expected {expected}, got {actual}")]
    InvalidByteLength {
        /// Expected number of bytes
        expected: usize,
        /// Actual number of bytes received
        actual: usize,
    },

    /// Word storage does not match the word count for the declared length
    #[error("Invalid word count: expected {expected}, got {actual}")]
    InvalidWordCount {
        /// Expected number of words
        expected: usize,
        /// Actual number of words received
        actual: usize,
    },

    /// Serialization error occurred
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

/// A specialized `Result` type for sharedbits operations.
pub type Result<T> = std::result::Result<T, BitsError>;
