//! Binary codec for persisting and shipping bit arrays.
//!
//! [`BitArray::bytes`] drops the length, so anything that has to come back as
//! a `BitArray` on its own goes through bincode here instead: the length and
//! the packed words are written together and validated on the way back in.
//!
//! # Examples
//!
//! ```
//! use sharedbits::{codec, BitArray};
//!
//! let ba = BitArray::new(100).unwrap();
//! ba.set(42, true);
//!
//! let encoded = codec::encode(&ba).unwrap();
//! let decoded = codec::decode(&encoded).unwrap();
//! assert_eq!(decoded, ba);
//! ```

use log::debug;

use crate::bitarray::BitArray;
use crate::error::Result;

/// Encode length and words with bincode.
pub fn encode(ba: &BitArray) -> Result<Vec<u8>> {
    Ok(bincode::serialize(ba)?)
}

/// Decode an array written by [`encode`].
///
/// Fails on truncated input, a zero length, or a word count that does not
/// match the length.
pub fn decode(bytes: &[u8]) -> Result<BitArray> {
    bincode::deserialize(bytes).map_err(|e| {
        debug!("failed to decode bit array from {} bytes: {}", bytes.len(), e);
        e.into()
    })
}
