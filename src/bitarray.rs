//! BitArray - concurrency-safe bit set over packed 64-bit words.
//!
//! # Design
//!
//! - Uses `Vec<u64>` for storage, behind a per-instance `parking_lot::Mutex`
//! - Bit indexing: word_idx = bit_idx / 64, bit_offset = bit_idx % 64
//! - Length is fixed per instance and always positive; "no array" is `None`
//!   (see [`crate::maybe`] for the absent-array rules)
//! - Algebra between arrays of different lengths produces new instances
//!
//! Bits past the logical length in the final word ("straggler bits") are
//! don't-care. [`BitArray::not`] flips them along with everything else, so no
//! operation may read them as meaningful.
//!
//! # Locking
//!
//! Every public operation holds the receiver's lock for its whole duration.
//! Operations taking a second array snapshot it under its own lock first and
//! release that lock before locking the receiver, so no operation ever holds
//! two locks at once and `a.or(&a)` cannot deadlock.
//!
//! # Examples
//!
//! ```
//! use sharedbits::BitArray;
//!
//! let votes = BitArray::new(10).unwrap();
//! votes.set(2, true);
//! votes.set(5, true);
//! assert_eq!(votes.num_bits_set(), 2);
//! assert_eq!(votes.set_indices(), vec![2, 5]);
//! ```

use log::{debug, error, trace};
use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{BitAnd, BitOr, Not, Sub};

use crate::error::{BitsError, Result};

/// Word type for bit storage (64-bit unsigned integer)
pub type Word = u64;

/// Number of bits per word
pub const BITS_PER_WORD: usize = 64;

/// Maximum word value
pub const WORD_MAX: Word = Word::MAX;

/// Number of bytes per serialized word
const BYTES_PER_WORD: usize = BITS_PER_WORD / 8;

/// Get word index from bit position
#[inline(always)]
const fn get_word_idx(bit_pos: usize) -> usize {
    bit_pos >> 6 // bit_pos / 64
}

/// Get bit index within word from bit position
#[inline(always)]
const fn get_bit_idx(bit_pos: usize) -> usize {
    bit_pos & 63 // bit_pos % 64
}

/// Number of words needed to hold `num_bits`
#[inline(always)]
const fn words_for(num_bits: usize) -> usize {
    num_bits.div_ceil(BITS_PER_WORD)
}

/// Meaningful bits held by the final word, in `1..=64` for positive lengths
#[inline(always)]
const fn last_word_bits(num_bits: usize) -> usize {
    match num_bits % BITS_PER_WORD {
        0 => BITS_PER_WORD,
        rem => rem,
    }
}

/// Create bitmask with n bits set (from LSB)
#[inline(always)]
const fn bitmask(n: usize) -> Word {
    if n == 0 {
        0
    } else if n >= BITS_PER_WORD {
        WORD_MAX
    } else {
        WORD_MAX >> (BITS_PER_WORD - n)
    }
}

// =============================================================================
// Lock-protected state
// =============================================================================

/// Packed storage guarded by the array's mutex.
///
/// Field names match the persisted form: `{"bits": .., "elems": [..]}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct Words {
    #[serde(rename = "bits")]
    num_bits: usize,
    #[serde(rename = "elems")]
    words: Vec<Word>,
}

impl Words {
    fn zeroed(num_bits: usize) -> Self {
        Self {
            num_bits,
            words: vec![0; words_for(num_bits)],
        }
    }

    /// Last word with straggler bits cleared.
    #[inline]
    fn masked_last(&self) -> Word {
        let last = self.words.len() - 1;
        self.words[last] & bitmask(last_word_bits(self.num_bits))
    }

    fn clear_stragglers(&mut self) {
        let last = self.words.len() - 1;
        self.words[last] = self.masked_last();
    }

    /// Copy of this storage with a different logical length.
    ///
    /// Growing zero-fills the new words and clears the old stragglers so they
    /// do not become meaningful bits. Shrinking drops whole words.
    fn resized(&self, num_bits: usize) -> Self {
        let mut c = self.clone();
        if num_bits > self.num_bits {
            c.clear_stragglers();
        }
        c.words.resize(words_for(num_bits), 0);
        c.num_bits = num_bits;
        c
    }

    #[inline]
    fn get(&self, i: usize) -> bool {
        if i >= self.num_bits {
            return false;
        }
        (self.words[get_word_idx(i)] >> get_bit_idx(i)) & 1 == 1
    }

    #[inline]
    fn set(&mut self, i: usize, v: bool) -> bool {
        if i >= self.num_bits {
            trace!("ignoring write to bit {} of {}-bit array", i, self.num_bits);
            return false;
        }
        let mask: Word = 1 << get_bit_idx(i);
        if v {
            self.words[get_word_idx(i)] |= mask;
        } else {
            self.words[get_word_idx(i)] &= !mask;
        }
        true
    }

    fn num_set(&self) -> usize {
        let last = self.words.len() - 1;
        let body: usize = self.words[..last]
            .iter()
            .map(|w| w.count_ones() as usize)
            .sum();
        body + self.masked_last().count_ones() as usize
    }

    fn or(&self, other: &Words) -> Words {
        let mut c = self.resized(self.num_bits.max(other.num_bits));
        let last = other.words.len() - 1;
        for (i, w) in other.words[..last].iter().enumerate() {
            c.words[i] |= w;
        }
        // The shorter operand contributes nothing past its own length.
        c.words[last] |= other.masked_last();
        c
    }

    fn and(&self, other: &Words) -> Words {
        let mut c = self.resized(self.num_bits.min(other.num_bits));
        for (dst, src) in c.words.iter_mut().zip(other.words.iter()) {
            *dst &= src;
        }
        c
    }

    fn not(&self) -> Words {
        Words {
            num_bits: self.num_bits,
            words: self.words.iter().map(|w| !w).collect(),
        }
    }

    fn sub(&self, other: &Words) -> Words {
        if self.num_bits <= other.num_bits {
            return self.and(&other.not());
        }

        let mut c = self.clone();
        let last = other.words.len() - 1;
        for (dst, src) in c.words[..last].iter_mut().zip(other.words.iter()) {
            *dst &= !src;
        }
        // Final overlapping word: only `other`'s meaningful bits may clear.
        for idx in (last * BITS_PER_WORD)..other.num_bits {
            let keep = c.get(idx) && !other.get(idx);
            c.set(idx, keep);
        }
        c
    }

    fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    fn is_full(&self) -> bool {
        let last = self.words.len() - 1;
        if self.words[..last].iter().any(|&w| w != WORD_MAX) {
            return false;
        }
        let mask = bitmask(last_word_bits(self.num_bits));
        self.words[last] & mask == mask
    }

    fn pick_random<R: Rng>(&self, rng: &mut R) -> Option<usize> {
        let length = self.words.len();
        if length == 0 {
            return None;
        }

        let start_word = rng.gen_range(0..length);
        for i in 0..length {
            let word_idx = (i + start_word) % length;
            let word = self.words[word_idx];
            let base = word_idx * BITS_PER_WORD;

            if word_idx < length - 1 {
                if word == 0 {
                    continue;
                }
                let start_bit = rng.gen_range(0..BITS_PER_WORD);
                for j in 0..BITS_PER_WORD {
                    let bit_idx = (j + start_bit) % BITS_PER_WORD;
                    if (word >> bit_idx) & 1 == 1 {
                        return Some(base + bit_idx);
                    }
                }
                error!(
                    "word {} reads {:#x} but holds no set bit (array of {} bits)",
                    word_idx, word, self.num_bits
                );
                panic!("Panicked on a sanity check: non-zero word with no set bit");
            } else {
                // Final word: scan only its meaningful bits, never stragglers.
                let width = last_word_bits(self.num_bits);
                let start_bit = rng.gen_range(0..width);
                for j in 0..width {
                    let bit_idx = (j + start_bit) % width;
                    if (word >> bit_idx) & 1 == 1 {
                        return Some(base + bit_idx);
                    }
                }
            }
        }
        None
    }

    fn bytes(&self) -> Vec<u8> {
        let num_bytes = self.num_bits.div_ceil(8);
        let mut bytes = Vec::with_capacity(self.words.len() * BYTES_PER_WORD);
        for word in &self.words {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        bytes.truncate(num_bytes);
        bytes
    }

    fn set_indices(&self) -> Vec<usize> {
        let mut acts = Vec::with_capacity(self.num_set());
        for (word_idx, &word) in self.words.iter().enumerate() {
            if word == 0 {
                continue;
            }
            let base = word_idx * BITS_PER_WORD;
            for bit_idx in 0..BITS_PER_WORD {
                let bit_pos = base + bit_idx;
                if bit_pos >= self.num_bits {
                    break;
                }
                if (word >> bit_idx) & 1 == 1 {
                    acts.push(bit_pos);
                }
            }
        }
        acts
    }

    fn describe(&self, indent: &str) -> String {
        let mut lines = Vec::new();
        let mut bits = String::new();
        for i in 0..self.num_bits {
            bits.push(if self.get(i) { 'X' } else { '_' });
            if i % 100 == 99 {
                lines.push(std::mem::take(&mut bits));
            }
            if i % 10 == 9 {
                bits.push(' ');
            }
            if i % 50 == 49 {
                bits.push(' ');
            }
        }
        if !bits.is_empty() {
            lines.push(bits);
        }
        format!("BA{{{}:{}}}", self.num_bits, lines.join(indent))
    }

    /// Compare meaningful bits only.
    fn same_bits(&self, other: &Words) -> bool {
        if self.num_bits != other.num_bits {
            return false;
        }
        let last = self.words.len() - 1;
        self.words[..last] == other.words[..last] && self.masked_last() == other.masked_last()
    }
}

// =============================================================================
// BitArray
// =============================================================================

/// Fixed-length bit set, safe to share between threads.
///
/// All operations take `&self`; mutation goes through the internal lock.
/// Wrap in `Arc` to share across threads.
pub struct BitArray {
    inner: Mutex<Words>,
}

impl BitArray {
    /// Create a new BitArray with `num_bits` bits, all clear.
    ///
    /// Returns `None` for `num_bits == 0`: there is no zero-length array,
    /// absence is represented by `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharedbits::BitArray;
    ///
    /// let ba = BitArray::new(100).unwrap();
    /// assert_eq!(ba.size(), 100);
    /// assert!(ba.is_empty());
    /// assert!(BitArray::new(0).is_none());
    /// ```
    pub fn new(num_bits: usize) -> Option<Self> {
        if num_bits == 0 {
            return None;
        }
        Some(Self::from_words(Words::zeroed(num_bits)))
    }

    fn from_words(words: Words) -> Self {
        debug_assert!(words.num_bits > 0);
        debug_assert_eq!(words.words.len(), words_for(words.num_bits));
        Self {
            inner: Mutex::new(words),
        }
    }

    /// Validate decoded storage before wrapping it.
    fn from_decoded(words: Words) -> Result<Self> {
        if words.num_bits == 0 {
            return Err(BitsError::ZeroLength);
        }
        let expected = words_for(words.num_bits);
        if words.words.len() != expected {
            debug!(
                "rejecting {}-bit array with {} words",
                words.num_bits,
                words.words.len()
            );
            return Err(BitsError::InvalidWordCount {
                expected,
                actual: words.words.len(),
            });
        }
        Ok(Self::from_words(words))
    }

    /// Rebuild an array from the output of [`BitArray::bytes`].
    ///
    /// The length is not recoverable from the bytes and must be supplied.
    /// Bits past `num_bits` in the final byte are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharedbits::BitArray;
    ///
    /// let ba = BitArray::new(12).unwrap();
    /// ba.set(3, true);
    /// ba.set(11, true);
    ///
    /// let restored = BitArray::from_bytes(12, &ba.bytes()).unwrap();
    /// assert_eq!(restored, ba);
    /// ```
    pub fn from_bytes(num_bits: usize, bytes: &[u8]) -> Result<Self> {
        if num_bits == 0 {
            return Err(BitsError::ZeroLength);
        }
        let expected = num_bits.div_ceil(8);
        if bytes.len() != expected {
            debug!(
                "rejecting {} bytes for a {}-bit array",
                bytes.len(),
                num_bits
            );
            return Err(BitsError::InvalidByteLength {
                expected,
                actual: bytes.len(),
            });
        }

        let words = bytes
            .chunks(BYTES_PER_WORD)
            .map(|chunk| {
                let mut buf = [0u8; BYTES_PER_WORD];
                buf[..chunk.len()].copy_from_slice(chunk);
                Word::from_le_bytes(buf)
            })
            .collect();
        let mut words = Words { num_bits, words };
        words.clear_stragglers();
        Ok(Self::from_words(words))
    }

    /// Clone the current state under this array's lock.
    fn snapshot(&self) -> Words {
        self.inner.lock().clone()
    }

    // =========================================================================
    // Single Bit Operations
    // =========================================================================

    /// Get number of bits in array.
    #[inline]
    pub fn size(&self) -> usize {
        self.inner.lock().num_bits
    }

    /// Get bit `i`. Indices past the end read as not set.
    #[inline]
    pub fn get(&self, i: usize) -> bool {
        self.inner.lock().get(i)
    }

    /// Assign bit `i` to `v`.
    ///
    /// Returns `false` and changes nothing when `i` is past the end.
    #[inline]
    pub fn set(&self, i: usize, v: bool) -> bool {
        self.inner.lock().set(i, v)
    }

    /// Deep copy with its own lock.
    pub fn copy(&self) -> BitArray {
        Self::from_words(self.snapshot())
    }

    /// Count set bits in `[0, size)`.
    pub fn num_bits_set(&self) -> usize {
        self.inner.lock().num_set()
    }

    // =========================================================================
    // Multi-size Algebra
    // =========================================================================

    /// Union. The result is as long as the longer operand.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharedbits::BitArray;
    ///
    /// let a = BitArray::new(4).unwrap();
    /// let b = BitArray::new(70).unwrap();
    /// a.set(1, true);
    /// b.set(69, true);
    ///
    /// let c = a.or(&b);
    /// assert_eq!(c.size(), 70);
    /// assert_eq!(c.set_indices(), vec![1, 69]);
    /// ```
    pub fn or(&self, other: &BitArray) -> BitArray {
        let other = other.snapshot();
        let this = self.inner.lock();
        Self::from_words(this.or(&other))
    }

    /// Intersection. The result is as long as the shorter operand.
    pub fn and(&self, other: &BitArray) -> BitArray {
        let other = other.snapshot();
        let this = self.inner.lock();
        Self::from_words(this.and(&other))
    }

    /// Complement of every storage word, straggler bits included.
    #[allow(clippy::should_implement_trait)]
    pub fn not(&self) -> BitArray {
        Self::from_words(self.inner.lock().not())
    }

    /// Difference: bits set here and not set in `other`.
    ///
    /// When this array is longer, bits past `other`'s length are kept as-is
    /// and the result keeps this array's length. Otherwise the result is
    /// `self AND (NOT other)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharedbits::BitArray;
    ///
    /// let a = BitArray::new(8).unwrap();
    /// let b = BitArray::new(5).unwrap();
    /// for i in 0..3 {
    ///     a.set(i, true);
    /// }
    /// b.set(0, true);
    ///
    /// let d = a.sub(&b);
    /// assert_eq!(d.size(), 8);
    /// assert_eq!(d.set_indices(), vec![1, 2]);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn sub(&self, other: &BitArray) -> BitArray {
        let other = other.snapshot();
        let this = self.inner.lock();
        Self::from_words(this.sub(&other))
    }

    /// True when every storage word is zero.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// True when every bit in `[0, size)` is set. Straggler bits are ignored.
    pub fn is_full(&self) -> bool {
        self.inner.lock().is_full()
    }

    // =========================================================================
    // Random Operations
    // =========================================================================

    /// Pick a set bit at random using the thread-local RNG.
    ///
    /// See [`BitArray::pick_random_with`] for the selection rules.
    pub fn pick_random(&self) -> Option<usize> {
        self.pick_random_with(&mut rand::thread_rng())
    }

    /// Pick a set bit at random, or `None` if no bit is set.
    ///
    /// A random starting word is chosen and words are scanned circularly; in
    /// the first non-zero word a random starting offset is chosen and bits are
    /// scanned circularly. Selection is uniform among set bits of the chosen
    /// word, so arrays with unevenly filled words are not sampled uniformly
    /// over all their set bits.
    ///
    /// # Panics
    ///
    /// Panics if a non-zero word yields no set bit, which indicates corrupted
    /// storage.
    ///
    /// # Examples
    ///
    /// ```
    /// use rand::SeedableRng;
    /// use sharedbits::BitArray;
    ///
    /// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    /// let ba = BitArray::new(200).unwrap();
    /// assert_eq!(ba.pick_random_with(&mut rng), None);
    ///
    /// ba.set(150, true);
    /// assert_eq!(ba.pick_random_with(&mut rng), Some(150));
    /// ```
    pub fn pick_random_with<R: Rng>(&self, rng: &mut R) -> Option<usize> {
        self.inner.lock().pick_random(rng)
    }

    // =========================================================================
    // Serialization and Bulk Update
    // =========================================================================

    /// Pack into `ceil(size / 8)` bytes, words little-endian in index order.
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.lock().bytes()
    }

    /// Overwrite this array's words with `other`'s, word for word, up to the
    /// shorter word count. Length never changes.
    ///
    /// `other` is snapshotted under its own lock before this array is locked;
    /// the two locks are never held together.
    pub fn update(&self, other: &BitArray) {
        let src = other.snapshot();
        let mut this = self.inner.lock();
        if src.words.len() != this.words.len() {
            debug!(
                "updating {}-word array from {}-word array",
                this.words.len(),
                src.words.len()
            );
        }
        let n = this.words.len().min(src.words.len());
        this.words[..n].copy_from_slice(&src.words[..n]);
    }

    // =========================================================================
    // Information and Access
    // =========================================================================

    /// Get number of words in storage.
    #[inline]
    pub fn num_words(&self) -> usize {
        self.inner.lock().words.len()
    }

    /// Copy of the raw storage words, straggler bits included.
    pub fn words(&self) -> Vec<Word> {
        self.inner.lock().words.clone()
    }

    /// Get indices of all set bits, in ascending order.
    pub fn set_indices(&self) -> Vec<usize> {
        self.inner.lock().set_indices()
    }

    /// Render bits as `X`/`_` for logs: a space every 10 bits, another every
    /// 50, and a new line (joined with `indent`) every 100.
    pub fn describe(&self, indent: &str) -> String {
        self.inner.lock().describe(indent)
    }
}

// =============================================================================
// Trait Impls
// =============================================================================

impl Clone for BitArray {
    fn clone(&self) -> Self {
        self.copy()
    }
}

impl fmt::Debug for BitArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = self.inner.lock();
        f.debug_struct("BitArray")
            .field("bits", &words.num_bits)
            .field("elems", &words.words)
            .finish()
    }
}

impl fmt::Display for BitArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe(""))
    }
}

impl PartialEq for BitArray {
    /// Equal lengths and equal meaningful bits; straggler bits are ignored.
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        let other = other.snapshot();
        self.inner.lock().same_bits(&other)
    }
}

impl Eq for BitArray {}

impl Serialize for BitArray {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.inner.lock().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BitArray {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let words = Words::deserialize(deserializer)?;
        BitArray::from_decoded(words).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Bitwise Operators
// =============================================================================

impl BitOr for &BitArray {
    type Output = BitArray;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

impl BitAnd for &BitArray {
    type Output = BitArray;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl Sub for &BitArray {
    type Output = BitArray;

    fn sub(self, rhs: Self) -> Self::Output {
        BitArray::sub(self, rhs)
    }
}

impl Not for &BitArray {
    type Output = BitArray;

    fn not(self) -> Self::Output {
        BitArray::not(self)
    }
}
