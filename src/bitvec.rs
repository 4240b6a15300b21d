// Copyright (c) 2020 Helge Wrede, Alexander Schultheiß, Lukas Simon
// Copyright (c) 2022 Alexis Sellier
//
// Licensed under the MIT license.

//! Bit vector functionality.
use std::fmt::Debug;

const WORD_BITS: usize = u64::BITS as usize;

/// Seed of the structural hash fold.
pub(crate) const HASH_SEED: i32 = 7;
/// Multiplier of the structural hash fold.
pub(crate) const HASH_MULTIPLIER: i32 = 61;

/// One step of the structural hash fold, `61 * hash + value` in wrapping 32-bit arithmetic.
pub(crate) fn fold(hash: i32, value: i32) -> i32 {
    HASH_MULTIPLIER.wrapping_mul(hash).wrapping_add(value)
}

/// A fixed-length bit vector packed into 64-bit words.
///
/// Bits past `len()` in the last word are always zero.
#[derive(Clone)]
pub struct BitVec {
    words: Vec<u64>,
    nbits: usize,
}

impl BitVec {
    /// Create a new bit vector of the given capacity, in bits, with every bit unset.
    pub fn new(capacity: usize) -> Self {
        Self {
            nbits: capacity,
            words: vec![0; capacity.div_ceil(WORD_BITS)],
        }
    }

    /// Get the length in bits of the vector.
    pub fn len(&self) -> usize {
        self.nbits
    }

    /// Check whether this vector is empty, ie. has a length of zero.
    pub fn is_empty(&self) -> bool {
        self.nbits == 0
    }

    /// Set all bits to zero.
    pub fn clear(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
    }

    /// Set a single bit to `1`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn set(&mut self, index: usize) {
        let (word, mask) = self.locate(index);
        self.words[word] |= mask;
    }

    /// Set a single bit to `0`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn unset(&mut self, index: usize) {
        let (word, mask) = self.locate(index);
        self.words[word] &= !mask;
    }

    /// Check whether a bit is set.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn is_set(&self, index: usize) -> bool {
        let (word, mask) = self.locate(index);
        self.words[word] & mask == mask
    }

    /// Count the number of `1` bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Count the number of `0` bits.
    pub fn count_zeros(&self) -> usize {
        self.len() - self.count_ones()
    }

    /// Iterate over every bit in index order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.nbits).map(|i| (self.words[i / WORD_BITS] >> (i % WORD_BITS)) & 1 == 1)
    }

    /// Structural hash over the vector's length and bit contents.
    ///
    /// Equal vectors always produce the same value.
    pub fn hash_code(&self) -> i32 {
        // Metadata is (synchronized, count, length, read-only); only the two lengths vary.
        let mut hash = HASH_SEED;
        hash = fold(hash, 0);
        hash = fold(hash, self.nbits as i32);
        hash = fold(hash, self.nbits as i32);
        hash = fold(hash, 0);
        hash = fold(hash, self.content_hash());
        hash
    }

    fn content_hash(&self) -> i32 {
        self.iter().fold(HASH_SEED, |hash, bit| fold(hash, bit as i32))
    }

    fn locate(&self, index: usize) -> (usize, u64) {
        if index >= self.len() {
            panic!(
                "index out of bounds: the len is {} but the index is {}",
                self.len(),
                index,
            )
        }
        (index / WORD_BITS, 1 << (index % WORD_BITS))
    }
}

impl PartialEq for BitVec {
    fn eq(&self, other: &Self) -> bool {
        // Trailing bits are kept zero, so comparing whole words compares every position.
        self.nbits == other.nbits && self.words == other.words
    }
}

impl Eq for BitVec {}

impl FromIterator<bool> for BitVec {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut words = Vec::new();
        let mut nbits = 0;

        for bit in iter {
            if nbits % WORD_BITS == 0 {
                words.push(0);
            }
            if bit {
                words[nbits / WORD_BITS] |= 1 << (nbits % WORD_BITS);
            }
            nbits += 1;
        }
        Self { words, nbits }
    }
}

impl Debug for BitVec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bits: String = self.iter().map(|b| if b { '1' } else { '0' }).collect();
        write!(f, "BitVec({})", bits)
    }
}
