// Licensed under the MIT license.

//! Sizing of a filter from one of its construction intents.
//!
//! A filter is fully described by `c`, the expected number of bits per element,
//! `n`, the expected number of elements, and `k`, the number of hashes per element.
//! The bit vector holds `ceil(c * n)` bits.

use std::f64::consts::LN_2;

use crate::error::{Error, Result};

/// Largest number of bits a filter may hold.
pub const MAX_NUM_BITS: usize = i32::MAX as usize;

/// The parameters a [`BloomFilter`](crate::BloomFilter) is built from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Params {
    bits_per_element: f64,
    expected_elements: usize,
    hashes: usize,
}

impl Params {
    /// Use the given bits per element `c`, expected elements `n` and hash count `k` as-is.
    pub fn new(bits_per_element: f64, expected_elements: usize, hashes: usize) -> Result<Self> {
        if !(bits_per_element.is_finite() && bits_per_element > 0.) {
            return Err(Error::invalid_parameter("bits per element must be positive")
                .with_context("bits_per_element", bits_per_element));
        }
        if expected_elements == 0 {
            return Err(Error::invalid_parameter("expected elements must be positive"));
        }
        if hashes == 0 {
            return Err(Error::invalid_parameter("hash count must be positive"));
        }
        let nbits = (bits_per_element * expected_elements as f64).ceil();
        if nbits > MAX_NUM_BITS as f64 {
            return Err(Error::invalid_parameter("filter size exceeds the maximum number of bits")
                .with_context("bits", nbits)
                .with_context("max", MAX_NUM_BITS));
        }
        Ok(Self {
            bits_per_element,
            expected_elements,
            hashes,
        })
    }

    /// Derive the parameters for a bit vector of `nbits` bits holding `expected_elements`.
    ///
    /// The hash count is `round(nbits / expected_elements * ln 2)`. The resulting
    /// [`size`](Self::size) is `ceil(nbits / expected_elements * expected_elements)`
    /// in floating point, which can be one more than `nbits` (e.g. 30 for `(29, 7)`).
    pub fn from_size(nbits: usize, expected_elements: usize) -> Result<Self> {
        if nbits == 0 {
            return Err(Error::invalid_parameter("bit set size must be positive"));
        }
        if expected_elements == 0 {
            return Err(Error::invalid_parameter("expected elements must be positive"));
        }
        let bits_per_element = nbits as f64 / expected_elements as f64;

        Self::new(
            bits_per_element,
            expected_elements,
            optimal_hashes(bits_per_element),
        )
        .map_err(|e| {
            e.with_context("bit_set_size", nbits)
                .with_context("expected_elements", expected_elements)
        })
    }

    /// Derive the parameters reaching `fp_rate` once `expected_elements` are inserted.
    ///
    /// The hash count is `ceil(-log2(fp_rate))` and each element gets `k / ln 2` bits.
    pub fn from_rate(fp_rate: f64, expected_elements: usize) -> Result<Self> {
        if !(fp_rate > 0. && fp_rate < 1.) {
            return Err(Error::invalid_parameter("false positive probability must be in (0, 1)")
                .with_context("fp_rate", fp_rate));
        }
        let hashes = hashes_for_rate(fp_rate);

        Self::new(hashes as f64 / LN_2, expected_elements, hashes)
    }

    /// Expected number of bits per element, `c`.
    pub fn bits_per_element(&self) -> f64 {
        self.bits_per_element
    }

    /// Expected number of elements, `n`.
    pub fn expected_elements(&self) -> usize {
        self.expected_elements
    }

    /// Number of hashes per element, `k`.
    pub fn hashes(&self) -> usize {
        self.hashes
    }

    /// Number of bits in the filter, `ceil(c * n)`.
    pub fn size(&self) -> usize {
        (self.bits_per_element * self.expected_elements as f64).ceil() as usize
    }
}

/// Return the optimal number of hash functions for a given number of bits per element.
///
/// Also called `k`.
pub fn optimal_hashes(bits_per_element: f64) -> usize {
    (bits_per_element * LN_2).round() as usize
}

/// Return the number of hash functions needed to reach a false positive rate.
pub fn hashes_for_rate(fp_rate: f64) -> usize {
    (-fp_rate.log2()).ceil() as usize
}
