//! A Bloom filter whose hash functions are drawn from salted MD5 digests.
//!
//! # Bloom Filters
//!
//! A Bloom filter is a space-efficient probabilistic data structure that is
//! used to test whether an element is a member of a set. It allows for queries
//! to return: "possibly in set" or "definitely not in set". Elements can be
//! added to the set, but not removed; the more elements that are added to the
//! set, the larger the probability of false positives.
//!
//! A filter is created from one of three intents:
//!
//! - bits per element `c`, expected elements `n` and hash count `k`, given directly
//!   ([`BloomFilter::new`]);
//! - a bit vector size `m` and expected elements `n`, from which `k = round(m/n * ln 2)`
//!   ([`BloomFilter::with_size`]);
//! - a target false positive probability `p` and expected elements `n`, from which
//!   `k = ceil(-log2 p)` and `c = k / ln 2` ([`BloomFilter::with_rate`]).
//!
//! The filter holds `ceil(c * n)` bits.
//!
//! # Salted Digests
//!
//! The `k` bit positions of an element are taken from MD5 digests of the element's
//! bytes prefixed by a one-byte salt. Each digest gives four 32-bit hashes; the salt
//! is incremented whenever more are needed. See [`hash`].
//!
//! # Example
//!
//! ```
//! use saltbloom::BloomFilter;
//!
//! let mut filter = BloomFilter::<str>::with_size(1000, 100).unwrap();
//!
//! filter.insert("foo");
//! filter.insert("bar");
//!
//! assert!(filter.contains("foo"));
//! assert!(filter.contains("bar"));
//! assert!(!filter.contains("baz"));
//!
//! assert_eq!(filter.count(), 2);
//! assert_eq!(filter.hashes(), 7);
//! ```
#![warn(missing_docs)]
#![allow(clippy::bool_assert_comparison)]

pub mod bitvec;
pub mod bloom;
pub mod element;
pub mod error;
pub mod hash;
pub mod params;

pub use bitvec::BitVec;
pub use bloom::BloomFilter;
pub use element::Element;
pub use error::{Error, ErrorKind, Result};
pub use params::Params;
