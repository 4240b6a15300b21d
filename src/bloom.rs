// Copyright (c) 2018 Aleksandr Bezobchuk
// Copyright (c) 2022 Alexis Sellier
//
// Licensed under the MIT license.

//! A Bloom filter whose `k` hash functions are drawn from salted MD5 digests.

use std::borrow::Borrow;
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use log::{debug, trace};

use crate::bitvec::{self, BitVec};
use crate::element::Element;
use crate::error::{Error, Result};
use crate::hash;
use crate::params::Params;

/// The default false positive probability value, 1%.
pub const DEFAULT_FALSE_POSITIVE_RATE: f64 = 0.01;

/// A Bloom filter that keeps track of items of type `T`.
pub struct BloomFilter<T: ?Sized> {
    bits: BitVec,
    params: Params,
    count: usize,
    key: PhantomData<T>,
}

impl<T: ?Sized> BloomFilter<T> {
    /// Return a new Bloom filter with `bits_per_element` bits for each of the
    /// `expected_elements`, using `hashes` hash functions.
    pub fn new(bits_per_element: f64, expected_elements: usize, hashes: usize) -> Result<Self> {
        Params::new(bits_per_element, expected_elements, hashes).map(Self::from_params)
    }

    /// Return a new Bloom filter with a given approximate item capacity.
    /// The false positive probability is [`DEFAULT_FALSE_POSITIVE_RATE`].
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_rate(DEFAULT_FALSE_POSITIVE_RATE, capacity)
    }

    /// Return a new Bloom filter of about `nbits` bits, sized for `expected_elements`.
    /// The number of hashes is chosen to minimize the false positive probability.
    ///
    /// The size is `ceil(nbits / expected_elements * expected_elements)` computed in
    /// floating point, so it can exceed `nbits` by one; see [`Params::from_size`].
    pub fn with_size(nbits: usize, expected_elements: usize) -> Result<Self> {
        Params::from_size(nbits, expected_elements).map(Self::from_params)
    }

    /// Return a new Bloom filter that reaches `fp_rate` once `expected_elements`
    /// items have been inserted.
    pub fn with_rate(fp_rate: f64, expected_elements: usize) -> Result<Self> {
        Params::from_rate(fp_rate, expected_elements).map(Self::from_params)
    }

    /// Return an empty Bloom filter built from already derived parameters.
    pub fn from_params(params: Params) -> Self {
        debug!(
            "bloom filter created: size={}, hashes={}, expected_elements={}",
            params.size(),
            params.hashes(),
            params.expected_elements()
        );

        Self {
            bits: BitVec::new(params.size()),
            params,
            count: 0,
            key: PhantomData,
        }
    }

    /// Rebuild a filter from previously stored contents.
    ///
    /// `bits` must hold exactly as many bits as a filter created with
    /// [`BloomFilter::with_size`]`(nbits, expected_elements)`. The hash count is
    /// derived from `nbits / expected_elements` as `with_size` does, so only filters
    /// built with `with_size` are restored equal; one built with `new` or
    /// `with_rate` may come back with a different `k`.
    pub fn from_parts(
        nbits: usize,
        expected_elements: usize,
        count: usize,
        bits: BitVec,
    ) -> Result<Self> {
        let params = Params::from_size(nbits, expected_elements)?;
        if bits.len() != params.size() {
            return Err(Error::invalid_parameter("bit vector does not match the filter size")
                .with_context("size", params.size())
                .with_context("bits", bits.len()));
        }
        debug!(
            "bloom filter restored: size={}, hashes={}, count={}",
            params.size(),
            params.hashes(),
            count
        );

        Ok(Self {
            bits,
            params,
            count,
            key: PhantomData,
        })
    }

    /// Set an item's bytes in the filter, bypassing the [`Element`] conversion.
    pub fn insert_bytes(&mut self, bytes: &[u8]) {
        let size = self.size();

        for h in hash::hashes(bytes).take(self.hashes()) {
            self.bits.set(bit_index(h, size));
        }
        self.count += 1;
    }

    /// Return whether the given bytes are likely in the filter.
    pub fn contains_bytes(&self, bytes: &[u8]) -> bool {
        let size = self.size();

        hash::hashes(bytes)
            .take(self.hashes())
            .all(|h| self.bits.is_set(bit_index(h, size)))
    }

    /// Set all bits to zero and reset the item count.
    pub fn clear(&mut self) {
        trace!("bloom filter cleared after {} insertions", self.count);

        self.bits.clear();
        self.count = 0;
    }

    /// Return the bit at `index`.
    pub fn get_bit(&self, index: usize) -> Result<bool> {
        if index >= self.size() {
            return Err(Error::index_out_of_range(index, self.size()));
        }
        Ok(self.bits.is_set(index))
    }

    /// Set the bit at `index` to `value`.
    pub fn set_bit(&mut self, index: usize, value: bool) -> Result<()> {
        if index >= self.size() {
            return Err(Error::index_out_of_range(index, self.size()));
        }
        if value {
            self.bits.set(index);
        } else {
            self.bits.unset(index);
        }
        Ok(())
    }

    /// Return the number of bits in this filter, `m`.
    pub fn size(&self) -> usize {
        self.bits.len()
    }

    /// Number of hashes used (`k` parameter).
    pub fn hashes(&self) -> usize {
        self.params.hashes()
    }

    /// Number of items the filter was sized for, `n`.
    pub fn expected_elements(&self) -> usize {
        self.params.expected_elements()
    }

    /// Number of bits per item the filter was sized for, `c`.
    pub fn expected_bits_per_element(&self) -> f64 {
        self.params.bits_per_element()
    }

    /// Number of insertions since creation or the last [`clear`](Self::clear).
    pub fn count(&self) -> usize {
        self.count
    }

    /// Return the actual number of bits per inserted item, or `None` if nothing
    /// has been inserted yet.
    pub fn bits_per_element(&self) -> Option<f64> {
        (self.count > 0).then(|| self.size() as f64 / self.count as f64)
    }

    /// Return the false positive probability after `elements` insertions.
    ///
    /// Computed as `(1 - e^(-k * elements / m))^k`.
    pub fn false_positive_rate_at(&self, elements: f64) -> f64 {
        let k = self.hashes() as f64;
        let m = self.size() as f64;

        (1. - (-k * elements / m).exp()).powf(k)
    }

    /// Return the false positive probability once the expected number of items
    /// has been inserted.
    pub fn expected_false_positive_rate(&self) -> f64 {
        self.false_positive_rate_at(self.expected_elements() as f64)
    }

    /// Return the false positive probability for the current number of insertions.
    pub fn false_positive_rate(&self) -> f64 {
        self.false_positive_rate_at(self.count as f64)
    }

    /// Return the underlying bit vector.
    pub fn bitvec(&self) -> &BitVec {
        &self.bits
    }

    /// Structural hash over the filter's size, expected elements, hash count and bits.
    ///
    /// Equal filters always produce the same value.
    pub fn hash_code(&self) -> i32 {
        let mut hash = bitvec::HASH_SEED;
        hash = bitvec::fold(hash, self.size() as i32);
        hash = bitvec::fold(hash, self.expected_elements() as i32);
        hash = bitvec::fold(hash, self.hashes() as i32);
        hash = bitvec::fold(hash, self.bits.hash_code());
        hash
    }
}

impl<T: Element + ?Sized> BloomFilter<T> {
    /// Set an item in the Bloom filter. Every insertion, including repeated ones,
    /// is counted.
    pub fn insert(&mut self, item: &T) {
        self.insert_bytes(&item.to_bytes());
    }

    /// Insert every item, in iteration order.
    ///
    /// Items inserted before a panic in `items` stay in the filter.
    pub fn insert_all<I>(&mut self, items: I)
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        for item in items {
            self.insert(item.borrow());
        }
    }

    /// Return whether or not a given item is likely in the Bloom filter or not. There is a
    /// possibility for a false positive, but a false negative will never occur.
    pub fn contains(&self, item: &T) -> bool {
        self.contains_bytes(&item.to_bytes())
    }

    /// Return whether every item is likely in the filter, stopping at the first miss.
    pub fn contains_all<I>(&self, items: I) -> bool
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        items.into_iter().all(|item| self.contains(item.borrow()))
    }
}

fn bit_index(hash: i32, size: usize) -> usize {
    hash.unsigned_abs() as usize % size
}

impl<T: ?Sized> Clone for BloomFilter<T> {
    fn clone(&self) -> Self {
        Self {
            bits: self.bits.clone(),
            params: self.params,
            count: self.count,
            key: PhantomData,
        }
    }
}

impl<T: ?Sized> Debug for BloomFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BloomFilter")
            .field("size", &self.size())
            .field("hashes", &self.hashes())
            .field("expected_elements", &self.expected_elements())
            .field("count", &self.count)
            .finish()
    }
}

impl<T: ?Sized> PartialEq for BloomFilter<T> {
    fn eq(&self, other: &Self) -> bool {
        self.expected_elements() == other.expected_elements()
            && self.hashes() == other.hashes()
            && self.size() == other.size()
            && self.bits == other.bits
    }
}

impl<T: ?Sized> Eq for BloomFilter<T> {}

impl<T: ?Sized> Hash for BloomFilter<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(self.hash_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::collections::HashSet;
    use std::iter;

    fn key() -> String {
        let rng = fastrand::Rng::new();
        iter::repeat_with(|| rng.alphanumeric()).take(32).collect()
    }

    fn items(size: usize) -> Vec<String> {
        let mut items = HashSet::<String>::new();
        while items.len() < size {
            items.insert(key());
        }
        items.into_iter().collect()
    }

    fn random_bytes(rng: &fastrand::Rng, len: usize) -> Vec<u8> {
        iter::repeat_with(|| rng.u8(..)).take(len).collect()
    }

    #[test]
    fn test_bloom_filter() {
        let n = 1024;
        let items = items(n);
        let mut bf = BloomFilter::<String>::with_capacity(items.len()).unwrap();

        // Test inclusion.
        for item in items.iter() {
            bf.insert(item);

            assert_eq!(
                bf.contains(item),
                true,
                "item {} should result in a positive inclusion",
                item,
            );
        }

        // Test false negatives.
        for _ in 0..n {
            let item = key();
            let exists = bf.contains(&item);

            if items.contains(&item) {
                assert_eq!(exists, true, "item {} resulted in a false negative", item);
            }
        }
    }

    #[test]
    fn test_new() {
        let bf = BloomFilter::<str>::new(8., 125, 4).unwrap();

        assert_eq!(bf.size(), 1000);
        assert_eq!(bf.hashes(), 4);
        assert_eq!(bf.expected_elements(), 125);
        assert_eq!(bf.expected_bits_per_element(), 8.);
        assert_eq!(bf.count(), 0);
        assert_eq!(bf.bitvec().count_ones(), 0);
    }

    #[test]
    fn test_size() {
        for nbits in 100..1000 {
            let bf = BloomFilter::<str>::with_size(nbits, 10).unwrap();
            assert_eq!(bf.size(), nbits);
        }
        assert_eq!(BloomFilter::<str>::with_size(29, 7).unwrap().size(), 30);
    }

    #[test]
    fn test_bit_index() {
        assert_eq!(bit_index(i32::MIN, 7), (1_usize << 31) % 7);
        assert_eq!(bit_index(i32::MIN, 1 << 31), 0);
        assert_eq!(bit_index(-10, 7), 3);
        assert_eq!(bit_index(i32::MAX, 1000), 647);
    }

    #[test]
    fn test_hash_code_known_value() {
        let bf = BloomFilter::<str>::with_size(100, 10).unwrap();
        assert_eq!(bf.hash_code(), -59921798);
    }

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(
            BloomFilter::<str>::new(2., 10, 0).unwrap_err().kind(),
            ErrorKind::InvalidParameter
        );
        assert_eq!(
            BloomFilter::<str>::with_size(1, 2).unwrap_err().kind(),
            ErrorKind::InvalidParameter
        );
        assert_eq!(
            BloomFilter::<str>::with_rate(1.5, 10).unwrap_err().kind(),
            ErrorKind::InvalidParameter
        );
    }

    #[test]
    fn test_equals() {
        let mut a = BloomFilter::<String>::with_size(1000, 100).unwrap();
        let mut b = BloomFilter::<String>::with_size(1000, 100).unwrap();

        for item in items(100) {
            a.insert(&item);
            b.insert(&item);
        }
        assert_eq!(a, b);
        assert_eq!(b, a);

        a.insert(&"Another entry".to_owned());
        assert_ne!(a, b);

        a.clear();
        b.clear();
        assert_eq!(a, b);
        assert_eq!(b, a);

        for item in items(100) {
            a.insert(&item);
            b.insert(&item);
        }
        assert_eq!(a, b);
        assert_eq!(b, a);
    }

    #[test]
    fn test_not_equal_with_different_parameters() {
        let a = BloomFilter::<str>::with_size(100, 10).unwrap();
        let b = BloomFilter::<str>::with_size(100, 9).unwrap();
        let c = BloomFilter::<str>::new(10., 10, 3).unwrap();

        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_hash_code() {
        let mut a = BloomFilter::<String>::with_size(1000, 100).unwrap();
        let mut b = BloomFilter::<String>::with_size(1000, 100).unwrap();
        assert_eq!(a.hash_code(), b.hash_code());

        for item in items(100) {
            a.insert(&item);
            b.insert(&item);
        }
        assert_eq!(a.hash_code(), b.hash_code());

        a.clear();
        b.clear();
        assert_eq!(a.hash_code(), b.hash_code());

        let pairs = [((100, 10), (100, 9)), ((100, 10), (99, 9)), ((100, 10), (50, 10))];
        for ((m1, n1), (m2, n2)) in pairs {
            let a = BloomFilter::<str>::with_size(m1, n1).unwrap();
            let b = BloomFilter::<str>::with_size(m2, n2).unwrap();
            assert_ne!(a.hash_code(), b.hash_code());
        }
    }

    #[test]
    fn test_hash_set_membership() {
        let mut a = BloomFilter::<str>::with_size(1000, 100).unwrap();
        a.insert("x");
        let b = a.clone();

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_expected_false_positive_rate() {
        let cases = [
            ((1000, 100), 7, 0.00819, 0.000009),
            ((100, 10), 7, 0.00819, 0.000009),
            ((20, 10), 1, 0.393, 0.0005),
            ((110, 10), 8, 0.00509, 0.00001),
        ];

        for ((nbits, n), k, expected, tolerance) in cases {
            let bf = BloomFilter::<str>::with_size(nbits, n).unwrap();
            assert_eq!(bf.hashes(), k);
            assert!(
                (bf.expected_false_positive_rate() - expected).abs() < tolerance,
                "m = {nbits}, n = {n}: {}",
                bf.expected_false_positive_rate()
            );
        }
    }

    #[test]
    fn test_false_positive_rate_follows_count() {
        let mut bf = BloomFilter::<u32>::with_size(1000, 100).unwrap();
        assert_eq!(bf.false_positive_rate(), 0.);
        assert_eq!(bf.bits_per_element(), None);

        for i in 0..100 {
            bf.insert(&i);
        }
        assert_eq!(bf.count(), 100);
        assert_eq!(bf.false_positive_rate(), bf.expected_false_positive_rate());
        assert_eq!(bf.bits_per_element(), Some(10.));
        assert!(bf.false_positive_rate_at(200.) > bf.false_positive_rate());
    }

    #[test]
    fn test_empirical_false_positive_rate() {
        let rng = fastrand::Rng::with_seed(0x5eed);

        for j in 10..21 {
            let mut bf = BloomFilter::<[u8]>::with_size(100 * j, 100).unwrap();
            let members: Vec<Vec<u8>> = iter::repeat_with(|| random_bytes(&rng, 100)).take(100).collect();
            bf.insert_all(members.iter().map(Vec::as_slice));

            let queries = 20_000;
            let mut false_positives = 0;
            for _ in 0..queries {
                let query = random_bytes(&rng, 100);
                if bf.contains(&query) && !members.contains(&query) {
                    false_positives += 1;
                }
            }
            let ratio = false_positives as f64 / queries as f64;

            assert!(
                (bf.expected_false_positive_rate() - ratio).abs() < 0.01,
                "m/n = {j}: got {ratio}, expected {}",
                bf.expected_false_positive_rate()
            );
        }
    }

    #[test]
    fn test_clear() {
        let mut bf = BloomFilter::<str>::with_size(1000, 100).unwrap();
        for i in 0..bf.size() {
            bf.set_bit(i, true).unwrap();
        }
        bf.insert("x");
        bf.clear();

        assert_eq!(bf.count(), 0);
        for i in 0..bf.size() {
            assert_eq!(bf.get_bit(i).unwrap(), false);
        }
    }

    #[test]
    fn test_insert_all() {
        let items = items(100);
        let mut bf = BloomFilter::<String>::with_size(1000, 100).unwrap();

        bf.insert_all(&items);

        assert_eq!(bf.count(), 100);
        for item in &items {
            assert!(bf.contains(item));
        }
    }

    #[test]
    fn test_contains() {
        let mut bf = BloomFilter::<String>::with_size(10000, 10).unwrap();

        for i in 0..10 {
            let item = format!("{:b}", i);
            bf.insert(&item);
            assert!(bf.contains(&item));
        }
        assert!(!bf.contains(&key()));
    }

    #[test]
    fn test_contains_all() {
        let items = items(100);
        let mut bf = BloomFilter::<str>::with_size(10000, 100).unwrap();

        for item in &items {
            bf.insert(item);
        }
        assert!(bf.contains_all(items.iter().map(String::as_str)));

        let mut queries: Vec<&str> = items.iter().map(String::as_str).collect();
        queries.push("never inserted");
        assert!(!bf.contains_all(queries));
    }

    #[test]
    fn test_contains_generic_and_bytes() {
        let rng = fastrand::Rng::new();
        let mut text = BloomFilter::<String>::with_rate(0.01, 100).unwrap();
        let mut raw = BloomFilter::<Vec<u8>>::with_rate(0.01, 100).unwrap();

        for _ in 0..100 {
            let s = key();
            text.insert(&s);
            assert!(text.contains(&s));
            assert!(text.contains_bytes(s.as_bytes()));

            let bytes = random_bytes(&rng, 500);
            raw.insert(&bytes);
            assert!(raw.contains(&bytes));
        }
        assert_eq!(text.count(), 100);
        assert_eq!(raw.count(), 100);
    }

    #[test]
    fn test_text_projection() {
        let mut numbers = BloomFilter::<u64>::with_size(1000, 100).unwrap();
        numbers.insert(&42);

        assert!(numbers.contains_bytes(b"42"));
        assert!(numbers.contains(&42));
    }

    #[test]
    fn test_get_and_set_bit() {
        let rng = fastrand::Rng::new();
        let mut bf = BloomFilter::<str>::with_size(1000, 100).unwrap();

        for i in 0..100 {
            let b = rng.bool();
            bf.set_bit(i, b).unwrap();
            assert_eq!(bf.get_bit(i).unwrap(), b);
        }
        for i in 0..100 {
            bf.set_bit(i, true).unwrap();
            assert_eq!(bf.get_bit(i).unwrap(), true);
        }
        for i in 0..100 {
            bf.set_bit(i, false).unwrap();
            assert_eq!(bf.get_bit(i).unwrap(), false);
        }
    }

    #[test]
    fn test_bit_index_out_of_range() {
        let mut bf = BloomFilter::<str>::with_size(1000, 100).unwrap();

        assert_eq!(bf.get_bit(1000).unwrap_err().kind(), ErrorKind::IndexOutOfRange);
        assert_eq!(bf.set_bit(1000, true).unwrap_err().kind(), ErrorKind::IndexOutOfRange);
        assert_eq!(bf.bitvec().count_ones(), 0);
    }

    #[test]
    fn test_from_parts() {
        let mut a = BloomFilter::<String>::with_size(2048, 128).unwrap();
        let items = items(128);
        a.insert_all(&items);

        let bits: BitVec = a.bitvec().iter().collect();
        let b = BloomFilter::<String>::from_parts(2048, 128, a.count(), bits).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.hash_code(), b.hash_code());
        assert_eq!(b.count(), 128);
        assert!(b.contains_all(&items));

        // `with_rate(0.01, 1)` has k = 7, but 11 bits for one element derives k = 8.
        let c = BloomFilter::<str>::with_rate(0.01, 1).unwrap();
        let d = BloomFilter::<str>::from_parts(c.size(), 1, 0, c.bitvec().clone()).unwrap();
        assert_eq!(c.hashes(), 7);
        assert_eq!(d.hashes(), 8);
        assert_ne!(c, d);

        let err = BloomFilter::<String>::from_parts(2048, 128, 0, BitVec::new(2047)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_concurrent_readers() {
        let items = items(64);
        let mut bf = BloomFilter::<String>::with_size(1024, 64).unwrap();
        bf.insert_all(&items);

        std::thread::scope(|s| {
            for chunk in items.chunks(16) {
                let bf = &bf;
                s.spawn(move || assert!(bf.contains_all(chunk)));
            }
        });
    }
}
