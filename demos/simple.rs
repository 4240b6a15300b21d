//! A simple example showing the use of a Bloom filter.
use saltbloom::{BitVec, BloomFilter};

fn main() -> saltbloom::Result<()> {
    let mut bf = BloomFilter::<str>::with_size(1228, 128)?;

    bf.insert("foo");
    bf.insert("bar");

    println!("foo: {}", bf.contains("foo")); // true
    println!("bar: {}", bf.contains("bar")); // true
    println!("baz: {}", bf.contains("baz")); // false

    println!(
        "{} bits, k = {}, expected fpp = {:.5}",
        bf.size(),
        bf.hashes(),
        bf.expected_false_positive_rate()
    );

    // Store the bits elsewhere, then rebuild an equal filter from them.
    let stored: Vec<bool> = bf.bitvec().iter().collect();
    let restored = BloomFilter::<str>::from_parts(
        bf.size(),
        bf.expected_elements(),
        bf.count(),
        stored.into_iter().collect::<BitVec>(),
    );
    println!("restored: {:?}", restored.map(|r| r == bf));

    Ok(())
}
