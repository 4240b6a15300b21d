// Licensed under the MIT license.

//! Salted MD5 hash family.
//!
//! Each round digests `[salt] ‖ data` with MD5 and splits the 16-byte digest into
//! four big-endian 32-bit hashes. The salt starts at zero and advances by one per
//! round, wrapping like a byte, so any number of hashes can be drawn for the same
//! input. The sequence only depends on the input, hence drawing fewer hashes always
//! yields a prefix of drawing more.

use md5::{Digest, Md5};

const DIGEST_LEN: usize = 16;
const HASH_LEN: usize = 4;

/// Return the first hash of `data`.
pub fn create_hash(data: &[u8]) -> i32 {
    hashes(data).next().unwrap_or_default()
}

/// Return the first hash of the UTF-8 encoding of `text`.
pub fn create_hash_str(text: &str) -> i32 {
    create_hash(text.as_bytes())
}

/// Return the first `k` hashes of `data`.
pub fn create_hashes(data: &[u8], k: usize) -> Vec<i32> {
    hashes(data).take(k).collect()
}

/// Return an unbounded iterator over the hashes of `data`.
///
/// A new digest round is only computed once the previous one has been consumed.
pub fn hashes(data: &[u8]) -> Hashes<'_> {
    Hashes {
        data,
        salt: 0,
        digest: [0; DIGEST_LEN],
        offset: DIGEST_LEN,
    }
}

/// Iterator returned by [`hashes`].
#[derive(Clone, Debug)]
pub struct Hashes<'a> {
    data: &'a [u8],
    salt: u8,
    digest: [u8; DIGEST_LEN],
    offset: usize,
}

impl Hashes<'_> {
    fn next_round(&mut self) {
        let mut hasher = Md5::new();
        hasher.update([self.salt]);
        hasher.update(self.data);

        self.digest.copy_from_slice(&hasher.finalize());
        self.salt = self.salt.wrapping_add(1);
        self.offset = 0;
    }
}

impl Iterator for Hashes<'_> {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        if self.offset == DIGEST_LEN {
            self.next_round();
        }
        let mut chunk = [0; HASH_LEN];
        chunk.copy_from_slice(&self.digest[self.offset..self.offset + HASH_LEN]);
        self.offset += HASH_LEN;

        Some(i32::from_be_bytes(chunk))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}
