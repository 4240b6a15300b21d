// Licensed under the MIT license.

//! Canonical byte representation of filter elements.
use std::borrow::Cow;

/// A value that can be fed to a [`BloomFilter`](crate::BloomFilter).
///
/// Byte types are hashed as-is. Every other type is hashed through the UTF-8
/// encoding of its text form, so `42_u32`, `42_i64` and `"42"` all map to the
/// same bits.
pub trait Element {
    /// Return the bytes that identify this value.
    fn to_bytes(&self) -> Cow<'_, [u8]>;
}

impl<T: Element + ?Sized> Element for &T {
    fn to_bytes(&self) -> Cow<'_, [u8]> {
        (**self).to_bytes()
    }
}

impl Element for [u8] {
    fn to_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self)
    }
}

impl<const N: usize> Element for [u8; N] {
    fn to_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self)
    }
}

impl Element for Vec<u8> {
    fn to_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self)
    }
}

impl Element for str {
    fn to_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl Element for String {
    fn to_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

macro_rules! impl_element_via_display {
    ($($t:ty),*) => {
        $(
            impl Element for $t {
                fn to_bytes(&self) -> Cow<'_, [u8]> {
                    Cow::Owned(self.to_string().into_bytes())
                }
            }
        )*
    };
}

impl_element_via_display!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);
