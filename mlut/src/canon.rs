//! Canonical fixed-width encoding of keys and values.
//!
//! Keys and values of heterogeneous types are normalized to unsigned
//! integers before construction: byte `i` of a datum lands at bit offset
//! `8*i` of the result (little-endian packing, most data first), and the
//! table-wide width is the smallest of {1, 2, 4, 8, 16} bytes that fits
//! the longest datum.

use crate::err::Error;

/// The largest supported canonical width, in bytes.
pub const MAX_WIDTH_BYTES: usize = 16;

/// Types encodable as canonical fixed-width unsigned integers.
pub trait ToCanon {
    /// Returns the length, in bytes, of the canonical encoding of `self`:
    /// the width of the type for integers, the length of the data for
    /// strings and byte buffers. It can exceed [`MAX_WIDTH_BYTES`]; width
    /// selection reports such data as unencodable.
    fn canon_bytes(&self) -> usize;

    /// Returns the canonical encoding of `self`, with byte `i` at bit
    /// offset `8*i`. Bytes beyond [`MAX_WIDTH_BYTES`] are ignored.
    fn to_canon(&self) -> u128;
}

/// Types decodable from canonical unsigned integers.
///
/// Decoding inverts [`ToCanon`] for data that fit the selected width; see
/// the `String` implementation for the case where it is lossy.
pub trait FromCanon {
    /// Decodes a canonical integer produced by [`ToCanon::to_canon`].
    fn from_canon(canon: u128) -> Self;
}

impl<T: ToCanon + ?Sized> ToCanon for &T {
    #[inline(always)] fn canon_bytes(&self) -> usize { T::canon_bytes(self) }
    #[inline(always)] fn to_canon(&self) -> u128 { T::to_canon(self) }
}

macro_rules! impl_canon_for_int {
    ($($t:ty as $u:ty),*) => {$(
        impl ToCanon for $t {
            #[inline(always)] fn canon_bytes(&self) -> usize { std::mem::size_of::<$t>() }
            #[inline(always)] fn to_canon(&self) -> u128 { *self as $u as u128 }
        }
        impl FromCanon for $t {
            #[inline(always)] fn from_canon(canon: u128) -> Self { canon as $u as $t }
        }
    )*}
}

impl_canon_for_int!(u8 as u8, u16 as u16, u32 as u32, u64 as u64, u128 as u128, usize as usize,
    i8 as u8, i16 as u16, i32 as u32, i64 as u64, i128 as u128, isize as usize);

impl ToCanon for bool {
    #[inline(always)] fn canon_bytes(&self) -> usize { 1 }
    #[inline(always)] fn to_canon(&self) -> u128 { *self as u128 }
}

impl FromCanon for bool {
    #[inline(always)] fn from_canon(canon: u128) -> Self { canon & 1 != 0 }
}

impl ToCanon for char {
    #[inline(always)] fn canon_bytes(&self) -> usize { 4 }
    #[inline(always)] fn to_canon(&self) -> u128 { *self as u128 }
}

impl FromCanon for char {
    #[inline(always)] fn from_canon(canon: u128) -> Self {
        char::from_u32(canon as u32).unwrap_or(char::REPLACEMENT_CHARACTER)
    }
}

impl ToCanon for [u8] {
    #[inline(always)] fn canon_bytes(&self) -> usize { self.len() }

    fn to_canon(&self) -> u128 {
        let mut result = 0;
        for (i, byte) in self.iter().take(MAX_WIDTH_BYTES).enumerate() {
            result |= (*byte as u128) << (8 * i);
        }
        result
    }
}

impl<const N: usize> ToCanon for [u8; N] {
    #[inline(always)] fn canon_bytes(&self) -> usize { N }
    #[inline(always)] fn to_canon(&self) -> u128 { self[..].to_canon() }
}

impl<const N: usize> FromCanon for [u8; N] {
    #[inline(always)] fn from_canon(canon: u128) -> Self {
        let le = canon.to_le_bytes();
        std::array::from_fn(|i| if i < MAX_WIDTH_BYTES { le[i] } else { 0 })
    }
}

impl ToCanon for Vec<u8> {
    #[inline(always)] fn canon_bytes(&self) -> usize { self.len() }
    #[inline(always)] fn to_canon(&self) -> u128 { self[..].to_canon() }
}

impl FromCanon for Vec<u8> {
    #[inline(always)] fn from_canon(canon: u128) -> Self {
        let le = canon.to_le_bytes();
        le[..significant_len(&le)].to_vec()
    }
}

impl ToCanon for str {
    #[inline(always)] fn canon_bytes(&self) -> usize { self.len() }
    #[inline(always)] fn to_canon(&self) -> u128 { self.as_bytes().to_canon() }
}

impl ToCanon for String {
    #[inline(always)] fn canon_bytes(&self) -> usize { self.len() }
    #[inline(always)] fn to_canon(&self) -> u128 { self.as_str().to_canon() }
}

impl FromCanon for String {
    /// Reconstructs bytes from bit offsets, treating the trailing run of
    /// zero bytes as the terminator. Strings whose encoding ends with zero
    /// bytes therefore do not round-trip; accepted limitation of the
    /// canonical form.
    fn from_canon(canon: u128) -> Self {
        let le = canon.to_le_bytes();
        String::from_utf8_lossy(&le[..significant_len(&le)]).into_owned()
    }
}

#[inline]
fn significant_len(le: &[u8; MAX_WIDTH_BYTES]) -> usize {
    MAX_WIDTH_BYTES - le.iter().rev().take_while(|byte| **byte == 0).count()
}

/// Returns the smallest supported canonical width (in bytes) that can hold
/// `max_bytes`-byte data: one of 1, 2, 4, 8 or 16.
pub fn canon_width(max_bytes: usize) -> Result<u8, Error> {
    match max_bytes {
        0..=1 => Ok(1),
        2 => Ok(2),
        3..=4 => Ok(4),
        5..=8 => Ok(8),
        9..=16 => Ok(16),
        bytes => Err(Error::WidthOverflow { bytes }),
    }
}

/// Keeps the `width_bytes` lowest bytes of `canon`, ignoring the rest.
#[inline]
pub fn truncate_to_width(canon: u128, width_bytes: u8) -> u128 {
    canon & bits_mask(width_bytes * 8)
}

/// Mask with the `bits` lowest bits set. `bits` must be in `[0, 128]`.
#[inline(always)]
pub(crate) fn bits_mask(bits: u8) -> u128 {
    if bits >= 128 { u128::MAX } else { (1u128 << bits) - 1 }
}

/// Minimal number of bits needed to store `value`.
#[inline]
pub(crate) fn bits_to_store_canon(value: u128) -> u8 {
    if value <= u64::MAX as u128 {
        bitm::bits_to_store(value as u64)
    } else {
        64 + bitm::bits_to_store((value >> 64) as u64)
    }
}

/// Selects the canonical width of the longest of the given `lengths`.
pub(crate) fn scan_width(lengths: impl IntoIterator<Item = usize>) -> Result<u8, Error> {
    canon_width(lengths.into_iter().max().unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_encoding() {
        assert_eq!(6u8.to_canon(), 6);
        assert_eq!(6u8.canon_bytes(), 1);
        assert_eq!(300u16.to_canon(), 300);
        assert_eq!((-1i8).to_canon(), 0xFF);
        assert_eq!((-1i32).to_canon(), 0xFFFF_FFFF);
        assert_eq!(u64::MAX.to_canon(), u64::MAX as u128);
        assert_eq!(u8::from_canon(6u8.to_canon()), 6);
        assert_eq!(i8::from_canon((-1i8).to_canon()), -1);
        assert_eq!(i32::from_canon((-7i32).to_canon()), -7);
    }

    #[test]
    fn str_encoding() {
        assert_eq!("h".to_canon(), 'h' as u128);
        assert_eq!("hi!".to_canon(),
            ('!' as u128) << 16 | ('i' as u128) << 8 | ('h' as u128));
        assert_eq!(truncate_to_width("hi!".to_canon(), 2),
            ('i' as u128) << 8 | ('h' as u128));
        assert_eq!(truncate_to_width("hi!".to_canon(), 1), 'h' as u128);
        assert_eq!(String::from("hi!").to_canon(), "hi!".to_canon());
        assert_eq!((&"hi!").to_canon(), "hi!".to_canon());
    }

    #[test]
    fn str_decoding() {
        assert_eq!(String::from_canon("hi!".to_canon()), "hi!");
        assert_eq!(String::from_canon("gutentag".to_canon()), "gutentag");
        assert_eq!(String::from_canon(0), "");
        // trailing zero bytes act as the terminator and are not restored
        assert_eq!(String::from_canon("a\0".to_canon()), "a");
    }

    #[test]
    fn bytes_encoding() {
        assert_eq!([1u8, 2, 3].to_canon(), 0x030201);
        assert_eq!(<[u8; 3]>::from_canon(0x030201), [1, 2, 3]);
        assert_eq!(vec![9u8, 0, 7].to_canon(), 0x070009);
        assert_eq!(Vec::<u8>::from_canon(0x070009), vec![9, 0, 7]);
    }

    #[test]
    fn char_and_bool() {
        assert_eq!('h'.to_canon(), 0x68);
        assert_eq!('h'.canon_bytes(), 4);
        assert_eq!(char::from_canon('λ'.to_canon()), 'λ');
        assert_eq!(true.to_canon(), 1);
        assert!(bool::from_canon(true.to_canon()));
    }

    #[test]
    fn long_data_is_cut_at_max_width() {
        let long = "I need more than sixteen bytes";
        assert_eq!(long.canon_bytes(), long.len());
        assert_eq!(long.to_canon(), long[..MAX_WIDTH_BYTES].to_canon());
    }

    #[test]
    fn width_selection() {
        assert_eq!(canon_width(0), Ok(1));
        assert_eq!(canon_width(1), Ok(1));
        assert_eq!(canon_width(2), Ok(2));
        assert_eq!(canon_width(3), Ok(4));
        assert_eq!(canon_width(8), Ok(8));
        assert_eq!(canon_width(9), Ok(16));
        assert_eq!(canon_width(16), Ok(16));
        assert_eq!(canon_width(17), Err(Error::WidthOverflow { bytes: 17 }));
        assert_eq!(scan_width(["hi".len(), "bye!".len()]), Ok(4));
    }

    #[test]
    fn bit_lengths() {
        assert_eq!(bits_to_store_canon(0), 0);
        assert_eq!(bits_to_store_canon(1), 1);
        assert_eq!(bits_to_store_canon(8), 4);
        assert_eq!(bits_to_store_canon(u64::MAX as u128), 64);
        assert_eq!(bits_to_store_canon(1u128 << 64), 65);
        assert_eq!(bits_to_store_canon(u128::MAX), 128);
    }

    #[test]
    fn masks() {
        assert_eq!(bits_mask(0), 0);
        assert_eq!(bits_mask(3), 0b111);
        assert_eq!(bits_mask(64), u64::MAX as u128);
        assert_eq!(bits_mask(128), u128::MAX);
    }
}
