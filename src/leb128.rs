//! LEB128 variable-length integer encoding/decoding.
//!
//! Encoding is done _in reverse_: the caller hands us the position where the
//! varint must end and we return where it starts. This is what lets a record be
//! written from the tail of a pre-sized buffer toward its head.

// This module uses `as` casts which have been thoroughly reviewed for correctness.
#![allow(clippy::as_conversions)]

use bytes::Buf;
use static_assertions::const_assert_eq;

use crate::error::DecodeErrorKind;
use crate::util::likely;

/// Maximum number of bytes a LEB128 encoded `u64` occupies.
pub const MAX_VARINT_LEN: usize = 10;

// ceil(64 / 7) == 10
const_assert_eq!(MAX_VARINT_LEN, (64 + 6) / 7);

/// Integers that can be encoded as LEB128 varints.
pub trait LebCodec: Sized + Copy {
    const MAX_LEB_BYTES: usize;

    /// Decode a LEB128 variable length integer from the front of `data`.
    ///
    /// Returns a tuple of the decoded value and the number of bytes read.
    fn decode_leb128(data: &[u8]) -> Result<(Self, usize), DecodeErrorKind>;

    /// Decode a LEB128 variable length integer from the front of `buf`,
    /// advancing `buf` past it.
    ///
    /// On error `buf` may have been partially consumed.
    fn decode_leb128_buf<B: Buf>(buf: &mut B) -> Result<(Self, usize), DecodeErrorKind> {
        let chunk = buf.chunk();

        // Fast path: the whole varint is in the current chunk.
        if chunk.len() >= Self::MAX_LEB_BYTES || chunk.len() == buf.remaining() {
            let (value, bytes_read) = Self::decode_leb128(chunk)?;
            buf.advance(bytes_read);
            return Ok((value, bytes_read));
        }

        // Slow path: the varint straddles chunks, read byte by byte.
        let mut scratch = [0u8; MAX_VARINT_LEN];
        for i in 0..Self::MAX_LEB_BYTES {
            if !buf.has_remaining() {
                return Err(DecodeErrorKind::UnexpectedEnd);
            }
            scratch[i] = buf.get_u8();
            if scratch[i] < 0x80 {
                return Self::decode_leb128(&scratch[..=i]);
            }
        }
        Err(DecodeErrorKind::IntegerOverflow)
    }

    /// Encode `self` so that its final byte lands at `buf[end - 1]`, returning
    /// the index of its first byte.
    ///
    /// # Panics
    ///
    /// If `buf[..end]` has fewer than [`LebCodec::encoded_leb128_len`] bytes.
    fn encode_leb128_rev(self, buf: &mut [u8], end: usize) -> usize;

    /// The number of bytes required to encode this integer.
    fn encoded_leb128_len(self) -> usize;
}

impl LebCodec for u64 {
    const MAX_LEB_BYTES: usize = MAX_VARINT_LEN;

    #[inline]
    fn decode_leb128(data: &[u8]) -> Result<(Self, usize), DecodeErrorKind> {
        // Fast path, most varints on the wire (keys, small lengths, flags) are a single byte.
        match data.first() {
            Some(&b) if likely(b < 0x80) => return Ok((u64::from(b), 1)),
            None => return Err(DecodeErrorKind::UnexpectedEnd),
            Some(_) => {}
        }

        let mut value = 0u64;
        for (i, &b) in data.iter().take(Self::MAX_LEB_BYTES).enumerate() {
            // The 10th byte only has room for the top bit of a u64, and it must
            // be the final byte.
            if i == Self::MAX_LEB_BYTES - 1 && b > 0x01 {
                return Err(DecodeErrorKind::IntegerOverflow);
            }
            value |= u64::from(b & 0x7f) << (7 * i);
            if b < 0x80 {
                return Ok((value, i + 1));
            }
        }

        // Fewer than 10 bytes were available and all of them had the continuation bit set.
        Err(DecodeErrorKind::UnexpectedEnd)
    }

    #[inline]
    fn encode_leb128_rev(self, buf: &mut [u8], end: usize) -> usize {
        let start = end - self.encoded_leb128_len();

        let mut value = self;
        let mut idx = start;
        while value >= 0x80 {
            buf[idx] = (value as u8 & 0x7f) | 0x80;
            value >>= 7;
            idx += 1;
        }
        buf[idx] = value as u8;

        start
    }

    /// Compute the LEB128 encoded length using leading_zeros.
    ///
    /// LEB128 encodes 7 bits per byte, so the number of bytes needed is
    /// ceil(significant_bits / 7) with a minimum of 1 byte for the value 0.
    #[inline]
    fn encoded_leb128_len(self) -> usize {
        // Lookup table mapping leading_zeros (0-64) to LEB128 byte count.
        #[rustfmt::skip]
        const LZ_TO_LEN: [u8; 65] = [
            10,                                         // 0:     64 bits -> 10 bytes
            9, 9, 9, 9, 9, 9, 9,                        // 1-7:   63-57 bits -> 9 bytes
            8, 8, 8, 8, 8, 8, 8,                        // 8-14:  56-50 bits -> 8 bytes
            7, 7, 7, 7, 7, 7, 7,                        // 15-21: 49-43 bits -> 7 bytes
            6, 6, 6, 6, 6, 6, 6,                        // 22-28: 42-36 bits -> 6 bytes
            5, 5, 5, 5, 5, 5, 5,                        // 29-35: 35-29 bits -> 5 bytes
            4, 4, 4, 4, 4, 4, 4,                        // 36-42: 28-22 bits -> 4 bytes
            3, 3, 3, 3, 3, 3, 3,                        // 43-49: 21-15 bits -> 3 bytes
            2, 2, 2, 2, 2, 2, 2,                        // 50-56: 14-8 bits  -> 2 bytes
            1, 1, 1, 1, 1, 1, 1, 1,                     // 57-64: 7-0 bits   -> 1 byte
        ];

        LZ_TO_LEN[self.leading_zeros() as usize] as usize
    }
}

impl LebCodec for u32 {
    const MAX_LEB_BYTES: usize = 5;

    #[inline]
    fn decode_leb128(data: &[u8]) -> Result<(Self, usize), DecodeErrorKind> {
        let (value, len) = u64::decode_leb128(data)?;
        let value = u32::try_from(value).map_err(|_| DecodeErrorKind::IntegerOverflow)?;
        Ok((value, len))
    }

    #[inline]
    fn encode_leb128_rev(self, buf: &mut [u8], end: usize) -> usize {
        u64::from(self).encode_leb128_rev(buf, end)
    }

    #[inline]
    fn encoded_leb128_len(self) -> usize {
        u64::from(self).encoded_leb128_len()
    }
}

/// Writes `value` so that it ends right before `end`, returning the new
/// (lower) write position.
#[inline]
pub fn encode_varint(buf: &mut [u8], end: usize, value: u64) -> usize {
    value.encode_leb128_rev(buf, end)
}

/// Reads a varint from the front of `buf`, advancing past it.
#[inline]
pub fn decode_varint<B: Buf>(buf: &mut B) -> Result<u64, DecodeErrorKind> {
    let (value, _) = u64::decode_leb128_buf(buf)?;
    Ok(value)
}
