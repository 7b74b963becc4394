//! Wire format for Google's Protocol Buffers, aka [protobuf](https://protobuf.dev).

use bytes::Buf;
use static_assertions::assert_eq_size;

use crate::buffer::ReverseBuf;
use crate::error::{DecodeError, DecodeErrorKind, InvalidTagReason};
use crate::leb128::{decode_varint, LebCodec};
use crate::util::{likely, unlikely};

/// Minimum value of a protobuf tag.
pub const MINIMUM_TAG_VAL: u32 = 1;

/// A decoded protobuf field key containing a wire type and tag.
///
/// Only constructed through [`unpack_tag`], so the tag is never zero. Field
/// numbers above protobuf's `2^29 - 1` are still accepted, so that input from a
/// newer or non-conforming writer can be skipped as unknown fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtoKey {
    tag: u32,
    wire_type: WireType,
}

assert_eq_size!(ProtoKey, u64);

impl ProtoKey {
    /// Returns the [`WireType`] component of this key.
    #[inline(always)]
    pub const fn wire_type(self) -> WireType {
        self.wire_type
    }

    /// Returns the tag/field number component of this key.
    #[inline(always)]
    pub const fn tag(self) -> u32 {
        self.tag
    }

    /// Decomposes this key into its [`WireType`] and tag components.
    #[inline(always)]
    pub const fn into_parts(self) -> (WireType, u32) {
        (self.wire_type, self.tag)
    }

    /// Fails with [`InvalidTagReason::WireTypeMismatch`] unless this key carries `expected`.
    #[inline]
    pub fn expect_wire_type(self, expected: WireType) -> Result<(), DecodeErrorKind> {
        if unlikely(self.wire_type != expected) {
            return Err(DecodeErrorKind::InvalidTag {
                reason: InvalidTagReason::WireTypeMismatch {
                    field: self.tag,
                    expected,
                    actual: self.wire_type,
                },
            });
        }
        Ok(())
    }
}

/// Combines a field number and wire type into the raw key value.
#[inline(always)]
pub fn pack_tag(tag: u32, wire_type: WireType) -> u64 {
    (u64::from(tag) << 3) | u64::from(wire_type.into_val())
}

/// Splits a raw key value into its field number and wire type, validating both.
///
/// Any field number in `1..=u32::MAX` is accepted.
#[inline]
pub fn unpack_tag(raw: u64) -> Result<ProtoKey, DecodeErrorKind> {
    let wire_type = WireType::try_from_val(raw & 0b111)?;

    match u32::try_from(raw >> 3) {
        Ok(tag) if tag >= MINIMUM_TAG_VAL => Ok(ProtoKey { tag, wire_type }),
        _ => Err(DecodeErrorKind::InvalidTag {
            reason: InvalidTagReason::FieldNumberOutOfRange,
        }),
    }
}

/// Writes the key for `tag`/`wire_type` immediately before the current write position.
///
/// Called once per field, _after_ the field's payload has been written.
#[inline(always)]
pub fn encode_key_rev(wire_type: WireType, tag: u32, buf: &mut ReverseBuf<'_>) {
    buf.put_varint(pack_tag(tag, wire_type));
}

/// Returns the encoded length of a field key (tag + wire type).
#[inline(always)]
pub fn encoded_key_len(tag: u32) -> usize {
    // The wire type only occupies the low 3 bits so it never changes the length.
    (u64::from(tag) << 3).encoded_leb128_len()
}

/// Decodes the key from the front of `buf`.
///
/// Called for every field of every message.
#[inline]
pub fn decode_key<B: Buf>(buf: &mut B) -> Result<ProtoKey, DecodeErrorKind> {
    let raw = decode_varint(buf)?;
    unpack_tag(raw)
}

/// Decodes the length prefix for a length-delimited field.
///
/// Fails with [`DecodeErrorKind::TruncatedMessage`] when the declared length runs
/// past the end of `buf`. On success, exactly the payload remains in front of `buf`.
#[inline]
pub fn decode_len<B: Buf>(buf: &mut B) -> Result<usize, DecodeErrorKind> {
    let chunk = buf.chunk();
    // Fast path, most lengths fit in one byte (< 128).
    let declared = if likely(!chunk.is_empty() && chunk[0] < 0x80) {
        let len = u64::from(chunk[0]);
        buf.advance(1);
        len
    } else {
        decode_varint(buf)?
    };

    let remaining = buf.remaining();
    match usize::try_from(declared) {
        Ok(len) if len <= remaining => Ok(len),
        _ => Err(DecodeErrorKind::TruncatedMessage {
            declared,
            remaining,
        }),
    }
}

#[inline]
fn advance_fixed<B: Buf>(buf: &mut B, width: usize) -> Result<(), DecodeErrorKind> {
    if unlikely(buf.remaining() < width) {
        return Err(DecodeErrorKind::UnexpectedEnd);
    }
    buf.advance(width);
    Ok(())
}

/// Skips over a field value based on its wire type.
///
/// Protobuf supports backwards and forwards compatibility by skipping fields
/// we don't know about. We "skip" a field by advancing our buffer past it. The
/// key has already been consumed and `offset` is the absolute position of the
/// front of `buf`, used to report where an error was found.
///
/// Groups are walked iteratively with an explicit depth counter, so arbitrarily
/// deep input never grows the call stack. More than `max_depth` open groups fail
/// with [`DecodeErrorKind::NestingTooDeep`].
pub fn skip_field<B: Buf>(
    buf: &mut B,
    offset: usize,
    wire_type: WireType,
    max_depth: u32,
) -> Result<(), DecodeError> {
    let total = buf.remaining();
    let position = |remaining: usize| offset + (total - remaining);

    let mut wire_type = wire_type;
    let mut depth: u32 = 0;

    loop {
        let pos = position(buf.remaining());
        match wire_type {
            WireType::Varint => {
                decode_varint(buf).map_err(|kind| kind.at(pos))?;
            }
            WireType::I64 => advance_fixed(buf, 8).map_err(|kind| kind.at(pos))?,
            WireType::Len => {
                let len = decode_len(buf).map_err(|kind| kind.at(pos))?;
                buf.advance(len);
            }
            WireType::I32 => advance_fixed(buf, 4).map_err(|kind| kind.at(pos))?,
            WireType::SGroup => {
                if unlikely(depth >= max_depth) {
                    return Err(DecodeErrorKind::NestingTooDeep.at(pos));
                }
                depth += 1;
            }
            WireType::EGroup => {
                if unlikely(depth == 0) {
                    return Err(DecodeErrorKind::UnmatchedGroup.at(pos));
                }
                depth -= 1;
            }
        }

        if depth == 0 {
            return Ok(());
        }

        // Inside a group, keep consuming fields until its end marker.
        let pos = position(buf.remaining());
        if unlikely(!buf.has_remaining()) {
            return Err(DecodeErrorKind::UnmatchedGroup.at(pos));
        }
        wire_type = decode_key(buf).map_err(|kind| kind.at(pos))?.wire_type();
    }
}

/// Denotes the type of a field in an encoded protobuf message.
///
/// Protobuf messages are a series of key-value pairs. When encoded each key-value pair
/// is turned into a record consisting of a field number, a [`WireType`], and a payload.
/// The [`WireType`] indicates how large the proceeding payload is.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum WireType {
    /// Variable length integer.
    ///
    /// Used for: `bool` and the zig-zag encoded duration components.
    Varint = 0,
    /// 64-bit integer. Only ever skipped.
    I64 = 1,
    /// Variable length field.
    ///
    /// Used for: embedded messages, including durations.
    Len = 2,
    /// Group start (deprecated). Only ever skipped.
    SGroup = 3,
    /// Group end (deprecated). Only ever skipped.
    EGroup = 4,
    /// 32-bit integer. Only ever skipped.
    I32 = 5,
}

assert_eq_size!(WireType, u8);

#[allow(clippy::as_conversions)]
impl WireType {
    /// Try to decode a [`WireType`] from the low three bits of a key.
    #[inline(always)]
    fn try_from_val(value: u64) -> Result<Self, DecodeErrorKind> {
        match value {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::I64),
            2 => Ok(WireType::Len),
            3 => Ok(WireType::SGroup),
            4 => Ok(WireType::EGroup),
            5 => Ok(WireType::I32),
            other => Err(DecodeErrorKind::InvalidTag {
                reason: InvalidTagReason::UndefinedWireType {
                    value: u8::try_from(other).unwrap_or(u8::MAX),
                },
            }),
        }
    }

    /// Return the raw value for this [`WireType`].
    #[inline(always)]
    pub const fn into_val(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for WireType {
    type Error = DecodeErrorKind;

    #[inline(always)]
    fn try_from(value: u8) -> Result<Self, DecodeErrorKind> {
        WireType::try_from_val(u64::from(value))
    }
}

#[cfg(test)]
mod test {
    use bytes::Buf;
    use proptest::prelude::*;

    use crate::error::{DecodeError, DecodeErrorKind, InvalidTagReason};
    use crate::leb128::encode_varint;
    use crate::wire::{
        decode_key, decode_len, pack_tag, skip_field, unpack_tag, WireType, MINIMUM_TAG_VAL,
    };

    const MAX_DEPTH: u32 = 100;

    /// Skips one value at the front of `bytes`, returning how many bytes it took.
    fn skip(bytes: &[u8], wire_type: WireType, max_depth: u32) -> Result<usize, DecodeError> {
        let mut buf = bytes;
        skip_field(&mut buf, 0, wire_type, max_depth)?;
        Ok(bytes.len() - buf.remaining())
    }

    #[test]
    fn proptest_key_roundtrips() {
        fn arb_tag() -> impl Strategy<Value = u32> {
            MINIMUM_TAG_VAL..=u32::MAX
        }

        fn arb_wiretype() -> impl Strategy<Value = WireType> {
            (0..=5u8).prop_map(|val| WireType::try_from(val).expect("known valid"))
        }

        fn test(tag: u32, wire_type: WireType) {
            let mut storage = [0u8; 16];
            let start = encode_varint(&mut storage, 16, pack_tag(tag, wire_type));
            let mut buf = &storage[start..];
            let key = decode_key(&mut buf).unwrap();

            assert!(!buf.has_remaining());
            assert_eq!((wire_type, tag), key.into_parts());
        }

        let strat = (arb_tag(), arb_wiretype());
        proptest!(|((tag, wire_type) in strat)| test(tag, wire_type))
    }

    #[test]
    fn test_all_valid_values() {
        for i in u8::MIN..u8::MAX {
            let wire_type = WireType::try_from(i);
            match (i, wire_type) {
                (0, Ok(WireType::Varint))
                | (1, Ok(WireType::I64))
                | (2, Ok(WireType::Len))
                | (3, Ok(WireType::SGroup))
                | (4, Ok(WireType::EGroup))
                | (5, Ok(WireType::I32)) => (),
                (_, Err(_)) => (),
                other => panic!("unexpected value {other:?}"),
            }
        }
    }

    #[test]
    fn test_pack_tag() {
        assert_eq!(pack_tag(1, WireType::Varint), 0x08);
        assert_eq!(pack_tag(1, WireType::Len), 0x0a);
        assert_eq!(pack_tag(2, WireType::Len), 0x12);
    }

    #[test]
    fn test_unpack_large_field_numbers() {
        // One past protobuf's 2^29 - 1 limit.
        let key = unpack_tag(1 << 32).unwrap();
        assert_eq!(key.into_parts(), (WireType::Varint, 1 << 29));

        let key = unpack_tag(u64::from(u32::MAX) << 3 | 2).unwrap();
        assert_eq!(key.into_parts(), (WireType::Len, u32::MAX));
    }

    #[test]
    fn test_unpack_invalid() {
        // Field number zero.
        assert_eq!(
            unpack_tag(0x02),
            Err(DecodeErrorKind::InvalidTag {
                reason: InvalidTagReason::FieldNumberOutOfRange
            })
        );
        // Field number past u32::MAX.
        assert_eq!(
            unpack_tag((u64::from(u32::MAX) + 1) << 3),
            Err(DecodeErrorKind::InvalidTag {
                reason: InvalidTagReason::FieldNumberOutOfRange
            })
        );
        // Wire types 6 and 7 are not defined.
        assert_eq!(
            unpack_tag(0x0e),
            Err(DecodeErrorKind::InvalidTag {
                reason: InvalidTagReason::UndefinedWireType { value: 6 }
            })
        );
        assert!(unpack_tag(0x0f).is_err());
    }

    #[test]
    fn test_decode_key_invalid() {
        let mut buf = &[0x07u8][..];
        let err = decode_key(&mut buf).unwrap_err();
        assert!(matches!(err, DecodeErrorKind::InvalidTag { .. }));
    }

    #[test]
    fn test_decode_len() {
        // Length 0
        let mut buf = &[0u8][..];
        assert_eq!(decode_len(&mut buf).unwrap(), 0);
        assert!(!buf.has_remaining());

        // Length 3
        let mut buf = &[3u8, 1, 2, 3][..];
        assert_eq!(decode_len(&mut buf).unwrap(), 3);
        assert_eq!(buf, &[1, 2, 3]);

        // Length 128 (two bytes)
        let mut bytes = vec![0x80, 0x01];
        bytes.resize(130, 0);
        let mut buf = &bytes[..];
        assert_eq!(decode_len(&mut buf).unwrap(), 128);
        assert_eq!(buf.remaining(), 128);
    }

    #[test]
    fn test_decode_len_truncated() {
        let mut buf = &[0x05u8, 1, 2][..];
        assert_eq!(
            decode_len(&mut buf),
            Err(DecodeErrorKind::TruncatedMessage {
                declared: 5,
                remaining: 2
            })
        );

        let mut buf = &[0x80u8][..];
        assert_eq!(decode_len(&mut buf), Err(DecodeErrorKind::UnexpectedEnd));
    }

    #[test]
    fn test_skip_field_varint() {
        // Skip a 1-byte varint
        assert_eq!(skip(&[42u8, 99], WireType::Varint, MAX_DEPTH).unwrap(), 1);

        // Skip a multi-byte varint
        assert_eq!(skip(&[0x80, 0x01, 99], WireType::Varint, MAX_DEPTH).unwrap(), 2);
    }

    #[test]
    fn test_skip_field_fixed() {
        let buf = [1, 2, 3, 4, 5, 6, 7, 8, 99];
        assert_eq!(skip(&buf, WireType::I32, MAX_DEPTH).unwrap(), 4);
        assert_eq!(skip(&buf, WireType::I64, MAX_DEPTH).unwrap(), 8);

        let err = skip(&buf[6..], WireType::I32, MAX_DEPTH).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::UnexpectedEnd);
        assert_eq!(err.offset(), 0);
        let err = skip(&buf[2..], WireType::I64, MAX_DEPTH).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::UnexpectedEnd);
    }

    #[test]
    fn test_skip_field_len() {
        // Skip length-delimited field: length=3, data=[1,2,3]
        assert_eq!(skip(&[3, 1, 2, 3, 99], WireType::Len, MAX_DEPTH).unwrap(), 4);

        // Skip empty length-delimited field
        assert_eq!(skip(&[0, 99], WireType::Len, MAX_DEPTH).unwrap(), 1);

        let err = skip(&[9, 1], WireType::Len, MAX_DEPTH).unwrap_err();
        assert!(matches!(err.kind(), DecodeErrorKind::TruncatedMessage { .. }));
    }

    #[test]
    fn test_skip_reports_absolute_offset() {
        // Group { fixed32 with only two bytes }
        let mut buf = &[0x1Du8, 0x01, 0x02][..];
        let err = skip_field(&mut buf, 40, WireType::SGroup, MAX_DEPTH).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::UnexpectedEnd);
        assert_eq!(err.offset(), 41);
    }

    #[test]
    fn test_skip_group() {
        // { field 2: varint 5 } then end group for field 1.
        assert_eq!(skip(&[0x10, 0x05, 0x0C, 0x99], WireType::SGroup, MAX_DEPTH).unwrap(), 3);

        // Empty group.
        assert_eq!(skip(&[0x0C], WireType::SGroup, MAX_DEPTH).unwrap(), 1);
    }

    #[test]
    fn test_skip_nested_groups() {
        // { group 2 { field 1: varint 1 } fixed32 field 3 } end.
        let buf = [
            0x13, 0x08, 0x01, 0x14, 0x1D, 0x01, 0x02, 0x03, 0x04, 0x0C, 0x99,
        ];
        assert_eq!(skip(&buf, WireType::SGroup, MAX_DEPTH).unwrap(), 10);
    }

    #[test]
    fn test_skip_end_group_without_start() {
        let err = skip(&[0x99], WireType::EGroup, MAX_DEPTH).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::UnmatchedGroup);
        assert_eq!(err.offset(), 0);
    }

    #[test]
    fn test_skip_unterminated_group() {
        let buf = [0x10, 0x05, 0x13, 0x14];
        let err = skip(&buf, WireType::SGroup, MAX_DEPTH).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::UnmatchedGroup);
        assert_eq!(err.offset(), buf.len());
    }

    #[test]
    fn test_skip_group_with_undefined_wire_type() {
        let err = skip(&[0x0F, 0x0C], WireType::SGroup, MAX_DEPTH).unwrap_err();
        assert!(matches!(err.kind(), DecodeErrorKind::InvalidTag { .. }));
        assert_eq!(err.offset(), 0);
    }

    #[test]
    fn test_skip_group_depth_limit() {
        // Exactly `max_depth` open groups is fine.
        let mut buf = vec![0x0B; 2];
        buf.extend([0x0C; 3]);
        assert_eq!(skip(&buf, WireType::SGroup, 3).unwrap(), 5);

        // One more is not.
        let mut buf = vec![0x0B; 3];
        buf.extend([0x0C; 4]);
        let err = skip(&buf, WireType::SGroup, 3).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::NestingTooDeep);
        assert_eq!(err.offset(), 3);
    }

    #[test]
    fn test_skip_million_group_starts() {
        let buf = vec![0x0B; 1_000_000];
        let err = skip(&buf, WireType::SGroup, MAX_DEPTH).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::NestingTooDeep);
    }
}
