//! Scalar protobuf types and their encoding/decoding implementations.

use super::{ProtoDecode, ProtoEncode, ProtoType};
use crate::buffer::ReverseBuf;
use crate::decoder::Decoder;
use crate::error::DecodeError;
use crate::leb128::LebCodec;
use crate::wire::WireType;

impl ProtoType for bool {
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl ProtoDecode for bool {
    /// Any nonzero varint decodes as `true`.
    #[inline]
    fn decode_into(dec: &mut Decoder<'_>, dst: &mut Self) -> Result<(), DecodeError> {
        *dst = dec.read_varint()? != 0;
        Ok(())
    }
}

impl ProtoEncode for bool {
    #[inline]
    fn encode_rev(&self, buf: &mut ReverseBuf<'_>) {
        buf.put_u8(u8::from(*self));
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        1
    }
}

#[inline]
#[allow(clippy::as_conversions)]
pub const fn zigzag_encode_32(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

#[inline]
#[allow(clippy::as_conversions)]
pub const fn zigzag_decode_32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ (-((n & 1) as i32))
}

/// Wrapper for protobuf `sint32` (zigzag-encoded signed 32-bit integer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct Sint32(pub i32);

impl core::ops::Deref for Sint32 {
    type Target = i32;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ProtoType for Sint32 {
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl ProtoDecode for Sint32 {
    #[inline]
    fn decode_into(dec: &mut Decoder<'_>, dst: &mut Self) -> Result<(), DecodeError> {
        *dst = Sint32(zigzag_decode_32(dec.read_varint_u32()?));
        Ok(())
    }
}

impl ProtoEncode for Sint32 {
    #[inline]
    fn encode_rev(&self, buf: &mut ReverseBuf<'_>) {
        buf.put_varint(u64::from(zigzag_encode_32(self.0)));
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        zigzag_encode_32(self.0).encoded_leb128_len()
    }
}

#[inline]
#[allow(clippy::as_conversions)]
pub const fn zigzag_encode_64(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

#[inline]
#[allow(clippy::as_conversions)]
pub const fn zigzag_decode_64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ (-((n & 1) as i64))
}

/// Wrapper for protobuf `sint64` (zigzag-encoded signed 64-bit integer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct Sint64(pub i64);

impl core::ops::Deref for Sint64 {
    type Target = i64;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ProtoType for Sint64 {
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl ProtoDecode for Sint64 {
    #[inline]
    fn decode_into(dec: &mut Decoder<'_>, dst: &mut Self) -> Result<(), DecodeError> {
        *dst = Sint64(zigzag_decode_64(dec.read_varint()?));
        Ok(())
    }
}

impl ProtoEncode for Sint64 {
    #[inline]
    fn encode_rev(&self, buf: &mut ReverseBuf<'_>) {
        buf.put_varint(zigzag_encode_64(self.0));
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        zigzag_encode_64(self.0).encoded_leb128_len()
    }
}
