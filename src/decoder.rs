//! Forward cursor over an encoded message.

use bytes::Buf;
use tracing::trace;

use crate::config::DecodeOptions;
use crate::error::{DecodeError, DecodeErrorKind};
use crate::leb128::decode_varint;
use crate::wire::{decode_key, decode_len, skip_field, ProtoKey, WireType};

/// Reads one message body, tracking the absolute offset of every byte so errors
/// from nested messages still point into the caller's original buffer.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    /// Unread bytes of the current message.
    buf: &'a [u8],
    /// Absolute offset of the first byte of the current message.
    start: usize,
    /// Length of the current message.
    len: usize,
    /// Start of the most recently read key.
    key_pos: usize,
    depth: u32,
    max_depth: u32,
}

impl<'a> Decoder<'a> {
    /// A decoder over a complete top-level message.
    pub fn new(buf: &'a [u8], options: &DecodeOptions) -> Self {
        Decoder {
            buf,
            start: 0,
            len: buf.len(),
            key_pos: 0,
            depth: 0,
            max_depth: options.max_depth,
        }
    }

    /// Absolute offset of the next unread byte.
    #[inline]
    pub fn position(&self) -> usize {
        self.start + (self.len - self.buf.remaining())
    }

    #[inline]
    pub fn has_remaining(&self) -> bool {
        self.buf.has_remaining()
    }

    /// Reads the next field key.
    #[inline]
    pub fn read_key(&mut self) -> Result<ProtoKey, DecodeError> {
        let pos = self.position();
        let key = decode_key(&mut self.buf).map_err(|kind| kind.at(pos))?;
        self.key_pos = pos;
        Ok(key)
    }

    #[inline]
    pub fn read_varint(&mut self) -> Result<u64, DecodeError> {
        let pos = self.position();
        decode_varint(&mut self.buf).map_err(|kind| kind.at(pos))
    }

    /// Reads a varint that must fit in 32 bits.
    #[inline]
    pub fn read_varint_u32(&mut self) -> Result<u32, DecodeError> {
        let start = self.position();
        let value = self.read_varint()?;
        u32::try_from(value).map_err(|_| DecodeErrorKind::IntegerOverflow.at(start))
    }

    /// Fails, pointing at the key, unless `key` carries the `expected` wire type.
    #[inline]
    pub fn check_wire_type(&self, key: ProtoKey, expected: WireType) -> Result<(), DecodeError> {
        key.expect_wire_type(expected)
            .map_err(|kind| kind.at(self.key_pos))
    }

    /// Reads a length prefix and returns a decoder over the embedded message
    /// that follows it. `self` is advanced past the embedded message.
    pub fn enter_message(&mut self) -> Result<Decoder<'a>, DecodeError> {
        let len_pos = self.position();
        let len = decode_len(&mut self.buf).map_err(|kind| kind.at(len_pos))?;
        if self.depth >= self.max_depth {
            return Err(DecodeErrorKind::NestingTooDeep.at(len_pos));
        }

        let start = self.position();
        let buf: &'a [u8] = self.buf;
        let (body, rest) = buf.split_at(len);
        self.buf = rest;

        Ok(Decoder {
            buf: body,
            start,
            len,
            key_pos: start,
            depth: self.depth + 1,
            max_depth: self.max_depth,
        })
    }

    /// Skips the value of a field this schema does not know about.
    pub fn skip_field(&mut self, key: ProtoKey) -> Result<(), DecodeError> {
        trace!(
            field = key.tag(),
            wire_type = ?key.wire_type(),
            offset = self.key_pos,
            "skipping unknown field"
        );
        let offset = self.position();
        let budget = self.max_depth - self.depth;
        skip_field(&mut self.buf, offset, key.wire_type(), budget)
    }
}
