//! Message-level types and helpers.

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

use crate::buffer::ReverseBuf;
use crate::config::DecodeOptions;
use crate::decoder::Decoder;
use crate::error::{DecodeError, DecodeErrorKind, EncodeError};
use crate::leb128::LebCodec;
use crate::util::CastFrom;
use crate::wire::{encode_key_rev, encoded_key_len, ProtoKey, WireType};

/// Trait for protobuf message types.
///
/// Implementors describe their fields by number: `merge_field` dispatches on
/// the key's tag, `encode_message_rev` writes fields last to first. Everything
/// else (length prefixes, sizing, the decode loop) is provided.
///
/// Decoding follows protobuf merging semantics:
/// - Scalars: last value wins (overwrite)
/// - Embedded messages: recursive merge
/// - Optional embedded messages: replaced by the last occurrence
pub trait ProtoMessage: Default {
    /// Decode the value for `key` from `dec` into `self`.
    ///
    /// Unknown tags must be handed to [`Decoder::skip_field`].
    fn merge_field(&mut self, key: ProtoKey, dec: &mut Decoder<'_>) -> Result<(), DecodeError>;

    /// Returns the exact encoded length of the message body (without length prefix).
    ///
    /// This is also where values that cannot be encoded are rejected, so a
    /// successful return guarantees `encode_message_rev` will not fail.
    fn encoded_message_len(&self) -> Result<usize, EncodeError>;

    /// Encode the message body (without length prefix) in front of everything
    /// already written to `buf`, last field first.
    ///
    /// Must only be called after `encoded_message_len` succeeded.
    fn encode_message_rev(&self, buf: &mut ReverseBuf<'_>);

    /// Checks invariants that span several fields once the whole body was read.
    fn verify_decoded(&self) -> Result<(), DecodeErrorKind> {
        Ok(())
    }

    /// Merge every field remaining in `dec` into `self`.
    fn merge_message(&mut self, dec: &mut Decoder<'_>) -> Result<(), DecodeError> {
        let start = dec.position();
        while dec.has_remaining() {
            let key = dec.read_key()?;
            self.merge_field(key, dec)?;
        }
        self.verify_decoded().map_err(|kind| kind.at(start))
    }

    /// Decode a message from `buf` using the default [`DecodeOptions`].
    fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        Self::decode_with_options(buf, &DecodeOptions::default())
    }

    /// Decode a message from `buf`. Consumes all bytes in the buffer.
    fn decode_with_options(buf: &[u8], options: &DecodeOptions) -> Result<Self, DecodeError> {
        let mut msg = Self::default();
        let mut dec = Decoder::new(buf, options);
        msg.merge_message(&mut dec).inspect_err(|err| {
            debug!(
                message = core::any::type_name::<Self>(),
                error = %err,
                "failed to decode message"
            );
        })?;
        Ok(msg)
    }

    /// Encode the message into a newly allocated buffer of exactly the right size.
    fn encode(&self) -> Result<Bytes, EncodeError> {
        let len = self.encoded_message_len()?;
        trace!(message = core::any::type_name::<Self>(), len, "encoding message");

        let mut out = BytesMut::zeroed(len);
        let mut buf = ReverseBuf::new(&mut out[..]);
        self.encode_message_rev(&mut buf);
        debug_assert_eq!(buf.remaining(), 0, "encoded_message_len mismatch");

        Ok(out.freeze())
    }

    /// Encode the message into the front of `dst`, returning the number of bytes written.
    ///
    /// Nothing is written if `dst` is too small.
    fn encode_to_slice(&self, dst: &mut [u8]) -> Result<usize, EncodeError> {
        let len = self.encoded_message_len()?;
        if dst.len() < len {
            return Err(EncodeError::InsufficientSpace {
                required: len,
                available: dst.len(),
            });
        }

        let mut buf = ReverseBuf::new(&mut dst[..len]);
        self.encode_message_rev(&mut buf);
        debug_assert_eq!(buf.remaining(), 0, "encoded_message_len mismatch");

        Ok(len)
    }
}

/// Helper to encode a message as a length-delimited field.
///
/// Writes the message body, then its length prefix, then the key. The length is
/// simply the number of bytes the body occupied, so it is never computed twice.
#[inline]
pub fn encode_message_field_rev<T: ProtoMessage>(tag: u32, msg: &T, buf: &mut ReverseBuf<'_>) {
    let before = buf.written();
    msg.encode_message_rev(buf);
    let msg_len = buf.written() - before;
    buf.put_varint(u64::cast_from(msg_len));
    encode_key_rev(WireType::Len, tag, buf);
}

/// Returns the encoded length of a message as a length-delimited field, key included.
#[inline]
pub fn encoded_message_field_len<T: ProtoMessage>(tag: u32, msg: &T) -> Result<usize, EncodeError> {
    let msg_len = msg.encoded_message_len()?;
    Ok(encoded_key_len(tag) + u64::cast_from(msg_len).encoded_leb128_len() + msg_len)
}

/// Helper to merge a length-delimited message field into `dst`.
#[inline]
pub fn merge_message_field<T: ProtoMessage>(
    key: ProtoKey,
    dec: &mut Decoder<'_>,
    dst: &mut T,
) -> Result<(), DecodeError> {
    dec.check_wire_type(key, WireType::Len)?;
    let mut inner = dec.enter_message()?;
    dst.merge_message(&mut inner)
}
