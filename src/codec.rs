//! Encoding and decoding traits for protobuf wire format.

mod default_check;
mod duration;
mod message;
mod optional;
mod scalar;

use crate::buffer::ReverseBuf;
use crate::decoder::Decoder;
use crate::error::DecodeError;
use crate::wire::{encode_key_rev, encoded_key_len, ProtoKey, WireType};

pub trait ProtoType: Sized {
    /// The wire type used to encode and decode this type.
    const WIRE_TYPE: WireType;
}

/// A scalar that can be decoded from protobuf wire format.
pub trait ProtoDecode: ProtoType {
    /// Decode a value from `dec` into `dst`, overwriting any earlier value.
    fn decode_into(dec: &mut Decoder<'_>, dst: &mut Self) -> Result<(), DecodeError>;
}

/// A scalar that can be encoded to protobuf wire format.
pub trait ProtoEncode: ProtoType {
    /// Encode this value in front of everything already written to `buf`.
    fn encode_rev(&self, buf: &mut ReverseBuf<'_>);

    /// Returns the encoded length of this value (not including field key).
    fn encoded_len(&self) -> usize;
}

/// Writes `value` and then its key, so the key ends up in front of the value.
#[inline]
pub fn encode_field_rev<T: ProtoEncode>(tag: u32, value: &T, buf: &mut ReverseBuf<'_>) {
    value.encode_rev(buf);
    encode_key_rev(T::WIRE_TYPE, tag, buf);
}

/// Returns the encoded length of a scalar field including its key.
#[inline]
pub fn encoded_field_len<T: ProtoEncode>(tag: u32, value: &T) -> usize {
    encoded_key_len(tag) + value.encoded_len()
}

/// Decodes the value of a scalar field after checking the key's wire type.
#[inline]
pub fn merge_field<T: ProtoDecode>(
    key: ProtoKey,
    dec: &mut Decoder<'_>,
    dst: &mut T,
) -> Result<(), DecodeError> {
    dec.check_wire_type(key, T::WIRE_TYPE)?;
    T::decode_into(dec, dst)
}

pub use default_check::IsProtoDefault;
pub use duration::Duration;
pub use message::{
    encode_message_field_rev, encoded_message_field_len, merge_message_field, ProtoMessage,
};
pub use optional::{
    encode_optional_message_field_rev, encoded_optional_message_field_len,
    merge_optional_message_field,
};
pub use scalar::{zigzag_decode_32, zigzag_decode_64, zigzag_encode_32, zigzag_encode_64};
pub use scalar::{Sint32, Sint64};
