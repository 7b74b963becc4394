//! Embedded message fields with explicit presence.
//!
//! `None` is never written. `Some` is always written, even when every field of
//! the message is a default, so an explicitly zero value survives a round trip.

use super::message::{
    encode_message_field_rev, encoded_message_field_len, merge_message_field, ProtoMessage,
};
use crate::buffer::ReverseBuf;
use crate::decoder::Decoder;
use crate::error::{DecodeError, EncodeError};
use crate::wire::ProtoKey;

#[inline]
pub fn encode_optional_message_field_rev<T: ProtoMessage>(
    tag: u32,
    msg: &Option<T>,
    buf: &mut ReverseBuf<'_>,
) {
    if let Some(msg) = msg {
        encode_message_field_rev(tag, msg, buf);
    }
}

#[inline]
pub fn encoded_optional_message_field_len<T: ProtoMessage>(
    tag: u32,
    msg: &Option<T>,
) -> Result<usize, EncodeError> {
    match msg {
        Some(msg) => encoded_message_field_len(tag, msg),
        None => Ok(0),
    }
}

/// Decodes an occurrence of an optional message field.
///
/// Each occurrence replaces the previous value outright instead of merging
/// into it, so the last occurrence wins.
#[inline]
pub fn merge_optional_message_field<T: ProtoMessage>(
    key: ProtoKey,
    dec: &mut Decoder<'_>,
    dst: &mut Option<T>,
) -> Result<(), DecodeError> {
    let mut value = T::default();
    merge_message_field(key, dec, &mut value)?;
    *dst = Some(value);
    Ok(())
}
