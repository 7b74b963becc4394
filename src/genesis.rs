//! Genesis records of the recovery module.
//!
//! ```text
//! message GenesisState {
//!   Params params = 1;
//! }
//!
//! message Params {
//!   bool enable_recovery = 1;
//!   google.protobuf.Duration packet_timeout_duration = 2;
//! }
//! ```
//!
//! The duration is carried with zig-zag (`sint64`/`sint32`) components.

use crate::buffer::ReverseBuf;
use crate::codec::{
    encode_field_rev, encode_message_field_rev, encode_optional_message_field_rev,
    encoded_field_len, encoded_message_field_len, encoded_optional_message_field_len,
    merge_field, merge_message_field, merge_optional_message_field, Duration, IsProtoDefault,
    ProtoMessage,
};
use crate::decoder::Decoder;
use crate::error::{DecodeError, EncodeError};
use crate::wire::ProtoKey;

/// State of the recovery module at genesis.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenesisState {
    /// Always written, even when every parameter is a default.
    pub params: Params,
}

impl GenesisState {
    const PARAMS_TAG: u32 = 1;

    pub fn new(params: Params) -> Self {
        GenesisState { params }
    }
}

impl ProtoMessage for GenesisState {
    fn merge_field(&mut self, key: ProtoKey, dec: &mut Decoder<'_>) -> Result<(), DecodeError> {
        match key.tag() {
            Self::PARAMS_TAG => merge_message_field(key, dec, &mut self.params),
            _ => dec.skip_field(key),
        }
    }

    fn encoded_message_len(&self) -> Result<usize, EncodeError> {
        encoded_message_field_len(Self::PARAMS_TAG, &self.params)
    }

    fn encode_message_rev(&self, buf: &mut ReverseBuf<'_>) {
        encode_message_field_rev(Self::PARAMS_TAG, &self.params, buf);
    }
}

/// Parameters of the recovery module.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    pub enable_recovery: bool,
    /// `None` when the field was never set; `Some(Duration::ZERO)` is still written.
    pub packet_timeout_duration: Option<Duration>,
}

impl Params {
    const ENABLE_RECOVERY_TAG: u32 = 1;
    const PACKET_TIMEOUT_DURATION_TAG: u32 = 2;

    pub fn new(enable_recovery: bool, packet_timeout_duration: Duration) -> Self {
        Params {
            enable_recovery,
            packet_timeout_duration: Some(packet_timeout_duration),
        }
    }
}

impl ProtoMessage for Params {
    fn merge_field(&mut self, key: ProtoKey, dec: &mut Decoder<'_>) -> Result<(), DecodeError> {
        match key.tag() {
            Self::ENABLE_RECOVERY_TAG => merge_field(key, dec, &mut self.enable_recovery),
            Self::PACKET_TIMEOUT_DURATION_TAG => {
                merge_optional_message_field(key, dec, &mut self.packet_timeout_duration)
            }
            _ => dec.skip_field(key),
        }
    }

    fn encoded_message_len(&self) -> Result<usize, EncodeError> {
        let mut len = encoded_optional_message_field_len(
            Self::PACKET_TIMEOUT_DURATION_TAG,
            &self.packet_timeout_duration,
        )?;
        if !self.enable_recovery.is_proto_default() {
            len += encoded_field_len(Self::ENABLE_RECOVERY_TAG, &self.enable_recovery);
        }
        Ok(len)
    }

    fn encode_message_rev(&self, buf: &mut ReverseBuf<'_>) {
        encode_optional_message_field_rev(
            Self::PACKET_TIMEOUT_DURATION_TAG,
            &self.packet_timeout_duration,
            buf,
        );
        if !self.enable_recovery.is_proto_default() {
            encode_field_rev(Self::ENABLE_RECOVERY_TAG, &self.enable_recovery, buf);
        }
    }
}
