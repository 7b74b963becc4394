//! Signed durations as an embedded `{ sint64 seconds = 1; sint32 nanos = 2; }` message.

use super::message::ProtoMessage;
use super::scalar::{Sint32, Sint64};
use super::{encode_field_rev, encoded_field_len, merge_field, IsProtoDefault};
use crate::buffer::ReverseBuf;
use crate::decoder::Decoder;
use crate::error::{DecodeError, DecodeErrorKind, EncodeError, InvalidDurationReason};
use crate::wire::ProtoKey;

const SECONDS_TAG: u32 = 1;
const NANOS_TAG: u32 = 2;

/// A signed span of time with nanosecond resolution.
///
/// `seconds` and `nanos` always share a sign (either may be zero), and
/// `|nanos| < 1_000_000_000`. Construct through [`Duration::new`] to have this
/// checked up front; values built from the public fields are checked when they
/// are encoded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Duration {
    pub seconds: i64,
    pub nanos: i32,
}

impl Duration {
    pub const ZERO: Duration = Duration {
        seconds: 0,
        nanos: 0,
    };

    pub const NANOS_PER_SECOND: i32 = 1_000_000_000;

    /// About 10,000 years, the widest duration accepted on the wire.
    pub const MAX_SECONDS: i64 = 315_576_000_000;

    pub fn new(seconds: i64, nanos: i32) -> Result<Self, InvalidDurationReason> {
        let duration = Duration { seconds, nanos };
        duration.validate()?;
        Ok(duration)
    }

    pub const fn from_secs(seconds: i64) -> Self {
        Duration { seconds, nanos: 0 }
    }

    pub fn is_zero(&self) -> bool {
        self.seconds == 0 && self.nanos == 0
    }

    pub fn validate(&self) -> Result<(), InvalidDurationReason> {
        let Duration { seconds, nanos } = *self;
        if nanos <= -Self::NANOS_PER_SECOND || nanos >= Self::NANOS_PER_SECOND {
            return Err(InvalidDurationReason::NanosOutOfRange { nanos });
        }
        if !(-Self::MAX_SECONDS..=Self::MAX_SECONDS).contains(&seconds) {
            return Err(InvalidDurationReason::SecondsOutOfRange { seconds });
        }
        if (seconds > 0 && nanos < 0) || (seconds < 0 && nanos > 0) {
            return Err(InvalidDurationReason::SignMismatch { seconds, nanos });
        }
        Ok(())
    }
}

impl TryFrom<core::time::Duration> for Duration {
    type Error = InvalidDurationReason;

    fn try_from(value: core::time::Duration) -> Result<Self, Self::Error> {
        let seconds = i64::try_from(value.as_secs()).unwrap_or(i64::MAX);
        // Always below one billion.
        let nanos = i32::try_from(value.subsec_nanos()).unwrap_or(i32::MAX);
        Duration::new(seconds, nanos)
    }
}

impl TryFrom<Duration> for core::time::Duration {
    type Error = InvalidDurationReason;

    fn try_from(value: Duration) -> Result<Self, Self::Error> {
        value.validate()?;
        match (u64::try_from(value.seconds), u32::try_from(value.nanos)) {
            (Ok(secs), Ok(nanos)) => Ok(core::time::Duration::new(secs, nanos)),
            _ => Err(InvalidDurationReason::Negative {
                seconds: value.seconds,
                nanos: value.nanos,
            }),
        }
    }
}

impl ProtoMessage for Duration {
    fn merge_field(&mut self, key: ProtoKey, dec: &mut Decoder<'_>) -> Result<(), DecodeError> {
        match key.tag() {
            SECONDS_TAG => {
                let mut seconds = Sint64::default();
                merge_field(key, dec, &mut seconds)?;
                self.seconds = *seconds;
                Ok(())
            }
            NANOS_TAG => {
                let mut nanos = Sint32::default();
                merge_field(key, dec, &mut nanos)?;
                self.nanos = *nanos;
                Ok(())
            }
            _ => dec.skip_field(key),
        }
    }

    fn encoded_message_len(&self) -> Result<usize, EncodeError> {
        self.validate()?;

        let mut len = 0;
        if !self.seconds.is_proto_default() {
            len += encoded_field_len(SECONDS_TAG, &Sint64(self.seconds));
        }
        if !self.nanos.is_proto_default() {
            len += encoded_field_len(NANOS_TAG, &Sint32(self.nanos));
        }
        Ok(len)
    }

    fn encode_message_rev(&self, buf: &mut ReverseBuf<'_>) {
        if !self.nanos.is_proto_default() {
            encode_field_rev(NANOS_TAG, &Sint32(self.nanos), buf);
        }
        if !self.seconds.is_proto_default() {
            encode_field_rev(SECONDS_TAG, &Sint64(self.seconds), buf);
        }
    }

    fn verify_decoded(&self) -> Result<(), DecodeErrorKind> {
        self.validate().map_err(DecodeErrorKind::from)
    }
}

impl core::fmt::Display for Duration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.seconds < 0 || self.nanos < 0 { "-" } else { "" };
        let seconds = self.seconds.unsigned_abs();
        let nanos = self.nanos.unsigned_abs();
        if nanos == 0 {
            write!(f, "{sign}{seconds}s")
        } else {
            write!(f, "{sign}{seconds}.{nanos:09}s")
        }
    }
}
