use thiserror::Error;

use crate::wire::WireType;

/// The kinds of failure a decode can run into.
///
/// Leaf decoders return a bare kind; the [`crate::decoder::Decoder`] pins it to a
/// byte offset with [`DecodeErrorKind::at`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum DecodeErrorKind {
    #[error("varint does not fit in 64 bits")]
    IntegerOverflow,
    #[error("unexpected end of buffer")]
    UnexpectedEnd,
    #[error("invalid tag: {reason}")]
    InvalidTag { reason: InvalidTagReason },
    #[error("invalid duration: {reason}")]
    InvalidDuration { reason: InvalidDurationReason },
    #[error("length prefix {declared} exceeds the {remaining} remaining bytes")]
    TruncatedMessage { declared: u64, remaining: usize },
    #[error("unmatched group start or end")]
    UnmatchedGroup,
    #[error("nesting depth exceeds the configured limit")]
    NestingTooDeep,
}

impl DecodeErrorKind {
    /// Attach the byte offset at which this error was detected.
    #[cold]
    pub const fn at(self, offset: usize) -> DecodeError {
        DecodeError { kind: self, offset }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum InvalidTagReason {
    #[error("field number out of range")]
    FieldNumberOutOfRange,
    #[error("wire type {value} is not defined")]
    UndefinedWireType { value: u8 },
    #[error("field {field} expects wire type {expected:?}, found {actual:?}")]
    WireTypeMismatch {
        field: u32,
        expected: WireType,
        actual: WireType,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum InvalidDurationReason {
    #[error("nanos {nanos} is outside of ±999,999,999")]
    NanosOutOfRange { nanos: i32 },
    #[error("seconds {seconds} and nanos {nanos} have opposite signs")]
    SignMismatch { seconds: i64, nanos: i32 },
    #[error("seconds {seconds} is outside of ±10,000 years")]
    SecondsOutOfRange { seconds: i64 },
    #[error("duration of {seconds}s {nanos}ns is negative")]
    Negative { seconds: i64, nanos: i32 },
}

/// A decode failure and the byte offset in the input where it was detected.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
#[error("{kind} (at byte offset {offset})")]
pub struct DecodeError {
    kind: DecodeErrorKind,
    offset: usize,
}

impl DecodeError {
    pub fn kind(&self) -> DecodeErrorKind {
        self.kind
    }

    /// Offset into the top-level input buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Errors returned while encoding. These are raised before any byte is written.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("invalid duration: {reason}")]
    InvalidDuration { reason: InvalidDurationReason },
    #[error("encoding needs {required} bytes but only {available} are available")]
    InsufficientSpace { required: usize, available: usize },
}

impl From<InvalidDurationReason> for EncodeError {
    fn from(reason: InvalidDurationReason) -> Self {
        EncodeError::InvalidDuration { reason }
    }
}

impl From<InvalidDurationReason> for DecodeErrorKind {
    fn from(reason: InvalidDurationReason) -> Self {
        DecodeErrorKind::InvalidDuration { reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_offset() {
        let err = DecodeErrorKind::TruncatedMessage {
            declared: 10,
            remaining: 2,
        }
        .at(7);
        assert_eq!(
            err.to_string(),
            "length prefix 10 exceeds the 2 remaining bytes (at byte offset 7)"
        );
        assert_eq!(err.offset(), 7);
    }

    #[test]
    fn test_wire_type_mismatch_display() {
        let kind = DecodeErrorKind::InvalidTag {
            reason: InvalidTagReason::WireTypeMismatch {
                field: 2,
                expected: WireType::Len,
                actual: WireType::Varint,
            },
        };
        assert_eq!(
            kind.to_string(),
            "invalid tag: field 2 expects wire type Len, found Varint"
        );
    }
}
