//! Default value checks for zero-value elision.
//!
//! In proto3, scalar fields holding their default value are not encoded. Embedded
//! messages are a different story: once present they are always written, even if
//! every field inside them is a default. So this trait is only implemented for
//! scalars, and message-typed fields rely on `Option` for presence instead.

/// Trait for checking if a value is the protobuf default.
pub trait IsProtoDefault {
    /// Returns true if this value is the protobuf default value.
    fn is_proto_default(&self) -> bool;
}

// Bool - default is false
impl IsProtoDefault for bool {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        !*self
    }
}

impl IsProtoDefault for i32 {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        *self == 0
    }
}

impl IsProtoDefault for i64 {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        *self == 0
    }
}
