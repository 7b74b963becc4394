//! Configuration for decoding.

/// Default bound on nested messages and groups.
pub const DEFAULT_MAX_DEPTH: u32 = 100;

/// Limits applied while decoding untrusted input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum nesting of embedded messages and groups below the top-level record.
    pub(crate) max_depth: u32,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DecodeOptions {
    /// Create new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum nesting depth of embedded messages and groups.
    ///
    /// Input nested deeper than this fails with
    /// [`crate::DecodeErrorKind::NestingTooDeep`]. A depth of zero only accepts
    /// flat records.
    pub fn max_depth(&mut self, depth: u32) -> &mut Self {
        self.max_depth = depth;
        self
    }
}
