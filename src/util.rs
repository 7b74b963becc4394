//! Small helpers shared across the codec.

use static_assertions::const_assert;

// `CastFrom<usize> for u64` relies on `usize` being at most 64 bits wide.
const_assert!(core::mem::size_of::<usize>() <= core::mem::size_of::<u64>());

/// Infallible conversions that `From` does not provide because they depend on
/// the target's pointer width.
pub(crate) trait CastFrom<T> {
    fn cast_from(from: T) -> Self;
}

#[allow(clippy::as_conversions)]
impl CastFrom<usize> for u64 {
    #[inline(always)]
    fn cast_from(from: usize) -> u64 {
        from as u64
    }
}

#[inline(always)]
#[cold]
fn cold_path() {}

/// "Annotation" to hint that a branch of an if-statement is likely to occur.
#[inline(always)]
pub(crate) fn likely(b: bool) -> bool {
    if b {
        true
    } else {
        cold_path();
        false
    }
}

/// "Annotation" to hint that a branch of an if-statement is _not likely_ to occur.
#[inline(always)]
pub(crate) fn unlikely(b: bool) -> bool {
    if b {
        cold_path();
        true
    } else {
        false
    }
}
