//! Output buffer for the tail-to-head encoder.
//!
//! Every record is sized before it is written, so the encoder allocates exactly
//! once and then fills the allocation from the back. Writing the last field first
//! means a nested message's length is known (it is just the number of bytes
//! written since the message started) by the time its length prefix is needed.

use crate::leb128::LebCodec;

/// A fixed-size byte slice that is filled from its end toward its start.
pub struct ReverseBuf<'a> {
    buf: &'a mut [u8],
    /// Index of the first written byte; `buf[pos..]` is the output so far.
    pos: usize,
}

impl<'a> ReverseBuf<'a> {
    /// Wraps `buf`; the first write lands in its last byte.
    pub fn new(buf: &'a mut [u8]) -> Self {
        let pos = buf.len();
        ReverseBuf { buf, pos }
    }

    /// How many bytes have been written so far.
    #[inline]
    pub fn written(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// How many bytes can still be written in front of the current position.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.pos
    }

    /// Write a single byte in front of everything written so far.
    ///
    /// # Panics
    ///
    /// If the buffer is already full. Callers size the buffer exactly, so this
    /// indicates the size computation and the writer disagree.
    #[inline]
    pub fn put_u8(&mut self, byte: u8) {
        assert!(self.pos > 0, "ReverseBuf overrun");
        self.pos -= 1;
        self.buf[self.pos] = byte;
    }

    /// Write `value` as a varint in front of everything written so far.
    ///
    /// # Panics
    ///
    /// If fewer than `value.encoded_leb128_len()` bytes remain.
    #[inline]
    pub fn put_varint(&mut self, value: u64) {
        assert!(
            self.pos >= value.encoded_leb128_len(),
            "ReverseBuf overrun"
        );
        self.pos = value.encode_leb128_rev(self.buf, self.pos);
    }
}

impl core::fmt::Debug for ReverseBuf<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ReverseBuf")
            .field("len", &self.buf.len())
            .field("pos", &self.pos)
            .finish()
    }
}
