//! Fixed-Capacity Sentence Buffer
//!
//! ## Overview
//!
//! The NMEA assembler accumulates bytes from the UART interrupt into a buffer
//! whose capacity is fixed at compile time. Unlike a ring buffer that silently
//! overwrites, this buffer refuses the byte that would not fit and latches an
//! overflow flag. The assembler then discards the whole sentence and counts
//! the overflow; a truncated sentence is never handed to the parser.
//!
//! ```text
//! SentenceBuffer<8>
//! ┌───┬───┬───┬───┬───┬───┬───┬───┐
//! │ $ │ G │ P │ R │ M │ C │ , │ 1 │  push('2') -> Err(BufferOverflow)
//! └───┴───┴───┴───┴───┴───┴───┴───┘  overflowed() == true until clear()
//! ```
//!
//! Storage is a `heapless::Vec`, so the memory footprint is exactly `N` bytes
//! plus a length word, with no allocator involvement.

use heapless::Vec;

use crate::errors::{AcquisitionError, AcquisitionResult};

/// Bounded byte buffer with explicit overflow signalling
#[derive(Clone, Default)]
pub struct SentenceBuffer<const N: usize> {
    bytes: Vec<u8, N>,
    overflowed: bool,
}

impl<const N: usize> SentenceBuffer<N> {
    /// Empty buffer, usable in const contexts
    pub const fn new() -> Self {
        Self {
            bytes: Vec::new(),
            overflowed: false,
        }
    }

    /// Append one byte
    ///
    /// Fails once the buffer is full and keeps failing until `clear()`, even
    /// if the caller ignores the first error.
    pub fn push(&mut self, byte: u8) -> AcquisitionResult<()> {
        if self.overflowed || self.bytes.push(byte).is_err() {
            self.overflowed = true;
            return Err(AcquisitionError::BufferOverflow { capacity: N });
        }
        Ok(())
    }

    /// Contents accumulated so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of stored bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether a push was refused since the last `clear()`
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Compile-time capacity
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Drop contents and the overflow latch
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.overflowed = false;
    }
}
