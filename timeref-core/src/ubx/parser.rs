//! UBX frame parser
//!
//! Byte-at-a-time state machine driven from the UART receive interrupt. It
//! never looks ahead and never blocks: [`FrameParser::feed`] returns
//! `WouldBlock` until a frame completes.
//!
//! ```text
//! WaitSync1 → WaitSync2 → Class → Id → LenLo → LenHi ─┬→ Payload(0..len) ─┬→ ChecksumA → ChecksumB
//!     ↑          │                                   └── len == 0 ───────┘                  │
//!     └──────────┴──────────────── unexpected byte / frame done ────────────────────────────┘
//! ```
//!
//! The payload index counts against the declared length, not the buffer.
//! Bytes past [`UBX_PAYLOAD_CAPACITY`] still feed the checksum and advance
//! the index but are not stored, so an oversized message (MON-VER with many
//! extension strings) cannot shift the framing of the next one.
//!
//! Checksums are verified: a mismatching frame is dropped and counted.

use heapless::Vec;

use super::{Checksum, SYNC1, SYNC2};
use crate::constants::buffers::UBX_PAYLOAD_CAPACITY;
use crate::errors::AcquisitionError;

/// Parser position within a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParserState {
    /// Hunting for 0xB5
    WaitSync1,
    /// Saw 0xB5, expecting 0x62
    WaitSync2,
    /// Expecting class byte
    Class,
    /// Expecting id byte
    Id,
    /// Expecting length low byte
    LenLo,
    /// Expecting length high byte
    LenHi,
    /// Inside the payload
    Payload,
    /// Expecting CK_A
    ChecksumA,
    /// Expecting CK_B
    ChecksumB,
}

/// Frame accounting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UbxStats {
    /// Frames that passed checksum verification
    pub frames: u32,
    /// Frames dropped on checksum mismatch
    pub checksum_errors: u32,
    /// Verified frames whose payload exceeded the buffer
    pub truncated: u32,
    /// Verified frames of a class/id this layer does not consume
    pub unknown: u32,
}

/// A verified frame, borrowed from the parser until the next `feed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    /// Message class
    pub class: u8,
    /// Message id
    pub id: u8,
    /// Length from the header
    pub declared_len: u16,
    /// Stored payload, at most `UBX_PAYLOAD_CAPACITY` bytes
    pub payload: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Whether bytes were dropped from the payload
    pub fn is_truncated(&self) -> bool {
        self.payload.len() < self.declared_len as usize
    }

    /// Whole payload, or `FrameTruncated` if the tail was not stored
    pub fn full_payload(&self) -> Result<&'a [u8], AcquisitionError> {
        if self.is_truncated() {
            return Err(AcquisitionError::FrameTruncated {
                declared: self.declared_len,
                capacity: self.payload.len(),
            });
        }
        Ok(self.payload)
    }

    /// `(class, id)` pair
    pub fn key(&self) -> (u8, u8) {
        (self.class, self.id)
    }
}

/// UBX parser state machine
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParserState,
    class: u8,
    id: u8,
    len: u16,
    index: u16,
    payload: Vec<u8, UBX_PAYLOAD_CAPACITY>,
    checksum: Checksum,
    ck_a: u8,
    stats: UbxStats,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Parser hunting for a sync byte
    pub const fn new() -> Self {
        Self {
            state: ParserState::WaitSync1,
            class: 0,
            id: 0,
            len: 0,
            index: 0,
            payload: Vec::new(),
            checksum: Checksum::new(),
            ck_a: 0,
            stats: UbxStats {
                frames: 0,
                checksum_errors: 0,
                truncated: 0,
                unknown: 0,
            },
        }
    }

    /// Abandon any partial frame
    pub fn reset(&mut self) {
        self.state = ParserState::WaitSync1;
        self.index = 0;
    }

    /// Current state
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Frame counters
    pub fn stats(&self) -> &UbxStats {
        &self.stats
    }

    /// Count a verified frame nobody consumed
    pub fn note_unknown(&mut self) {
        self.stats.unknown = self.stats.unknown.wrapping_add(1);
    }

    /// Advance by one byte
    ///
    /// `Ok` carries a verified frame; `Err(Other)` reports a dropped frame.
    pub fn feed(&mut self, byte: u8) -> nb::Result<Frame<'_>, AcquisitionError> {
        match self.state {
            ParserState::WaitSync1 => {
                if byte == SYNC1 {
                    self.state = ParserState::WaitSync2;
                }
            }
            ParserState::WaitSync2 => {
                self.state = match byte {
                    SYNC2 => ParserState::Class,
                    // B5 B5 62: the second B5 may start the real frame
                    SYNC1 => ParserState::WaitSync2,
                    _ => ParserState::WaitSync1,
                };
                self.checksum = Checksum::new();
            }
            ParserState::Class => {
                self.class = byte;
                self.checksum.update(byte);
                self.state = ParserState::Id;
            }
            ParserState::Id => {
                self.id = byte;
                self.checksum.update(byte);
                self.state = ParserState::LenLo;
            }
            ParserState::LenLo => {
                self.len = byte as u16;
                self.checksum.update(byte);
                self.state = ParserState::LenHi;
            }
            ParserState::LenHi => {
                self.len |= (byte as u16) << 8;
                self.checksum.update(byte);
                self.index = 0;
                self.payload.clear();
                self.state = if self.len == 0 {
                    ParserState::ChecksumA
                } else {
                    ParserState::Payload
                };
            }
            ParserState::Payload => {
                self.checksum.update(byte);
                // Full buffer: keep counting, stop storing
                let _ = self.payload.push(byte);
                self.index += 1;
                if self.index >= self.len {
                    self.state = ParserState::ChecksumA;
                }
            }
            ParserState::ChecksumA => {
                self.ck_a = byte;
                self.state = ParserState::ChecksumB;
            }
            ParserState::ChecksumB => {
                self.reset();
                let (calc_a, calc_b) = self.checksum.value();

                if calc_a != self.ck_a || calc_b != byte {
                    self.stats.checksum_errors = self.stats.checksum_errors.wrapping_add(1);
                    return Err(nb::Error::Other(AcquisitionError::ChecksumMismatch {
                        expected: u16::from_be_bytes([self.ck_a, byte]),
                        computed: u16::from_be_bytes([calc_a, calc_b]),
                    }));
                }

                self.stats.frames = self.stats.frames.wrapping_add(1);
                let frame = Frame {
                    class: self.class,
                    id: self.id,
                    declared_len: self.len,
                    payload: self.payload.as_slice(),
                };
                if frame.is_truncated() {
                    self.stats.truncated = self.stats.truncated.wrapping_add(1);
                }
                return Ok(frame);
            }
        }

        Err(nb::Error::WouldBlock)
    }
}
