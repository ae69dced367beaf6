//! Sentence assembly from the receive byte stream
//!
//! Collects `$`-started bytes until CR or LF, then verifies and parses the
//! sentence in one go. A sentence is either applied whole or dropped and
//! counted; nothing partially decoded leaves this module.

use super::sentence::{self, Sentence};
use super::{verify, NmeaStats};
use crate::buffer::SentenceBuffer;
use crate::constants::buffers::NMEA_BUFFER_SIZE;
use crate::errors::{AcquisitionError, AcquisitionResult};

/// Byte-at-a-time NMEA framer
#[derive(Clone, Default)]
pub struct SentenceAssembler {
    buffer: SentenceBuffer<NMEA_BUFFER_SIZE>,
    collecting: bool,
    stats: NmeaStats,
}

impl SentenceAssembler {
    /// Idle assembler waiting for `$`
    pub const fn new() -> Self {
        Self {
            buffer: SentenceBuffer::new(),
            collecting: false,
            stats: NmeaStats::new(),
        }
    }

    /// Drop any partial sentence
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.collecting = false;
    }

    /// Whether a sentence is being collected
    pub fn is_collecting(&self) -> bool {
        self.collecting
    }

    /// Sentence counters
    pub fn stats(&self) -> &NmeaStats {
        &self.stats
    }

    /// Advance by one byte
    ///
    /// `Ok` carries a verified, parsed sentence; `Err(Other)` reports a
    /// sentence that was dropped (already counted).
    pub fn feed(&mut self, byte: u8) -> nb::Result<Sentence, AcquisitionError> {
        match byte {
            b'$' => {
                // A new start always wins over an unterminated sentence
                self.buffer.clear();
                self.collecting = self.buffer.push(byte).is_ok();
                Err(nb::Error::WouldBlock)
            }
            b'\r' | b'\n' if self.collecting => {
                self.collecting = false;
                let result = self.finish();
                self.buffer.clear();
                result.map_err(nb::Error::Other)
            }
            _ if self.collecting => match self.buffer.push(byte) {
                Ok(()) => Err(nb::Error::WouldBlock),
                Err(error) => {
                    self.collecting = false;
                    self.stats.record::<Sentence>(&Err(error));
                    Err(nb::Error::Other(error))
                }
            },
            _ => Err(nb::Error::WouldBlock),
        }
    }

    fn finish(&mut self) -> AcquisitionResult<Sentence> {
        let result = verify(self.buffer.as_bytes()).and_then(sentence::parse);
        self.stats.record(&result);
        result
    }
}
