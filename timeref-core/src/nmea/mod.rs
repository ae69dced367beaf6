//! NMEA 0183 sentence handling
//!
//! ## Pipeline
//!
//! ```text
//! byte ──→ SentenceAssembler ──→ verify() ──→ sentence::parse() ──→ Sentence
//!          ($ … CR/LF, 96 B)     (XOR *hh)    (RMC/GGA/GSA/ZDA)
//! ```
//!
//! Every stage either passes the whole sentence on or rejects it with an
//! [`AcquisitionError`]; [`NmeaStats`] counts the outcome.

pub mod assembler;
pub mod fields;
pub mod sentence;

pub use assembler::SentenceAssembler;
pub use fields::{parse_latitude, parse_longitude, UtcDate, UtcTime};
pub use sentence::{Gga, Gsa, Rmc, Sentence, Zda};

use crate::constants::buffers::NMEA_MIN_SENTENCE_LEN;
use crate::errors::{AcquisitionError, AcquisitionResult};

/// XOR of every byte in `body`
pub fn checksum(body: &[u8]) -> u8 {
    body.iter().fold(0, |acc, &b| acc ^ b)
}

fn hex_value(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|d| d as u8)
}

/// Verify a `$…*hh` sentence (without line terminator) and return its body
///
/// Hex digits compare case-insensitively.
pub fn verify(sentence: &[u8]) -> AcquisitionResult<&str> {
    if sentence.len() < NMEA_MIN_SENTENCE_LEN {
        return Err(AcquisitionError::SentenceTooShort {
            len: sentence.len(),
            min: NMEA_MIN_SENTENCE_LEN,
        });
    }

    let star = sentence
        .iter()
        .rposition(|&b| b == b'*')
        .ok_or(AcquisitionError::MissingChecksum)?;
    let (high, low) = match &sentence[star + 1..] {
        [high, low] => (*high, *low),
        _ => return Err(AcquisitionError::MissingChecksum),
    };
    let expected = match (hex_value(high), hex_value(low)) {
        (Some(high), Some(low)) => (high << 4) | low,
        _ => return Err(AcquisitionError::MissingChecksum),
    };

    let body = &sentence[1..star];
    let computed = checksum(body);
    if computed != expected {
        return Err(AcquisitionError::ChecksumMismatch {
            expected: expected as u16,
            computed: computed as u16,
        });
    }

    core::str::from_utf8(body).map_err(|_| AcquisitionError::InvalidField { index: 0 })
}

/// Sentence accounting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NmeaStats {
    /// Verified and parsed
    pub accepted: u32,
    /// Wrong or missing `*hh`
    pub checksum_errors: u32,
    /// Longer than the assembly buffer
    pub overflows: u32,
    /// Shorter than the minimum sentence
    pub too_short: u32,
    /// Verified but of a type this layer ignores
    pub unknown: u32,
    /// Verified but with a malformed field
    pub malformed: u32,
}

impl NmeaStats {
    /// All counters zero
    pub const fn new() -> Self {
        Self {
            accepted: 0,
            checksum_errors: 0,
            overflows: 0,
            too_short: 0,
            unknown: 0,
            malformed: 0,
        }
    }

    /// Fold one sentence outcome into the counters
    pub fn record<T>(&mut self, outcome: &AcquisitionResult<T>) {
        let counter = match outcome {
            Ok(_) => &mut self.accepted,
            Err(AcquisitionError::ChecksumMismatch { .. } | AcquisitionError::MissingChecksum) => {
                &mut self.checksum_errors
            }
            Err(AcquisitionError::BufferOverflow { .. }) => &mut self.overflows,
            Err(AcquisitionError::SentenceTooShort { .. }) => &mut self.too_short,
            Err(AcquisitionError::UnsupportedSentence) => &mut self.unknown,
            Err(_) => &mut self.malformed,
        };
        *counter = counter.wrapping_add(1);
    }

    /// Sentences dropped for any reason other than being of an ignored type
    pub fn total_errors(&self) -> u32 {
        self.checksum_errors
            .wrapping_add(self.overflows)
            .wrapping_add(self.too_short)
            .wrapping_add(self.malformed)
    }
}
