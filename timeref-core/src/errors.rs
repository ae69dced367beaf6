//! Error Types for Time-Reference Acquisition
//!
//! ## Design Philosophy
//!
//! Nothing in the acquisition layer is fatal. A corrupt sentence, a frame with
//! a bad checksum or a counter that never fires all degrade a validity flag
//! rather than stopping the process. Errors therefore exist for two reasons:
//!
//! 1. **Parser plumbing**: the NMEA and UBX decoders return `AcquisitionResult`
//!    so that every rejection path is explicit and unit-testable.
//!
//! 2. **Accounting**: the interrupt-side owners fold each error into a counter
//!    (`NmeaStats`, `UbxStats`). Errors never cross the query boundary; callers
//!    poll validity flags instead.
//!
//! Like the rest of the crate the error type is small, `Copy`, and carries no
//! heap data, so it can be produced inside an interrupt handler.
//!
//! ## Error Categories
//!
//! ### Framing
//! - `ChecksumMismatch`: NMEA XOR or UBX Fletcher checksum disagrees
//! - `MissingChecksum`: NMEA sentence without a `*hh` suffix
//! - `BufferOverflow`: sentence longer than the assembly buffer
//! - `SentenceTooShort`: fragment too short to carry an address and checksum
//! - `FrameTruncated`: UBX payload exceeded the receive buffer
//!
//! ### Content
//! - `MissingField` / `InvalidField`: a positional field is absent or malformed
//! - `CoordinateOutOfRange`: degrees or minutes outside their domain
//! - `PayloadTooShort`: a recognised UBX response shorter than its layout
//! - `UnsupportedSentence`: valid sentence of a type this layer ignores

use thiserror_no_std::Error;

/// Result type for acquisition operations
pub type AcquisitionResult<T> = Result<T, AcquisitionError>;

/// Acquisition errors - kept small for interrupt context
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionError {
    /// Transmitted checksum does not match the computed one
    #[error("Checksum mismatch: expected {expected:#04x}, computed {computed:#04x}")]
    ChecksumMismatch {
        /// Checksum carried by the sentence or frame
        expected: u16,
        /// Checksum computed over the received bytes
        computed: u16,
    },

    /// Sentence ends without a `*hh` checksum suffix
    #[error("Missing checksum")]
    MissingChecksum,

    /// Sentence shorter than the minimum verifiable length
    #[error("Sentence too short: {len} bytes, need {min}")]
    SentenceTooShort {
        /// Received length
        len: usize,
        /// Minimum accepted length
        min: usize,
    },

    /// Fixed-capacity buffer would have overflowed
    #[error("Buffer overflow at {capacity} bytes")]
    BufferOverflow {
        /// Capacity of the buffer that filled up
        capacity: usize,
    },

    /// Sentence ends before a positional field its type defines
    #[error("Missing field {index}")]
    MissingField {
        /// 0-based field index after the sentence identifier
        index: usize,
    },

    /// Positional field present but not parseable
    #[error("Invalid field {index}")]
    InvalidField {
        /// 0-based field index after the sentence identifier
        index: usize,
    },

    /// Checksum-valid sentence of a type the layer does not consume
    #[error("Unsupported sentence type")]
    UnsupportedSentence,

    /// UBX payload longer than the receive buffer; tail bytes were dropped
    #[error("Frame truncated: declared {declared} bytes, kept {capacity}")]
    FrameTruncated {
        /// Payload length from the frame header
        declared: u16,
        /// Bytes actually stored
        capacity: usize,
    },

    /// Recognised UBX response shorter than its fixed layout
    #[error("Payload too short: {len} bytes, need {min}")]
    PayloadTooShort {
        /// Stored payload length
        len: usize,
        /// Minimum layout length
        min: usize,
    },

    /// Latitude/longitude outside its domain or malformed
    #[error("Coordinate out of range")]
    CoordinateOutOfRange,
}

#[cfg(feature = "defmt")]
impl defmt::Format for AcquisitionError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::ChecksumMismatch { expected, computed } =>
                defmt::write!(fmt, "Checksum {:x} != {:x}", expected, computed),
            Self::MissingChecksum =>
                defmt::write!(fmt, "Missing checksum"),
            Self::SentenceTooShort { len, min } =>
                defmt::write!(fmt, "Sentence {} < {} bytes", len, min),
            Self::BufferOverflow { capacity } =>
                defmt::write!(fmt, "Overflow at {} bytes", capacity),
            Self::MissingField { index } =>
                defmt::write!(fmt, "Missing field {}", index),
            Self::InvalidField { index } =>
                defmt::write!(fmt, "Invalid field {}", index),
            Self::UnsupportedSentence =>
                defmt::write!(fmt, "Unsupported sentence"),
            Self::FrameTruncated { declared, capacity } =>
                defmt::write!(fmt, "Frame {} truncated to {}", declared, capacity),
            Self::PayloadTooShort { len, min } =>
                defmt::write!(fmt, "Payload {} < {} bytes", len, min),
            Self::CoordinateOutOfRange =>
                defmt::write!(fmt, "Coordinate out of range"),
        }
    }
}
