//! Constants for TimeRef Core
//!
//! Every numeric contract the acquisition layer exposes lives here, grouped
//! by domain, so the disciplining and telemetry layers can reference the same
//! values the validators were built against.
//!
//! ## Organization
//!
//! - **Frequency**: nominal reference count, tolerances, signal-present window
//! - **GNSS**: fix thresholds and receiver query policy
//! - **Time**: unit conversions and staleness bounds
//! - **Buffers**: fixed capacities for the interrupt-side parsers
//!
//! ## Usage Guidelines
//!
//! 1. Always use these constants instead of magic numbers
//! 2. Timeouts are expressed in microseconds to match `Timestamp`
//! 3. `AcquisitionConfig::default()` is built from these values

/// Reference oscillator and frequency-validation contract.
pub mod frequency;

/// GNSS receiver thresholds and query policy.
pub mod gnss;

/// Time unit conversions and staleness bounds.
pub mod time;

/// Buffer capacities for the byte-stream parsers.
pub mod buffers;

pub use frequency::{
    NOMINAL_COUNT, VALID_TOLERANCE_CYCLES, SIGNAL_WINDOW_PERCENT,
    SIGNAL_MIN_COUNT, SIGNAL_MAX_COUNT,
};

pub use gnss::{
    MIN_SATELLITES_FOR_FIX, IDENTITY_MAX_ATTEMPTS, DEFAULT_LEAP_SECONDS,
};

pub use time::{
    US_PER_MS, US_PER_SECOND, MEASUREMENT_STALE_US, PPS_TIMEOUT_US,
    NMEA_TIMEOUT_US, RECEIVER_BOOT_HOLDOFF_US, IDENTITY_RETRY_INTERVAL_US,
};

pub use buffers::{
    NMEA_BUFFER_SIZE, NMEA_MIN_SENTENCE_LEN, NMEA_MAX_FIELDS,
    UBX_PAYLOAD_CAPACITY, UBX_TX_BUFFER_SIZE, VERSION_STRING_CAPACITY,
};
