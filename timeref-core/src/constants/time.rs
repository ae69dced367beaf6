//! Time-Related Constants
//!
//! Unit conversions and the three staleness domains of the acquisition
//! layer. All values are in microseconds of the monotonic clock.

// ===== TIME UNIT CONVERSIONS =====

/// Microseconds per millisecond.
pub const US_PER_MS: u64 = 1000;

/// Microseconds per second.
pub const US_PER_SECOND: u64 = 1_000_000;

// ===== STALENESS BOUNDS =====

/// Age after which the last frequency measurement no longer counts as a
/// present signal. Two gate intervals: one missed PPS is tolerated.
pub const MEASUREMENT_STALE_US: u64 = 2 * US_PER_SECOND;

/// Age after which the PPS state is reported invalid.
pub const PPS_TIMEOUT_US: u64 = 2 * US_PER_SECOND;

/// Age after which NMEA-derived time and fix state are reported invalid.
///
/// Receivers emit RMC/GGA once per second; three seconds of silence means
/// the stream is gone, not merely jittery.
pub const NMEA_TIMEOUT_US: u64 = 3 * US_PER_SECOND;

// ===== RECEIVER QUERIES =====

/// Delay after init before the first configuration frame is sent, giving the
/// receiver module time to boot.
pub const RECEIVER_BOOT_HOLDOFF_US: u64 = US_PER_SECOND;

/// Interval between identity query attempts.
pub const IDENTITY_RETRY_INTERVAL_US: u64 = 2 * US_PER_SECOND;
