//! Monotonic time for the acquisition layer
//!
//! Every timestamp in this crate is microseconds of a monotonic counter that
//! starts at boot. On the RP2040 that is the 64-bit TIMER peripheral, which is
//! readable from any interrupt without locking. Wall-clock time only ever
//! comes out of the GNSS receiver as `GnssTime`.

use fugit::MicrosDurationU64;

use crate::constants::time::US_PER_MS;

/// Monotonic timestamp in microseconds since boot
pub type Timestamp = u64;

/// Source of monotonic time
///
/// Implemented by the firmware over the hardware timer and by `FixedTime`
/// in tests. Interrupt handlers read it directly, so `now()` must not block.
pub trait TimeSource {
    /// Current timestamp in microseconds
    fn now(&self) -> Timestamp;
}

/// Elapsed time from `earlier` to `now`, saturating at zero if the two
/// were captured out of order across interrupt lines.
#[inline]
pub fn age(now: Timestamp, earlier: Timestamp) -> u64 {
    now.saturating_sub(earlier)
}

/// True if a value captured at `captured` is older than `bound` at `now`.
///
/// Never-captured values (`None`) are always stale.
#[inline]
pub fn is_stale(now: Timestamp, captured: Option<Timestamp>, bound: MicrosDurationU64) -> bool {
    match captured {
        Some(at) => age(now, at) > bound.to_micros(),
        None => true,
    }
}

/// Fixed time source for testing
#[derive(Debug, Clone)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    /// Clock frozen at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Jump to an absolute timestamp
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Move forward by `us` microseconds
    pub fn advance(&mut self, us: u64) {
        self.timestamp += us;
    }

    /// Move forward by `ms` milliseconds
    pub fn advance_ms(&mut self, ms: u64) {
        self.advance(ms * US_PER_MS);
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }
}
