//! Reference Oscillator Constants
//!
//! The hardware pulse counter gates a 10 MHz reference between successive
//! PPS edges. A perfect oscillator therefore yields exactly `NOMINAL_COUNT`
//! edges per interval.

/// Expected reference edges per one-second gate interval (10 MHz).
pub const NOMINAL_COUNT: u32 = 10_000_000;

/// Deviation, in cycles, still classified as a valid measurement.
///
/// ±10 cycles of a 10 MHz reference over a 1 s gate is ±1 µs, i.e. ±1 ppm.
/// Downstream disciplining trusts the valid/invalid counters for quality
/// reporting, so changing this value changes a published contract.
pub const VALID_TOLERANCE_CYCLES: u32 = 10;

/// Width of the signal-present window around nominal, in percent.
///
/// Anything outside this window is not a slightly-off 10 MHz oscillator but
/// a different (or absent) signal on the reference input.
pub const SIGNAL_WINDOW_PERCENT: u32 = 10;

/// Lowest raw count accepted as "a 10 MHz signal is present".
pub const SIGNAL_MIN_COUNT: u32 = NOMINAL_COUNT - NOMINAL_COUNT / 100 * SIGNAL_WINDOW_PERCENT;

/// Highest raw count accepted as "a 10 MHz signal is present".
pub const SIGNAL_MAX_COUNT: u32 = NOMINAL_COUNT + NOMINAL_COUNT / 100 * SIGNAL_WINDOW_PERCENT;

/// Scale factor from a fractional frequency error to parts per billion.
pub const PPB_SCALE: f64 = 1e9;
