//! AC-mains zero-crossing monitor
//!
//! Unrelated to GNSS timing: it only shares the GPIO interrupt callback. Each
//! falling edge on the mains sense pin marks one full mains cycle. Periods
//! outside the plausible 40-70 Hz band are treated as glitches and neither
//! update the estimate nor reset it.

use crate::constants::time::US_PER_SECOND;
use crate::time::{self, Timestamp};

/// Shortest accepted period, 70 Hz
pub const MIN_PERIOD_US: u64 = US_PER_SECOND / 70;
/// Longest accepted period, 40 Hz
pub const MAX_PERIOD_US: u64 = US_PER_SECOND / 40;
/// Periods averaged per frequency estimate
pub const AVERAGE_CYCLES: u32 = 50;

/// Falling-edge period tracker
#[derive(Debug, Clone, Default)]
pub struct ZeroCrossingMonitor {
    last_edge: Option<Timestamp>,
    crossings: u32,
    glitches: u32,
    window_sum: u64,
    window_len: u32,
    average_period: Option<u64>,
}

impl ZeroCrossingMonitor {
    /// No edges seen
    pub fn new() -> Self {
        Self::default()
    }

    /// Falling-edge interrupt body
    pub fn on_falling_edge(&mut self, now: Timestamp) {
        self.crossings = self.crossings.wrapping_add(1);
        let Some(previous) = self.last_edge.replace(now) else {
            return;
        };

        let period = time::age(now, previous);
        if !(MIN_PERIOD_US..=MAX_PERIOD_US).contains(&period) {
            self.glitches = self.glitches.wrapping_add(1);
            return;
        }

        self.window_sum += period;
        self.window_len += 1;
        if self.window_len == AVERAGE_CYCLES {
            self.average_period = Some(self.window_sum / self.window_len as u64);
            self.window_sum = 0;
            self.window_len = 0;
        }
    }

    /// Edges seen
    pub fn crossings(&self) -> u32 {
        self.crossings
    }

    /// Implausible periods rejected
    pub fn glitches(&self) -> u32 {
        self.glitches
    }

    /// Average period over the last complete window, microseconds
    pub fn period_us(&self) -> Option<u64> {
        self.average_period
    }

    /// Mains frequency from the last complete window
    pub fn frequency_hz(&self) -> Option<f32> {
        self.average_period
            .filter(|&p| p > 0)
            .map(|p| US_PER_SECOND as f32 / p as f32)
    }
}
