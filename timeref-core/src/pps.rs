//! PPS correlator (GPIO edge interrupt side)
//!
//! On each GNSS PPS rising edge the correlator first lets the frequency
//! counter capture, so the gate boundary and the edge describe the same
//! instant, and only then stamps the edge and bumps the capture count.
//!
//! ```text
//! PPS ↑ ──→ on_edge(now)
//!             1. trigger.capture_at(now)     (frequency counter)
//!             2. count += 1, timestamp = now
//!             3. publish PpsCapture ──→ Handoff ──→ task: PpsState
//! ```
//!
//! The counter's PIO gate and this GPIO edge are the same physical signal
//! seen through two paths; they are correlated, not identical.

use crate::counter::{EdgeCounter, FrequencyCounter};
use crate::handoff::Handoff;
use crate::time::Timestamp;

/// What the interrupt hands to the task: two words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PpsCapture {
    /// Monotonic time of the edge
    pub timestamp: Timestamp,
    /// Edges since boot, including this one
    pub count: u32,
}

/// Something that must sample its state on the PPS edge
pub trait CaptureTrigger {
    /// Called first thing in the PPS interrupt
    fn capture_at(&mut self, now: Timestamp);
}

impl<H: EdgeCounter> CaptureTrigger for FrequencyCounter<'_, H> {
    fn capture_at(&mut self, now: Timestamp) {
        // The PIO pushes on the same edge; drain it before the PIO IRQ runs
        self.on_interrupt(now);
    }
}

/// GNSS PPS edge handler
pub struct PpsCorrelator<'a> {
    count: u32,
    last: Option<Timestamp>,
    reports: &'a Handoff<PpsCapture>,
}

impl<'a> PpsCorrelator<'a> {
    /// Correlator publishing into `reports`
    pub fn new(reports: &'a Handoff<PpsCapture>) -> Self {
        Self {
            count: 0,
            last: None,
            reports,
        }
    }

    /// PPS rising-edge interrupt body
    pub fn on_edge<T: CaptureTrigger + ?Sized>(&mut self, now: Timestamp, trigger: &mut T) -> PpsCapture {
        trigger.capture_at(now);

        self.count = self.count.wrapping_add(1);
        self.last = Some(now);
        let capture = PpsCapture {
            timestamp: now,
            count: self.count,
        };
        self.reports.publish(capture);
        capture
    }

    /// Edges seen since boot
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Time of the most recent edge
    pub fn last_edge(&self) -> Option<Timestamp> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AcquisitionConfig;
    use crate::counter::SimulatedCounter;
    use crate::handoff::Request;

    /// Records what the correlator had published when the trigger fired
    struct TriggerLog<'a> {
        reports: &'a Handoff<PpsCapture>,
        seen: std::vec::Vec<(Timestamp, bool)>,
    }

    impl CaptureTrigger for TriggerLog<'_> {
        fn capture_at(&mut self, now: Timestamp) {
            self.seen.push((now, self.reports.is_pending()));
        }
    }

    #[test]
    fn capture_runs_before_publish() {
        let reports = Handoff::new();
        let mut correlator = PpsCorrelator::new(&reports);
        let mut trigger = TriggerLog { reports: &reports, seen: std::vec::Vec::new() };

        let capture = correlator.on_edge(1_000_000, &mut trigger);
        assert_eq!(trigger.seen, [(1_000_000, false)]);
        assert_eq!(capture, PpsCapture { timestamp: 1_000_000, count: 1 });
        assert_eq!(reports.take(), Some(capture));
    }

    #[test]
    fn count_accumulates_and_newest_wins() {
        let reports = Handoff::new();
        let mut correlator = PpsCorrelator::new(&reports);
        let mut trigger = TriggerLog { reports: &reports, seen: std::vec::Vec::new() };

        correlator.on_edge(1_000_000, &mut trigger);
        correlator.on_edge(2_000_000, &mut trigger);
        assert_eq!(correlator.count(), 2);
        assert_eq!(correlator.last_edge(), Some(2_000_000));
        assert_eq!(reports.take().map(|c| c.count), Some(2));
    }

    #[test]
    fn edge_drains_frequency_counter() {
        let pps_reports = Handoff::new();
        let frequency_reports = Handoff::new();
        let reset = Request::new();
        let mut counter = FrequencyCounter::new(
            SimulatedCounter::new(),
            AcquisitionConfig::default(),
            &frequency_reports,
            &reset,
        );
        counter.start();
        counter.hardware_mut().complete_interval(10_000_000);

        let mut correlator = PpsCorrelator::new(&pps_reports);
        correlator.on_edge(1_000_000, &mut counter);

        assert!(counter.new_measurement_available());
        let published = frequency_reports.take().unwrap();
        assert_eq!(published.measurement().timestamp, Some(1_000_000));
    }
}
