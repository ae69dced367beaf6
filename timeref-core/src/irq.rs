//! Shared GPIO interrupt dispatch
//!
//! The RP2040 SDK allows one GPIO callback per core, so the GNSS PPS edge
//! and the AC-mains zero crossing arrive through the same handler. The
//! router classifies each `(pin, edge)` into a [`GpioEvent`] and hands it to
//! exactly one subsystem; neither branch touches the other's state.
//!
//! ```text
//!                       ┌─ (pps_pin,   Rising)  → GnssPps           → PpsCorrelator
//! GPIO IRQ ─→ classify ─┼─ (mains_pin, Falling) → MainsZeroCrossing → ZeroCrossingMonitor
//!                       └─ anything else        → ignored
//! ```

use crate::config::AcquisitionConfig;
use crate::mains::ZeroCrossingMonitor;
use crate::pps::{CaptureTrigger, PpsCorrelator};
use crate::time::Timestamp;

/// Edge direction reported by the GPIO block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// Low to high
    Rising,
    /// High to low
    Falling,
}

/// A GPIO interrupt this firmware cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioEvent {
    /// GNSS PPS rising edge
    GnssPps {
        /// Monotonic time read at handler entry
        timestamp: Timestamp,
    },
    /// AC mains falling edge
    MainsZeroCrossing {
        /// Monotonic time read at handler entry
        timestamp: Timestamp,
    },
}

/// Receivers of routed GPIO events
pub trait GpioHandlers {
    /// GNSS PPS rising edge
    fn on_gnss_pps(&mut self, timestamp: Timestamp);

    /// AC mains falling edge
    fn on_mains_zero_crossing(&mut self, timestamp: Timestamp);
}

/// Pin/edge classifier for the shared callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioRouter {
    pps_pin: u8,
    mains_pin: u8,
}

impl GpioRouter {
    /// Router for the pins in `config`
    pub fn new(config: &AcquisitionConfig) -> Self {
        Self {
            pps_pin: config.pps_pin,
            mains_pin: config.mains_pin,
        }
    }

    /// Map a raw interrupt to an event, `None` for unrelated pins or edges
    pub fn classify(&self, pin: u8, edge: Edge, timestamp: Timestamp) -> Option<GpioEvent> {
        match edge {
            Edge::Rising if pin == self.pps_pin => Some(GpioEvent::GnssPps { timestamp }),
            Edge::Falling if pin == self.mains_pin => {
                Some(GpioEvent::MainsZeroCrossing { timestamp })
            }
            _ => None,
        }
    }

    /// Classify and deliver; returns the event that was delivered
    pub fn route<H: GpioHandlers + ?Sized>(
        &self,
        pin: u8,
        edge: Edge,
        timestamp: Timestamp,
        handlers: &mut H,
    ) -> Option<GpioEvent> {
        let event = self.classify(pin, edge, timestamp)?;
        match event {
            GpioEvent::GnssPps { timestamp } => handlers.on_gnss_pps(timestamp),
            GpioEvent::MainsZeroCrossing { timestamp } => handlers.on_mains_zero_crossing(timestamp),
        }
        Some(event)
    }
}

/// The two subsystems behind the shared callback
pub struct GpioDispatch<'r, 'a, T: CaptureTrigger> {
    /// GNSS PPS branch
    pub pps: &'r mut PpsCorrelator<'a>,
    /// Captures on each PPS edge, normally the frequency counter
    pub trigger: &'r mut T,
    /// Mains branch
    pub mains: &'r mut ZeroCrossingMonitor,
}

impl<T: CaptureTrigger> GpioHandlers for GpioDispatch<'_, '_, T> {
    fn on_gnss_pps(&mut self, timestamp: Timestamp) {
        self.pps.on_edge(timestamp, &mut *self.trigger);
    }

    fn on_mains_zero_crossing(&mut self, timestamp: Timestamp) {
        self.mains.on_falling_edge(timestamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handoff::Handoff;

    struct Counting {
        captures: u32,
    }

    impl CaptureTrigger for Counting {
        fn capture_at(&mut self, _now: Timestamp) {
            self.captures += 1;
        }
    }

    fn router() -> GpioRouter {
        GpioRouter::new(&AcquisitionConfig::default().with_irq_pins(22, 26))
    }

    #[test]
    fn classification_needs_pin_and_edge() {
        let router = router();
        assert_eq!(router.classify(22, Edge::Rising, 7), Some(GpioEvent::GnssPps { timestamp: 7 }));
        assert_eq!(
            router.classify(26, Edge::Falling, 9),
            Some(GpioEvent::MainsZeroCrossing { timestamp: 9 })
        );
        assert_eq!(router.classify(22, Edge::Falling, 0), None);
        assert_eq!(router.classify(26, Edge::Rising, 0), None);
        assert_eq!(router.classify(3, Edge::Rising, 0), None);
    }

    #[test]
    fn branches_stay_independent() {
        let reports = Handoff::new();
        let mut pps = PpsCorrelator::new(&reports);
        let mut trigger = Counting { captures: 0 };
        let mut mains = ZeroCrossingMonitor::new();
        let router = router();

        {
            let mut dispatch = GpioDispatch { pps: &mut pps, trigger: &mut trigger, mains: &mut mains };
            router.route(26, Edge::Falling, 10_000, &mut dispatch);
            router.route(26, Edge::Falling, 30_000, &mut dispatch);
        }
        assert_eq!(pps.count(), 0);
        assert_eq!(trigger.captures, 0);
        assert_eq!(mains.crossings(), 2);

        {
            let mut dispatch = GpioDispatch { pps: &mut pps, trigger: &mut trigger, mains: &mut mains };
            router.route(22, Edge::Rising, 1_000_000, &mut dispatch);
        }
        assert_eq!(pps.count(), 1);
        assert_eq!(trigger.captures, 1);
        assert_eq!(mains.crossings(), 2);
        assert!(reports.take().is_some());
    }
}
