//! Whole-station test harness
//!
//! Owns the interrupt-side components the way firmware statics would and
//! drives them from a [`FixedTime`] clock. Interrupts and main-loop polls are
//! explicit calls, so every interleaving in a test is deterministic.

use timeref_core::counter::SimulatedCounter;
use timeref_core::irq::{Edge, GpioDispatch, GpioRouter};
use timeref_core::mains::ZeroCrossingMonitor;
use timeref_core::time::{FixedTime, TimeSource};
use timeref_core::{
    AcquisitionConfig, Exchange, FrequencyCounter, GnssFrontEnd, PollReport, PpsCorrelator,
    TimeReference,
};

use super::RecordingSink;

pub struct Station {
    pub exchange: &'static Exchange,
    pub config: AcquisitionConfig,
    pub clock: FixedTime,
    pub front_end: GnssFrontEnd<'static>,
    pub counter: FrequencyCounter<'static, SimulatedCounter>,
    pub pps: PpsCorrelator<'static>,
    pub mains: ZeroCrossingMonitor,
    pub router: GpioRouter,
    pub reference: TimeReference<'static>,
    pub sink: RecordingSink,
}

impl Station {
    pub fn new() -> Self {
        Self::with_config(AcquisitionConfig::default())
    }

    pub fn with_config(config: AcquisitionConfig) -> Self {
        // One exchange per test, living as long as a firmware static would
        let exchange: &'static Exchange = Box::leak(Box::new(Exchange::new()));

        let mut counter = FrequencyCounter::new(
            SimulatedCounter::new(),
            config,
            &exchange.frequency,
            &exchange.reset_statistics,
        );
        counter.start();

        Self {
            exchange,
            config,
            clock: FixedTime::new(0),
            front_end: GnssFrontEnd::new(&exchange.control, &exchange.flush, &exchange.gnss),
            counter,
            pps: PpsCorrelator::new(&exchange.pps),
            mains: ZeroCrossingMonitor::new(),
            router: GpioRouter::new(&config),
            reference: TimeReference::new(config, exchange),
            sink: RecordingSink::default(),
        }
    }

    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    pub fn advance_ms(&mut self, ms: u64) {
        self.clock.advance_ms(ms);
    }

    /// UART RX interrupt for each byte
    pub fn receive(&mut self, bytes: &[u8]) {
        let now = self.clock.now();
        self.front_end.on_rx_bytes(bytes, now);
    }

    /// PIO finishes a gate interval and the PPS edge arrives
    pub fn pps_edge(&mut self, count: u32) {
        self.counter.hardware_mut().complete_interval(count);
        self.gpio(self.config.pps_pin, Edge::Rising);
    }

    /// Shared GPIO callback
    pub fn gpio(&mut self, pin: u8, edge: Edge) {
        let now = self.clock.now();
        let mut dispatch = GpioDispatch {
            pps: &mut self.pps,
            trigger: &mut self.counter,
            mains: &mut self.mains,
        };
        self.router.route(pin, edge, now, &mut dispatch);
    }

    /// One main-loop cycle
    pub fn poll(&mut self) -> PollReport {
        let now = self.clock.now();
        self.reference.poll(now, &mut self.sink)
    }

    /// One second of a healthy reference: count, edge, poll
    pub fn second(&mut self, count: u32) -> PollReport {
        self.advance_ms(1000);
        self.pps_edge(count);
        self.poll()
    }
}
