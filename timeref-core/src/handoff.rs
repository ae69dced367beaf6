//! Interrupt-to-Task State Handoff
//!
//! ## Overview
//!
//! Three interrupt lines (PIO, UART RX, GPIO edge) produce state that one
//! cooperative main-loop task consumes. Rather than sharing individual fields
//! between the two contexts, each producer owns its working state privately
//! and publishes a complete copy into a single-producer slot. The task takes
//! the newest copy once per cycle.
//!
//! ```text
//! Interrupt (producer)               Main loop (consumer)
//!      |                                   |
//!   publish(copy) ──→ [ Handoff slot ] ──→ take()
//!      |              (newest wins)        |
//!   never blocks                     one short critical section
//! ```
//!
//! ## Rules
//!
//! - Exactly one interrupt context publishes into a given slot.
//! - Only the task takes from it.
//! - A publish that lands before the previous value was taken replaces it;
//!   the replacement is counted so a slow consumer is observable.
//!
//! The reverse direction (task to interrupt) carries only tiny values:
//! [`ControlFlags`] for enable/debug toggles and [`Request`] for one-shot
//! commands such as "flush buffered input".
//!
//! Every access runs inside `critical_section::with`, which on a single-core
//! bare-metal target masks interrupts for the duration of a memcpy.

use core::cell::Cell;

use critical_section::Mutex;

/// Single-producer, single-consumer slot holding the newest published value
pub struct Handoff<T> {
    slot: Mutex<Cell<Option<T>>>,
    replaced: Mutex<Cell<u32>>,
}

impl<T> Handoff<T> {
    /// Empty slot, usable in a `static`
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(Cell::new(None)),
            replaced: Mutex::new(Cell::new(0)),
        }
    }

    /// Publish a value (producer side)
    ///
    /// Returns `true` if an untaken value was replaced.
    pub fn publish(&self, value: T) -> bool {
        critical_section::with(|cs| {
            let previous = self.slot.borrow(cs).replace(Some(value));
            if previous.is_some() {
                let replaced = self.replaced.borrow(cs);
                replaced.set(replaced.get().wrapping_add(1));
                true
            } else {
                false
            }
        })
    }

    /// Take the newest value, leaving the slot empty (consumer side)
    pub fn take(&self) -> Option<T> {
        critical_section::with(|cs| self.slot.borrow(cs).take())
    }

    /// Drop any pending value
    pub fn clear(&self) {
        critical_section::with(|cs| {
            self.slot.borrow(cs).set(None);
        });
    }

    /// Whether a value is waiting to be taken
    pub fn is_pending(&self) -> bool {
        critical_section::with(|cs| {
            let cell = self.slot.borrow(cs);
            let value = cell.take();
            let pending = value.is_some();
            cell.set(value);
            pending
        })
    }

    /// Publishes that overwrote a value the consumer never took
    pub fn replaced_count(&self) -> u32 {
        critical_section::with(|cs| self.replaced.borrow(cs).get())
    }
}

impl<T> Default for Handoff<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot request raised by the task and consumed by an interrupt handler
pub struct Request {
    raised: Mutex<Cell<bool>>,
}

impl Request {
    /// Lowered request, usable in a `static`
    pub const fn new() -> Self {
        Self {
            raised: Mutex::new(Cell::new(false)),
        }
    }

    /// Ask the consumer to act on its next run
    pub fn raise(&self) {
        critical_section::with(|cs| self.raised.borrow(cs).set(true));
    }

    /// Returns `true` once per `raise`, then lowers the request
    pub fn take(&self) -> bool {
        critical_section::with(|cs| self.raised.borrow(cs).replace(false))
    }
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

/// Subsystem toggles written by the task, read by interrupt handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Control {
    /// GNSS byte processing enabled
    pub enabled: bool,
    /// Verbose per-sentence / per-frame logging
    pub debug: bool,
}

impl Control {
    const fn initial() -> Self {
        Self { enabled: true, debug: false }
    }
}

/// Interrupt-safe holder for [`Control`]
pub struct ControlFlags {
    state: Mutex<Cell<Control>>,
}

impl ControlFlags {
    /// Enabled, debug off
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(Control::initial())),
        }
    }

    /// Current toggles
    pub fn get(&self) -> Control {
        critical_section::with(|cs| self.state.borrow(cs).get())
    }

    /// Enable or suspend GNSS processing
    ///
    /// Runs masked so a handler never observes the toggle mid-update.
    pub fn set_enabled(&self, enabled: bool) {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut control = cell.get();
            control.enabled = enabled;
            cell.set(control);
        });
    }

    /// Turn verbose logging on or off
    pub fn set_debug(&self, debug: bool) {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut control = cell.get();
            control.debug = debug;
            cell.set(control);
        });
    }
}

impl Default for ControlFlags {
    fn default() -> Self {
        Self::new()
    }
}
