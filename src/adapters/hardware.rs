//! Output actuator adapters.
//!
//! [`RelayOutput`] is the board's relay pin. The commanded level lives in a
//! process-wide atomic so the interrupt handler and the main loop can each
//! hold their own (zero-sized) handle and still agree on `is_on`.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::app::ports::OutputPort;

#[cfg(target_os = "espidf")]
use crate::pins;

/// Last commanded level, shared by every `RelayOutput` handle.
static LEVEL: AtomicBool = AtomicBool::new(false);

/// Handle on the relay pin. Zero-sized; safe to construct in ISR context.
#[derive(Clone, Copy)]
pub struct RelayOutput;

impl Default for RelayOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayOutput {
    pub const fn new() -> Self {
        Self
    }
}

impl OutputPort for RelayOutput {
    fn set(&mut self, on: bool) {
        LEVEL.store(on, Ordering::Release);
        // gpio_set_level is a single register write and ISR-safe.
        #[cfg(target_os = "espidf")]
        unsafe {
            esp_idf_svc::sys::gpio_set_level(pins::RELAY_GPIO, u32::from(on));
        }
    }

    fn is_on(&self) -> bool {
        LEVEL.load(Ordering::Acquire)
    }
}

// ── Generic embedded-hal adapter ──────────────────────────────

/// Drives the output through any `embedded-hal` digital pin — used for
/// expansion boards and bring-up jigs where the relay hangs off an
/// external GPIO expander instead of a native pin.
pub struct HalOutput<P> {
    pin: P,
    on: bool,
}

impl<P: embedded_hal::digital::OutputPin> HalOutput<P> {
    pub fn new(pin: P) -> Self {
        Self { pin, on: false }
    }
}

impl<P: embedded_hal::digital::OutputPin> OutputPort for HalOutput<P> {
    fn set(&mut self, on: bool) {
        let result = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        match result {
            Ok(()) => self.on = on,
            Err(_) => log::warn!("relay: HAL pin write failed"),
        }
    }

    fn is_on(&self) -> bool {
        self.on
    }
}
