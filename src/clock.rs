//! Cycle clock — monotonic time from a free-running 16-bit hardware counter.
//!
//! The hardware counter ticks at [`TICKS_PER_SECOND`] and overflows every
//! [`TICKS_PER_OVERFLOW`] ticks; the overflow interrupt increments a 64-bit
//! software counter. The combined value never resets during the program
//! lifetime (u64 exhaustion is centuries away and ignored).
//!
//! The overflow counter is written in ISR context and read as part of a
//! multi-part value by the main loop — [`CycleClock::current_cycles`] uses a
//! double-read retry so a torn overflow/tick pair is never observed.

use core::sync::atomic::{AtomicU64, Ordering};

/// Counter model: 16 MHz core clock through a /64 prescaler.
pub const TICKS_PER_SECOND: u64 = 16_000_000 / 64;

/// 16-bit counter width.
pub const TICKS_PER_OVERFLOW: u64 = 1 << 16;

/// Convert whole seconds to cycle counts.
pub const fn seconds_to_cycles(seconds: u32) -> u64 {
    seconds as u64 * TICKS_PER_SECOND
}

/// Abstracts the hardware tick register. The device build reads the live
/// timer counter; tests substitute a scripted source.
pub trait TickSource {
    /// Current value of the free-running 16-bit counter register.
    fn ticks(&self) -> u16;
}

/// Monotonic cycle counter.
pub struct CycleClock {
    /// Incremented strictly from the timer-overflow ISR.
    overflows: AtomicU64,
}

/// The node's clock instance, shared between the overflow ISR and the
/// main loop.
pub static CLOCK: CycleClock = CycleClock::new();

impl Default for CycleClock {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleClock {
    pub const fn new() -> Self {
        Self {
            overflows: AtomicU64::new(0),
        }
    }

    /// Overflow ISR entry point. Must not be called from any other context.
    pub fn on_overflow(&self) {
        self.overflows.fetch_add(1, Ordering::Release);
    }

    /// Combined monotonic cycle count.
    ///
    /// The overflow counter is sampled before and after the tick register;
    /// if an overflow lands in between, the pair is inconsistent and the
    /// read retries. An overflow fires every ~262 ms with this counter
    /// model, so a second iteration is already vanishingly rare.
    pub fn current_cycles(&self, source: &impl TickSource) -> u64 {
        loop {
            let before = self.overflows.load(Ordering::Acquire);
            let ticks = source.ticks();
            let after = self.overflows.load(Ordering::Acquire);
            if before == after {
                return before * TICKS_PER_OVERFLOW + u64::from(ticks);
            }
        }
    }

    #[cfg(test)]
    pub fn overflow_count(&self) -> u64 {
        self.overflows.load(Ordering::Acquire)
    }
}
