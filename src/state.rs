//! Shared control state across the ISR / main-loop boundary.
//!
//! A single owned struct of independently-updatable atomic cells, passed by
//! reference into both the radio-receive interrupt handler and the main-loop
//! scheduler. Every cell is a single machine word — neither side ever needs a
//! compound multi-field transition visible to the other, which is why no
//! critical section exists anywhere in this file.
//!
//! Per-field write/read contexts:
//!
//! | field                | ISR (dispatcher)  | main loop (scheduler)      |
//! |----------------------|-------------------|----------------------------|
//! | `output_enabled`     | writes            | reads                      |
//! | `pending_turn_on`    | sets              | swap-clears                |
//! | `delay_setting`      | writes            | reads                      |
//! | `off_deadline_cycles`| —                 | reads + writes (exclusive) |
//! | `persist_requested`  | sets              | swap-clears                |

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};

/// Process-wide control state. Lives for the program lifetime; the device
/// build keeps one instance in [`CONTROL`], tests construct their own.
pub struct ControlState {
    /// Master enable for the delayed-on path. `true` at boot.
    output_enabled: AtomicBool,
    /// One-shot: a delayed-on sequence was requested but not yet started.
    pending_turn_on: AtomicBool,
    /// Configured off-delay, 0–255. The scheduler multiplies this by 60
    /// before converting to cycles (see `scheduler::poll`).
    delay_setting: AtomicU8,
    /// Absolute cycle-count deadline for the pending off job; 0 = none.
    /// Main-loop exclusive — the ISR never touches it, so the set-pending →
    /// arm-deadline transition needs no cross-context atomicity.
    off_deadline_cycles: AtomicU64,
    /// One-shot: `delay_setting` changed and must be flushed to storage.
    persist_requested: AtomicBool,
}

/// The node's single control-state instance, shared between the radio ISR
/// and the main loop.
pub static CONTROL: ControlState = ControlState::new();

impl Default for ControlState {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlState {
    pub const fn new() -> Self {
        Self {
            output_enabled: AtomicBool::new(true),
            pending_turn_on: AtomicBool::new(false),
            delay_setting: AtomicU8::new(0),
            off_deadline_cycles: AtomicU64::new(0),
            persist_requested: AtomicBool::new(false),
        }
    }

    // ── output_enabled ────────────────────────────────────────

    pub fn output_enabled(&self) -> bool {
        self.output_enabled.load(Ordering::Acquire)
    }

    pub fn set_output_enabled(&self, enabled: bool) {
        self.output_enabled.store(enabled, Ordering::Release);
    }

    // ── pending_turn_on ───────────────────────────────────────

    pub fn request_turn_on(&self) {
        self.pending_turn_on.store(true, Ordering::Release);
    }

    /// Read-and-clear in one step; at most one caller observes `true`
    /// per request.
    pub fn take_pending_turn_on(&self) -> bool {
        self.pending_turn_on.swap(false, Ordering::AcqRel)
    }

    /// Drop a queued delayed-on request without acting on it.
    pub fn cancel_pending_turn_on(&self) {
        self.pending_turn_on.store(false, Ordering::Release);
    }

    /// Non-consuming read, for diagnostics and tests.
    pub fn pending_turn_on(&self) -> bool {
        self.pending_turn_on.load(Ordering::Acquire)
    }

    // ── delay_setting ─────────────────────────────────────────

    pub fn delay_setting(&self) -> u8 {
        self.delay_setting.load(Ordering::Acquire)
    }

    pub fn set_delay_setting(&self, value: u8) {
        self.delay_setting.store(value, Ordering::Release);
    }

    // ── off_deadline_cycles (main-loop exclusive) ─────────────

    pub fn off_deadline_cycles(&self) -> u64 {
        self.off_deadline_cycles.load(Ordering::Acquire)
    }

    pub fn set_off_deadline_cycles(&self, deadline: u64) {
        self.off_deadline_cycles.store(deadline, Ordering::Release);
    }

    // ── persist_requested ─────────────────────────────────────

    /// The delay value must be stored `Release`-before this flag so the
    /// scheduler never flushes a stale value (opcode 105 path).
    pub fn request_persist(&self) {
        self.persist_requested.store(true, Ordering::Release);
    }

    /// Read-and-clear; guarantees exactly one flush per request.
    pub fn take_persist_request(&self) -> bool {
        self.persist_requested.swap(false, Ordering::AcqRel)
    }

    /// Non-consuming read, for diagnostics and tests.
    pub fn persist_requested(&self) -> bool {
        self.persist_requested.load(Ordering::Acquire)
    }
}
