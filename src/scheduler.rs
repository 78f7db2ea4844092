//! Delay scheduler — the main-loop half of the control core.
//!
//! Polled once per main-loop iteration; never blocks. Each step is
//! idempotent and independent:
//!
//! 1. Flush a pending persist request to the byte store.
//! 2. If the delayed path is enabled: start a queued delayed-on episode
//!    (assert the output, arm the off deadline), then fire the off action
//!    once the deadline passes.
//! 3. If disabled: drop any queued delayed-on request. A countdown that is
//!    already running is not cancelled; disable only blocks future
//!    episodes.
//!
//! The deadline check is level-triggered against the monotonic cycle clock:
//! a missed iteration delays the off action, it never skips it.
//!
//! ```text
//!  radio ISR ──▶ ControlState (atomic cells) ──▶ poll() each iteration
//!                                                  │
//!                                                  ├─▶ OutputPort
//!                                                  └─▶ DelayStore
//! ```

use log::{debug, info};

use crate::app::ports::{DelayStore, OutputPort};
use crate::clock::seconds_to_cycles;
use crate::config::DELAY_SLOT;
use crate::state::ControlState;

/// The off-delay setting is interpreted as minutes: one unit = 60 seconds
/// of cycle time. Preserved exactly from the deployed protocol — the remote
/// enters "3" to mean three minutes.
const DELAY_UNIT_SECONDS: u32 = 60;

/// Main-loop scheduler for the delayed-off output episode.
pub struct DelayScheduler;

impl Default for DelayScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayScheduler {
    pub const fn new() -> Self {
        Self
    }

    /// Run one scheduling pass. `now` is the current monotonic cycle count.
    pub fn poll(
        &self,
        now: u64,
        state: &ControlState,
        output: &mut impl OutputPort,
        store: &mut impl DelayStore,
    ) {
        // ── Persist flush ─────────────────────────────────────
        // swap() clears the flag exactly once per request; the ISR only ever
        // re-raises it for a fresh request.
        if state.take_persist_request() {
            let value = state.delay_setting();
            store.write_byte(DELAY_SLOT, value);
            info!("scheduler: off-delay {} persisted", value);
        }

        if state.output_enabled() {
            // ── Start a queued delayed-on episode ─────────────
            if state.take_pending_turn_on() {
                let delay_secs = DELAY_UNIT_SECONDS * u32::from(state.delay_setting());
                state.set_off_deadline_cycles(now + seconds_to_cycles(delay_secs));
                output.set(true);
                info!("scheduler: output on, off in {}s", delay_secs);
            }

            // ── Fire the off action once the deadline passes ──
            let deadline = state.off_deadline_cycles();
            if deadline != 0 && now >= deadline {
                // Zeroed together with the deassert so the job can never
                // double-fire.
                state.set_off_deadline_cycles(0);
                output.set(false);
                info!("scheduler: output off after delay");
            }
        } else {
            // A disable cancels any queued request but leaves a running
            // countdown alone.
            if state.pending_turn_on() {
                debug!("scheduler: delayed-on request dropped (path disabled)");
            }
            state.cancel_pending_turn_on();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TICKS_PER_SECOND;

    struct FakeOutput {
        on: bool,
        transitions: u32,
    }

    impl FakeOutput {
        fn new() -> Self {
            Self {
                on: false,
                transitions: 0,
            }
        }
    }

    impl OutputPort for FakeOutput {
        fn set(&mut self, on: bool) {
            if self.on != on {
                self.transitions += 1;
            }
            self.on = on;
        }
        fn is_on(&self) -> bool {
            self.on
        }
    }

    struct FakeStore {
        slots: [u8; 4],
        writes: u32,
    }

    impl FakeStore {
        fn new() -> Self {
            Self {
                slots: [0; 4],
                writes: 0,
            }
        }
    }

    impl DelayStore for FakeStore {
        fn read_byte(&mut self, addr: u8) -> u8 {
            self.slots[addr as usize]
        }
        fn write_byte(&mut self, addr: u8, value: u8) {
            self.slots[addr as usize] = value;
            self.writes += 1;
        }
    }

    #[test]
    fn delayed_on_asserts_and_arms_deadline() {
        let state = ControlState::new();
        let mut out = FakeOutput::new();
        let mut store = FakeStore::new();
        let sched = DelayScheduler::new();

        state.set_delay_setting(3);
        state.request_turn_on();

        let now = 1_000;
        sched.poll(now, &state, &mut out, &mut store);

        assert!(out.is_on());
        assert!(!state.pending_turn_on());
        assert_eq!(
            state.off_deadline_cycles(),
            now + 60 * 3 * TICKS_PER_SECOND
        );
    }

    #[test]
    fn off_fires_once_past_deadline() {
        let state = ControlState::new();
        let mut out = FakeOutput::new();
        let mut store = FakeStore::new();
        let sched = DelayScheduler::new();

        state.set_delay_setting(1);
        state.request_turn_on();
        sched.poll(100, &state, &mut out, &mut store);
        let deadline = state.off_deadline_cycles();
        assert!(out.is_on());

        // Still counting down.
        sched.poll(deadline - 1, &state, &mut out, &mut store);
        assert!(out.is_on());

        // Past the deadline — even arbitrarily late (level-triggered).
        sched.poll(deadline + 7_777, &state, &mut out, &mut store);
        assert!(!out.is_on());
        assert_eq!(state.off_deadline_cycles(), 0);

        // No double fire.
        let transitions = out.transitions;
        sched.poll(deadline + 9_999, &state, &mut out, &mut store);
        assert_eq!(out.transitions, transitions);
    }

    #[test]
    fn zero_delay_turns_off_within_the_same_pass() {
        let state = ControlState::new();
        let mut out = FakeOutput::new();
        let mut store = FakeStore::new();
        let sched = DelayScheduler::new();

        // delay 0 → deadline == now, so the off check fires right after the
        // assert in the same pass (the output blips).
        state.request_turn_on();
        sched.poll(500, &state, &mut out, &mut store);

        assert!(!out.is_on());
        assert_eq!(out.transitions, 2, "must still go through on then off");
        assert_eq!(state.off_deadline_cycles(), 0);
    }

    #[test]
    fn disable_cancels_queued_request() {
        let state = ControlState::new();
        let mut out = FakeOutput::new();
        let mut store = FakeStore::new();
        let sched = DelayScheduler::new();

        state.request_turn_on();
        state.set_output_enabled(false);

        sched.poll(100, &state, &mut out, &mut store);

        assert!(!out.is_on(), "disabled path must never assert the output");
        assert!(!state.pending_turn_on(), "queued request must be dropped");
    }

    #[test]
    fn disable_does_not_cancel_running_countdown() {
        let state = ControlState::new();
        let mut out = FakeOutput::new();
        let mut store = FakeStore::new();
        let sched = DelayScheduler::new();

        state.set_delay_setting(1);
        state.request_turn_on();
        sched.poll(100, &state, &mut out, &mut store);
        let deadline = state.off_deadline_cycles();
        assert!(out.is_on());

        // Disable arrives mid-countdown.
        state.set_output_enabled(false);
        sched.poll(deadline / 2, &state, &mut out, &mut store);
        assert!(out.is_on(), "countdown must keep running while disabled");
        assert_eq!(state.off_deadline_cycles(), deadline);

        // Re-enabled before expiry — the off action still fires on time.
        state.set_output_enabled(true);
        sched.poll(deadline, &state, &mut out, &mut store);
        assert!(!out.is_on());
    }

    #[test]
    fn persist_flushes_exactly_once_per_request() {
        let state = ControlState::new();
        let mut out = FakeOutput::new();
        let mut store = FakeStore::new();
        let sched = DelayScheduler::new();

        state.set_delay_setting(42);
        state.request_persist();

        sched.poll(10, &state, &mut out, &mut store);
        assert_eq!(store.slots[DELAY_SLOT as usize], 42);
        assert_eq!(store.writes, 1);

        // Subsequent passes must not rewrite.
        sched.poll(20, &state, &mut out, &mut store);
        sched.poll(30, &state, &mut out, &mut store);
        assert_eq!(store.writes, 1);
    }

    #[test]
    fn persist_flushes_even_while_disabled() {
        let state = ControlState::new();
        let mut out = FakeOutput::new();
        let mut store = FakeStore::new();
        let sched = DelayScheduler::new();

        state.set_output_enabled(false);
        state.set_delay_setting(9);
        state.request_persist();

        sched.poll(10, &state, &mut out, &mut store);
        assert_eq!(store.slots[DELAY_SLOT as usize], 9);
    }
}
