//! Fuzz target: `Command::decode` + `dispatch::apply`
//!
//! Drives arbitrary byte sequences through the packet dispatch path and
//! asserts that it never panics and that rejected packets leave the
//! control state fully untouched.
//!
//! cargo fuzz run fuzz_packet_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use relaynode::app::ports::OutputPort;
use relaynode::dispatch::{self, Command};
use relaynode::state::ControlState;

struct NullOutput(bool);

impl OutputPort for NullOutput {
    fn set(&mut self, on: bool) {
        self.0 = on;
    }
    fn is_on(&self) -> bool {
        self.0
    }
}

fuzz_target!(|data: &[u8]| {
    let state = ControlState::new();
    let mut output = NullOutput(false);

    let decoded = Command::decode(data);
    dispatch::handle_packet(data, &state, &mut output);

    if decoded.is_none() {
        // A rejected packet must be a complete no-op.
        assert!(state.output_enabled());
        assert!(!state.pending_turn_on());
        assert_eq!(state.delay_setting(), 0);
        assert_eq!(state.off_deadline_cycles(), 0);
        assert!(!state.persist_requested());
        assert!(!output.is_on());
    }
});
