//! Command dispatcher — decodes inbound packets and mutates shared state.
//!
//! Runs in radio-receive interrupt context. Every branch is a single-word
//! memory write (plus, for the two override opcodes, one atomic pin write),
//! so no critical section is needed anywhere in the dispatch path. Malformed
//! and unknown packets degrade to "no state change"; nothing here can panic
//! or propagate an error — the dispatcher is the outermost handler for its
//! triggering event.
//!
//! After dispatch the caller MUST flush the transceiver's receive buffer so
//! the next packet can land; skipping the flush locks the link up (see
//! `drivers::radio`).

use log::{info, warn};

use crate::app::ports::OutputPort;
use crate::config::COMMAND_FAMILY;
use crate::state::ControlState;

/// A command decoded from an inbound packet.
///
/// Wire layout: `[0] = family address, [1] = opcode, [2] = argument`
/// (argument present only for the set-delay opcodes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Opcode 100 — force the output on and disable the delayed path.
    ForceOn,
    /// Opcode 101 — force the output off and disable the delayed path.
    ForceOff,
    /// Opcode 102 — queue a delayed-on episode.
    TurnOnDelayed,
    /// Opcode 103 — set the off-delay.
    SetDelay(u8),
    /// Opcode 104 — persist the current off-delay.
    SaveDelay,
    /// Opcode 105 — set and persist the off-delay.
    SetAndSaveDelay(u8),
    /// Opcode 106 — disable the delayed path.
    DisableDelayed,
    /// Opcode 107 — enable the delayed path.
    EnableDelayed,
}

impl Command {
    /// Decode a raw packet. `None` means the packet is not for us:
    /// too short, wrong family address, missing argument, or an opcode we
    /// do not know. Decoding never panics on any input.
    pub fn decode(packet: &[u8]) -> Option<Self> {
        if packet.len() < 2 {
            warn!("dispatch: short packet ({} bytes), dropped", packet.len());
            return None;
        }
        if packet[0] != COMMAND_FAMILY {
            warn!("dispatch: unknown family address {}, dropped", packet[0]);
            return None;
        }

        match packet[1] {
            100 => Some(Self::ForceOn),
            101 => Some(Self::ForceOff),
            102 => Some(Self::TurnOnDelayed),
            103 => packet.get(2).map(|&v| Self::SetDelay(v)),
            104 => Some(Self::SaveDelay),
            105 => packet.get(2).map(|&v| Self::SetAndSaveDelay(v)),
            106 => Some(Self::DisableDelayed),
            107 => Some(Self::EnableDelayed),
            other => {
                warn!("dispatch: unknown opcode {}, dropped", other);
                None
            }
        }
    }
}

/// Apply a decoded command to the shared state.
///
/// ISR-safe: single-word stores only. The override opcodes additionally
/// write the pin directly so they take effect before the next main-loop
/// iteration.
pub fn apply(cmd: Command, state: &ControlState, output: &mut impl OutputPort) {
    match cmd {
        Command::ForceOn => {
            state.set_output_enabled(false);
            output.set(true);
            info!("dispatch: output forced on");
        }
        Command::ForceOff => {
            state.set_output_enabled(false);
            output.set(false);
            info!("dispatch: output forced off");
        }
        Command::TurnOnDelayed => {
            state.request_turn_on();
        }
        Command::SetDelay(v) => {
            state.set_delay_setting(v);
            info!("dispatch: off-delay = {}", v);
        }
        Command::SaveDelay => {
            state.request_persist();
            info!("dispatch: persist requested");
        }
        Command::SetAndSaveDelay(v) => {
            // Value first, flag second — the scheduler reads them in the
            // opposite order.
            state.set_delay_setting(v);
            state.request_persist();
            info!("dispatch: off-delay = {} (persist requested)", v);
        }
        Command::DisableDelayed => {
            state.set_output_enabled(false);
            info!("dispatch: delayed path disabled");
        }
        Command::EnableDelayed => {
            state.set_output_enabled(true);
            info!("dispatch: delayed path enabled");
        }
    }
}

/// Decode-and-apply entry point for the receive ISR.
pub fn handle_packet(packet: &[u8], state: &ControlState, output: &mut impl OutputPort) {
    if let Some(cmd) = Command::decode(packet) {
        apply(cmd, state, output);
    }
}
