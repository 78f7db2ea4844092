//! Node service — wires the control core together.
//!
//! Owns the [`DelayScheduler`] and exposes the two entry points the outside
//! world needs: [`NodeService::on_packet`] for the receive interrupt and
//! [`NodeService::poll`] for the main loop. All I/O flows through the port
//! traits, so the whole service runs against mocks on the host.
//!
//! ```text
//!  radio ISR ──▶ on_packet() ──▶ ControlState
//!                                    │
//!  main loop ──▶ poll() ─────────────┴──▶ OutputPort / DelayStore
//! ```

use log::info;

use crate::config::DELAY_SLOT;
use crate::dispatch;
use crate::scheduler::DelayScheduler;
use crate::state::ControlState;

use super::ports::{DelayStore, OutputPort};

pub struct NodeService {
    scheduler: DelayScheduler,
}

impl Default for NodeService {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeService {
    pub const fn new() -> Self {
        Self {
            scheduler: DelayScheduler::new(),
        }
    }

    /// Boot-time restore of the persisted off-delay. Reads the slot exactly
    /// once per power cycle.
    pub fn start(&self, state: &ControlState, store: &mut impl DelayStore) {
        let value = store.read_byte(DELAY_SLOT);
        state.set_delay_setting(value);
        info!("restored off-delay = {}", value);
    }

    /// Receive-interrupt entry point. Single-word state writes only; the
    /// radio driver flushes its RX FIFO after this returns.
    pub fn on_packet(
        &self,
        packet: &[u8],
        state: &ControlState,
        output: &mut impl OutputPort,
    ) {
        dispatch::handle_packet(packet, state, output);
    }

    /// Main-loop entry point; runs one scheduling pass.
    pub fn poll(
        &self,
        now: u64,
        state: &ControlState,
        output: &mut impl OutputPort,
        store: &mut impl DelayStore,
    ) {
        self.scheduler.poll(now, state, output, store);
    }
}
