//! RelayNode Firmware — Main Entry Point
//!
//! Remote-controlled output actuator node: command packets arrive over the
//! nRF24L01+ link, the receive ISR mutates the shared control state, and
//! the cooperative main loop schedules the relay and flushes config writes.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  radio ISR ──▶ dispatch ──▶ ControlState (atomic cells)    │
//! │  timer ISR ──▶ CycleClock overflow counter                 │
//! │                                                            │
//! │  ──────────────── ISR / main-loop boundary ─────────────   │
//! │                                                            │
//! │  main loop: console poll → scheduler poll                  │
//! │                 │              ├─▶ RelayOutput (port)      │
//! │                 ▼              └─▶ NvsDelayStore (port)    │
//! │             log sink                                       │
//! └────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::info;

use relaynode::adapters::hardware::RelayOutput;
use relaynode::adapters::nvs::NvsDelayStore;
use relaynode::app::service::NodeService;
use relaynode::clock::CLOCK;
use relaynode::config::RadioConfig;
use relaynode::console::Console;
use relaynode::drivers::{cycle_timer, hw_init, radio, uart};
use relaynode::state::CONTROL;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("RelayNode v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Peripheral bring-up ────────────────────────────────
    hw_init::init_peripherals().map_err(|e| anyhow::anyhow!("{e}"))?;
    hw_init::init_isr_service().map_err(|e| anyhow::anyhow!("{e}"))?;
    cycle_timer::start(&CLOCK).map_err(|e| anyhow::anyhow!("{e}"))?;
    uart::init().map_err(|e| anyhow::anyhow!("{e}"))?;

    // Radio last: its IRQ handler dispatches against CONTROL, so everything
    // CONTROL-adjacent must be live first.
    let radio_config = RadioConfig::default();
    radio::init(&radio_config).map_err(|e| anyhow::anyhow!("{e}"))?;

    // ── 3. Control core ───────────────────────────────────────
    let service = NodeService::new();
    let mut store = NvsDelayStore::new().map_err(|e| anyhow::anyhow!("{e}"))?;
    let mut relay = RelayOutput::new();
    let mut console = Console::new();

    // Read the persisted off-delay exactly once per boot.
    service.start(&CONTROL, &mut store);

    info!("System ready. Entering main loop.");

    // ── 4. Main loop — pure poll, never blocks ────────────────
    let ticks = cycle_timer::HwTicks;
    loop {
        // Console is a pure sink; drain whatever arrived.
        while let Some(byte) = uart::read_byte() {
            console.push_byte(byte);
        }

        let now = CLOCK.current_cycles(&ticks);
        service.poll(now, &CONTROL, &mut relay, &mut store);

        // Yield one tick so the idle task can feed the watchdog.
        unsafe { esp_idf_svc::sys::vTaskDelay(1) };
    }
}
