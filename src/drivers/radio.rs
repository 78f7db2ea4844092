//! nRF24L01+ transceiver driver.
//!
//! Physical-layer plumbing only: SPI register setup, RX listening, and the
//! IRQ service routine. The control core never sees any of this — it
//! consumes received packet bytes through `dispatch::handle_packet` and
//! nothing else.
//!
//! The IRQ handler runs the whole receive path in interrupt context:
//! read payload → dispatch →
//! flush RX FIFO → clear IRQ flags. The flush is mandatory — a FIFO left
//! full blocks every later packet at the link layer with no recovery.

use crate::config::RadioConfig;

#[cfg(target_os = "espidf")]
use crate::adapters::hardware::RelayOutput;
#[cfg(target_os = "espidf")]
use crate::dispatch;
#[cfg(target_os = "espidf")]
use crate::error::{Error, RadioError, Result};
#[cfg(target_os = "espidf")]
use crate::pins;
#[cfg(target_os = "espidf")]
use crate::state::CONTROL;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

// ── nRF24L01+ register map (the subset this node uses) ────────

#[cfg(target_os = "espidf")]
mod reg {
    pub const CONFIG: u8 = 0x00;
    pub const EN_AA: u8 = 0x01;
    pub const EN_RXADDR: u8 = 0x02;
    pub const SETUP_RETR: u8 = 0x04;
    pub const RF_CH: u8 = 0x05;
    pub const RF_SETUP: u8 = 0x06;
    pub const STATUS: u8 = 0x07;
    pub const RX_ADDR_P0: u8 = 0x0A;
    pub const RX_ADDR_P1: u8 = 0x0B;
    pub const TX_ADDR: u8 = 0x10;
    pub const RX_PW_P1: u8 = 0x12;

    // SPI commands
    pub const R_REGISTER: u8 = 0x00;
    pub const W_REGISTER: u8 = 0x20;
    pub const R_RX_PAYLOAD: u8 = 0x61;
    pub const W_TX_PAYLOAD: u8 = 0xA0;
    pub const FLUSH_TX: u8 = 0xE1;
    pub const FLUSH_RX: u8 = 0xE2;
    pub const NOP: u8 = 0xFF;

    // STATUS bits
    pub const RX_DR: u8 = 1 << 6;
    pub const TX_DS: u8 = 1 << 5;
    pub const MAX_RT: u8 = 1 << 4;

    // CONFIG bits: CRC on, 2-byte CRC, powered up, primary RX
    pub const CONFIG_LISTEN: u8 = 0b0000_1111;
}

#[cfg(target_os = "espidf")]
static mut SPI_DEV: spi_device_handle_t = core::ptr::null_mut();

/// Payload width configured at init; the ISR reads exactly this many bytes.
#[cfg(target_os = "espidf")]
static mut PAYLOAD_SIZE: u8 = 8;

/// SAFETY: SPI_DEV is written once in `init()` before the IRQ handler is
/// registered; afterwards both the main task and the ISR only read it.
#[cfg(target_os = "espidf")]
unsafe fn spi_dev() -> spi_device_handle_t {
    unsafe { SPI_DEV }
}

// ── SPI primitives ────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn transfer(tx: &[u8], rx: &mut [u8]) {
    let mut txn: spi_transaction_t = unsafe { core::mem::zeroed() };
    txn.length = tx.len() * 8;
    txn.__bindgen_anon_1.tx_buffer = tx.as_ptr() as *const core::ffi::c_void;
    txn.__bindgen_anon_2.rx_buffer = rx.as_mut_ptr() as *mut core::ffi::c_void;
    // SAFETY: spi_dev() contract; polling transmit is usable from ISR
    // context because the device was added with polling enabled and no
    // other task touches the bus.
    unsafe {
        spi_device_polling_transmit(spi_dev(), &mut txn);
    }
}

#[cfg(target_os = "espidf")]
unsafe fn write_register(register: u8, value: u8) {
    let tx = [reg::W_REGISTER | register, value];
    let mut rx = [0u8; 2];
    unsafe { transfer(&tx, &mut rx) };
}

#[cfg(target_os = "espidf")]
unsafe fn write_register_bytes(register: u8, value: &[u8]) {
    let mut tx = [0u8; 6];
    tx[0] = reg::W_REGISTER | register;
    tx[1..=value.len()].copy_from_slice(value);
    let mut rx = [0u8; 6];
    unsafe { transfer(&tx[..=value.len()], &mut rx[..=value.len()]) };
}

#[cfg(target_os = "espidf")]
unsafe fn read_register(register: u8) -> u8 {
    let tx = [reg::R_REGISTER | register, reg::NOP];
    let mut rx = [0u8; 2];
    unsafe { transfer(&tx, &mut rx) };
    rx[1]
}

#[cfg(target_os = "espidf")]
unsafe fn strobe(command: u8) -> u8 {
    let tx = [command];
    let mut rx = [0u8; 1];
    unsafe { transfer(&tx, &mut rx) };
    rx[0] // STATUS is always clocked out with the command byte.
}

/// Five-byte little-endian pipe address as the nRF24 expects it.
#[cfg(target_os = "espidf")]
fn pipe_bytes(pipe: u64) -> [u8; 5] {
    let b = pipe.to_le_bytes();
    [b[0], b[1], b[2], b[3], b[4]]
}

// ── Bring-up ──────────────────────────────────────────────────

/// Initialise the SPI bus, configure the transceiver per `config`, and
/// enter RX mode. The IRQ handler is registered last so no packet can be
/// dispatched against a half-configured radio.
#[cfg(target_os = "espidf")]
pub fn init(config: &RadioConfig) -> Result<()> {
    // SAFETY: single-threaded bring-up from main(); SPI_DEV and
    // PAYLOAD_SIZE are written before the ISR is registered.
    unsafe {
        let bus_cfg = spi_bus_config_t {
            __bindgen_anon_1: spi_bus_config_t__bindgen_ty_1 {
                mosi_io_num: pins::RADIO_MOSI_GPIO,
            },
            __bindgen_anon_2: spi_bus_config_t__bindgen_ty_2 {
                miso_io_num: pins::RADIO_MISO_GPIO,
            },
            sclk_io_num: pins::RADIO_SCLK_GPIO,
            __bindgen_anon_3: spi_bus_config_t__bindgen_ty_3 { quadwp_io_num: -1 },
            __bindgen_anon_4: spi_bus_config_t__bindgen_ty_4 { quadhd_io_num: -1 },
            ..core::mem::zeroed()
        };
        let ret = spi_bus_initialize(
            spi_host_device_t_SPI2_HOST,
            &bus_cfg,
            spi_common_dma_t_SPI_DMA_DISABLED,
        );
        if ret != ESP_OK {
            return Err(Error::Radio(RadioError::SpiInitFailed(ret)));
        }

        let dev_cfg = spi_device_interface_config_t {
            mode: 0,
            clock_speed_hz: 8_000_000, // nRF24 tops out at 10 MHz
            spics_io_num: pins::RADIO_CSN_GPIO,
            queue_size: 1,
            ..core::mem::zeroed()
        };
        let ret = spi_bus_add_device(spi_host_device_t_SPI2_HOST, &dev_cfg, &raw mut SPI_DEV);
        if ret != ESP_OK {
            return Err(Error::Radio(RadioError::SpiInitFailed(ret)));
        }

        PAYLOAD_SIZE = config.payload_size;

        // CE low while configuring.
        gpio_set_direction(pins::RADIO_CE_GPIO, gpio_mode_t_GPIO_MODE_OUTPUT);
        gpio_set_level(pins::RADIO_CE_GPIO, 0);

        // Link parameters.
        write_register(reg::EN_AA, 0x3F); // auto-ack on all pipes
        write_register(
            reg::SETUP_RETR,
            (config.retry_delay << 4) | (config.retry_count & 0x0F),
        );
        write_register(reg::RF_CH, config.channel & 0x7F);
        write_register(reg::RF_SETUP, 0x07); // 1 Mbps, 0 dBm, LNA on
        write_register(reg::RX_PW_P1, config.payload_size);

        // Pipes: P0 mirrors the TX address for auto-ack, P1 receives.
        write_register_bytes(reg::TX_ADDR, &pipe_bytes(config.tx_pipe));
        write_register_bytes(reg::RX_ADDR_P0, &pipe_bytes(config.tx_pipe));
        write_register_bytes(reg::RX_ADDR_P1, &pipe_bytes(config.rx_pipe));
        write_register(reg::EN_RXADDR, 0b0000_0011);

        // Clean slate before listening.
        strobe(reg::FLUSH_RX);
        strobe(reg::FLUSH_TX);
        write_register(reg::STATUS, reg::RX_DR | reg::TX_DS | reg::MAX_RT);

        write_register(reg::CONFIG, reg::CONFIG_LISTEN);
        if read_register(reg::CONFIG) != reg::CONFIG_LISTEN {
            return Err(Error::Radio(RadioError::RegisterVerifyFailed(reg::CONFIG)));
        }

        // CE high → RX mode. 130 µs settling time per datasheet.
        gpio_set_level(pins::RADIO_CE_GPIO, 1);
        esp_rom_delay_us(130);

        let ret = gpio_isr_handler_add(
            pins::RADIO_IRQ_GPIO,
            Some(radio_irq_handler),
            core::ptr::null_mut(),
        );
        if ret != ESP_OK {
            return Err(Error::Radio(RadioError::IrqConfigFailed(ret)));
        }
    }

    info!(
        "radio: listening on channel {} (payload {} bytes)",
        config.channel, config.payload_size
    );
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init(config: &RadioConfig) -> crate::error::Result<()> {
    log::info!(
        "radio(sim): listening on channel {} (payload {} bytes)",
        config.channel,
        config.payload_size
    );
    Ok(())
}

// ── Receive path (interrupt context) ──────────────────────────

/// Radio IRQ service routine.
///
/// Reads one payload, dispatches it against the shared control state, then
/// flushes the RX FIFO (discarding anything still queued behind it) and
/// clears the IRQ flags so the transceiver can accept the next packet.
/// Skipping that final step is a protocol-level lockout, not a recoverable
/// error.
#[cfg(target_os = "espidf")]
unsafe extern "C" fn radio_irq_handler(_arg: *mut core::ffi::c_void) {
    // SAFETY: SPI_DEV/PAYLOAD_SIZE were initialised before this handler was
    // registered; dispatch only performs single-word atomic writes.
    unsafe {
        let status = strobe(reg::NOP);
        if status & reg::RX_DR != 0 {
            let size = PAYLOAD_SIZE as usize;
            let mut tx = [reg::NOP; 33];
            tx[0] = reg::R_RX_PAYLOAD;
            let mut rx = [0u8; 33];
            transfer(&tx[..=size], &mut rx[..=size]);

            let mut output = RelayOutput::new();
            dispatch::handle_packet(&rx[1..=size], &CONTROL, &mut output);
        }

        // Mandatory: free the FIFO and drop the IRQ line for the next packet.
        strobe(reg::FLUSH_RX);
        write_register(reg::STATUS, reg::RX_DR | reg::TX_DS | reg::MAX_RT);
    }
}

// ── Transmit (link-layer ack handles delivery; no app payloads yet) ──

/// Queue a payload on the TX pipe. Provided for symmetry with the remote
/// end; this node currently sends nothing of its own.
#[cfg(target_os = "espidf")]
#[allow(dead_code)]
pub fn send(payload: &[u8]) {
    // SAFETY: same contract as the IRQ handler.
    unsafe {
        let mut tx = [0u8; 33];
        tx[0] = reg::W_TX_PAYLOAD;
        let n = payload.len().min(32);
        tx[1..=n].copy_from_slice(&payload[..n]);
        let mut rx = [0u8; 33];
        transfer(&tx[..=n], &mut rx[..=n]);
    }
}

// ── Host simulation ───────────────────────────────────────────

/// In-memory stand-in for the RX path: tests inject packets and `poll`
/// plays the part of the receive interrupt (dispatch, then "flush").
#[cfg(not(target_os = "espidf"))]
pub struct SimRadio {
    rx_queue: std::collections::VecDeque<Vec<u8>>,
}

#[cfg(not(target_os = "espidf"))]
impl Default for SimRadio {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_os = "espidf"))]
impl SimRadio {
    pub fn new() -> Self {
        Self {
            rx_queue: std::collections::VecDeque::new(),
        }
    }

    /// Queue a packet as if it had arrived over the air.
    pub fn inject(&mut self, packet: &[u8]) {
        self.rx_queue.push_back(packet.to_vec());
    }

    /// Deliver every queued packet through the dispatcher.
    pub fn poll(
        &mut self,
        state: &crate::state::ControlState,
        output: &mut impl crate::app::ports::OutputPort,
    ) {
        while let Some(packet) = self.rx_queue.pop_front() {
            crate::dispatch::handle_packet(&packet, state, output);
        }
    }
}
