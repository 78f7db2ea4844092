//! GPIO / peripheral pin assignments for the RelayNode board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers. Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Output actuator (relay / LED driver, active HIGH)
// ---------------------------------------------------------------------------

/// Digital output driving the relay coil transistor.
pub const RELAY_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// nRF24L01+ transceiver (SPI2 bus)
// ---------------------------------------------------------------------------

pub const RADIO_SCLK_GPIO: i32 = 12;
pub const RADIO_MOSI_GPIO: i32 = 11;
pub const RADIO_MISO_GPIO: i32 = 13;
/// Chip select, active LOW.
pub const RADIO_CSN_GPIO: i32 = 10;
/// Chip enable — HIGH keeps the radio in RX mode.
pub const RADIO_CE_GPIO: i32 = 9;
/// Interrupt request from the radio — falling edge on RX_DR/TX_DS/MAX_RT.
pub const RADIO_IRQ_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// UART debug console
// ---------------------------------------------------------------------------

pub const UART_TX_GPIO: i32 = 17;
pub const UART_RX_GPIO: i32 = 18;
