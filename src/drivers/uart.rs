//! Debug UART driver — byte source for the serial console.
//!
//! Non-blocking reads from UART0, polled by the main loop. The console is
//! a pure sink, so nothing here touches control state.

#[cfg(target_os = "espidf")]
use crate::error::{Error, Result};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
const UART_NUM: u32 = 0;

#[cfg(target_os = "espidf")]
const RX_BUF_SIZE: i32 = 256;

#[cfg(target_os = "espidf")]
pub fn init() -> Result<()> {
    // SAFETY: called once from main() before the main loop polls.
    let ret = unsafe {
        uart_driver_install(
            UART_NUM as i32,
            RX_BUF_SIZE,
            0,
            0,
            core::ptr::null_mut(),
            0,
        )
    };
    if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
        return Err(Error::Init("UART driver install failed"));
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init() -> crate::error::Result<()> {
    Ok(())
}

/// Read one byte if available; never blocks.
#[cfg(target_os = "espidf")]
pub fn read_byte() -> Option<u8> {
    let mut byte: u8 = 0;
    // SAFETY: driver installed in init(); zero timeout keeps this a poll.
    let n = unsafe { uart_read_bytes(UART_NUM as i32, (&mut byte as *mut u8).cast(), 1, 0) };
    (n == 1).then_some(byte)
}

#[cfg(not(target_os = "espidf"))]
pub fn read_byte() -> Option<u8> {
    None
}
