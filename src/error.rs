//! Unified error types for the RelayNode firmware.
//!
//! Only bring-up and driver paths are fallible. The command path is not:
//! every malformed or unknown packet degrades to "no state change" inside
//! the dispatcher (it is the outermost handler for its event), and the
//! persist write is fire-and-forget.

use core::fmt;

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// The radio transceiver failed.
    Radio(RadioError),
    /// The persistent byte store failed.
    Storage(StorageError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Radio(e) => write!(f, "radio: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioError {
    /// SPI bus or device setup failed.
    SpiInitFailed(i32),
    /// A register write read back a different value.
    RegisterVerifyFailed(u8),
    /// The IRQ line could not be configured.
    IrqConfigFailed(i32),
}

impl fmt::Display for RadioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpiInitFailed(rc) => write!(f, "SPI init failed (rc={rc})"),
            Self::RegisterVerifyFailed(reg) => {
                write!(f, "register 0x{reg:02X} verify failed")
            }
            Self::IrqConfigFailed(rc) => write!(f, "IRQ config failed (rc={rc})"),
        }
    }
}

impl From<RadioError> for Error {
    fn from(e: RadioError) -> Self {
        Self::Radio(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// The backing store could not be opened.
    OpenFailed(i32),
    /// A read or write primitive failed.
    IoError(i32),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenFailed(rc) => write!(f, "open failed (rc={rc})"),
            Self::IoError(rc) => write!(f, "I/O error (rc={rc})"),
        }
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
