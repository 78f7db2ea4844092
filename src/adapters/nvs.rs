//! NVS-backed persistent byte store.
//!
//! Implements [`DelayStore`] with EEPROM-like semantics: one durable byte
//! per address, last write wins, durable before the next read. On ESP32
//! each address maps to its own `u8` key in the `relaynode` namespace
//! (nvs_commit makes the write atomic and power-safe). The simulation
//! backend is a plain in-memory array.
//!
//! Per the control design, writes are fire-and-forget: a failed commit is
//! logged here and never propagates into the scheduler.

use crate::app::ports::DelayStore;

#[cfg(target_os = "espidf")]
use crate::error::StorageError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::{info, warn};

#[cfg(target_os = "espidf")]
const NAMESPACE: &[u8] = b"relaynode\0";

pub struct NvsDelayStore {
    #[cfg(target_os = "espidf")]
    handle: nvs_handle_t,
    #[cfg(not(target_os = "espidf"))]
    slots: [u8; 256],
}

#[cfg(target_os = "espidf")]
impl NvsDelayStore {
    /// Initialise NVS flash and open the namespace. On first boot or after
    /// a version mismatch the partition is erased and re-initialised.
    pub fn new() -> Result<Self, StorageError> {
        // SAFETY: nvs_flash_init / nvs_flash_erase run from the single
        // main-task context before any other NVS access.
        let ret = unsafe { nvs_flash_init() };
        if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
            warn!("nvs: erasing and re-initialising flash partition");
            let ret2 = unsafe { nvs_flash_erase() };
            if ret2 != ESP_OK {
                return Err(StorageError::OpenFailed(ret2));
            }
            let ret3 = unsafe { nvs_flash_init() };
            if ret3 != ESP_OK {
                return Err(StorageError::OpenFailed(ret3));
            }
        } else if ret != ESP_OK {
            return Err(StorageError::OpenFailed(ret));
        }

        let mut handle: nvs_handle_t = 0;
        let ret = unsafe {
            nvs_open(
                NAMESPACE.as_ptr() as *const core::ffi::c_char,
                nvs_open_mode_t_NVS_READWRITE,
                &mut handle,
            )
        };
        if ret != ESP_OK {
            return Err(StorageError::OpenFailed(ret));
        }

        info!("nvs: namespace open");
        Ok(Self { handle })
    }

    /// Key for a byte slot: `"s<addr>"` zero-padded, NUL-terminated.
    fn key(addr: u8) -> [u8; 5] {
        [
            b's',
            b'0' + addr / 100,
            b'0' + (addr / 10) % 10,
            b'0' + addr % 10,
            0,
        ]
    }
}

#[cfg(not(target_os = "espidf"))]
impl NvsDelayStore {
    pub fn new() -> Result<Self, crate::error::StorageError> {
        Ok(Self { slots: [0; 256] })
    }
}

#[cfg(target_os = "espidf")]
impl DelayStore for NvsDelayStore {
    fn read_byte(&mut self, addr: u8) -> u8 {
        let key = Self::key(addr);
        let mut value: u8 = 0;
        // SAFETY: handle was opened in new(); key is NUL-terminated.
        let ret = unsafe {
            nvs_get_u8(
                self.handle,
                key.as_ptr() as *const core::ffi::c_char,
                &mut value,
            )
        };
        match ret {
            ESP_OK => value,
            ESP_ERR_NVS_NOT_FOUND => {
                info!("nvs: slot {} empty, defaulting to 0", addr);
                0
            }
            rc => {
                warn!("nvs: read of slot {} failed (rc={})", addr, rc);
                0
            }
        }
    }

    fn write_byte(&mut self, addr: u8, value: u8) {
        let key = Self::key(addr);
        // SAFETY: same contract as read_byte.
        let ret = unsafe {
            nvs_set_u8(
                self.handle,
                key.as_ptr() as *const core::ffi::c_char,
                value,
            )
        };
        if ret != ESP_OK {
            warn!("nvs: write of slot {} failed (rc={})", addr, ret);
            return;
        }
        let ret = unsafe { nvs_commit(self.handle) };
        if ret != ESP_OK {
            warn!("nvs: commit of slot {} failed (rc={})", addr, ret);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl DelayStore for NvsDelayStore {
    fn read_byte(&mut self, addr: u8) -> u8 {
        self.slots[addr as usize]
    }

    fn write_byte(&mut self, addr: u8, value: u8) {
        self.slots[addr as usize] = value;
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn sim_store_round_trips() {
        let mut store = NvsDelayStore::new().unwrap();
        assert_eq!(store.read_byte(0), 0, "unwritten slot reads zero");

        store.write_byte(0, 42);
        assert_eq!(store.read_byte(0), 42);

        store.write_byte(0, 7);
        assert_eq!(store.read_byte(0), 7, "last write wins");
    }
}
