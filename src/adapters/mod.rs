//! Adapters — concrete implementations of the port traits.
//!
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module; host targets get simulation backends.

pub mod hardware;
pub mod nvs;
