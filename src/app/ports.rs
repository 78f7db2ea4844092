//! Port traits — the boundary between the control core and the hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ dispatcher / scheduler (domain)
//! ```
//!
//! Driven adapters (the relay pin, the EEPROM-style byte store) implement
//! these traits. The dispatcher and scheduler consume them via generics, so
//! the core never touches hardware directly and runs unchanged on the host.

/// Write-side port: the single digital output (relay or LED driver).
///
/// A pin write is one atomic register operation, so the dispatcher may call
/// this from interrupt context for the immediate-override opcodes; every
/// multi-step scheduling decision stays in the main loop.
pub trait OutputPort {
    /// Drive the output to the requested level.
    fn set(&mut self, on: bool);

    /// Current commanded level.
    fn is_on(&self) -> bool;
}

/// Persistent single-byte store (EEPROM-style semantics).
///
/// `write_byte` must be durable before the next `read_byte` on the same
/// address. Storage failure is not modeled at this boundary — the write is
/// fire-and-forget and adapters log their own faults. Last write wins; no
/// wear-leveling, no versioning.
pub trait DelayStore {
    /// Read one byte at `addr`.
    fn read_byte(&mut self, addr: u8) -> u8;

    /// Write one byte at `addr`.
    fn write_byte(&mut self, addr: u8, value: u8);
}
