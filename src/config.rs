//! Protocol and radio link configuration.
//!
//! Constants shared by both ends of the command link. The logical pipe
//! addresses and channel must match the transmitter node exactly.

/// First payload byte identifying this command family. Packets carrying any
/// other value are logged and discarded.
pub const COMMAND_FAMILY: u8 = 177;

/// Durable byte slot holding the configured off-delay.
pub const DELAY_SLOT: u8 = 0;

/// nRF24L01+ link parameters.
#[derive(Debug, Clone)]
pub struct RadioConfig {
    /// RF channel (2400 MHz + n).
    pub channel: u8,
    /// Fixed payload width in bytes.
    pub payload_size: u8,
    /// Auto-retransmit delay, in 250 µs units minus one (register encoding).
    pub retry_delay: u8,
    /// Auto-retransmit count.
    pub retry_count: u8,
    /// Logical pipe this node transmits on.
    pub tx_pipe: u64,
    /// Logical pipe this node listens on.
    pub rx_pipe: u64,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            channel: 120,
            payload_size: 8,
            retry_delay: 15,
            retry_count: 15,
            tx_pipe: 0xF0_F0F0_F0E1,
            rx_pipe: 0xF0_F0F0_F0D2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_link_config_is_sane() {
        let c = RadioConfig::default();
        assert!(c.channel <= 125, "nRF24 channels end at 125");
        assert!(c.payload_size > 0 && c.payload_size <= 32);
        assert!(c.retry_delay <= 15 && c.retry_count <= 15);
        assert_ne!(c.tx_pipe, c.rx_pipe, "pipes must not collide");
    }

    #[test]
    fn payload_fits_a_full_command() {
        // address + opcode + argument
        assert!(RadioConfig::default().payload_size >= 3);
    }
}
