//! Hardware drivers — GPIO bring-up, the cycle timer, the nRF24L01+
//! transceiver, and the debug UART.

pub mod cycle_timer;
pub mod hw_init;
pub mod radio;
pub mod uart;
