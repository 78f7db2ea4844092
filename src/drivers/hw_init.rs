//! One-shot GPIO bring-up.
//!
//! Configures the relay output and the radio IRQ input using raw ESP-IDF
//! sys calls. Called once from `main()` before the main loop starts.

use crate::error::{Error, Result};

#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<()> {
    // SAFETY: called once from main() before the main loop; single-threaded.
    unsafe {
        init_relay_pin()?;
        init_irq_pin()?;
    }
    info!("hw_init: GPIO configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<()> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

/// Relay output, deasserted at boot.
#[cfg(target_os = "espidf")]
unsafe fn init_relay_pin() -> Result<()> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::RELAY_GPIO,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK {
        return Err(Error::Init("relay pin config failed"));
    }
    let ret = unsafe { gpio_set_level(pins::RELAY_GPIO, 0) };
    if ret != ESP_OK {
        return Err(Error::Init("relay pin deassert failed"));
    }
    Ok(())
}

/// Radio IRQ input. The nRF24 drives this line low on RX_DR/TX_DS/MAX_RT,
/// so the interrupt triggers on the falling edge.
#[cfg(target_os = "espidf")]
unsafe fn init_irq_pin() -> Result<()> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::RADIO_IRQ_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_NEGEDGE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK {
        return Err(Error::Init("radio IRQ pin config failed"));
    }
    Ok(())
}

/// Install the GPIO ISR service. Separate from pin config so `main()` can
/// decide how to degrade if it fails.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<()> {
    let ret = unsafe { gpio_install_isr_service(0) };
    if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
        return Err(Error::Init("GPIO ISR service install failed"));
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<()> {
    Ok(())
}
