//! Cycle timer driver — feeds the [`CycleClock`](crate::clock::CycleClock).
//!
//! The device build runs a hardware timer at [`TICKS_PER_SECOND`] whose
//! alarm fires every [`TICKS_PER_OVERFLOW`] counts with auto-reload; the
//! alarm callback increments the clock's overflow counter and nothing else,
//! so overflow events survive a busy main loop. The host build derives the
//! same counter model from `std::time::Instant`.

use crate::clock::{CycleClock, TickSource, TICKS_PER_OVERFLOW, TICKS_PER_SECOND};

#[cfg(target_os = "espidf")]
use crate::error::{Error, Result};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
static mut TIMER: gptimer_handle_t = core::ptr::null_mut();

/// SAFETY: TIMER is written once in `start()` before the alarm is enabled
/// and only read afterwards. Main-task access only.
#[cfg(target_os = "espidf")]
unsafe fn timer() -> gptimer_handle_t {
    unsafe { TIMER }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn on_alarm(
    _timer: gptimer_handle_t,
    _edata: *const gptimer_alarm_event_data_t,
    user_ctx: *mut core::ffi::c_void,
) -> bool {
    // SAFETY: user_ctx is the &'static CycleClock passed to start().
    let clock = unsafe { &*(user_ctx as *const CycleClock) };
    clock.on_overflow();
    false // No task yield required.
}

/// Start the free-running cycle timer against `clock`.
#[cfg(target_os = "espidf")]
pub fn start(clock: &'static CycleClock) -> Result<()> {
    // SAFETY: TIMER is written here once at boot from the main task before
    // any alarm callback can fire.
    unsafe {
        let timer_cfg = gptimer_config_t {
            clk_src: gptimer_clock_source_t_GPTIMER_CLK_SRC_DEFAULT,
            direction: gptimer_count_direction_t_GPTIMER_COUNT_UP,
            resolution_hz: TICKS_PER_SECOND as u32,
            ..Default::default()
        };
        let ret = gptimer_new_timer(&timer_cfg, &raw mut TIMER);
        if ret != ESP_OK {
            return Err(Error::Init("cycle timer create failed"));
        }

        let cbs = gptimer_event_callbacks_t {
            on_alarm: Some(on_alarm),
        };
        let ret = gptimer_register_event_callbacks(
            timer(),
            &cbs,
            clock as *const CycleClock as *mut core::ffi::c_void,
        );
        if ret != ESP_OK {
            return Err(Error::Init("cycle timer callback register failed"));
        }

        let alarm_cfg = gptimer_alarm_config_t {
            alarm_count: TICKS_PER_OVERFLOW,
            reload_count: 0,
            flags: gptimer_alarm_config_t__bindgen_ty_1 {
                _bitfield_1: gptimer_alarm_config_t__bindgen_ty_1::new_bitfield_1(1),
                ..Default::default()
            },
        };
        let ret = gptimer_set_alarm_action(timer(), &alarm_cfg);
        if ret != ESP_OK {
            return Err(Error::Init("cycle timer alarm config failed"));
        }

        let ret = gptimer_enable(timer());
        if ret != ESP_OK {
            return Err(Error::Init("cycle timer enable failed"));
        }
        let ret = gptimer_start(timer());
        if ret != ESP_OK {
            return Err(Error::Init("cycle timer start failed"));
        }
    }

    log::info!(
        "cycle_timer: running at {} Hz, overflow every {} ticks",
        TICKS_PER_SECOND,
        TICKS_PER_OVERFLOW
    );
    Ok(())
}

/// Live tick-register view of the hardware timer.
#[cfg(target_os = "espidf")]
#[derive(Clone, Copy)]
pub struct HwTicks;

#[cfg(target_os = "espidf")]
impl TickSource for HwTicks {
    fn ticks(&self) -> u16 {
        let mut count: u64 = 0;
        // SAFETY: timer() contract — TIMER valid after start().
        let ret = unsafe { gptimer_get_raw_count(timer(), &mut count) };
        if ret != ESP_OK {
            return 0;
        }
        (count % TICKS_PER_OVERFLOW) as u16
    }
}

// ── Host simulation ───────────────────────────────────────────

/// Simulated tick source: derives the 16-bit counter from wall time and
/// replays the overflow interrupts the hardware would have raised.
#[cfg(not(target_os = "espidf"))]
pub struct SimTicks {
    start: std::time::Instant,
    reported_overflows: u64,
}

#[cfg(not(target_os = "espidf"))]
impl Default for SimTicks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_os = "espidf"))]
impl SimTicks {
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
            reported_overflows: 0,
        }
    }

    fn total_cycles(&self) -> u64 {
        let micros = self.start.elapsed().as_micros() as u64;
        micros * TICKS_PER_SECOND / 1_000_000
    }

    /// Fire any overflow "interrupts" that elapsed since the last call.
    /// The device never needs this — its alarm ISR runs on hardware time.
    pub fn service(&mut self, clock: &CycleClock) {
        let due = self.total_cycles() / TICKS_PER_OVERFLOW;
        while self.reported_overflows < due {
            clock.on_overflow();
            self.reported_overflows += 1;
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl TickSource for SimTicks {
    fn ticks(&self) -> u16 {
        (self.total_cycles() % TICKS_PER_OVERFLOW) as u16
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn sim_ticks_advance() {
        let sim = SimTicks::new();
        let a = sim.total_cycles();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let b = sim.total_cycles();
        assert!(b > a);
    }

    #[test]
    fn service_reports_elapsed_overflows() {
        let clock = CycleClock::new();
        let mut sim = SimTicks::new();
        // Pretend the node has been up for three overflow periods.
        let elapsed = std::time::Duration::from_micros(
            (3 * TICKS_PER_OVERFLOW * 1_000_000 / TICKS_PER_SECOND) + 10,
        );
        sim.start = sim
            .start
            .checked_sub(elapsed)
            .expect("process uptime shorter than simulated elapsed time");
        sim.service(&clock);
        assert_eq!(clock.overflow_count(), 3);
    }
}
