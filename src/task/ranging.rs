//! Ultrasonic ranging
//!
//! # Sensor Operation
//! - PWM slice 1 runs free as the trigger timer: a short high pulse every
//!   100 ms fires the HC-SR04
//! - PWM slice 2 counts at 1 MHz while the echo line is high
//! - Once per trigger period the count is latched into [`ECHO`] and cleared,
//!   emulating a capture timer that resets on the trigger edge
//! - Once per second the sampling task reads the latch and hands the distance
//!   to the serial transmitter
//!
//! The latch period is not phase locked to the trigger, so an echo may now
//! and then be split across two latches.

use defmt::{info, warn};
use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::gpio::{Level, Output, Pull};
use embassy_rp::pwm::{self, InputMode, Pwm};
use embassy_time::{Duration, Ticker};
use sonar_sweep::system::capture::PulseSample;
use sonar_sweep::system::config::{CAPTURE, SAMPLE_PERIOD, TIMER_CLOCK_HZ, TRIGGER};
use sonar_sweep::system::ranging::{Dispatch, RangingController};
use sonar_sweep::system::state::EchoLatch;

use crate::board::resources::RangingResources;
use crate::task::serial::{Uart0Tx, TRANSMITTER};

/// Latched echo, written by the capture task, read by the sampling task.
pub static ECHO: EchoLatch = EchoLatch::new();

/// Trigger slice clock divider; 150 MHz / 250 = 600 kHz.
const TRIGGER_DIVIDER: u8 = 250;

/// Trigger high time in 600 kHz ticks (10 µs).
const TRIGGER_PULSE_TICKS: u16 = 6;

/// Trigger period as configured for the sensor.
const TRIGGER_PERIOD: Duration = Duration::from_millis(
    TRIGGER.period as u64 * 1000 / TRIGGER.tick_hz(TIMER_CLOCK_HZ) as u64,
);

/// Echo counter ticks per capture tick.
const ECHO_US_PER_TICK: u32 = 1_000_000 / CAPTURE.tick_hz(TIMER_CLOCK_HZ);

/// Drive the trigger and latch the echo width once per trigger period.
#[embassy_executor::task]
pub async fn echo_capture(r: RangingResources) {
    let clock_freq_hz = clk_sys_freq();

    let trigger_hz = clock_freq_hz / TRIGGER_DIVIDER as u32;
    let mut trigger_config = pwm::Config::default();
    trigger_config.divider = TRIGGER_DIVIDER.into();
    trigger_config.top = (trigger_hz as u64 * TRIGGER_PERIOD.as_millis() / 1000) as u16 - 1;
    trigger_config.compare_a = TRIGGER_PULSE_TICKS;
    let _trigger = Pwm::new_output_a(r.trigger_slice, r.trigger_pin, trigger_config);

    // 1 µs per count while the echo is high
    let mut echo_config = pwm::Config::default();
    echo_config.divider = ((clock_freq_hz / 1_000_000) as u8).into();
    let echo = Pwm::new_input(r.echo_slice, r.echo_pin, Pull::None, InputMode::Level, echo_config);

    let mut led = Output::new(r.led_pin, Level::Low);
    let mut latches: u32 = 0;

    info!("echo capture running, trigger every {} ms", TRIGGER_PERIOD.as_millis());

    let mut ticker = Ticker::every(TRIGGER_PERIOD);
    loop {
        ticker.next().await;

        let high_us = u32::from(echo.counter());
        echo.set_counter(0);

        let falling = (high_us / ECHO_US_PER_TICK).min(u32::from(CAPTURE.wrap_value())) as u16;
        ECHO.latch(PulseSample { rising: 0, falling });

        // Heartbeat, once per second
        latches = latches.wrapping_add(1);
        if latches % 10 == 0 {
            led.toggle();
        }
    }
}

/// Once-per-second ranging sample.
#[embassy_executor::task]
pub async fn sample() {
    let mut ranging = RangingController::new(CAPTURE);
    let mut ticker = Ticker::every(Duration::from_millis(SAMPLE_PERIOD.as_millis() as u64));

    loop {
        ticker.next().await;

        // Only the state update runs with UART0_IRQ masked; logging waits.
        let outcome = TRANSMITTER.with(|tx| ranging.on_tick(&ECHO, tx, &mut Uart0Tx));
        outcome.log();

        match outcome.dispatch {
            Dispatch::Armed => info!("distance {} reported", outcome.report.distance),
            Dispatch::Overwrote => {
                warn!("previous frame still sending, distance {} replaces it", outcome.report.distance)
            }
        }
    }
}
