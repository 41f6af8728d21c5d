//! Servo Sweep
//!
//! Sweeps the servo between its limits one step per tick, independent of the
//! ranging path. PWM slice 3 is set up for 1 µs ticks and a 20 ms frame, so
//! the compare register takes the pulse width in microseconds directly.

use defmt::{debug, info};
use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::pwm::{self, Pwm};
use embassy_time::{Duration, Ticker};
use sonar_sweep::system::config::{SERVO, SERVO_STEP_INTERVAL};
use sonar_sweep::system::servo::{DutyCycleOutput, ServoActuator, ServoConfig};

use crate::board::resources::ServoResources;

/// Servo pulse output on channel A of a PWM slice.
pub struct PwmServoOutput {
    pwm: Pwm<'static>,
    // Kept so that updating the compare value does not reset the divider.
    config: pwm::Config,
}

impl PwmServoOutput {
    pub fn new(r: ServoResources, servo: &ServoConfig) -> Self {
        let clock_freq_hz = clk_sys_freq();
        // Aim for 1 tick = 1 µs
        let divider = (clock_freq_hz / 1_000_000).clamp(1, 255) as u8;

        let mut config = pwm::Config::default();
        config.divider = divider.into();
        config.top = servo.carrier_period - 1;
        config.phase_correct = false;
        config.compare_a = servo.center;
        config.enable = true;

        let pwm = Pwm::new_output_a(r.slice, r.pin, config.clone());
        info!("servo clk={}Hz div={} top={}", clock_freq_hz, divider, config.top);

        Self { pwm, config }
    }
}

impl DutyCycleOutput for PwmServoOutput {
    fn set_compare(&mut self, ticks: u16) {
        self.config.compare_a = ticks;
        self.pwm.set_config(&self.config);
    }
}

#[embassy_executor::task]
pub async fn servo_sweep(r: ServoResources) {
    let output = PwmServoOutput::new(r, &SERVO);
    let mut servo = match ServoActuator::new(output, SERVO) {
        Ok(servo) => servo,
        Err(e) => {
            defmt::error!("servo configuration rejected: {}", e);
            return;
        }
    };

    let mut ticker = Ticker::every(Duration::from_millis(SERVO_STEP_INTERVAL.as_millis() as u64));
    loop {
        ticker.next().await;
        let step = servo.sweep();
        debug!("servo {} ({} deg) {}", step, servo.degrees(), servo.direction());
    }
}
