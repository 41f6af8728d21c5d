//! Board configuration
//!
//! Compile-time settings for every timer and peripheral the core talks to.
//! The values describe the reference board: a 24 MHz timer clock prescaled to
//! 1 ms ticks for ranging and to 1 µs ticks for the servo.
//!
//! # Timers
//! - Trigger: 1 ms ticks, 100 ms period, 10 tick pulse (10 Hz sensor trigger)
//! - Capture: 1 ms ticks, 150 ms period (longest measurable echo)
//! - Sampling: one report per second
//! - Servo: 1 µs ticks, 20 ms carrier, 700..=2700 µs pulse range

use core::time::Duration;

use crate::system::capture::{CaptureConfig, TriggerConfig};
use crate::system::servo::ServoConfig;

/// Timer input clock after the APB prescalers.
pub const TIMER_CLOCK_HZ: u32 = 24_000_000;

/// Free-running sensor trigger.
pub const TRIGGER: TriggerConfig = TriggerConfig {
    prescaler: 24_000,
    period: 100,
    pulse: 10,
};

/// Echo capture timer.
pub const CAPTURE: CaptureConfig = CaptureConfig {
    prescaler: 24_000,
    period: 150,
};

/// Time between two distance reports.
pub const SAMPLE_PERIOD: Duration = Duration::from_secs(1);

/// Time between two servo steps.
pub const SERVO_STEP_INTERVAL: Duration = Duration::from_millis(50);

/// Servo pulse range and sweep step.
pub const SERVO: ServoConfig = ServoConfig {
    min_bound: 700,
    max_bound: 2700,
    center: 1700,
    step: 100,
    carrier_period: 20_000,
    max_degrees: 180,
};

const _: () = assert!(SERVO.validate().is_ok(), "invalid servo configuration");
const _: () = assert!(TRIGGER.validate().is_ok(), "invalid trigger timer configuration");
const _: () = assert!(CAPTURE.validate().is_ok(), "invalid capture timer configuration");

/// Parity setting of the serial line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Serial line settings. The link is transmit only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub data_bits: u8,
    pub parity: Parity,
    pub stop_bits: u8,
}

impl SerialConfig {
    /// Bits on the wire for one byte, start bit included.
    pub const fn bits_per_frame(&self) -> u32 {
        let parity = match self.parity {
            Parity::None => 0,
            Parity::Even | Parity::Odd => 1,
        };
        1 + self.data_bits as u32 + parity + self.stop_bits as u32
    }

    /// Time the line needs to shift out one byte, rounded up to whole microseconds.
    pub const fn byte_time_us(&self) -> u32 {
        (self.bits_per_frame() * 1_000_000).div_ceil(self.baud_rate)
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        SERIAL
    }
}

/// 9600 baud, 8N1.
pub const SERIAL: SerialConfig = SerialConfig {
    baud_rate: 9600,
    data_bits: 8,
    parity: Parity::None,
    stop_bits: 1,
};
