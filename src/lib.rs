//! Sonar sweep core
//!
//! Hardware-independent half of the sonar sweep firmware: an ultrasonic echo is
//! captured by a timer, sampled once per second and reported over a serial line
//! one byte per interrupt, while a servo sweeps back and forth between its limits.
//!
//! Everything here is `no_std`, allocation free and runs on the host, so the
//! interrupt-level behaviour can be exercised with the simulated board in
//! [`system::sim`]. The RP2350 firmware in `main.rs` binds the same components
//! to real peripherals.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod system;

pub use system::capture::{CaptureConfig, PulseCaptureSource, PulseSample, PulseWidth};
pub use system::error::{ConfigError, QueueFull, ServoError, TransmitError};
pub use system::ranging::{Dispatch, RangingController, SampleOutcome};
pub use system::report::{DistanceDigit, DistanceReport};
pub use system::ring_buffer::RingBuffer;
pub use system::serial_tx::{SerialTransmitter, TxEvent, TxRegister, TxState};
pub use system::servo::{Direction, DutyCycleOutput, ServoActuator, ServoConfig};
