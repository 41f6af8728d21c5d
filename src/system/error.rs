//! Error values
//!
//! Nothing in the core aborts or retries. Every failure degrades to a no-op,
//! and the no-op is reported back to the caller as one of these values so it
//! can be logged or asserted on.

use core::fmt;

/// A byte was offered to a full ring buffer and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QueueFull(pub u8);

impl fmt::Display for QueueFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queue full, dropped byte {:#04x}", self.0)
    }
}

/// Serial transmitter refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmitError {
    /// `arm` was called while a frame was still on its way out.
    FrameInProgress,
}

impl fmt::Display for TransmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransmitError::FrameInProgress => f.write_str("frame already in progress"),
        }
    }
}

/// Servo position request outside the configured range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServoError {
    /// Duty cycle outside `[min_bound, max_bound]`.
    DutyCycleOutOfRange(u16),
    /// Angle above the servo's maximum rotation.
    AngleOutOfRange(u16),
}

impl fmt::Display for ServoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServoError::DutyCycleOutOfRange(ticks) => {
                write!(f, "duty cycle {} ticks out of range", ticks)
            }
            ServoError::AngleOutOfRange(degrees) => write!(f, "angle {}° out of range", degrees),
        }
    }
}

/// Inconsistent configuration constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Minimum bound is not below the maximum bound.
    EmptyRange,
    /// Center position lies outside the bounds.
    CenterOutOfRange,
    /// Step is zero or wider than the whole range.
    InvalidStep,
    /// Pulse range does not fit in the carrier period.
    ExceedsCarrier,
    /// Zero degrees of rotation.
    NoRotation,
    /// Timer prescaler of zero.
    ZeroPrescaler,
    /// Timer period too short to tell a pulse from a wraparound.
    PeriodTooShort,
    /// Trigger pulse does not end before the trigger period.
    PulseOutsidePeriod,
    /// Simulated timer period of zero milliseconds.
    ZeroInterval,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConfigError::EmptyRange => "min bound must be below max bound",
            ConfigError::CenterOutOfRange => "center outside bounds",
            ConfigError::InvalidStep => "step must be non-zero and within the range",
            ConfigError::ExceedsCarrier => "max bound exceeds carrier period",
            ConfigError::NoRotation => "max degrees must be positive",
            ConfigError::ZeroPrescaler => "timer prescaler must be non-zero",
            ConfigError::PeriodTooShort => "timer period must be at least two ticks",
            ConfigError::PulseOutsidePeriod => "trigger pulse must be shorter than its period",
            ConfigError::ZeroInterval => "timer interval must be non-zero",
        };
        f.write_str(msg)
    }
}
