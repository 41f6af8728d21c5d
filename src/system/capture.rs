//! Echo pulse capture
//!
//! The echo timer runs in slave-reset mode: the rising edge of the echo pulse
//! restarts the counter and latches it into the first capture register, the
//! falling edge latches the second. The second register therefore already
//! holds the pulse width; software never subtracts timestamps.
//!
//! The capture is purely autonomous. Readers get whatever the registers hold
//! right now, which is the last complete pulse, or a torn pair if the read
//! races a latch. Both are hardware properties, not software faults.
//!
//! # Timeout
//! If no falling edge arrives within one counter period the second register
//! ends up holding the wraparound value `period - 1`. [`CaptureConfig::is_timeout`]
//! recognises that value; the ranging layer reports it but still transmits it.

use crate::system::error::ConfigError;

/// Ticks between the start and end edge of one echo pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseWidth(pub u16);

impl PulseWidth {
    pub const fn ticks(self) -> u16 {
        self.0
    }
}

/// Both capture registers as latched by the last echo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseSample {
    /// Counter value latched on the rising edge of the start channel.
    pub rising: u16,
    /// Counter value latched on the falling edge of the end channel.
    pub falling: u16,
}

impl PulseSample {
    /// Width of the pulse. The counter was reset by the rising edge, so the
    /// falling capture is the width.
    pub const fn width(&self) -> PulseWidth {
        PulseWidth(self.falling)
    }
}

/// Read access to a capture timer.
pub trait PulseCaptureSource {
    /// Current contents of both capture registers.
    fn read_sample(&self) -> PulseSample;

    /// Width of the last latched echo pulse.
    fn read_pulse_width(&self) -> PulseWidth {
        self.read_sample().width()
    }
}

impl<T: PulseCaptureSource + ?Sized> PulseCaptureSource for &T {
    fn read_sample(&self) -> PulseSample {
        (**self).read_sample()
    }
}

/// Prescaler and period of the echo capture timer.
///
/// The prescaler sets the tick resolution, the period the longest pulse that
/// can be measured before the counter wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureConfig {
    pub prescaler: u16,
    pub period: u16,
}

impl CaptureConfig {
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.prescaler == 0 {
            return Err(ConfigError::ZeroPrescaler);
        }
        if self.period < 2 {
            return Err(ConfigError::PeriodTooShort);
        }
        Ok(())
    }

    /// Counter frequency for a given timer input clock.
    pub const fn tick_hz(&self, clock_hz: u32) -> u32 {
        clock_hz / self.prescaler as u32
    }

    /// Value of the auto-reload register, the highest count before wrapping.
    /// Saturates at zero for a period that [`validate`](Self::validate) rejects.
    pub const fn wrap_value(&self) -> u16 {
        self.period.saturating_sub(1)
    }

    /// Longest pulse that can be captured.
    pub const fn max_width(&self) -> PulseWidth {
        PulseWidth(self.wrap_value())
    }

    /// True when the width is the wraparound value left behind by a missing echo.
    pub const fn is_timeout(&self, width: PulseWidth) -> bool {
        width.0 >= self.wrap_value()
    }
}

/// Free-running trigger timer: one `pulse` tick high phase every `period` ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TriggerConfig {
    pub prescaler: u16,
    pub period: u16,
    pub pulse: u16,
}

impl TriggerConfig {
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.prescaler == 0 {
            return Err(ConfigError::ZeroPrescaler);
        }
        if self.period == 0 {
            return Err(ConfigError::PeriodTooShort);
        }
        if self.pulse == 0 || self.pulse >= self.period {
            return Err(ConfigError::PulseOutsidePeriod);
        }
        Ok(())
    }

    pub const fn tick_hz(&self, clock_hz: u32) -> u32 {
        clock_hz / self.prescaler as u32
    }

    /// Sensor triggers per second.
    pub const fn rate_hz(&self, clock_hz: u32) -> u32 {
        self.tick_hz(clock_hz) / self.period as u32
    }
}
