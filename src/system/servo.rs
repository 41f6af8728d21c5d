//! Servo sweep state machine
//!
//! Keeps the servo pulse width (duty cycle, in 1 µs timer ticks) and the sweep
//! direction, and writes the pulse width to the PWM compare register after
//! every change.
//!
//! # Sweep
//! - Clockwise walks the pulse width down towards `min_bound`
//! - CounterClockwise walks it up towards `max_bound`
//! - Centered parks it at `center` and stays there
//!
//! [`ServoActuator::sweep`] reverses only when the servo sits on the bound it is
//! heading for, then steps; a step that would pass that bound lands on it.
//! This yields a continuous back-and-forth sweep between the limits from any
//! position and direction. [`ServoActuator::toggle`] is the coarser manual
//! control: it reverses on either bound.
//!
//! # Angles
//! Degrees map onto `[min_bound, max_bound]` affinely with integer division
//! truncating in both directions, so a round trip may lose up to one degree
//! (or one degree's worth of ticks). That loss is inherent in working in whole
//! ticks and whole degrees.

use crate::system::error::{ConfigError, ServoError};

/// PWM compare register that sets the servo pulse width.
pub trait DutyCycleOutput {
    fn set_compare(&mut self, ticks: u16);
}

impl<T: DutyCycleOutput + ?Sized> DutyCycleOutput for &mut T {
    fn set_compare(&mut self, ticks: u16) {
        (**self).set_compare(ticks)
    }
}

/// Sweep direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Clockwise,
    CounterClockwise,
    Centered,
}

impl Direction {
    /// The opposite sweep direction. Centered has none.
    pub const fn reversed(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
            Direction::Centered => Direction::Centered,
        }
    }
}

/// Result of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepOutcome {
    /// Position changed by one step.
    Moved(u16),
    /// The step would have passed a bound; position unchanged.
    Blocked(u16),
    /// Position set to the center.
    Centered(u16),
}

impl StepOutcome {
    pub const fn position(self) -> u16 {
        match self {
            StepOutcome::Moved(p) | StepOutcome::Blocked(p) | StepOutcome::Centered(p) => p,
        }
    }
}

/// Pulse range, sweep step and carrier of a hobby servo, all in 1 µs ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServoConfig {
    pub min_bound: u16,
    pub max_bound: u16,
    pub center: u16,
    pub step: u16,
    /// PWM period, 20 000 ticks for a 20 ms frame.
    pub carrier_period: u16,
    pub max_degrees: u16,
}

impl ServoConfig {
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.min_bound >= self.max_bound {
            return Err(ConfigError::EmptyRange);
        }
        if self.center < self.min_bound || self.center > self.max_bound {
            return Err(ConfigError::CenterOutOfRange);
        }
        if self.step == 0 || self.step > self.max_bound - self.min_bound {
            return Err(ConfigError::InvalidStep);
        }
        if self.max_bound >= self.carrier_period {
            return Err(ConfigError::ExceedsCarrier);
        }
        if self.max_degrees == 0 {
            return Err(ConfigError::NoRotation);
        }
        Ok(())
    }

    pub const fn contains(&self, ticks: u16) -> bool {
        ticks >= self.min_bound && ticks <= self.max_bound
    }

    fn span(&self) -> u32 {
        u32::from(self.max_bound - self.min_bound)
    }

    /// Pulse width for an angle. Angles past `max_degrees` are not clamped.
    pub fn degrees_to_duty_cycle(&self, degrees: u16) -> u16 {
        let offset = u32::from(degrees) * self.span() / u32::from(self.max_degrees);
        (u32::from(self.min_bound) + offset) as u16
    }

    /// Angle for a pulse width. Widths below `min_bound` read as 0°.
    pub fn duty_cycle_to_degrees(&self, ticks: u16) -> u16 {
        let offset = u32::from(ticks.saturating_sub(self.min_bound));
        (offset * u32::from(self.max_degrees) / self.span()) as u16
    }
}

pub struct ServoActuator<P> {
    pwm: P,
    config: ServoConfig,
    position: u16,
    direction: Direction,
}

impl<P: DutyCycleOutput> ServoActuator<P> {
    /// Take over the PWM output, park the servo at the center and start
    /// sweeping clockwise.
    pub fn new(pwm: P, config: ServoConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut servo = Self {
            pwm,
            config,
            position: config.center,
            direction: Direction::Clockwise,
        };
        servo.pwm.set_compare(config.center);
        Ok(servo)
    }

    pub fn config(&self) -> &ServoConfig {
        &self.config
    }

    /// Current pulse width in ticks.
    pub fn position(&self) -> u16 {
        self.position
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Current angle.
    pub fn degrees(&self) -> u16 {
        self.config.duty_cycle_to_degrees(self.position)
    }

    pub fn pwm(&self) -> &P {
        &self.pwm
    }

    /// Set the pulse width directly. Values outside the bounds change nothing.
    pub fn set_duty_cycle(&mut self, ticks: u16) -> Result<(), ServoError> {
        if !self.config.contains(ticks) {
            return Err(ServoError::DutyCycleOutOfRange(ticks));
        }
        self.position = ticks;
        self.pwm.set_compare(ticks);
        Ok(())
    }

    /// Move to an angle between 0 and `max_degrees`.
    pub fn set_degrees(&mut self, degrees: u16) -> Result<(), ServoError> {
        if degrees > self.config.max_degrees {
            return Err(ServoError::AngleOutOfRange(degrees));
        }
        self.set_duty_cycle(self.config.degrees_to_duty_cycle(degrees))
    }

    /// Park at the center and stop sweeping.
    pub fn center(&mut self) -> StepOutcome {
        self.direction = Direction::Centered;
        self.move_servo(Direction::Centered)
    }

    /// One step in `direction`. The position is rewritten to the register
    /// whether or not it changed.
    pub fn move_servo(&mut self, direction: Direction) -> StepOutcome {
        let ServoConfig {
            min_bound,
            max_bound,
            center,
            step,
            ..
        } = self.config;

        let outcome = match direction {
            Direction::Clockwise => match self.position.checked_sub(step) {
                Some(next) if next >= min_bound => StepOutcome::Moved(next),
                _ => StepOutcome::Blocked(self.position),
            },
            Direction::CounterClockwise => match self.position.checked_add(step) {
                Some(next) if next <= max_bound => StepOutcome::Moved(next),
                _ => StepOutcome::Blocked(self.position),
            },
            Direction::Centered => StepOutcome::Centered(center),
        };

        // Every outcome is inside the bounds, so the setter cannot refuse it.
        let _ = self.set_duty_cycle(outcome.position());
        outcome
    }

    /// Reverse the sweep when the servo sits on either bound. Returns true if
    /// the direction changed.
    pub fn toggle(&mut self) -> bool {
        let at_bound =
            self.position == self.config.min_bound || self.position == self.config.max_bound;
        if at_bound && self.direction != Direction::Centered {
            self.direction = self.direction.reversed();
            debug!("servo reversed at {} ticks", self.position);
            true
        } else {
            false
        }
    }

    /// Bound the current direction is heading for. Centered has none.
    fn bound_ahead(&self) -> Option<u16> {
        match self.direction {
            Direction::Clockwise => Some(self.config.min_bound),
            Direction::CounterClockwise => Some(self.config.max_bound),
            Direction::Centered => None,
        }
    }

    /// One sweep tick: turn around when sitting on the bound ahead, then
    /// step. A step that would pass the bound ends on it instead.
    pub fn sweep(&mut self) -> StepOutcome {
        if self.bound_ahead() == Some(self.position) {
            self.direction = self.direction.reversed();
            debug!("servo reversed at {} ticks", self.position);
        }

        let outcome = self.move_servo(self.direction);
        match (outcome, self.bound_ahead()) {
            (StepOutcome::Blocked(_), Some(bound)) => {
                let _ = self.set_duty_cycle(bound);
                StepOutcome::Moved(bound)
            }
            _ => outcome,
        }
    }
}
