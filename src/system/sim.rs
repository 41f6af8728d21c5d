//! Hosted board simulation
//!
//! Stands in for the timers, the UART and the PWM output so the whole
//! interrupt-level behaviour runs on a development machine. Time advances in
//! whole milliseconds; in every millisecond:
//! 1. The UART shifts the held byte onto the wire (9600 baud ≈ 1 byte/ms)
//! 2. The trigger timer fires the sensor and the echo timer latches the pulse
//! 3. The sampling and servo ticks are pended when their period elapses
//! 4. A transmit-empty interrupt is pended while enabled and the register is empty
//! 5. Pending interrupts run through the [`Nvic`] in priority order
//!
//! The sampling handler opens a preemption point right after arming the
//! transmitter, so the first frame byte goes out from a nested serial
//! interrupt exactly as it would on the target.

use crate::system::capture::{CaptureConfig, PulseCaptureSource, PulseSample};
use crate::system::config;
use crate::system::error::ConfigError;
use crate::system::interrupt::{InterruptHandlers, Irq, Nvic};
use crate::system::ranging::{RangingController, SampleOutcome};
use crate::system::report::FRAME_PREFIX;
use crate::system::ring_buffer::RingBuffer;
use crate::system::serial_tx::{SerialTransmitter, TxEvent, TxRegister};
use crate::system::servo::{DutyCycleOutput, ServoActuator, ServoConfig, StepOutcome};
use crate::system::state::EchoLatch;

/// Echo timer in slave-reset mode.
pub struct SimEchoTimer {
    config: CaptureConfig,
    latch: EchoLatch,
}

impl SimEchoTimer {
    pub const fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            latch: EchoLatch::new(),
        }
    }

    /// One trigger cycle. `Some(ticks)` is an echo of that width, `None` no
    /// echo at all. A missing or over-long echo leaves the wraparound value.
    pub fn echo(&self, width: Option<u16>) {
        let wrap = self.config.wrap_value();
        let falling = match width {
            Some(ticks) if ticks < wrap => ticks,
            _ => wrap,
        };
        self.latch.latch(PulseSample { rising: 0, falling });
    }

    /// Echoes latched so far.
    pub fn latches(&self) -> u32 {
        self.latch.latches()
    }
}

impl PulseCaptureSource for SimEchoTimer {
    fn read_sample(&self) -> PulseSample {
        self.latch.read_sample()
    }
}

/// Transmit-only UART with a single holding register, draining onto a wire
/// buffer of `W` slots.
pub struct SimUart<const W: usize> {
    holding: Option<u8>,
    wire: RingBuffer<W>,
    irq_enabled: bool,
    overruns: u32,
    dropped: u32,
}

impl<const W: usize> SimUart<W> {
    pub const fn new() -> Self {
        Self {
            holding: None,
            wire: RingBuffer::new(),
            irq_enabled: false,
            overruns: 0,
            dropped: 0,
        }
    }

    /// Move the held byte onto the wire.
    pub fn shift_out(&mut self) {
        if let Some(byte) = self.holding.take() {
            if self.wire.enqueue(byte).is_err() {
                self.dropped += 1;
            }
        }
    }

    /// The peripheral is requesting a transmit-empty interrupt.
    pub fn raises_empty(&self) -> bool {
        self.irq_enabled && self.holding.is_none()
    }

    pub fn irq_enabled(&self) -> bool {
        self.irq_enabled
    }

    /// Next byte received by whatever listens on the wire.
    pub fn read_wire(&mut self) -> Option<u8> {
        self.wire.dequeue()
    }

    /// Writes that replaced a byte not yet shifted out.
    pub fn overruns(&self) -> u32 {
        self.overruns
    }

    /// Bytes lost because nobody read the wire.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl<const W: usize> Default for SimUart<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize> TxRegister for SimUart<W> {
    fn write(&mut self, byte: u8) {
        if self.holding.replace(byte).is_some() {
            self.overruns += 1;
        }
    }

    fn enable_empty_interrupt(&mut self) {
        self.irq_enabled = true;
    }

    fn disable_empty_interrupt(&mut self) {
        self.irq_enabled = false;
    }
}

/// PWM compare register.
#[derive(Debug, Default)]
pub struct SimPwm {
    compare: u16,
    writes: u32,
}

impl SimPwm {
    pub fn compare(&self) -> u16 {
        self.compare
    }

    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl DutyCycleOutput for SimPwm {
    fn set_compare(&mut self, ticks: u16) {
        self.compare = ticks;
        self.writes += 1;
    }
}

/// Periods of the simulated timers, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimTiming {
    pub sample_ms: u64,
    pub servo_ms: u64,
    pub trigger_ms: u64,
}

impl SimTiming {
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_ms == 0 || self.servo_ms == 0 || self.trigger_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }
}

impl Default for SimTiming {
    fn default() -> Self {
        Self {
            sample_ms: config::SAMPLE_PERIOD.as_millis() as u64,
            servo_ms: config::SERVO_STEP_INTERVAL.as_millis() as u64,
            trigger_ms: 100,
        }
    }
}

/// Everything the interrupt handlers touch.
pub struct SimPeripherals<const W: usize> {
    pub echo: SimEchoTimer,
    pub uart: SimUart<W>,
    pub transmitter: SerialTransmitter,
    pub ranging: RangingController,
    pub servo: ServoActuator<SimPwm>,
    last_outcome: Option<SampleOutcome>,
    last_step: Option<StepOutcome>,
    spurious: u32,
}

impl<const W: usize> InterruptHandlers for SimPeripherals<W> {
    fn on_interrupt(&mut self, irq: Irq, nvic: &mut Nvic) {
        match irq {
            Irq::SampleTick => {
                let outcome = self
                    .ranging
                    .on_tick(&self.echo, &mut self.transmitter, &mut self.uart);
                outcome.log();
                self.last_outcome = Some(outcome);
                if self.uart.raises_empty() {
                    nvic.pend(Irq::SerialTxEmpty);
                }
                nvic.service(self);
            }
            Irq::SerialTxEmpty => {
                if self.transmitter.on_tx_empty(&mut self.uart) == TxEvent::Spurious {
                    self.spurious += 1;
                }
            }
            Irq::ServoTick => {
                self.last_step = Some(self.servo.sweep());
            }
        }
    }
}

/// The whole board: controller, peripherals and a millisecond clock.
pub struct SimBoard<const W: usize = 256> {
    pub nvic: Nvic,
    pub peripherals: SimPeripherals<W>,
    timing: SimTiming,
    echo_width: Option<u16>,
    now_ms: u64,
}

impl<const W: usize> SimBoard<W> {
    /// Board with the shipped configuration.
    pub fn new() -> Self {
        match Self::with_config(SimTiming::default(), config::CAPTURE, config::SERVO) {
            Ok(board) => board,
            Err(_) => unreachable!("shipped configuration is valid"),
        }
    }

    pub fn with_config(
        timing: SimTiming,
        capture: CaptureConfig,
        servo: ServoConfig,
    ) -> Result<Self, ConfigError> {
        timing.validate()?;
        capture.validate()?;
        let mut nvic = Nvic::new();
        for irq in Irq::ALL {
            nvic.enable(irq);
        }
        Ok(Self {
            nvic,
            peripherals: SimPeripherals {
                echo: SimEchoTimer::new(capture),
                uart: SimUart::new(),
                transmitter: SerialTransmitter::new(FRAME_PREFIX),
                ranging: RangingController::new(capture),
                servo: ServoActuator::new(SimPwm::default(), servo)?,
                last_outcome: None,
                last_step: None,
                spurious: 0,
            },
            timing,
            echo_width: None,
            now_ms: 0,
        })
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Width of the echo returned to every following trigger, `None` for no echo.
    pub fn set_echo(&mut self, width: Option<u16>) {
        self.echo_width = width;
    }

    pub fn last_outcome(&self) -> Option<SampleOutcome> {
        self.peripherals.last_outcome
    }

    pub fn last_step(&self) -> Option<StepOutcome> {
        self.peripherals.last_step
    }

    /// Transmit-empty interrupts that found the transmitter idle.
    pub fn spurious_interrupts(&self) -> u32 {
        self.peripherals.spurious
    }

    /// Advance one millisecond.
    pub fn step_ms(&mut self) {
        self.now_ms += 1;
        let now = self.now_ms;
        let p = &mut self.peripherals;

        p.uart.shift_out();
        if now % self.timing.trigger_ms == 0 {
            p.echo.echo(self.echo_width);
        }
        if now % self.timing.sample_ms == 0 {
            self.nvic.pend(Irq::SampleTick);
        }
        if now % self.timing.servo_ms == 0 {
            self.nvic.pend(Irq::ServoTick);
        }
        if p.uart.raises_empty() {
            self.nvic.pend(Irq::SerialTxEmpty);
        }
        self.nvic.service(p);
    }

    pub fn run_for_ms(&mut self, ms: u64) {
        for _ in 0..ms {
            self.step_ms();
        }
    }

    /// Copy bytes received on the wire into `buf`. Returns how many were copied.
    pub fn read_wire(&mut self, buf: &mut [u8]) -> usize {
        let mut n = 0;
        for slot in buf.iter_mut() {
            match self.peripherals.uart.read_wire() {
                Some(byte) => {
                    *slot = byte;
                    n += 1;
                }
                None => break,
            }
        }
        n
    }
}

impl<const W: usize> Default for SimBoard<W> {
    fn default() -> Self {
        Self::new()
    }
}
