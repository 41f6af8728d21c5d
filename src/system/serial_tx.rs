//! Interrupt-driven frame transmitter
//!
//! Sends one report frame a byte at a time from the "transmit register empty"
//! interrupt. Each interrupt puts exactly one byte in the output register;
//! the interrupt is enabled by [`SerialTransmitter::arm`] and disabled again
//! once the terminator is out, so no empty-register interrupt can fire
//! between frames.
//!
//! ```text
//!          arm()
//!   Idle ─────────▶ SendPrefixByte(0) ─▶ … ─▶ SendPrefixByte(n-1)
//!    ▲                                              │
//!    │ '\r', irq off                                ▼
//!   SendTerminator ◀──────────────────────── SendDistanceDigit
//! ```
//!
//! The distance is latched at `arm` time and may be overwritten while the
//! frame is in flight; whatever value is held when the digit state is reached
//! is the one sent.

use crate::system::error::TransmitError;
use crate::system::report::{DistanceDigit, FRAME_TERMINATOR};

/// Output side of a UART as seen from the transmit interrupt.
pub trait TxRegister {
    /// Place a byte in the transmit data register.
    fn write(&mut self, byte: u8);
    /// Let the peripheral raise its empty-register interrupt.
    fn enable_empty_interrupt(&mut self);
    /// Stop the empty-register interrupt.
    fn disable_empty_interrupt(&mut self);
}

impl<T: TxRegister + ?Sized> TxRegister for &mut T {
    fn write(&mut self, byte: u8) {
        (**self).write(byte)
    }

    fn enable_empty_interrupt(&mut self) {
        (**self).enable_empty_interrupt()
    }

    fn disable_empty_interrupt(&mut self) {
        (**self).disable_empty_interrupt()
    }
}

/// Position within the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxState {
    Idle,
    /// Next byte is the prefix byte at this index.
    SendPrefixByte(usize),
    SendDistanceDigit,
    SendTerminator,
}

/// What one interrupt invocation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxEvent {
    /// A prefix byte went out.
    Prefix(u8),
    /// The distance byte went out.
    Digit(DistanceDigit),
    /// The carriage return went out and the transmitter is idle again.
    FrameComplete,
    /// Interrupt while idle; nothing was written.
    Spurious,
}

pub struct SerialTransmitter {
    prefix: &'static [u8],
    state: TxState,
    distance: u16,
    frames_sent: u32,
}

impl SerialTransmitter {
    pub const fn new(prefix: &'static [u8]) -> Self {
        Self {
            prefix,
            state: TxState::Idle,
            distance: 0,
            frames_sent: 0,
        }
    }

    pub fn state(&self) -> TxState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == TxState::Idle
    }

    /// Distance that the current or next frame carries.
    pub fn distance(&self) -> u16 {
        self.distance
    }

    pub fn prefix(&self) -> &'static [u8] {
        self.prefix
    }

    /// Frames completed since start-up.
    pub fn frames_sent(&self) -> u32 {
        self.frames_sent
    }

    /// Start a frame for `distance` and enable the empty-register interrupt.
    ///
    /// Only allowed while idle; a frame in flight is left alone.
    pub fn arm<R: TxRegister>(&mut self, distance: u16, reg: &mut R) -> Result<(), TransmitError> {
        if !self.is_idle() {
            return Err(TransmitError::FrameInProgress);
        }
        self.distance = distance;
        self.state = if self.prefix.is_empty() {
            TxState::SendDistanceDigit
        } else {
            TxState::SendPrefixByte(0)
        };
        reg.enable_empty_interrupt();
        Ok(())
    }

    /// Replace the distance held for the frame. Returns true if a frame was in
    /// flight, i.e. an outstanding report got overwritten.
    pub fn load_distance(&mut self, distance: u16) -> bool {
        self.distance = distance;
        !self.is_idle()
    }

    /// Body of the transmit-register-empty interrupt.
    pub fn on_tx_empty<R: TxRegister>(&mut self, reg: &mut R) -> TxEvent {
        match self.state {
            TxState::Idle => {
                reg.disable_empty_interrupt();
                TxEvent::Spurious
            }
            TxState::SendPrefixByte(i) => {
                let byte = self.prefix[i];
                reg.write(byte);
                self.state = if i + 1 == self.prefix.len() {
                    TxState::SendDistanceDigit
                } else {
                    TxState::SendPrefixByte(i + 1)
                };
                TxEvent::Prefix(byte)
            }
            TxState::SendDistanceDigit => {
                let digit = DistanceDigit::encode(self.distance);
                reg.write(digit.byte());
                self.state = TxState::SendTerminator;
                TxEvent::Digit(digit)
            }
            TxState::SendTerminator => {
                reg.write(FRAME_TERMINATOR);
                self.state = TxState::Idle;
                reg.disable_empty_interrupt();
                self.frames_sent = self.frames_sent.wrapping_add(1);
                TxEvent::FrameComplete
            }
        }
    }
}
