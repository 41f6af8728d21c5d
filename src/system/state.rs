//! State shared between interrupt priorities
//!
//! Each component owns its own state; only two things are touched from more
//! than one execution context:
//! - The serial transmitter: armed from the sampling tick, drained from the
//!   serial interrupt
//! - The latched echo capture: written by whatever latches the echo, read by
//!   the sampling tick
//!
//! The transmitter sits behind a critical-section mutex so neither side can
//! observe it half updated, regardless of how the interrupt priorities are
//! configured. The echo latch is written and read as a pair inside a critical
//! section for the same reason.
//!
//! # Access Pattern
//! ```rust,ignore
//! static TRANSMITTER: SharedTransmitter = SharedTransmitter::new(FRAME_PREFIX);
//! TRANSMITTER.with(|tx| tx.on_tx_empty(&mut uart));
//! ```

use core::cell::{Cell, RefCell};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::system::capture::{PulseCaptureSource, PulseSample};
use crate::system::serial_tx::SerialTransmitter;

/// A [`SerialTransmitter`] that can live in a `static` and be reached from
/// several interrupt handlers.
pub struct SharedTransmitter {
    inner: Mutex<CriticalSectionRawMutex, RefCell<SerialTransmitter>>,
}

impl SharedTransmitter {
    pub const fn new(prefix: &'static [u8]) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(SerialTransmitter::new(prefix))),
        }
    }

    /// Run `f` with exclusive access to the transmitter. Interrupts are masked
    /// for the duration, so keep `f` short.
    pub fn with<T>(&self, f: impl FnOnce(&mut SerialTransmitter) -> T) -> T {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}

/// Last echo capture, latched as one unit.
pub struct EchoLatch {
    inner: Mutex<CriticalSectionRawMutex, Cell<PulseSample>>,
    latches: Mutex<CriticalSectionRawMutex, Cell<u32>>,
}

impl EchoLatch {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Cell::new(PulseSample {
                rising: 0,
                falling: 0,
            })),
            latches: Mutex::new(Cell::new(0)),
        }
    }

    /// Overwrite the latched capture with a new pulse.
    pub fn latch(&self, sample: PulseSample) {
        critical_section::with(|cs| {
            self.inner.borrow(cs).set(sample);
            let count = self.latches.borrow(cs);
            count.set(count.get().wrapping_add(1));
        });
    }

    /// Number of pulses latched since start-up.
    pub fn latches(&self) -> u32 {
        self.latches.lock(Cell::get)
    }
}

impl Default for EchoLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseCaptureSource for EchoLatch {
    fn read_sample(&self) -> PulseSample {
        self.inner.lock(Cell::get)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::capture::PulseWidth;
    use crate::system::report::FRAME_PREFIX;
    use crate::system::serial_tx::TxState;

    struct NullRegister;

    impl crate::system::serial_tx::TxRegister for NullRegister {
        fn write(&mut self, _byte: u8) {}
        fn enable_empty_interrupt(&mut self) {}
        fn disable_empty_interrupt(&mut self) {}
    }

    #[test]
    fn shared_transmitter_in_a_static() {
        static TX: SharedTransmitter = SharedTransmitter::new(FRAME_PREFIX);
        TX.with(|tx| tx.arm(2, &mut NullRegister)).unwrap();
        assert_eq!(TX.with(|tx| tx.state()), TxState::SendPrefixByte(0));
    }

    #[test]
    fn latch_keeps_only_the_last_pulse() {
        let latch = EchoLatch::new();
        latch.latch(PulseSample {
            rising: 0,
            falling: 4,
        });
        latch.latch(PulseSample {
            rising: 0,
            falling: 6,
        });
        assert_eq!(latch.read_pulse_width(), PulseWidth(6));
        assert_eq!(latch.latches(), 2);
    }
}
