//! Periodic ranging
//!
//! Runs once per sampling period from the sampling tick:
//! 1. Read the latched echo width from the capture timer
//! 2. Keep it as the current distance (in capture ticks)
//! 3. Hand it to the serial transmitter
//!
//! [`RangingController::on_tick`] does not log, so it can run with the
//! transmitter locked; callers log the returned [`SampleOutcome`] afterwards.
//!
//! Only one report is ever outstanding. If the previous frame is still being
//! sent, the new distance overwrites the one it carries instead of queueing a
//! second frame.
//!
//! The sampling tick runs below the serial interrupt, so the transmitter may
//! preempt this handler but never the other way round. On targets without
//! that ordering the transmitter must be reached through
//! [`SharedTransmitter`](crate::system::state::SharedTransmitter).

use crate::system::capture::{CaptureConfig, PulseCaptureSource, PulseSample};
use crate::system::report::{DistanceDigit, DistanceReport};
use crate::system::serial_tx::{SerialTransmitter, TxRegister};

/// How a report reached the transmitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dispatch {
    /// The transmitter was idle and a new frame was started.
    Armed,
    /// A frame was in flight; its distance was replaced.
    Overwrote,
}

/// Everything one sampling tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SampleOutcome {
    pub report: DistanceReport,
    /// Raw capture registers the report came from.
    pub sample: PulseSample,
    pub digit: DistanceDigit,
    pub dispatch: Dispatch,
    /// The capture held the wraparound value of a missing echo. The value is
    /// reported regardless.
    pub timed_out: bool,
}

impl SampleOutcome {
    /// Log the tick: both capture registers, then anything unusual.
    pub fn log(&self) {
        info!("SR04: {} {}", self.sample.rising, self.sample.falling);
        if self.timed_out {
            warn!("no echo, capture wrapped at {} ticks", self.sample.falling);
        }
        if self.dispatch == Dispatch::Overwrote {
            debug!("frame in flight, distance replaced");
        }
        if !self.digit.is_decimal() {
            warn!("distance {} does not fit one digit", self.report.distance);
        }
    }
}

pub struct RangingController {
    capture: CaptureConfig,
    last_report: Option<DistanceReport>,
    samples_taken: u32,
    overwrites: u32,
}

impl RangingController {
    pub const fn new(capture: CaptureConfig) -> Self {
        Self {
            capture,
            last_report: None,
            samples_taken: 0,
            overwrites: 0,
        }
    }

    pub fn last_report(&self) -> Option<DistanceReport> {
        self.last_report
    }

    pub fn samples_taken(&self) -> u32 {
        self.samples_taken
    }

    /// Reports that replaced one still in flight.
    pub fn overwrites(&self) -> u32 {
        self.overwrites
    }

    /// Body of the sampling tick.
    pub fn on_tick<C, R>(
        &mut self,
        capture: &C,
        transmitter: &mut SerialTransmitter,
        reg: &mut R,
    ) -> SampleOutcome
    where
        C: PulseCaptureSource + ?Sized,
        R: TxRegister,
    {
        let sample = capture.read_sample();
        let width = sample.width();
        let report = DistanceReport::new(width.ticks());
        let timed_out = self.capture.is_timeout(width);

        self.last_report = Some(report);
        self.samples_taken = self.samples_taken.wrapping_add(1);

        let dispatch = match transmitter.arm(report.distance, reg) {
            Ok(()) => Dispatch::Armed,
            Err(_) => {
                transmitter.load_distance(report.distance);
                self.overwrites = self.overwrites.wrapping_add(1);
                Dispatch::Overwrote
            }
        };

        SampleOutcome {
            report,
            sample,
            digit: report.digit(),
            dispatch,
            timed_out,
        }
    }
}
