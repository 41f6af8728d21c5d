//! Priority-ordered interrupt dispatch
//!
//! A small model of a nested vectored interrupt controller: a fixed set of
//! named sources, each with a static priority, a pending flag and an enable
//! flag. [`Nvic::service`] runs pending sources most urgent first. A handler
//! may call `service` again at any point to let more urgent sources preempt
//! it; sources at the same or a lower priority wait until it returns.
//!
//! This is the discipline the components rely on: the serial interrupt can cut
//! into the sampling tick, the sampling tick never cuts into the serial
//! interrupt, so the serial handler always runs to completion before the
//! sampling handler resumes.

/// Interrupt priority. Lower numbers are more urgent, as on Cortex-M.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Priority(pub u8);

impl Priority {
    /// True if an interrupt at `self` may preempt a handler running at `running`.
    pub const fn preempts(self, running: Priority) -> bool {
        self.0 < running.0
    }
}

/// Interrupt sources of the board, most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Irq {
    /// Serial transmit data register empty.
    SerialTxEmpty,
    /// Periodic ranging sample.
    SampleTick,
    /// Servo sweep cadence.
    ServoTick,
}

impl Irq {
    /// All sources in priority order.
    pub const ALL: [Irq; 3] = [Irq::SerialTxEmpty, Irq::SampleTick, Irq::ServoTick];

    pub const fn priority(self) -> Priority {
        match self {
            Irq::SerialTxEmpty => Priority(1),
            Irq::SampleTick => Priority(2),
            Irq::ServoTick => Priority(3),
        }
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Handler table.
pub trait InterruptHandlers {
    /// Called with the controller so the handler can pend sources, mask them
    /// or open a preemption point with [`Nvic::service`].
    fn on_interrupt(&mut self, irq: Irq, nvic: &mut Nvic);
}

#[derive(Debug, Default)]
pub struct Nvic {
    pending: u8,
    enabled: u8,
    running: Option<Priority>,
    depth: u8,
    max_depth: u8,
    dispatched: u32,
}

impl Nvic {
    pub const fn new() -> Self {
        Self {
            pending: 0,
            enabled: 0,
            running: None,
            depth: 0,
            max_depth: 0,
            dispatched: 0,
        }
    }

    pub fn pend(&mut self, irq: Irq) {
        self.pending |= irq.bit();
    }

    pub fn unpend(&mut self, irq: Irq) {
        self.pending &= !irq.bit();
    }

    pub fn is_pending(&self, irq: Irq) -> bool {
        self.pending & irq.bit() != 0
    }

    pub fn enable(&mut self, irq: Irq) {
        self.enabled |= irq.bit();
    }

    pub fn disable(&mut self, irq: Irq) {
        self.enabled &= !irq.bit();
    }

    pub fn is_enabled(&self, irq: Irq) -> bool {
        self.enabled & irq.bit() != 0
    }

    /// Priority of the innermost handler currently running.
    pub fn running_priority(&self) -> Option<Priority> {
        self.running
    }

    /// Deepest handler nesting seen so far.
    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    /// Handlers run since start-up.
    pub fn dispatched(&self) -> u32 {
        self.dispatched
    }

    fn next_runnable(&self) -> Option<Irq> {
        Irq::ALL.into_iter().find(|&irq| {
            self.is_pending(irq)
                && self.is_enabled(irq)
                && self
                    .running
                    .map_or(true, |running| irq.priority().preempts(running))
        })
    }

    /// Run every pending source that may preempt the current level, most
    /// urgent first. Returns how many handlers ran at this level.
    pub fn service<H: InterruptHandlers + ?Sized>(&mut self, handlers: &mut H) -> u32 {
        let mut count = 0;
        while let Some(irq) = self.next_runnable() {
            // Pending clears on entry; a source pended again by its own
            // handler runs once more afterwards.
            self.unpend(irq);
            let preempted = self.running.replace(irq.priority());
            self.depth += 1;
            self.max_depth = self.max_depth.max(self.depth);

            handlers.on_interrupt(irq, self);

            self.depth -= 1;
            self.running = preempted;
            self.dispatched = self.dispatched.wrapping_add(1);
            count += 1;
        }
        count
    }
}
