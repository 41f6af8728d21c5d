//! Sonar sweep firmware entry point
//!
//! Measures distance with an HC-SR04, reports it over UART0 once per second and
//! sweeps a servo back and forth.
//!
//! # Priorities
//! ```text
//! UART0_IRQ   P1  frame byte out, one per interrupt
//! SWI_IRQ_1   P2  interrupt executor: echo latch, 1 Hz sampling
//! thread          servo sweep
//! ```
//! The serial interrupt preempts sampling, never the other way round.

#![no_std]
#![no_main]

use crate::task::{
    ranging::{echo_capture, sample},
    servo_sweep::servo_sweep,
};
use board::resources::{self, AssignedResources, RangingResources, SerialResources, ServoResources};
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

/// Pin assignment and interrupt bindings
mod board;
/// Task and interrupt handler implementations
mod task;

/// Executor for the time-critical ranging tasks, below the serial interrupt.
static EXECUTOR_RANGING: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_RANGING.on_interrupt()
}

/// Firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());

    // Split the resources into separate groups for each task.
    let r = split_resources!(p);

    // The serial interrupt must be live before the first sample arms it.
    let _uart = task::serial::init(r.serial, resources::Irqs);

    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let ranging_spawner = EXECUTOR_RANGING.start(interrupt::SWI_IRQ_1);
    ranging_spawner.spawn(echo_capture(r.ranging)).unwrap();
    ranging_spawner.spawn(sample()).unwrap();

    spawner.spawn(servo_sweep(r.servo)).unwrap();
}
