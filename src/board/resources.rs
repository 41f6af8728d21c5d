//! Hardware Resource Management
//!
//! Assigns the RP2350 pins and peripherals to the tasks that own them.
//!
//! # Resource Groups
//! - Ranging: trigger PWM slice, echo capture PWM slice, status LED
//! - Serial: UART0 transmit pin
//! - Servo: PWM slice driving the sweep servo
//!
//! # Pin Map
//! ```text
//! GPIO0  UART0 TX        ──▶ USB-UART RX (9600 8N1)
//! GPIO2  PWM1 A trigger  ──▶ HC-SR04 TRIG
//! GPIO5  PWM2 B echo     ◀── HC-SR04 ECHO (level shifted)
//! GPIO6  PWM3 A servo    ──▶ servo signal
//! GPIO25 status LED
//! ```

use assign_resources::assign_resources;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals;

use crate::task::serial::SerialTxInterruptHandler;

assign_resources! {
    /// HC-SR04 trigger and echo capture
    ranging: RangingResources {
        trigger_slice: PWM_SLICE1,
        trigger_pin: PIN_2,
        echo_slice: PWM_SLICE2,
        echo_pin: PIN_5,
        led_pin: PIN_25,
    },
    /// Transmit-only serial link
    serial: SerialResources {
        uart: UART0,
        tx_pin: PIN_0,
    },
    /// Sweep servo
    servo: ServoResources {
        slice: PWM_SLICE3,
        pin: PIN_6,
    },
}

bind_interrupts!(pub struct Irqs {
    UART0_IRQ => SerialTxInterruptHandler;
});
