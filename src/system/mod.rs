//! Core components of the sonar sweep
pub mod capture;
pub mod config;
pub mod error;
pub mod interrupt;
pub mod ranging;
pub mod report;
pub mod ring_buffer;
pub mod serial_tx;
pub mod servo;
pub mod sim;
pub mod state;
