pub mod ranging;
pub mod serial;
pub mod servo_sweep;
