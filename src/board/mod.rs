//! Board bring-up: pin assignment and interrupt bindings
pub mod resources;
