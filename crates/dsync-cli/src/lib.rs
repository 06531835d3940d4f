//! Support library for the `dsync` binary.

pub mod logging;
pub mod settings;
