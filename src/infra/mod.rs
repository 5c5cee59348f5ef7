pub mod error;
pub mod files;
pub mod memory;
pub mod plugins;
pub mod telemetry;
