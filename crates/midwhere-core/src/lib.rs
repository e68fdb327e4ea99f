pub mod config;
pub mod equity;
pub mod error;
pub mod telemetry;
