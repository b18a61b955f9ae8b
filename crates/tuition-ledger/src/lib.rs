pub mod config;
pub mod error;
pub mod finance;
pub mod telemetry;
