pub mod admissions;
pub mod config;
pub mod error;
pub mod telemetry;
