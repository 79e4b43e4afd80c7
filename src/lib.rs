pub mod board;
pub mod config;
pub mod error;
pub mod paginator;
pub mod telemetry;
