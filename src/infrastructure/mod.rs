pub mod config;
pub mod data;
pub mod mail;
pub mod telemetry;
