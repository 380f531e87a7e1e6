//! antxml library
//!
//! Configuration, command execution and output rendering for the `antxml`
//! binary, exported for use in integration tests.

pub mod app;
pub mod config;
pub mod report;

pub use app::run;
pub use config::{Config, ConfigError, OutputFormat};
