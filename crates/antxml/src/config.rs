//! Configuration for the antxml command
//!
//! Command-line flags (with environment variable fallbacks) and the checks
//! run on them before any report is read.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use encoding_rs::{Encoding, UTF_8};

/// Read Ant/JUnit XML test reports and print the parsed results
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "antxml")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Report file to parse, or directory tree to collect with --collect
    pub path: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Debug, env = "ANTXML_FORMAT")]
    pub format: OutputFormat,

    /// Character encoding of the report (WHATWG label, e.g. utf-8, windows-1252, utf-16le)
    ///
    /// Defaults to UTF-8. Reports found with --collect are always read as UTF-8.
    #[arg(long, env = "ANTXML_ENCODING")]
    pub encoding: Option<String>,

    /// Treat PATH as a directory tree and collect every report under it
    ///
    /// Reports are `.xml` files below a directory whose name contains
    /// `test`. A `build-log.txt` file is recorded as the build log.
    #[arg(long, default_value = "false")]
    pub collect: bool,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so they never mix with the report on stdout.
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

/// How parsed results are printed
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed Rust debug form
    #[default]
    Debug,
    /// Pretty-printed JSON
    Json,
}

impl Config {
    /// Resolve the input encoding label
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownEncoding` if the label is not a known
    /// WHATWG encoding label.
    pub fn encoding(&self) -> Result<&'static Encoding, ConfigError> {
        match self.encoding.as_deref() {
            None => Ok(UTF_8),
            Some(label) => Encoding::for_label_no_replacement(label.trim().as_bytes())
                .ok_or_else(|| ConfigError::UnknownEncoding(label.to_string())),
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path doesn't exist
    /// - The path is a directory without --collect, or a file with it
    /// - The encoding label is unknown
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.path.exists() {
            return Err(ConfigError::PathNotFound(self.path.clone()));
        }
        if self.collect && !self.path.is_dir() {
            return Err(ConfigError::NotADirectory(self.path.clone()));
        }
        if !self.collect && self.path.is_dir() {
            return Err(ConfigError::IsADirectory(self.path.clone()));
        }
        self.encoding()?;
        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Input path not found
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// --collect was given a file
    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A directory was given without --collect
    #[error("Path is a directory (use --collect to gather reports from it): {0}")]
    IsADirectory(PathBuf),

    /// Encoding label not recognized
    #[error("Unknown encoding label: {0:?}")]
    UnknownEncoding(String),
}
