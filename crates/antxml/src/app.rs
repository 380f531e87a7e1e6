// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Command execution

use crate::config::Config;
use crate::report;
use anyhow::{Context, Result};
use antxml_collector::DirectoryCollector;
use antxml_parser::AntXmlParser;
use encoding_rs::UTF_8;
use std::fs::File;
use std::io::Write;
use tracing::{debug, info, warn};

/// Run the command described by `config`, writing results to `out`
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the input cannot be
/// read or parsed, or the output cannot be written.
pub fn run<W: Write>(config: &Config, out: &mut W) -> Result<()> {
    config.validate()?;

    if config.collect {
        collect(config, out)
    } else {
        parse_file(config, out)
    }
}

fn parse_file<W: Write>(config: &Config, out: &mut W) -> Result<()> {
    let encoding = config.encoding()?;
    debug!(path = %config.path.display(), encoding = encoding.name(), "Parsing report");

    let file = File::open(&config.path)
        .with_context(|| format!("Failed to open {}", config.path.display()))?;
    let suites = AntXmlParser::new()
        .parse(file, encoding)
        .with_context(|| format!("Failed to parse {}", config.path.display()))?;

    info!(suites = suites.len(), "Parsed report");
    report::write_suites(out, &suites, config.format).context("Failed to write results")?;
    Ok(())
}

fn collect<W: Write>(config: &Config, out: &mut W) -> Result<()> {
    if config.encoding()? != UTF_8 {
        warn!("Ignoring --encoding: collected reports are always read as UTF-8");
    }

    let results = DirectoryCollector::new().collect(&config.path).with_context(|| {
        format!(
            "Failed to collect test results under {}",
            config.path.display()
        )
    })?;

    report::write_results(out, &results, config.format).context("Failed to write results")?;
    Ok(())
}
