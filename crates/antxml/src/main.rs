//! antxml: print the contents of Ant/JUnit XML test reports
//!
//! Parses a single report, or with `--collect` every report under a
//! directory tree, and prints the results to stdout.

use antxml::Config;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr; stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(config.log_level().into()))
        .with_writer(std::io::stderr)
        .init();

    let stdout = std::io::stdout();
    antxml::run(&config, &mut stdout.lock())
}
