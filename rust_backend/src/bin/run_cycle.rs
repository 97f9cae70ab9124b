//! Handover Cycle Runner
//!
//! Runs the handover pipeline over cycle inputs read from a JSON file and
//! prints one report per cycle as JSON.
//!
//! # Usage
//!
//! ```bash
//! run-cycle <input.json> [handover.toml]
//! ```
//!
//! Without a configuration argument, `handover.toml` is searched in the
//! standard locations and built-in defaults are used when none exists. A
//! file that exists but is invalid stops the run before any cycle.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log filter (default: info)

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ntn_handover::config::HandoverConfig;
use ntn_handover::io::read_cycles;
use ntn_handover::pipeline::HandoverPipeline;

fn load_config(path: Option<PathBuf>) -> Result<HandoverConfig> {
    match path {
        Some(path) => HandoverConfig::from_file(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => match HandoverConfig::from_default_location()
            .context("Failed to load handover.toml")?
        {
            Some(config) => Ok(config),
            None => {
                warn!("No handover.toml found; using built-in defaults");
                Ok(HandoverConfig::default())
            }
        },
    }
}

fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let input_path = PathBuf::from(
        args.next()
            .context("Usage: run-cycle <input.json> [handover.toml]")?,
    );
    let config = load_config(args.next().map(PathBuf::from))?;

    let cycles = read_cycles(&input_path)
        .with_context(|| format!("Failed to read cycles from {}", input_path.display()))?;

    let mut pipeline =
        HandoverPipeline::new(&config).context("Failed to build handover pipeline")?;

    let mut failed = 0usize;
    for (index, result) in pipeline.run_cycles(&cycles).into_iter().enumerate() {
        match result {
            Ok(report) => {
                let json = serde_json::to_string_pretty(&report)
                    .context("Failed to serialize cycle report")?;
                println!("{}", json);
            }
            Err(e) => {
                failed += 1;
                warn!("Cycle {} produced no decision: {}", index, e);
            }
        }
    }

    info!(
        "Processed {} cycle(s), {} without decision",
        cycles.len(),
        failed
    );

    Ok(())
}
