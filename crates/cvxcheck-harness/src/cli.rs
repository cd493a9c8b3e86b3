use anyhow::{ensure, Context};
use tracing_subscriber::EnvFilter;

use crate::config::HarnessConfig;
use crate::runner::run_config;

/// Log to stderr, filtered by `RUST_LOG` (default `info`)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point shared by the binaries: one run, report on stdout.
///
/// Exits with an error when any verification check fails.
pub fn run_main(default: HarnessConfig) -> anyhow::Result<()> {
    init_tracing();

    let config = HarnessConfig::from_env_or(default).context("loading configuration")?;
    let report = run_config(&config, std::io::stdout().lock())
        .with_context(|| format!("running {}", config.problem.name()))?;

    let failed: Vec<&str> = report.failed_checks().map(|c| c.name.as_str()).collect();
    ensure!(failed.is_empty(), "failed checks: {}", failed.join(", "));
    Ok(())
}
