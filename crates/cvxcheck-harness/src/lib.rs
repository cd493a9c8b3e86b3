mod config;
mod checks;
mod runner;
mod cli;

pub use config::{HarnessConfig, CONFIG_ENV_VAR};
pub use checks::run_checks;
pub use runner::{reported_dual, run_config, solve, Harness};
pub use cli::{init_tracing, run_main};
