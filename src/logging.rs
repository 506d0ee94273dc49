//! Global tracing subscriber for the command-line tool.

use tracing_subscriber::EnvFilter;

use crate::errors::{PipelineError, Result};

const DEFAULT_FILTER: &str = "info";

/// Install a stdout fmt subscriber filtered by `RUST_LOG`, falling back to `info`.
pub fn init() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| PipelineError::Logging(err.to_string()))
}
