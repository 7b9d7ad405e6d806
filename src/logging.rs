use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Where log output may go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// The terminal is owned by the UI; only a log file is allowed
    Interactive,
    /// One-shot commands may log to stderr
    Command,
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides the configured level.
pub fn init(config: &Config, target: LogTarget) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true);

    let result = match (config.log_file.as_deref(), target) {
        (Some(path), _) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        (None, LogTarget::Command) => builder.with_writer(std::io::stderr).try_init(),
        (None, LogTarget::Interactive) => return Ok(()),
    };
    result.map_err(|err| anyhow!("failed to initialise logging: {}", err))?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "project tracker starting");
    log_config(config);

    Ok(())
}

/// Log configuration (without the access token)
pub fn log_config(config: &Config) {
    tracing::info!(
        site_url = config.site_url(),
        list = %config.list_name,
        backend = ?config.backend,
        has_token = config.access_token.is_some(),
        "configuration loaded"
    );
}
