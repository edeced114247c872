//! Logging setup.
//!
//! Everything in this crate logs through `tracing`. This module installs a
//! `tracing-subscriber` formatter configured from a [`LoggingConfig`]:
//!
//! ```rust,ignore
//! let config = ConfigLoader::new().load()?;
//! autoroute::logging::init(&config.logging)?;
//! ```
//!
//! `RUST_LOG`, when set, replaces the configured base level. Per-target
//! filters are added on top either way.

use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt};

/// Install a global subscriber for `config`.
///
/// Fails if a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<(), TryInitError> {
    let filter = build_filter(config);
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
        LogFormat::Full => registry.with(fmt::layer()).try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
    }
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    let mut filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    for directive in directives(config) {
        if let Ok(d) = directive.parse() {
            filter = filter.add_directive(d);
        }
    }
    filter
}

fn directives(config: &LoggingConfig) -> Vec<String> {
    config
        .filters
        .iter()
        .map(|(target, level)| format!("{target}={level}"))
        .collect()
}
