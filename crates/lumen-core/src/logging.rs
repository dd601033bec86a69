//! Tracing subscriber setup shared by the binaries
//!
//! Author: hephaex@gmail.com

use crate::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber, writing to stderr
///
/// `RUST_LOG` takes precedence over `default_directives`; the configured
/// level is appended as the fallback for every other target.
pub fn init_tracing(config: &LoggingConfig, default_directives: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives = if default_directives.is_empty() {
            config.level.clone()
        } else {
            format!("{},{}", config.level, default_directives)
        };
        EnvFilter::new(directives)
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    let result = if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))
}
