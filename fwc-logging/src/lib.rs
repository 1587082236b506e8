//! Tracing subscriber setup for FWC services

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use fwc_config::{LogFormat, LoggingConfig};

/// Filter from the configured level, else `RUST_LOG`, else `info`
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    config
        .level
        .map(|level| EnvFilter::new(level.as_str()))
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Install the global subscriber
///
/// Calling this again after a subscriber is installed leaves the first one
/// in place.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
    };

    if tracing_subscriber::registry()
        .with(env_filter(config))
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwc_config::LogLevel;

    #[test]
    fn test_configured_level_wins() {
        let config = LoggingConfig {
            level: Some(LogLevel::Debug),
            ..Default::default()
        };
        assert_eq!(env_filter(&config).to_string(), "debug");
    }

    #[test]
    fn test_init_twice_is_tolerated() {
        let config = LoggingConfig {
            format: LogFormat::Json,
            ..Default::default()
        };
        init_tracing(&config).unwrap();
        init_tracing(&LoggingConfig::default()).unwrap();
    }
}
