//! Structured logging.
//!
//! Log lines always go to stderr so that tools printing machine-readable
//! output on stdout stay parseable.

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global `tracing` subscriber described by `config`.
///
/// Fails with [`TelemetryError::LoggingInit`] if a global subscriber is
/// already installed.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    if !config.console_output {
        return Ok(());
    }

    let env_filter =
        EnvFilter::try_new(&config.log_level).map_err(|e| TelemetryError::Config(e.to_string()))?;

    if config.json_logs {
        let json_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
    } else {
        let fmt_layer = fmt::layer().with_target(true).with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
    }
}

/// Log a token lifecycle event with standard fields.
///
/// ```rust,ignore
/// log_token_event!(info, "mint", id, "Units minted", amount = 3);
/// ```
#[macro_export]
macro_rules! log_token_event {
    ($level:ident, $operation:expr, $token_id:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            operation = $operation,
            token_id = %$token_id,
            $($($field)*,)?
            $msg
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_output_is_noop() {
        let config = TelemetryConfig {
            console_output: false,
            ..TelemetryConfig::default()
        };
        assert!(init_logging(&config).is_ok());
    }

    #[test]
    fn test_rejects_bad_filter() {
        let config = TelemetryConfig::default().with_log_level("info,[");
        assert!(matches!(
            init_logging(&config),
            Err(TelemetryError::Config(_))
        ));
    }
}
