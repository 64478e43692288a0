//! # Orb Telemetry
//!
//! Logging and metrics bootstrap shared by the Orb crates.
//!
//! ## Components
//!
//! - **Logs**: `tracing-subscriber` with an `EnvFilter`, human-readable or
//!   JSON lines for log shippers.
//! - **Metrics**: Prometheus counters and histograms for lifecycle calls,
//!   registered in a process-wide registry and rendered with
//!   [`encode_metrics`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use orb_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `ORB_SERVICE_NAME` | `orb` | Service name attached to logs |
//! | `ORB_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `ORB_JSON_LOGS` | `false` | Emit JSON lines |
//! | `ORB_CONSOLE_OUTPUT` | `true` | Write logs to stderr at all |

#![warn(missing_docs)]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, MetricsHandle, LIFECYCLE_CALLS,
    LIFECYCLE_DURATION, LIFECYCLE_REJECTIONS, UNITS_BURNED, UNITS_MINTED, WITHDRAWALS,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// A metric could not be registered or encoded.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// The configuration could not be turned into a filter.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    init_logging(&config)?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard { _metrics: metrics })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::debug!("Shutting down telemetry");
    }
}
