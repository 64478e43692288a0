//! Prometheus metrics for the Orb lifecycle engine.
//!
//! All metrics follow the naming convention: `orb_<metric>_<unit>`
//!
//! Counters are usable before registration; registration only makes them
//! visible to [`encode_metrics`].

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts,
    Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Lifecycle calls attempted, by operation (load, mint, fork, ...)
    pub static ref LIFECYCLE_CALLS: IntCounterVec = IntCounterVec::new(
        Opts::new("orb_lifecycle_calls_total", "Total lifecycle calls attempted"),
        &["operation"]
    ).expect("metric creation failed");

    /// Lifecycle calls rejected, by operation and error kind
    pub static ref LIFECYCLE_REJECTIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("orb_lifecycle_rejections_total", "Total lifecycle calls rejected"),
        &["operation", "kind"]
    ).expect("metric creation failed");

    /// Wall time per lifecycle call
    pub static ref LIFECYCLE_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "orb_lifecycle_duration_seconds",
            "Time spent executing lifecycle calls"
        ).buckets(exponential_buckets(0.000_001, 4.0, 10).expect("valid buckets")),
        &["operation"]
    ).expect("metric creation failed");

    /// Units minted across all tokens
    pub static ref UNITS_MINTED: IntCounter = IntCounter::new(
        "orb_units_minted_total",
        "Total token units minted"
    ).expect("metric creation failed");

    /// Units burned across all tokens
    pub static ref UNITS_BURNED: IntCounter = IntCounter::new(
        "orb_units_burned_total",
        "Total token units burned"
    ).expect("metric creation failed");

    /// Non-empty vault withdrawals paid out
    pub static ref WITHDRAWALS: IntCounter = IntCounter::new(
        "orb_withdrawals_total",
        "Total vault withdrawals paid out"
    ).expect("metric creation failed");
}

/// Handle proving the metrics were registered.
pub struct MetricsHandle {
    _registry: Registry,
}

/// Register all metrics with the global registry.
///
/// Calling this more than once is harmless.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(LIFECYCLE_CALLS.clone()),
        Box::new(LIFECYCLE_REJECTIONS.clone()),
        Box::new(LIFECYCLE_DURATION.clone()),
        Box::new(UNITS_MINTED.clone()),
        Box::new(UNITS_BURNED.clone()),
        Box::new(WITHDRAWALS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        _registry: REGISTRY.clone(),
    })
}

/// Encode all registered metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard that observes the elapsed time for one operation on drop.
pub struct HistogramTimer {
    operation: &'static str,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start timing `operation`.
    #[must_use]
    pub fn start(operation: &'static str) -> Self {
        Self {
            operation,
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        LIFECYCLE_DURATION
            .with_label_values(&[self.operation])
            .observe(self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_metrics_twice() {
        assert!(register_metrics().is_ok());
        assert!(register_metrics().is_ok());
    }

    #[test]
    fn test_counter_increment() {
        let before = LIFECYCLE_CALLS.with_label_values(&["test"]).get();
        LIFECYCLE_CALLS.with_label_values(&["test"]).inc();
        assert_eq!(LIFECYCLE_CALLS.with_label_values(&["test"]).get(), before + 1);
    }

    #[test]
    fn test_encode_contains_registered_metric() {
        register_metrics().unwrap();
        UNITS_MINTED.inc();
        let text = encode_metrics().unwrap();
        assert!(text.contains("orb_units_minted_total"));
    }

    #[test]
    fn test_timer_observes_on_drop() {
        let before = LIFECYCLE_DURATION.with_label_values(&["timer_test"]).get_sample_count();
        {
            let _timer = HistogramTimer::start("timer_test");
        }
        assert_eq!(
            LIFECYCLE_DURATION.with_label_values(&["timer_test"]).get_sample_count(),
            before + 1
        );
    }
}
