use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Request counters for observability
pub struct Metrics {
    /// Requests that reached the scoring endpoint
    pub predict_requests: AtomicU64,
    /// Successful predictions
    pub predictions: AtomicU64,
    /// Predictions at or above the threshold
    pub flagged: AtomicU64,
    /// Requests rejected by input validation
    pub validation_failures: AtomicU64,
    /// Forward-pass failures
    pub inference_errors: AtomicU64,
    started_at: DateTime<Utc>,
}

impl Metrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self {
            predict_requests: AtomicU64::new(0),
            predictions: AtomicU64::new(0),
            flagged: AtomicU64::new(0),
            validation_failures: AtomicU64::new(0),
            inference_errors: AtomicU64::new(0),
            started_at: Utc::now(),
        }
    }

    pub fn inc_requests(&self) {
        self.predict_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_prediction(&self, flagged: bool) {
        self.predictions.fetch_add(1, Ordering::Relaxed);
        if flagged {
            self.flagged.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn inc_validation_failures(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_inference_errors(&self) {
        self.inference_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Seconds since the service started; backs `/health` and `/metrics`
    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.started_at).num_seconds().max(0) as u64
    }

    /// Prometheus text exposition
    pub fn render(&self) -> String {
        format!(
            r#"# HELP fraudguard_up Model loaded and serving
# TYPE fraudguard_up gauge
fraudguard_up 1

# HELP fraudguard_uptime_seconds Uptime in seconds
# TYPE fraudguard_uptime_seconds counter
fraudguard_uptime_seconds {}

# HELP fraudguard_predict_requests_total Requests received on /predict
# TYPE fraudguard_predict_requests_total counter
fraudguard_predict_requests_total {}

# HELP fraudguard_predictions_total Successful predictions
# TYPE fraudguard_predictions_total counter
fraudguard_predictions_total {}

# HELP fraudguard_flagged_total Predictions classified as fraudulent
# TYPE fraudguard_flagged_total counter
fraudguard_flagged_total {}

# HELP fraudguard_validation_failures_total Requests rejected by validation
# TYPE fraudguard_validation_failures_total counter
fraudguard_validation_failures_total {}

# HELP fraudguard_inference_errors_total Forward-pass failures
# TYPE fraudguard_inference_errors_total counter
fraudguard_inference_errors_total {}
"#,
            self.uptime_seconds(),
            self.predict_requests.load(Ordering::Relaxed),
            self.predictions.load(Ordering::Relaxed),
            self.flagged.load(Ordering::Relaxed),
            self.validation_failures.load(Ordering::Relaxed),
            self.inference_errors.load(Ordering::Relaxed),
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
