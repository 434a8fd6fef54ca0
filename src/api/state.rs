use std::sync::Arc;

use crate::services::{FraudDetector, Metrics};

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// Model loaded once at startup; read-only for the process lifetime
    pub detector: Arc<FraudDetector>,

    /// Request counters and start time
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(detector: FraudDetector) -> Self {
        Self {
            detector: Arc::new(detector),
            metrics: Arc::new(Metrics::new()),
        }
    }
}
