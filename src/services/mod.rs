pub mod detector;
pub mod metrics;

pub use detector::{FraudDetector, ModelInfo};
pub use metrics::Metrics;
