use serde::{Deserialize, Serialize};

/// Default decision boundary.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Scoring result returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub is_fraudulent: bool,
    pub fraud_probability: f64,
}

impl Prediction {
    /// Apply the decision boundary. The probability is clamped into `[0, 1]`.
    pub fn from_probability(probability: f64, threshold: f64) -> Self {
        let fraud_probability = probability.clamp(0.0, 1.0);
        Self {
            is_fraudulent: fraud_probability >= threshold,
            fraud_probability,
        }
    }
}
