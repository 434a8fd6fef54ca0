pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod ml;
pub mod services;

pub use config::AppConfig;
pub use domain::{Prediction, TransactionFeatures};
pub use error::{FraudError, Result};
pub use services::FraudDetector;
