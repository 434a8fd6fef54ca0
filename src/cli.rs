use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::domain::TransactionFeatures;
use crate::error::Result;
use crate::services::FraudDetector;

#[derive(Parser)]
#[command(name = "fraudguard")]
#[command(author = "FraudGuard Team")]
#[command(version)]
#[command(about = "Transaction fraud scoring service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config directory (default.toml, then $FRAUDGUARD_ENV)
    #[arg(short, long, default_value = "config", global = true)]
    pub config: PathBuf,

    /// Model artifact path (overrides model.path)
    #[arg(long, global = true)]
    pub model: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Load the model and serve the HTTP API (default)
    Serve {
        /// Interface to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Score a single transaction and print the result as JSON
    Predict {
        /// Transaction amount
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
        /// Time of day
        #[arg(long, allow_negative_numbers = true)]
        time_of_day: i64,
        /// Billing/shipping mismatch flag
        #[arg(long, allow_negative_numbers = true)]
        mismatch: i64,
        /// Recent transaction count
        #[arg(long, allow_negative_numbers = true)]
        frequency: i64,
    },
    /// Load and validate the model artifact, then print its description
    CheckModel,
}

impl Cli {
    /// Fold command-line overrides into the loaded configuration.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(path) = &self.model {
            config.model.path = path.clone();
        }
        if let Some(Commands::Serve { host, port }) = &self.command {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
        }
    }
}

/// One-shot scoring without starting the server.
pub fn predict_once(config: &AppConfig, features: TransactionFeatures) -> Result<()> {
    let detector = FraudDetector::from_config(&config.model)?;
    let prediction = detector.predict(&features)?;
    println!("{}", serde_json::to_string_pretty(&prediction)?);
    Ok(())
}

pub fn check_model(config: &AppConfig) -> Result<()> {
    let detector = FraudDetector::from_config(&config.model)?;
    println!("{}", serde_json::to_string_pretty(&detector.info())?);
    Ok(())
}
