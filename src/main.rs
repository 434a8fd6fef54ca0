use clap::Parser;
use fraudguard::api::{start_api_server, AppState};
use fraudguard::cli::{self, Cli, Commands};
use fraudguard::config::{AppConfig, LoggingConfig};
use fraudguard::domain::TransactionFeatures;
use fraudguard::error::Result;
use fraudguard::services::FraudDetector;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_from(&cli.config)?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    match &cli.command {
        None | Some(Commands::Serve { .. }) => {
            init_logging(&config.logging);
            run_server(config).await?;
        }
        Some(Commands::Predict {
            amount,
            time_of_day,
            mismatch,
            frequency,
        }) => {
            init_logging_simple();
            let features = TransactionFeatures {
                amount: *amount,
                time_of_day: *time_of_day,
                mismatch: *mismatch,
                frequency: *frequency,
            };
            cli::predict_once(&config, features)?;
        }
        Some(Commands::CheckModel) => {
            init_logging_simple();
            cli::check_model(&config)?;
        }
    }

    Ok(())
}

async fn run_server(config: AppConfig) -> Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        model = %config.model.path.display(),
        threshold = config.model.threshold,
        "starting fraudguard"
    );

    // A model that cannot be loaded is fatal: never bind the listener.
    let detector = FraudDetector::from_config(&config.model).map_err(|e| {
        error!("model load failed: {}", e);
        e
    })?;

    let state = AppState::new(detector);
    start_api_server(state, &config.bind_addr()).await
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn init_logging_simple() {
    // Minimal logging for one-shot commands
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .try_init();
}
