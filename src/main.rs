//! Agrorisk CLI
//!
//! `train` fits and saves both models; `predict` scores one JSON payload and
//! prints the assessment on stdout. Logs and progress go to stderr.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use agrorisk::cli::{Cli, Commands};
use agrorisk::report::TrainingSummary;
use agrorisk::utils::{
    create_spinner, finish_with_error, finish_with_success, print_banner, print_completion,
    print_config, print_info,
};
use agrorisk::{ModelStore, RiskConfig, RiskEngine, ScoringPayload, StoreProvider};

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = cli.config();

    match &cli.command {
        Commands::Train { trees } => run_train(config, *trees),
        Commands::Predict { payload } => run_predict(config, payload.as_deref()),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run_train(config: RiskConfig, trees: usize) -> Result<()> {
    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&config.data, &config.artifact_path, trees);

    let store = ModelStore::new(config);
    let spinner = create_spinner("Loading records and training models...");
    let bundle = match store.retrain() {
        Ok(bundle) => {
            finish_with_success(&spinner, "Models trained");
            bundle
        }
        Err(err) => {
            finish_with_error(&spinner, "Training failed");
            return Err(err).context("Failed to train models");
        }
    };

    print_info(&format!(
        "Feature columns: {}",
        bundle.feature_columns().join(", ")
    ));

    TrainingSummary::new(bundle.report, store.artifact_path().to_path_buf(), trees).display();
    print_completion();
    Ok(())
}

fn run_predict(config: RiskConfig, payload_path: Option<&Path>) -> Result<()> {
    let input = match payload_path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload file {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read payload from stdin")?;
            buffer
        }
    };

    let payload = ScoringPayload::from_json_str(&input).context("Invalid payload")?;
    let mut engine = RiskEngine::new(StoreProvider::new(ModelStore::new(config)));
    let assessment = engine.assess(&payload).context("Failed to score payload")?;

    println!("{}", serde_json::to_string(&assessment)?);
    Ok(())
}
