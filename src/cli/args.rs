//! Command-line argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{RiskConfig, DEFAULT_ARTIFACT_PATH};
use crate::model::TrainerConfig;
use crate::pipeline::loader::{DataSource, DEFAULT_DATA_PATH, DEFAULT_SHEET};

/// Agrorisk - Credit risk scoring for sustainable agricultural loans
#[derive(Parser, Debug)]
#[command(name = "agrorisk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Training data: a CSV/Parquet file, or a directory with one file per sheet
    #[arg(long, global = true, env = "AGRORISK_DATA", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Sheet to read when --data is a directory
    #[arg(long, global = true, env = "AGRORISK_SHEET", default_value = DEFAULT_SHEET)]
    pub sheet: String,

    /// Model artifact path
    #[arg(long, global = true, env = "AGRORISK_MODEL", default_value = DEFAULT_ARTIFACT_PATH)]
    pub model: PathBuf,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Train both models from the data source and save the artifact
    Train {
        /// Trees per forest
        #[arg(long, default_value = "150")]
        trees: usize,
    },

    /// Score a JSON payload (file or stdin) and print the assessment as JSON
    Predict {
        /// Payload file; reads stdin when omitted
        #[arg(long)]
        payload: Option<PathBuf>,
    },
}

impl Cli {
    /// Runtime configuration from the parsed flags
    pub fn config(&self) -> RiskConfig {
        let trainer = match self.command {
            Commands::Train { trees } => TrainerConfig::default().with_trees(trees),
            Commands::Predict { .. } => TrainerConfig::default(),
        };
        RiskConfig::default()
            .with_data(DataSource::new(self.data.clone(), self.sheet.clone()))
            .with_artifact_path(self.model.clone())
            .with_trainer(trainer)
    }
}
