//! Tests for CLI argument parsing and the agrorisk binary

mod common;

use assert_cmd::Command;
use clap::Parser;
use predicates::prelude::*;
use std::path::PathBuf;

use agrorisk::cli::{Cli, Commands};
use common::{create_loan_sheet, Workspace, SHEET};

#[test]
fn test_cli_default_values() {
    let cli = Cli::parse_from(["agrorisk", "train"]);

    assert_eq!(cli.command, Commands::Train { trees: 150 });
    assert_eq!(cli.data, PathBuf::from("data/AVANCE_BIOCREDITOS_Y_AGROPROTECTOR"));
    assert_eq!(cli.sheet, "COLOCACIONES_BIOCREDITOS");
    assert_eq!(cli.model, PathBuf::from("data/modelo_crediticio.json"));
}

#[test]
fn test_cli_global_flags_after_subcommand() {
    let cli = Cli::parse_from([
        "agrorisk",
        "predict",
        "--payload",
        "req.json",
        "--data",
        "/tmp/loans.csv",
        "--model",
        "/tmp/m.json",
    ]);

    assert_eq!(
        cli.command,
        Commands::Predict {
            payload: Some(PathBuf::from("req.json"))
        }
    );
    let config = cli.config();
    assert_eq!(config.data.path, PathBuf::from("/tmp/loans.csv"));
    assert_eq!(config.artifact_path, PathBuf::from("/tmp/m.json"));
}

#[test]
fn test_cli_trees_reach_trainer_config() {
    let cli = Cli::parse_from(["agrorisk", "train", "--trees", "12"]);
    let config = cli.config();
    assert_eq!(config.trainer.classifier.n_trees, 12);
    assert_eq!(config.trainer.regressor.n_trees, 12);
}

#[test]
fn test_cli_requires_subcommand() {
    assert!(Cli::try_parse_from(["agrorisk"]).is_err());
}

fn agrorisk_with_sheet(workspace: &Workspace, sheet: &str) -> Command {
    let mut cmd = Command::cargo_bin("agrorisk").unwrap();
    cmd.env_remove("AGRORISK_DATA")
        .env_remove("AGRORISK_SHEET")
        .env_remove("AGRORISK_MODEL")
        .env("RUST_LOG", "warn")
        .arg("--data")
        .arg(workspace.data_dir())
        .arg("--sheet")
        .arg(sheet)
        .arg("--model")
        .arg(workspace.artifact());
    cmd
}

fn agrorisk(workspace: &Workspace) -> Command {
    agrorisk_with_sheet(workspace, SHEET)
}

#[test]
fn test_train_command_writes_artifact() {
    let workspace = Workspace::new(&mut create_loan_sheet(60, 41, &[]));

    agrorisk(&workspace)
        .args(["train", "--trees", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TRAINING SUMMARY"));

    assert!(workspace.artifact().exists());
}

#[test]
fn test_predict_from_stdin() {
    let workspace = Workspace::new(&mut create_loan_sheet(60, 42, &[]));

    agrorisk(&workspace)
        .arg("predict")
        .write_stdin(r#"{"monto_credito": 5000, "predio_saf": "Sí"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"eco_score\":20"))
        .stdout(predicate::str::contains("\"prob_impago\""))
        .stdout(predicate::str::contains("Complete los datos ambientales"));
}

#[test]
fn test_predict_empty_stdin_scores_defaults() {
    let workspace = Workspace::new(&mut create_loan_sheet(60, 43, &[]));

    agrorisk(&workspace)
        .arg("predict")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"eco_score\":0"));
}

#[test]
fn test_predict_rejects_malformed_json() {
    let workspace = Workspace::new(&mut create_loan_sheet(60, 44, &[]));

    agrorisk(&workspace)
        .arg("predict")
        .write_stdin("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid payload"));
}

#[test]
fn test_train_without_data_fails() {
    let workspace = Workspace::new(&mut create_loan_sheet(10, 45, &[]));

    agrorisk_with_sheet(&workspace, "NO_EXISTE")
        .args(["train", "--trees", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Training data not found"));
}
