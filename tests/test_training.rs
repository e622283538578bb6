//! Tests for proxy labeling and dual model training on a realistic sheet

mod common;

use agrorisk::model::{train_models, TrainerConfig};
use agrorisk::pipeline::loader::clean_loan_records;
use agrorisk::pipeline::target::{synthesize_targets, ProxyConfig, DEFAULT_FLAG, RISK_SCORE};
use agrorisk::pipeline::FeatureKind;
use common::create_loan_sheet;

fn labeled(rows: usize, seed: u64) -> agrorisk::pipeline::ProxyTargets {
    let records = clean_loan_records(create_loan_sheet(rows, seed, &[])).unwrap();
    synthesize_targets(&records, &ProxyConfig::default()).unwrap()
}

#[test]
fn test_labels_are_deterministic() {
    let a = labeled(60, 11);
    let b = labeled(60, 11);
    assert!(a.frame.equals(&b.frame));
    assert_eq!(a.default_threshold, b.default_threshold);
}

#[test]
fn test_default_flag_matches_threshold() {
    let targets = labeled(100, 12);
    let risk = targets.frame.column(RISK_SCORE).unwrap().f64().unwrap().clone();
    let flags = targets.frame.column(DEFAULT_FLAG).unwrap().i32().unwrap().clone();

    for (r, f) in risk.into_iter().zip(flags.into_iter()) {
        let (r, f) = (r.unwrap(), f.unwrap());
        assert_eq!(f == 1, r >= targets.default_threshold);
    }
}

#[test]
fn test_bundle_schema_excludes_identity_dates_and_targets() {
    let bundle = train_models(&labeled(90, 13), &TrainerConfig::default().with_trees(8)).unwrap();
    let columns = bundle.feature_columns();

    for excluded in [
        "ID",
        "NOMBRE_CLIENTE",
        "DNI",
        "FECHA_DESEMBOLSO",
        "FECHA_VENCIMIENTO",
        "risk_score",
        "default_flag",
        "loss_severity",
        "exposure_at_default",
        "expected_loss",
    ] {
        assert!(!columns.contains(&excluded), "{} should not be a feature", excluded);
    }

    assert_eq!(bundle.schema.kind_of("MONTO_CREDITO"), Some(FeatureKind::Numerical));
    assert_eq!(bundle.schema.kind_of("EDAD"), Some(FeatureKind::Numerical));
    assert_eq!(bundle.schema.kind_of("PREDIO_SAF"), Some(FeatureKind::Categorical));
    assert_eq!(bundle.schema.kind_of("REGION"), Some(FeatureKind::Categorical));
}

#[test]
fn test_training_is_reproducible() {
    let config = TrainerConfig::default().with_trees(8);
    let a = train_models(&labeled(80, 14), &config).unwrap();
    let b = train_models(&labeled(80, 14), &config).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_report_metrics_in_range() {
    let bundle = train_models(&labeled(120, 15), &TrainerConfig::default().with_trees(20)).unwrap();
    let report = &bundle.report;

    assert_eq!(report.rows, 120);
    assert!((0.15..=0.25).contains(&report.positive_rate));
    assert!((0.0..=1.0).contains(&report.classifier.accuracy));
    assert!((0.0..=1.0).contains(&report.classifier.roc_auc));
    assert!(report.regressor.mae >= 0.0);
    assert_eq!(report.regressor.test_rows, 36);
    // Amount drives both the label and the loss, so the models pick up signal
    assert!(report.classifier.roc_auc > 0.5);
}
