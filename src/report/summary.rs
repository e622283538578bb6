//! Training summary report

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;
use std::path::PathBuf;

use crate::model::TrainingReport;

/// AUC at or above which the classifier is shown as healthy
const GOOD_AUC: f64 = 0.75;

/// What a `train` run produced
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub report: TrainingReport,
    pub artifact: PathBuf,
    pub trees: usize,
}

impl TrainingSummary {
    pub fn new(report: TrainingReport, artifact: PathBuf, trees: usize) -> Self {
        Self {
            report,
            artifact,
            trees,
        }
    }

    /// Metric/value table, without indentation
    pub fn table(&self) -> Table {
        let report = &self.report;

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![Cell::new("📁 Training rows"), Cell::new(report.rows)]);
        table.add_row(vec![
            Cell::new("🧮 Features"),
            Cell::new(format!(
                "{} ({} numerical, {} categorical)",
                report.features, report.numerical_features, report.categorical_features
            )),
        ]);
        table.add_row(vec![Cell::new("🌲 Trees per forest"), Cell::new(self.trees)]);
        table.add_row(vec![
            Cell::new("⚠️  Default rate"),
            Cell::new(format!("{:.1}%", report.positive_rate * 100.0)),
        ]);
        table.add_row(vec![
            Cell::new("🎯 Default threshold"),
            Cell::new(format!("{:.4}", report.default_threshold)),
        ]);

        let auc_color = if report.classifier.roc_auc >= GOOD_AUC {
            Color::Green
        } else {
            Color::Yellow
        };
        table.add_row(vec![
            Cell::new("✅ Classifier accuracy"),
            Cell::new(format!("{:.3}", report.classifier.accuracy)),
        ]);
        table.add_row(vec![
            Cell::new("📈 Classifier ROC AUC"),
            Cell::new(format!("{:.3}", report.classifier.roc_auc))
                .fg(auc_color)
                .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("💸 Regressor MAE"),
            Cell::new(format!("{:.2}", report.regressor.mae)),
        ]);
        table.add_row(vec![
            Cell::new("📉 Regressor R²"),
            Cell::new(format!("{:.3}", report.regressor.r2)),
        ]);

        table
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("TRAINING SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        for line in self.table().to_string().lines() {
            println!("    {}", line);
        }

        println!();
        println!(
            "    {} {}",
            style("Model saved to").dim(),
            style(self.artifact.display()).cyan()
        );
    }
}
