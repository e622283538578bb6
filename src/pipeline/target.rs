//! Proxy target synthesis
//!
//! The disbursement sheet has no observed default outcome. This module derives
//! one: a noisy risk score from normalized loan and practice factors, a default
//! flag for the top fifth of that score, a loss severity, and the resulting
//! expected loss (PD x LGD x EAD).

use polars::prelude::*;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use super::fields::col;
use super::flags::YesNo;
use crate::error::{Result, RiskError};

/// Synthesized risk score in [0, 1]
pub const RISK_SCORE: &str = "risk_score";
/// 1 when the risk score is in the top fifth of the table
pub const DEFAULT_FLAG: &str = "default_flag";
/// Loss given default in [0.3, 0.9]
pub const LOSS_SEVERITY: &str = "loss_severity";
/// Exposure at default, equal to the loan amount
pub const EXPOSURE_AT_DEFAULT: &str = "exposure_at_default";
/// Regression target: risk score x loss severity x exposure
pub const EXPECTED_LOSS: &str = "expected_loss";

/// All columns added by [`synthesize_targets`]
pub const TARGET_COLUMNS: [&str; 5] = [
    RISK_SCORE,
    DEFAULT_FLAG,
    LOSS_SEVERITY,
    EXPOSURE_AT_DEFAULT,
    EXPECTED_LOSS,
];

/// Guards the min-max denominator against constant columns
const NORMALIZE_EPSILON: f64 = 1e-8;

/// Risk-score weights
const W_AMOUNT: f64 = 0.30;
const W_TERM: f64 = 0.20;
const W_NEW_CLIENT: f64 = 0.15;
const W_MISSING_PRACTICES: f64 = 0.15;
const W_YOUTH: f64 = 0.10;
const W_SMALL_AREA: f64 = 0.10;

/// Loss severity: base rate, maximum downward adjustment and bounds
const SEVERITY_BASE: f64 = 0.60;
const SEVERITY_ADJUSTMENT: f64 = 0.2;
const SEVERITY_MIN: f64 = 0.3;
const SEVERITY_MAX: f64 = 0.9;

/// Parameters of the proxy-label synthesis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Seed for both noise draws
    pub seed: u64,
    /// Standard deviation of the noise added to the risk score
    pub risk_noise: f64,
    /// Standard deviation of the noise added to the loss severity
    pub severity_noise: f64,
    /// Percentile of the risk score at or above which a row is a default
    pub default_percentile: f64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            seed: 2025,
            risk_noise: 0.08,
            severity_noise: 0.05,
            default_percentile: 80.0,
        }
    }
}

/// Result of labeling a table
#[derive(Debug, Clone)]
pub struct ProxyTargets {
    /// Input table plus the five target columns
    pub frame: DataFrame,
    /// Risk-score cutoff used for the default flag on this table
    pub default_threshold: f64,
}

/// Augment a cleaned loan table with proxy targets.
///
/// The default threshold is the configured percentile of this table's risk
/// scores, so roughly `100 - percentile` percent of rows are labeled default
/// (modulo ties).
pub fn synthesize_targets(df: &DataFrame, config: &ProxyConfig) -> Result<ProxyTargets> {
    let n = df.height();

    let amount = numeric_column(df, col::MONTO_CREDITO)?;
    let term = numeric_column(df, col::PLAZO_MESES)?;
    let age = numeric_column(df, col::EDAD)?;
    let area = numeric_column(df, col::AREA_CULTIVAR)?;

    let new_client = flag_column(df, col::CLIENTE_NUEVO)?;
    let fertilizer = flag_column(df, col::USO_ABONOS)?;
    let pest_management = flag_column(df, col::MANEJO_PLAGAS)?;
    let agroforestry = flag_column(df, col::PREDIO_SAF)?;
    let deforestation_free = flag_column(df, col::PREDIO_LIBRE_DEFOREST)?;

    let amount_norm = normalize(&amount);
    let term_norm = normalize(&term);
    let age_norm = normalize(&age);
    let area_norm = normalize(&area);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let risk_noise = normal(0.0, config.risk_noise)?;
    let severity_noise = normal(0.0, config.severity_noise)?;

    let risk_score: Vec<f64> = (0..n)
        .map(|i| {
            let good4 = (fertilizer[i]
                + pest_management[i]
                + agroforestry[i]
                + deforestation_free[i])
                / 4.0;
            let score = W_AMOUNT * amount_norm[i]
                + W_TERM * term_norm[i]
                + W_NEW_CLIENT * new_client[i]
                + W_MISSING_PRACTICES * (1.0 - good4)
                + W_YOUTH * (1.0 - age_norm[i])
                + W_SMALL_AREA * (1.0 - area_norm[i]);
            (score + risk_noise.sample(&mut rng)).clamp(0.0, 1.0)
        })
        .collect();

    let default_threshold = percentile(&risk_score, config.default_percentile);
    let default_flag: Vec<i32> = risk_score
        .iter()
        .map(|&s| i32::from(s >= default_threshold))
        .collect();

    let loss_severity: Vec<f64> = (0..n)
        .map(|i| {
            let good3 = (fertilizer[i] + pest_management[i] + agroforestry[i]) / 3.0;
            let adjustment = -SEVERITY_ADJUSTMENT * (area_norm[i] + good3) / 2.0;
            (SEVERITY_BASE + adjustment + severity_noise.sample(&mut rng))
                .clamp(SEVERITY_MIN, SEVERITY_MAX)
        })
        .collect();

    let expected_loss: Vec<f64> = (0..n)
        .map(|i| risk_score[i] * loss_severity[i] * amount[i])
        .collect();

    let mut frame = df.clone();
    frame.with_column(Column::new(RISK_SCORE.into(), risk_score))?;
    frame.with_column(Column::new(DEFAULT_FLAG.into(), default_flag))?;
    frame.with_column(Column::new(LOSS_SEVERITY.into(), loss_severity))?;
    frame.with_column(Column::new(EXPOSURE_AT_DEFAULT.into(), amount))?;
    frame.with_column(Column::new(EXPECTED_LOSS.into(), expected_loss))?;

    Ok(ProxyTargets {
        frame,
        default_threshold,
    })
}

/// Min-max scale into [0, 1)
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    values
        .iter()
        .map(|v| (v - min) / (max - min + NORMALIZE_EPSILON))
        .collect()
}

/// Percentile with linear interpolation between closest ranks
pub fn percentile(values: &[f64], pct: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = (pct / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

fn normal(mean: f64, std_dev: f64) -> Result<Normal<f64>> {
    Normal::new(mean, std_dev).map_err(|e| {
        RiskError::InvalidConfig(format!("noise standard deviation {}: {}", std_dev, e))
    })
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| RiskError::MissingColumn(name.to_string()))?;
    let cast = column.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().map(|v| v.unwrap_or(0.0)).collect())
}

/// 1.0 where the flag reads Yes, 0.0 otherwise
fn flag_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| RiskError::MissingColumn(name.to_string()))?;
    let cast = column.cast(&DataType::String)?;
    Ok(cast
        .str()?
        .into_iter()
        .map(|v| {
            let yes = v.map(YesNo::from_text).unwrap_or(YesNo::No).is_yes();
            if yes {
                1.0
            } else {
                0.0
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaned_table(n: usize) -> DataFrame {
        let amount: Vec<f64> = (0..n).map(|i| 1000.0 + 250.0 * i as f64).collect();
        let term: Vec<f64> = (0..n).map(|i| 6.0 + (i % 5) as f64 * 6.0).collect();
        let age: Vec<f64> = (0..n).map(|i| 25.0 + (i % 30) as f64).collect();
        let area: Vec<f64> = (0..n).map(|i| 0.5 + (i % 7) as f64).collect();
        let flag = |m: usize| -> Vec<&'static str> {
            (0..n).map(|i| if i % m == 0 { "Sí" } else { "No" }).collect()
        };
        df! {
            "MONTO_CREDITO" => amount,
            "PLAZO_MESES" => term,
            "EDAD" => age,
            "AREA_CULTIVAR" => area,
            "CLIENTE_NUEVO" => flag(3),
            "USO_ABONOS" => flag(2),
            "MANEJO_PLAGAS" => flag(4),
            "PREDIO_SAF" => flag(5),
            "PREDIO_LIBRE_DEFOREST" => flag(2),
        }
        .unwrap()
    }

    #[test]
    fn test_normalize_range() {
        let normed = normalize(&[2.0, 4.0, 6.0]);
        assert_eq!(normed[0], 0.0);
        assert!((normed[1] - 0.5).abs() < 1e-6);
        assert!(normed[2] < 1.0 && normed[2] > 0.999);
    }

    #[test]
    fn test_normalize_constant_column_is_zero() {
        assert_eq!(normalize(&[3.0, 3.0, 3.0]), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_percentile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((percentile(&values, 80.0) - 4.2).abs() < 1e-12);
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 100.0), 5.0);
        assert!(percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn test_targets_added_and_bounded() {
        let df = cleaned_table(50);
        let labeled = synthesize_targets(&df, &ProxyConfig::default()).unwrap();
        let frame = &labeled.frame;

        for name in TARGET_COLUMNS {
            assert!(frame.column(name).is_ok(), "missing {}", name);
        }

        let risk: Vec<f64> = frame
            .column(RISK_SCORE)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert!(risk.iter().all(|&r| (0.0..=1.0).contains(&r)));

        let severity: Vec<f64> = frame
            .column(LOSS_SEVERITY)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert!(severity.iter().all(|&s| (SEVERITY_MIN..=SEVERITY_MAX).contains(&s)));
    }

    #[test]
    fn test_default_rate_is_about_one_fifth() {
        let df = cleaned_table(100);
        let labeled = synthesize_targets(&df, &ProxyConfig::default()).unwrap();
        let positives: i32 = labeled
            .frame
            .column(DEFAULT_FLAG)
            .unwrap()
            .i32()
            .unwrap()
            .into_iter()
            .flatten()
            .sum();
        // 80th percentile of 100 distinct scores leaves 20 at or above it
        assert!((18..=22).contains(&positives), "positives = {}", positives);
    }

    #[test]
    fn test_expected_loss_is_product() {
        let df = cleaned_table(20);
        let labeled = synthesize_targets(&df, &ProxyConfig::default()).unwrap();
        let frame = &labeled.frame;
        let get = |name: &str| -> Vec<f64> {
            frame.column(name).unwrap().f64().unwrap().into_iter().flatten().collect()
        };
        let (risk, severity, ead, el) = (
            get(RISK_SCORE),
            get(LOSS_SEVERITY),
            get(EXPOSURE_AT_DEFAULT),
            get(EXPECTED_LOSS),
        );
        for i in 0..20 {
            assert!((risk[i] * severity[i] * ead[i] - el[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_missing_column_errors() {
        let df = df! { "MONTO_CREDITO" => [1.0f64, 2.0] }.unwrap();
        let err = synthesize_targets(&df, &ProxyConfig::default()).unwrap_err();
        assert!(matches!(err, RiskError::MissingColumn(ref c) if c == "PLAZO_MESES"));
    }
}
