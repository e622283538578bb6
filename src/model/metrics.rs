//! Holdout metrics

/// Fraction of labels predicted correctly
pub fn accuracy(labels: &[u8], predicted: &[u8]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let correct = labels.iter().zip(predicted).filter(|(a, b)| a == b).count();
    correct as f64 / labels.len() as f64
}

/// ROC AUC via the rank-sum (Mann-Whitney) statistic with average ranks for
/// tied scores. Returns 0.5 when either class is absent.
pub fn roc_auc(labels: &[u8], scores: &[f64]) -> f64 {
    let mut pairs: Vec<(f64, u8)> = scores.iter().copied().zip(labels.iter().copied()).collect();
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let n_pos = pairs.iter().filter(|(_, l)| *l == 1).count() as f64;
    let n_neg = pairs.len() as f64 - n_pos;
    if n_pos == 0.0 || n_neg == 0.0 {
        return 0.5;
    }

    let n = pairs.len();
    let mut rank_sum_pos = 0.0;
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j < n && (pairs[j].0 - pairs[i].0).abs() < 1e-12 {
            j += 1;
        }
        // Ranks are 1-based; ties share the mean of ranks i+1..=j
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        let positives_in_group = pairs[i..j].iter().filter(|(_, l)| *l == 1).count();
        rank_sum_pos += avg_rank * positives_in_group as f64;
        i = j;
    }

    (rank_sum_pos - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg)
}

pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / actual.len() as f64
}

/// Coefficient of determination; 0.0 for a constant target
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return 0.0;
    }
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    1.0 - ss_res / ss_tot
}
