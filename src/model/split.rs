//! Seeded train/test splits

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::error::{Result, RiskError};

/// Row indices of a train/test partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle then hold out `ceil(test_fraction * n)` rows.
pub fn shuffle_split(n: usize, test_fraction: f64, seed: u64) -> Result<TrainTestSplit> {
    let n_test = (test_fraction * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(RiskError::InsufficientTrainingData(format!(
            "{} rows cannot be split with test fraction {}",
            n, test_fraction
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok(TrainTestSplit {
        train,
        test: indices,
    })
}

/// Split 0/1 labels so both halves keep each class.
///
/// Each class contributes `round(test_fraction * n_class)` rows to the test
/// side, clamped to `[1, n_class - 1]`; every class needs at least two rows.
pub fn stratified_split(labels: &[u8], test_fraction: f64, seed: u64) -> Result<TrainTestSplit> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for class in [0u8, 1u8] {
        let mut members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == class)
            .map(|(i, _)| i)
            .collect();
        if members.len() < 2 {
            return Err(RiskError::InsufficientTrainingData(format!(
                "class {} has {} rows, stratified split needs at least 2",
                class,
                members.len()
            )));
        }

        members.shuffle(&mut rng);
        let n_test = ((test_fraction * members.len() as f64).round() as usize)
            .clamp(1, members.len() - 1);
        let rest = members.split_off(n_test);
        test.extend(members);
        train.extend(rest);
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);
    Ok(TrainTestSplit { train, test })
}
