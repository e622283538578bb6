//! CART decision tree on dense f64 rows
//!
//! Classification and regression share one implementation: every node keeps
//! weighted sums of the target (and its square), so the binary Gini impurity
//! and the weighted variance both fall out of the same accumulator, and a
//! leaf's value is the weighted mean target (the positive-class fraction for
//! 0/1 targets).

use rand::rngs::StdRng;
use rand::seq::index;
use serde::{Deserialize, Serialize};

/// Ties closer than this are treated as one value when scanning thresholds
const VALUE_EPSILON: f64 = 1e-10;

/// Smallest impurity decrease accepted as a split
const MIN_GAIN: f64 = 1e-12;

/// Impurity measure used to rank splits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Criterion {
    /// Binary Gini impurity 2p(1 - p); targets must be 0/1
    Gini,
    /// Weighted variance of the target
    SquaredError,
}

/// How many features are drawn as split candidates at each node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// floor(sqrt(n_features)), at least 1
    Sqrt,
    All,
    Count(usize),
}

impl MaxFeatures {
    pub fn resolve(self, n_features: usize) -> usize {
        let k = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Count(k) => k,
        };
        k.clamp(1, n_features.max(1))
    }
}

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub criterion: Criterion,
    pub max_features: MaxFeatures,
    /// `None` grows until leaves are pure or too small to split
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted tree stored as a flat node arena; node 0 is the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

/// Weighted running sums of a node's targets
#[derive(Debug, Clone, Copy, Default)]
struct Stats {
    count: usize,
    weight: f64,
    weighted_y: f64,
    weighted_y2: f64,
}

impl Stats {
    fn add(&mut self, y: f64, w: f64) {
        self.count += 1;
        self.weight += w;
        self.weighted_y += w * y;
        self.weighted_y2 += w * y * y;
    }

    fn sub(&mut self, y: f64, w: f64) {
        self.count -= 1;
        self.weight -= w;
        self.weighted_y -= w * y;
        self.weighted_y2 -= w * y * y;
    }

    fn mean(&self) -> f64 {
        if self.weight <= 0.0 {
            return 0.0;
        }
        self.weighted_y / self.weight
    }

    fn impurity(&self, criterion: Criterion) -> f64 {
        if self.weight <= 0.0 {
            return 0.0;
        }
        let mean = self.mean();
        match criterion {
            Criterion::Gini => 2.0 * mean * (1.0 - mean),
            Criterion::SquaredError => (self.weighted_y2 / self.weight - mean * mean).max(0.0),
        }
    }
}

/// Best split found at a node
struct Candidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Borrowed training data shared by every node of one fit
struct Grower<'a> {
    x: &'a [Vec<f64>],
    y: &'a [f64],
    weights: &'a [f64],
    params: &'a TreeParams,
    n_candidates: usize,
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Fit on the rows listed in `samples` (repeats allowed, as produced by
    /// bootstrap resampling). `weights[i]` applies to row `i` each time it appears.
    pub fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        weights: &[f64],
        samples: &[usize],
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let n_features = x.first().map_or(0, Vec::len);
        let mut grower = Grower {
            x,
            y,
            weights,
            params,
            n_candidates: params.max_features.resolve(n_features),
            nodes: Vec::new(),
        };
        let mut samples = samples.to_vec();
        grower.grow(&mut samples, 0, rng);
        Self {
            nodes: grower.nodes,
        }
    }

    /// Leaf value reached by `row`
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], index: usize) -> usize {
            match &nodes[index] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }
}

impl Grower<'_> {
    /// Grow the subtree for `samples` and return its node index
    fn grow(&mut self, samples: &mut [usize], depth: usize, rng: &mut StdRng) -> usize {
        let mut stats = Stats::default();
        for &i in samples.iter() {
            stats.add(self.y[i], self.weights[i]);
        }

        let index = self.nodes.len();
        self.nodes.push(Node::Leaf {
            value: stats.mean(),
        });

        let depth_reached = self.params.max_depth.is_some_and(|d| depth >= d);
        if depth_reached
            || samples.len() < self.params.min_samples_split
            || stats.impurity(self.params.criterion) <= MIN_GAIN
        {
            return index;
        }

        let Some(best) = self.best_split(samples, &stats, rng) else {
            return index;
        };

        // Partition in place: left side first
        let mut boundary = 0;
        for k in 0..samples.len() {
            if self.x[samples[k]][best.feature] <= best.threshold {
                samples.swap(k, boundary);
                boundary += 1;
            }
        }
        let (left_samples, right_samples) = samples.split_at_mut(boundary);

        let left = self.grow(left_samples, depth + 1, rng);
        let right = self.grow(right_samples, depth + 1, rng);
        self.nodes[index] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        index
    }

    fn best_split(&self, samples: &[usize], parent: &Stats, rng: &mut StdRng) -> Option<Candidate> {
        let n_features = self.x.first().map_or(0, Vec::len);
        if n_features == 0 {
            return None;
        }
        let criterion = self.params.criterion;
        let min_leaf = self.params.min_samples_leaf.max(1);
        let parent_cost = parent.impurity(criterion) * parent.weight;

        let mut best: Option<Candidate> = None;
        let mut sorted = samples.to_vec();

        for feature in index::sample(rng, n_features, self.n_candidates).into_iter() {
            sorted.sort_by(|&a, &b| {
                self.x[a][feature]
                    .partial_cmp(&self.x[b][feature])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let mut left = Stats::default();
            let mut right = *parent;

            for k in 0..sorted.len().saturating_sub(1) {
                let i = sorted[k];
                left.add(self.y[i], self.weights[i]);
                right.sub(self.y[i], self.weights[i]);

                if left.count < min_leaf || right.count < min_leaf {
                    continue;
                }

                let value = self.x[i][feature];
                let next = self.x[sorted[k + 1]][feature];
                if (next - value).abs() < VALUE_EPSILON {
                    continue;
                }

                let child_cost = left.impurity(criterion) * left.weight
                    + right.impurity(criterion) * right.weight;
                let gain = parent_cost - child_cost;

                if gain > MIN_GAIN && best.as_ref().map_or(true, |b| gain > b.gain) {
                    best = Some(Candidate {
                        feature,
                        threshold: (value + next) / 2.0,
                        gain,
                    });
                }
            }
        }

        best
    }
}
