use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::tree::{DecisionTree, TreeParams};
use super::{ConfusionMatrix, ForestError, RandomForestConfig};

/// Out-of-bag error estimate.
///
/// Each sample is scored only by the trees whose bootstrap missed it, so
/// the error rate approximates held-out accuracy without a split.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OobScore {
    /// Misclassification rate over evaluated samples
    pub error_rate: f64,
    /// Samples that were out of bag for at least one tree
    pub evaluated: usize,
}

/// A trained Random Forest. Immutable once fitted.
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
    n_classes: usize,
    oob: OobScore,
    importances: Vec<f64>,
    confusion: ConfusionMatrix,
}

impl RandomForest {
    /// Train a forest on a row-major feature matrix `x` and class indices
    /// `y` (each below `n_classes`).
    pub fn fit(
        x: &[Vec<f64>],
        y: &[usize],
        n_classes: usize,
        config: &RandomForestConfig,
    ) -> Result<Self, ForestError> {
        if x.is_empty() {
            return Err(ForestError::EmptyTrainingSet);
        }
        if config.n_trees == 0 {
            return Err(ForestError::NoTrees);
        }
        if y.len() != x.len() {
            return Err(ForestError::LabelCount {
                labels: y.len(),
                rows: x.len(),
            });
        }
        let n_features = x[0].len();
        for (row, values) in x.iter().enumerate() {
            if values.len() != n_features {
                return Err(ForestError::RowLength {
                    row,
                    expected: n_features,
                    found: values.len(),
                });
            }
        }
        for &label in y {
            if label >= n_classes {
                return Err(ForestError::LabelOutOfRange { label, n_classes });
            }
        }

        let params = TreeParams {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            mtry: config.mtry_for(n_features),
        };

        let n = x.len();
        let mut oob_votes = vec![vec![0usize; n_classes]; n];
        let mut trees = Vec::with_capacity(config.n_trees);

        for t in 0..config.n_trees {
            // one deterministic stream per tree
            let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(t as u64));
            let mut in_bag = vec![false; n];
            let sample: Vec<usize> = (0..n)
                .map(|_| {
                    let i = rng.gen_range(0..n);
                    in_bag[i] = true;
                    i
                })
                .collect();

            let tree = DecisionTree::fit(x, y, n_classes, &sample, &params, &mut rng);
            for (i, row) in x.iter().enumerate() {
                if !in_bag[i] {
                    oob_votes[i][tree.predict(row)] += 1;
                }
            }
            trees.push(tree);
        }

        let mut confusion = ConfusionMatrix::new(n_classes);
        let mut evaluated = 0;
        let mut wrong = 0;
        for (i, votes) in oob_votes.iter().enumerate() {
            if votes.iter().sum::<usize>() == 0 {
                continue;
            }
            let predicted = argmax(votes);
            confusion.record(y[i], predicted);
            evaluated += 1;
            if predicted != y[i] {
                wrong += 1;
            }
        }
        let error_rate = if evaluated > 0 {
            wrong as f64 / evaluated as f64
        } else {
            0.0
        };

        let mut importances = vec![0.0; n_features];
        for tree in &trees {
            for (feature, value) in tree.importances.iter().enumerate() {
                importances[feature] += value;
            }
        }
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for value in &mut importances {
                *value /= total;
            }
        }

        Ok(RandomForest {
            trees,
            n_features,
            n_classes,
            oob: OobScore {
                error_rate,
                evaluated,
            },
            importances,
            confusion,
        })
    }

    /// Predict the class index of one feature row by majority vote.
    pub fn predict(&self, row: &[f64]) -> Result<usize, ForestError> {
        if row.len() != self.n_features {
            return Err(ForestError::FeatureCount {
                expected: self.n_features,
                found: row.len(),
            });
        }
        let mut votes = vec![0usize; self.n_classes];
        for tree in &self.trees {
            votes[tree.predict(row)] += 1;
        }
        Ok(argmax(&votes))
    }

    /// Predict every row; the result has exactly one class per input row.
    pub fn predict_batch(&self, x: &[Vec<f64>]) -> Result<Vec<usize>, ForestError> {
        let mut predictions = Vec::with_capacity(x.len());
        for (row, values) in x.iter().enumerate() {
            if values.len() != self.n_features {
                return Err(ForestError::RowLength {
                    row,
                    expected: self.n_features,
                    found: values.len(),
                });
            }
            predictions.push(self.predict(values)?);
        }
        Ok(predictions)
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Out-of-bag error estimate
    pub fn oob(&self) -> OobScore {
        self.oob
    }

    /// Mean decrease in Gini impurity per feature, normalized to sum to 1
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    /// Confusion matrix over out-of-bag votes
    pub fn confusion(&self) -> &ConfusionMatrix {
        &self.confusion
    }
}

/// First index with the highest vote count.
fn argmax(votes: &[usize]) -> usize {
    let mut best = 0;
    for (index, &count) in votes.iter().enumerate() {
        if count > votes[best] {
            best = index;
        }
    }
    best
}
