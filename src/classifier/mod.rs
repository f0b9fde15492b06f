//! Random Forest classification: train, evaluate, predict.
//!
//! CART decision trees with Gini split criterion, bootstrap resampling,
//! out-of-bag error estimation and mean-decrease-in-impurity feature
//! importance. Training is sequential and deterministic for a fixed seed.

mod config;
mod confusion;
mod forest;
mod tree;

pub use config::RandomForestConfig;
pub use confusion::ConfusionMatrix;
pub use forest::{OobScore, RandomForest};
pub use tree::DecisionTree;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForestError {
    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("at least one tree is required")]
    NoTrees,

    #[error("row {row} has {found} features, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("feature vector has {found} features, expected {expected}")]
    FeatureCount { expected: usize, found: usize },

    #[error("{labels} labels for {rows} training rows")]
    LabelCount { labels: usize, rows: usize },

    #[error("label {label} out of range for {n_classes} classes")]
    LabelOutOfRange { label: usize, n_classes: usize },
}
