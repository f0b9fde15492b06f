use serde::{Deserialize, Serialize};

/// Random Forest training parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestConfig {
    /// Number of trees in the ensemble
    pub n_trees: usize,
    /// Maximum tree depth
    pub max_depth: usize,
    /// Minimum number of samples required to split a node
    pub min_samples_split: usize,
    /// Number of features tried per split; `None` means ceil(sqrt(n_features))
    pub mtry: Option<usize>,
    /// Seed for bootstrap and feature sampling
    pub seed: u64,
}

impl Default for RandomForestConfig {
    fn default() -> Self {
        RandomForestConfig {
            n_trees: 100,
            max_depth: 16,
            min_samples_split: 2,
            mtry: None,
            seed: 42,
        }
    }
}

impl RandomForestConfig {
    /// Resolve the per-split feature count for a dataset with
    /// `n_features` columns, clamped to a sensible range.
    pub fn mtry_for(&self, n_features: usize) -> usize {
        let default = (n_features as f64).sqrt().ceil() as usize;
        self.mtry.unwrap_or(default).clamp(1, n_features.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mtry_default_is_sqrt() {
        let config = RandomForestConfig::default();
        assert_eq!(config.mtry_for(9), 3);
        assert_eq!(config.mtry_for(10), 4);
        assert_eq!(config.mtry_for(1), 1);
    }

    #[test]
    fn test_mtry_clamped() {
        let config = RandomForestConfig {
            mtry: Some(50),
            ..RandomForestConfig::default()
        };
        assert_eq!(config.mtry_for(4), 4);
        let config = RandomForestConfig {
            mtry: Some(0),
            ..RandomForestConfig::default()
        };
        assert_eq!(config.mtry_for(4), 1);
    }
}
