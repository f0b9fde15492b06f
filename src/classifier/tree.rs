use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::cmp::Ordering;

/// Tree-growing parameters resolved by the forest.
pub(crate) struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub mtry: usize,
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Leaf {
        class: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A single CART decision tree.
///
/// Axis-aligned threshold splits chosen by Gini impurity decrease over a
/// random feature subset; leaves predict the majority class of their
/// samples. Nodes are stored flat, children referenced by index.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    /// Impurity decrease accumulated per feature while growing
    pub(crate) importances: Vec<f64>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl DecisionTree {
    /// Grow a tree on the given bootstrap sample.
    ///
    /// `sample` holds indices into `x`/`y` (with repetition, as drawn by
    /// the bootstrap). Caller guarantees `x` is rectangular, `sample` is
    /// non-empty and every label is below `n_classes`.
    pub(crate) fn fit(
        x: &[Vec<f64>],
        y: &[usize],
        n_classes: usize,
        sample: &[usize],
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let n_features = x[0].len();
        let mut tree = DecisionTree {
            nodes: Vec::new(),
            importances: vec![0.0; n_features],
        };
        let root_size = sample.len() as f64;
        tree.grow(x, y, n_classes, sample.to_vec(), 0, params, rng, root_size);
        tree
    }

    /// Predict the class of one feature row.
    pub fn predict(&self, row: &[f64]) -> usize {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                Node::Leaf { class } => return class,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[feature] <= threshold { left } else { right };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[allow(clippy::too_many_arguments)]
    fn grow(
        &mut self,
        x: &[Vec<f64>],
        y: &[usize],
        n_classes: usize,
        indices: Vec<usize>,
        depth: usize,
        params: &TreeParams,
        rng: &mut StdRng,
        root_size: f64,
    ) -> usize {
        let counts = class_counts(y, &indices, n_classes);
        let node_gini = gini(&counts, indices.len());
        let majority = majority_class(&counts);

        if depth >= params.max_depth
            || indices.len() < params.min_samples_split
            || node_gini <= 0.0
        {
            let index = self.nodes.len();
            self.nodes.push(Node::Leaf { class: majority });
            return index;
        }

        let best = match self.find_split(x, y, n_classes, &indices, node_gini, params.mtry, rng) {
            Some(split) => split,
            // all candidate features constant over this node
            None => {
                let index = self.nodes.len();
                self.nodes.push(Node::Leaf { class: majority });
                return index;
            }
        };

        self.importances[best.feature] += (indices.len() as f64 / root_size) * best.gain;

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| x[i][best.feature] <= best.threshold);

        // reserve the slot so children index past it
        let index = self.nodes.len();
        self.nodes.push(Node::Leaf { class: majority });
        let left = self.grow(x, y, n_classes, left_indices, depth + 1, params, rng, root_size);
        let right = self.grow(x, y, n_classes, right_indices, depth + 1, params, rng, root_size);
        self.nodes[index] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        index
    }

    #[allow(clippy::too_many_arguments)]
    fn find_split(
        &self,
        x: &[Vec<f64>],
        y: &[usize],
        n_classes: usize,
        indices: &[usize],
        node_gini: f64,
        mtry: usize,
        rng: &mut StdRng,
    ) -> Option<BestSplit> {
        let n_features = x[0].len();
        let mut features: Vec<usize> = (0..n_features).collect();
        features.shuffle(rng);
        features.truncate(mtry);

        let n = indices.len();
        let total_counts = class_counts(y, indices, n_classes);
        let mut best: Option<BestSplit> = None;

        for &feature in &features {
            let mut order = indices.to_vec();
            order.sort_by(|&a, &b| {
                x[a][feature]
                    .partial_cmp(&x[b][feature])
                    .unwrap_or(Ordering::Equal)
            });

            let mut left_counts = vec![0usize; n_classes];
            for k in 0..n - 1 {
                left_counts[y[order[k]]] += 1;
                let value = x[order[k]][feature];
                let next = x[order[k + 1]][feature];
                if next <= value {
                    continue;
                }

                let n_left = k + 1;
                let n_right = n - n_left;
                let right_counts: Vec<usize> = total_counts
                    .iter()
                    .zip(&left_counts)
                    .map(|(t, l)| t - l)
                    .collect();
                let weighted = (n_left as f64 / n as f64) * gini(&left_counts, n_left)
                    + (n_right as f64 / n as f64) * gini(&right_counts, n_right);
                let gain = node_gini - weighted;
                if gain > 1e-12 && best.as_ref().map_or(true, |b| gain > b.gain) {
                    best = Some(BestSplit {
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

/// Gini impurity of a class count vector over `n` samples.
fn gini(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}

fn class_counts(y: &[usize], indices: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &i in indices {
        counts[y[i]] += 1;
    }
    counts
}

/// First class with the highest count.
fn majority_class(counts: &[usize]) -> usize {
    let mut best = 0;
    for (class, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = class;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn params() -> TreeParams {
        TreeParams {
            max_depth: 8,
            min_samples_split: 2,
            mtry: 2,
        }
    }

    #[test]
    fn test_gini() {
        assert_eq!(gini(&[4, 0], 4), 0.0);
        assert!((gini(&[2, 2], 4) - 0.5).abs() < 1e-12);
        assert_eq!(gini(&[], 0), 0.0);
    }

    #[test]
    fn test_majority_class() {
        assert_eq!(majority_class(&[1, 5, 3]), 1);
        assert_eq!(majority_class(&[2, 2]), 0);
    }

    #[test]
    fn test_tree_separates_classes() {
        // two clusters along the first feature
        let x = vec![
            vec![0.1, 1.0],
            vec![0.2, 0.9],
            vec![0.15, 1.1],
            vec![0.9, 0.1],
            vec![0.8, 0.2],
            vec![0.95, 0.15],
        ];
        let y = vec![0, 0, 0, 1, 1, 1];
        let sample: Vec<usize> = (0..x.len()).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let tree = DecisionTree::fit(&x, &y, 2, &sample, &params(), &mut rng);

        for (row, &label) in x.iter().zip(&y) {
            assert_eq!(tree.predict(row), label);
        }
        assert!(tree.node_count() >= 3);
    }

    #[test]
    fn test_pure_node_is_leaf() {
        let x = vec![vec![0.1], vec![0.2], vec![0.3]];
        let y = vec![1, 1, 1];
        let sample: Vec<usize> = (0..3).collect();
        let mut rng = StdRng::seed_from_u64(1);
        let tree = DecisionTree::fit(&x, &y, 2, &sample, &params(), &mut rng);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict(&[5.0]), 1);
    }

    #[test]
    fn test_constant_features_fall_back_to_majority() {
        let x = vec![vec![1.0], vec![1.0], vec![1.0]];
        let y = vec![0, 1, 1];
        let sample: Vec<usize> = (0..3).collect();
        let mut rng = StdRng::seed_from_u64(1);
        let tree = DecisionTree::fit(&x, &y, 2, &sample, &params(), &mut rng);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict(&[1.0]), 1);
    }
}
