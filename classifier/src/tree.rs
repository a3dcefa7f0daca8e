use log::debug;
use ndarray::ArrayView2;
use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use crate::{ClassifierError, Dataset};

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeParams {
    /// Number of non-constant features examined per split.
    pub max_features: usize,
    /// Maximum depth of a leaf, the root being at depth 0.
    pub max_depth: Option<usize>,
    /// Nodes with fewer samples than this become leaves.
    pub min_samples_split: usize,
}

/// A node of a fitted tree. Children always come after their parent in the
/// node list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        distribution: Vec<f64>,
    },
}

/// A CART classification tree grown on Gini impurity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Grows a tree on the given samples of `data`.
    ///
    /// # Args
    /// * `data` - The training dataset.
    /// * `samples` - Row indices to train on; repetitions act as weights.
    /// * `params` - Growth limits.
    /// * `rng` - Source of randomness for the feature visiting order.
    ///
    /// # Errors
    /// Returns `ClassifierError::InvalidParams` if `samples` is empty or the
    /// parameters are out of range.
    pub fn fit<R: Rng>(
        data: &Dataset,
        mut samples: Vec<usize>,
        params: &TreeParams,
        rng: &mut R,
    ) -> Result<Self, ClassifierError> {
        if samples.is_empty() {
            return Err(ClassifierError::InvalidParams("a tree needs at least one sample"));
        }
        if params.max_features == 0 {
            return Err(ClassifierError::InvalidParams("max_features must be greater than 0"));
        }
        if params.min_samples_split < 2 {
            return Err(ClassifierError::InvalidParams("min_samples_split must be at least 2"));
        }

        let mut grower = Grower {
            features: data.features(),
            targets: data.targets(),
            n_classes: data.n_classes(),
            params,
            rng,
            nodes: Vec::new(),
        };

        grower.grow(&mut samples, 0);
        let nodes = grower.nodes;
        debug!(nodes = nodes.len(); "grew tree");

        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns the class distribution of the leaf `features` falls into.
    ///
    /// `features` must be at least as long as the largest split feature index;
    /// `validate` guarantees this for trees that passed it.
    pub fn distribution(&self, features: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                Node::Leaf { distribution } => return distribution,
            }
        }
    }

    /// Returns the length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut depths = vec![0; self.nodes.len()];
        let mut max = 0;
        for (idx, node) in self.nodes.iter().enumerate() {
            if let Node::Split { left, right, .. } = node {
                depths[*left] = depths[idx] + 1;
                depths[*right] = depths[idx] + 1;
                max = max.max(depths[idx] + 1);
            }
        }
        max
    }

    /// Checks the structural invariants of a tree that did not come from `fit`.
    ///
    /// # Errors
    /// Returns `ClassifierError::CorruptModel` describing the first violation.
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), ClassifierError> {
        if self.nodes.is_empty() {
            return Err(ClassifierError::CorruptModel("tree has no nodes".into()));
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= n_features {
                        return Err(ClassifierError::CorruptModel(format!(
                            "node {idx} splits on feature {feature}, but there are {n_features}"
                        )));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(ClassifierError::CorruptModel(format!(
                                "node {idx} points to invalid child {child}"
                            )));
                        }
                    }
                }
                Node::Leaf { distribution } => {
                    if distribution.len() != n_classes {
                        return Err(ClassifierError::CorruptModel(format!(
                            "leaf {idx} has {} classes, expected {n_classes}",
                            distribution.len()
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

struct Split {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

struct Grower<'a, R> {
    features: ArrayView2<'a, f64>,
    targets: &'a [usize],
    n_classes: usize,
    params: &'a TreeParams,
    rng: &'a mut R,
    nodes: Vec<Node>,
}

impl<R: Rng> Grower<'_, R> {
    /// Grows the subtree for `samples` and returns the index of its root.
    fn grow(&mut self, samples: &mut [usize], depth: usize) -> usize {
        let idx = self.nodes.len();
        let counts = self.class_counts(samples);

        let pure = counts.iter().filter(|&&c| c > 0.0).count() <= 1;
        let too_small = samples.len() < self.params.min_samples_split;
        let too_deep = self.params.max_depth.is_some_and(|max| depth >= max);

        let split = if pure || too_small || too_deep {
            None
        } else {
            self.best_split(samples, &counts)
        };

        let Some(split) = split else {
            self.nodes.push(leaf(&counts, samples.len()));
            return idx;
        };

        // placeholder, replaced once both children exist
        self.nodes.push(Node::Leaf {
            distribution: Vec::new(),
        });

        let mid = self.partition(samples, split.feature, split.threshold);
        let (left_samples, right_samples) = samples.split_at_mut(mid);
        let left = self.grow(left_samples, depth + 1);
        let right = self.grow(right_samples, depth + 1);

        self.nodes[idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };

        idx
    }

    fn class_counts(&self, samples: &[usize]) -> Vec<f64> {
        let mut counts = vec![0.0; self.n_classes];
        for &s in samples {
            counts[self.targets[s]] += 1.0;
        }
        counts
    }

    fn best_split(&mut self, samples: &[usize], counts: &[f64]) -> Option<Split> {
        let mut order: Vec<usize> = (0..self.features.ncols()).collect();
        order.shuffle(&mut *self.rng);

        let n = samples.len() as f64;
        let mut sorted: Vec<(f64, usize)> = Vec::with_capacity(samples.len());
        let mut best: Option<Split> = None;
        let mut visited = 0;

        for feature in order {
            if visited >= self.params.max_features {
                break;
            }

            sorted.clear();
            sorted.extend(
                samples
                    .iter()
                    .map(|&s| (self.features[[s, feature]], self.targets[s])),
            );
            sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

            let (lo, hi) = (sorted[0].0, sorted[sorted.len() - 1].0);
            if lo >= hi {
                continue;
            }
            visited += 1;

            let mut left = vec![0.0; self.n_classes];
            let mut right = counts.to_vec();

            for i in 0..sorted.len() - 1 {
                let (value, target) = sorted[i];
                left[target] += 1.0;
                right[target] -= 1.0;

                let next = sorted[i + 1].0;
                if value >= next {
                    continue;
                }

                let n_left = (i + 1) as f64;
                let n_right = n - n_left;
                let impurity = (n_left * gini(&left, n_left) + n_right * gini(&right, n_right)) / n;

                if best.as_ref().is_none_or(|b| impurity < b.impurity) {
                    let mut threshold = value + (next - value) / 2.0;
                    if threshold >= next {
                        threshold = value;
                    }
                    best = Some(Split {
                        feature,
                        threshold,
                        impurity,
                    });
                }
            }
        }

        best
    }

    /// Moves samples going left to the front and returns how many there are.
    fn partition(&self, samples: &mut [usize], feature: usize, threshold: f64) -> usize {
        let mut mid = 0;
        for i in 0..samples.len() {
            if self.features[[samples[i], feature]] <= threshold {
                samples.swap(i, mid);
                mid += 1;
            }
        }
        mid
    }
}

fn gini(counts: &[f64], n: f64) -> f64 {
    1.0 - counts.iter().map(|c| (c / n).powi(2)).sum::<f64>()
}

fn leaf(counts: &[f64], n: usize) -> Node {
    let n = n as f64;
    Node::Leaf {
        distribution: counts.iter().map(|c| c / n).collect(),
    }
}
