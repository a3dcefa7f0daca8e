use log::{debug, info};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Classifier, ClassifierError, DataError, Dataset,
    tree::{DecisionTree, TreeParams},
};

/// How many features each split examines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`, at least one.
    #[default]
    Sqrt,
    /// Every feature.
    All,
    /// A fixed number, capped at the number of features.
    Fixed(usize),
}

impl MaxFeatures {
    fn resolve(self, n_features: usize) -> usize {
        match self {
            MaxFeatures::Sqrt => ((n_features as f64).sqrt() as usize).max(1),
            MaxFeatures::All => n_features,
            MaxFeatures::Fixed(k) => k.min(n_features),
        }
    }
}

/// Hyperparameters of a random forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_features: MaxFeatures,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub bootstrap: bool,
    /// `None` seeds from the OS, making every fit different.
    pub seed: Option<u64>,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_features: MaxFeatures::Sqrt,
            max_depth: None,
            min_samples_split: 2,
            bootstrap: true,
            seed: None,
        }
    }
}

impl ForestParams {
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    fn generate_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

/// A bagged ensemble of CART trees. Predictions average the trees' leaf
/// distributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    n_features: usize,
    n_classes: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fits a forest on every sample of `data`.
    ///
    /// # Args
    /// * `data` - The training dataset.
    /// * `params` - The forest hyperparameters.
    ///
    /// # Errors
    /// Returns `ClassifierError` if the dataset is empty or a parameter is out
    /// of range.
    pub fn fit(data: &Dataset, params: &ForestParams) -> Result<Self, ClassifierError> {
        if data.is_empty() || data.n_features() == 0 {
            return Err(DataError::Empty.into());
        }
        if params.n_trees == 0 {
            return Err(ClassifierError::InvalidParams("n_trees must be greater than 0"));
        }

        let tree_params = TreeParams {
            max_features: params.max_features.resolve(data.n_features()),
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
        };

        debug!(
            samples = data.len(),
            features = data.n_features(),
            trees = params.n_trees;
            "fitting random forest"
        );

        let mut rng = params.generate_rng();
        let n = data.len();
        let trees = (0..params.n_trees)
            .map(|_| {
                let samples: Vec<usize> = if params.bootstrap {
                    (0..n).map(|_| rng.random_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                DecisionTree::fit(data, samples, &tree_params, &mut rng)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let deepest = trees.iter().map(DecisionTree::depth).max().unwrap_or(0);
        info!(trees = trees.len(), samples = n, deepest = deepest; "fitted random forest");

        Ok(Self {
            n_features: data.n_features(),
            n_classes: data.n_classes(),
            trees,
        })
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Returns the class probabilities for `features`, averaged over all trees.
    ///
    /// # Errors
    /// Returns `ClassifierError::ShapeMismatch` if `features` has the wrong length.
    pub fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ClassifierError> {
        if features.len() != self.n_features {
            return Err(ClassifierError::ShapeMismatch {
                what: "features",
                got: features.len(),
                expected: self.n_features,
            });
        }

        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (p, q) in proba.iter_mut().zip(tree.distribution(features)) {
                *p += q;
            }
        }

        let n_trees = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        Ok(proba)
    }

    /// Returns the fraction of samples in `data` this forest labels correctly.
    ///
    /// # Errors
    /// Returns `ClassifierError::ShapeMismatch` if `data` has a different
    /// number of features.
    pub fn accuracy(&self, data: &Dataset) -> Result<f64, ClassifierError> {
        if data.is_empty() {
            return Err(DataError::Empty.into());
        }

        let mut hits = 0;
        for (i, &target) in data.targets().iter().enumerate() {
            let x = data.sample(i).to_vec();
            if self.predict(&x)? == target {
                hits += 1;
            }
        }

        Ok(hits as f64 / data.len() as f64)
    }

    /// Checks every tree of a forest that did not come from `fit`.
    ///
    /// # Errors
    /// Returns `ClassifierError::CorruptModel` on the first violation found.
    pub fn validate(&self) -> Result<(), ClassifierError> {
        if self.trees.is_empty() {
            return Err(ClassifierError::CorruptModel("forest has no trees".into()));
        }
        if self.n_classes == 0 {
            return Err(ClassifierError::CorruptModel("forest has no classes".into()));
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.n_classes)
                .map_err(|e| ClassifierError::CorruptModel(format!("tree {i}: {e}")))?;
        }

        Ok(())
    }
}

impl Classifier for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict(&self, features: &[f64]) -> Result<usize, ClassifierError> {
        let proba = self.predict_proba(features)?;

        // ties go to the lowest class index
        let mut best = 0;
        for (class, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = class;
            }
        }

        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;
    use crate::data::iris;

    #[test]
    fn sqrt_max_features() {
        assert_eq!(MaxFeatures::Sqrt.resolve(4), 2);
        assert_eq!(MaxFeatures::Sqrt.resolve(1), 1);
        assert_eq!(MaxFeatures::Sqrt.resolve(10), 3);
        assert_eq!(MaxFeatures::All.resolve(4), 4);
        assert_eq!(MaxFeatures::Fixed(9).resolve(4), 4);
    }

    #[test]
    fn default_params_match_stock_forest() {
        let params = ForestParams::default();
        assert_eq!(params.n_trees, 100);
        assert_eq!(params.max_features, MaxFeatures::Sqrt);
        assert_eq!(params.max_depth, None);
        assert_eq!(params.min_samples_split, 2);
        assert!(params.bootstrap);
    }

    #[test]
    fn fit_rejects_zero_trees() {
        let params = ForestParams::default().with_n_trees(0);
        let err = RandomForest::fit(&iris(), &params).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidParams(_)));
    }

    #[test]
    fn fit_rejects_empty_dataset() {
        let data = Dataset::new(Array2::zeros((0, 4)), vec![], vec!["a".into()]).unwrap();
        let err = RandomForest::fit(&data, &ForestParams::default()).unwrap_err();
        assert!(matches!(err, ClassifierError::Data(DataError::Empty)));
    }

    #[test]
    fn fit_rejects_zero_max_features() {
        let params = ForestParams {
            max_features: MaxFeatures::Fixed(0),
            ..ForestParams::default()
        };
        let err = RandomForest::fit(&iris(), &params).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidParams(_)));
    }

    #[test]
    fn predict_rejects_wrong_length() {
        let params = ForestParams::default().with_n_trees(3).with_seed(Some(1));
        let forest = RandomForest::fit(&iris(), &params).unwrap();
        let err = forest.predict(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            ClassifierError::ShapeMismatch { got: 3, expected: 4, .. }
        ));
    }

    #[test]
    fn probabilities_sum_to_one() {
        let params = ForestParams::default().with_n_trees(10).with_seed(Some(5));
        let forest = RandomForest::fit(&iris(), &params).unwrap();
        let proba = forest.predict_proba(&[6.0, 2.9, 4.5, 1.5]).unwrap();
        assert_eq!(proba.len(), 3);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn same_seed_same_forest() {
        let params = ForestParams::default().with_n_trees(10).with_seed(Some(42));
        let a = RandomForest::fit(&iris(), &params).unwrap();
        let b = RandomForest::fit(&iris(), &params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn validate_accepts_fitted_forest() {
        let params = ForestParams::default().with_n_trees(5).with_seed(Some(9));
        let forest = RandomForest::fit(&iris(), &params).unwrap();
        assert!(forest.validate().is_ok());
        assert_eq!(forest.trees().len(), 5);
    }
}
