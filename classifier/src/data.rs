use std::fmt;

use ndarray::{Array2, ArrayView1, ArrayView2};

/// Errors produced while assembling a dataset.
#[derive(Debug)]
pub enum DataError {
    /// The feature matrix and the target vector disagree on the number of samples.
    LengthMismatch { rows: usize, targets: usize },

    /// A target does not index any of the known class names.
    UnknownClass { index: usize, target: usize, classes: usize },

    /// The dataset has no samples or no features.
    Empty,
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::LengthMismatch { rows, targets } => {
                write!(f, "feature matrix has {rows} rows but there are {targets} targets")
            }
            DataError::UnknownClass { index, target, classes } => write!(
                f,
                "sample {index} has target {target}, but only {classes} classes are known"
            ),
            DataError::Empty => write!(f, "dataset has no samples or no features"),
        }
    }
}

impl std::error::Error for DataError {}

/// A labelled, in-memory classification dataset.
///
/// Row `i` of `features` is labelled with `targets[i]`, which in turn indexes
/// `class_names`.
#[derive(Debug, Clone)]
pub struct Dataset {
    features: Array2<f64>,
    targets: Vec<usize>,
    class_names: Vec<String>,
}

impl Dataset {
    /// Creates a new `Dataset`.
    ///
    /// # Args
    /// * `features` - A `(samples, features)` matrix.
    /// * `targets` - One class index per sample.
    /// * `class_names` - The label of each class index.
    ///
    /// # Errors
    /// Returns `DataError` if the row count and target count differ or a
    /// target has no class name.
    pub fn new(
        features: Array2<f64>,
        targets: Vec<usize>,
        class_names: Vec<String>,
    ) -> Result<Self, DataError> {
        if features.nrows() != targets.len() {
            return Err(DataError::LengthMismatch {
                rows: features.nrows(),
                targets: targets.len(),
            });
        }

        if let Some((index, &target)) = targets
            .iter()
            .enumerate()
            .find(|(_, t)| **t >= class_names.len())
        {
            return Err(DataError::UnknownClass {
                index,
                target,
                classes: class_names.len(),
            });
        }

        Ok(Self {
            features,
            targets,
            class_names,
        })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn n_classes(&self) -> usize {
        self.class_names.len()
    }

    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.features.view()
    }

    /// Returns the feature vector of sample `index`.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    pub fn sample(&self, index: usize) -> ArrayView1<'_, f64> {
        self.features.row(index)
    }

    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }
}

/// Names of the Iris features, in column order.
pub const IRIS_FEATURE_NAMES: [&str; 4] =
    ["sepal_length", "sepal_width", "petal_length", "petal_width"];

/// Names of the Iris classes, indexed by target.
pub const IRIS_CLASS_NAMES: [&str; 3] = ["setosa", "versicolor", "virginica"];

const SAMPLES_PER_CLASS: usize = 50;

/// Returns the bundled Iris dataset: 150 samples, 4 features, 3 classes of 50
/// samples each, stored in class order.
pub fn iris() -> Dataset {
    let features = Array2::from(IRIS.to_vec());
    let targets = (0..IRIS.len()).map(|i| i / SAMPLES_PER_CLASS).collect();
    let class_names = IRIS_CLASS_NAMES.iter().map(|s| s.to_string()).collect();

    Dataset {
        features,
        targets,
        class_names,
    }
}

#[rustfmt::skip]
const IRIS: [[f64; 4]; 150] = [
    // setosa
    [5.1, 3.5, 1.4, 0.2], [4.9, 3.0, 1.4, 0.2], [4.7, 3.2, 1.3, 0.2], [4.6, 3.1, 1.5, 0.2],
    [5.0, 3.6, 1.4, 0.2], [5.4, 3.9, 1.7, 0.4], [4.6, 3.4, 1.4, 0.3], [5.0, 3.4, 1.5, 0.2],
    [4.4, 2.9, 1.4, 0.2], [4.9, 3.1, 1.5, 0.1], [5.4, 3.7, 1.5, 0.2], [4.8, 3.4, 1.6, 0.2],
    [4.8, 3.0, 1.4, 0.1], [4.3, 3.0, 1.1, 0.1], [5.8, 4.0, 1.2, 0.2], [5.7, 4.4, 1.5, 0.4],
    [5.4, 3.9, 1.3, 0.4], [5.1, 3.5, 1.4, 0.3], [5.7, 3.8, 1.7, 0.3], [5.1, 3.8, 1.5, 0.3],
    [5.4, 3.4, 1.7, 0.2], [5.1, 3.7, 1.5, 0.4], [4.6, 3.6, 1.0, 0.2], [5.1, 3.3, 1.7, 0.5],
    [4.8, 3.4, 1.9, 0.2], [5.0, 3.0, 1.6, 0.2], [5.0, 3.4, 1.6, 0.4], [5.2, 3.5, 1.5, 0.2],
    [5.2, 3.4, 1.4, 0.2], [4.7, 3.2, 1.6, 0.2], [4.8, 3.1, 1.6, 0.2], [5.4, 3.4, 1.5, 0.4],
    [5.2, 4.1, 1.5, 0.1], [5.5, 4.2, 1.4, 0.2], [4.9, 3.1, 1.5, 0.2], [5.0, 3.2, 1.2, 0.2],
    [5.5, 3.5, 1.3, 0.2], [4.9, 3.6, 1.4, 0.1], [4.4, 3.0, 1.3, 0.2], [5.1, 3.4, 1.5, 0.2],
    [5.0, 3.5, 1.3, 0.3], [4.5, 2.3, 1.3, 0.3], [4.4, 3.2, 1.3, 0.2], [5.0, 3.5, 1.6, 0.6],
    [5.1, 3.8, 1.9, 0.4], [4.8, 3.0, 1.4, 0.3], [5.1, 3.8, 1.6, 0.2], [4.6, 3.2, 1.4, 0.2],
    [5.3, 3.7, 1.5, 0.2], [5.0, 3.3, 1.4, 0.2],
    // versicolor
    [7.0, 3.2, 4.7, 1.4], [6.4, 3.2, 4.5, 1.5], [6.9, 3.1, 4.9, 1.5], [5.5, 2.3, 4.0, 1.3],
    [6.5, 2.8, 4.6, 1.5], [5.7, 2.8, 4.5, 1.3], [6.3, 3.3, 4.7, 1.6], [4.9, 2.4, 3.3, 1.0],
    [6.6, 2.9, 4.6, 1.3], [5.2, 2.7, 3.9, 1.4], [5.0, 2.0, 3.5, 1.0], [5.9, 3.0, 4.2, 1.5],
    [6.0, 2.2, 4.0, 1.0], [6.1, 2.9, 4.7, 1.4], [5.6, 2.9, 3.6, 1.3], [6.7, 3.1, 4.4, 1.4],
    [5.6, 3.0, 4.5, 1.5], [5.8, 2.7, 4.1, 1.0], [6.2, 2.2, 4.5, 1.5], [5.6, 2.5, 3.9, 1.1],
    [5.9, 3.2, 4.8, 1.8], [6.1, 2.8, 4.0, 1.3], [6.3, 2.5, 4.9, 1.5], [6.1, 2.8, 4.7, 1.2],
    [6.4, 2.9, 4.3, 1.3], [6.6, 3.0, 4.4, 1.4], [6.8, 2.8, 4.8, 1.4], [6.7, 3.0, 5.0, 1.7],
    [6.0, 2.9, 4.5, 1.5], [5.7, 2.6, 3.5, 1.0], [5.5, 2.4, 3.8, 1.1], [5.5, 2.4, 3.7, 1.0],
    [5.8, 2.7, 3.9, 1.2], [6.0, 2.7, 5.1, 1.6], [5.4, 3.0, 4.5, 1.5], [6.0, 3.4, 4.5, 1.6],
    [6.7, 3.1, 4.7, 1.5], [6.3, 2.3, 4.4, 1.3], [5.6, 3.0, 4.1, 1.3], [5.5, 2.5, 4.0, 1.3],
    [5.5, 2.6, 4.4, 1.2], [6.1, 3.0, 4.6, 1.4], [5.8, 2.6, 4.0, 1.2], [5.0, 2.3, 3.3, 1.0],
    [5.6, 2.7, 4.2, 1.3], [5.7, 3.0, 4.2, 1.2], [5.7, 2.9, 4.2, 1.3], [6.2, 2.9, 4.3, 1.3],
    [5.1, 2.5, 3.0, 1.1], [5.7, 2.8, 4.1, 1.3],
    // virginica
    [6.3, 3.3, 6.0, 2.5], [5.8, 2.7, 5.1, 1.9], [7.1, 3.0, 5.9, 2.1], [6.3, 2.9, 5.6, 1.8],
    [6.5, 3.0, 5.8, 2.2], [7.6, 3.0, 6.6, 2.1], [4.9, 2.5, 4.5, 1.7], [7.3, 2.9, 6.3, 1.8],
    [6.7, 2.5, 5.8, 1.8], [7.2, 3.6, 6.1, 2.5], [6.5, 3.2, 5.1, 2.0], [6.4, 2.7, 5.3, 1.9],
    [6.8, 3.0, 5.5, 2.1], [5.7, 2.5, 5.0, 2.0], [5.8, 2.8, 5.1, 2.4], [6.4, 3.2, 5.3, 2.3],
    [6.5, 3.0, 5.5, 1.8], [7.7, 3.8, 6.7, 2.2], [7.7, 2.6, 6.9, 2.3], [6.0, 2.2, 5.0, 1.5],
    [6.9, 3.2, 5.7, 2.3], [5.6, 2.8, 4.9, 2.0], [7.7, 2.8, 6.7, 2.0], [6.3, 2.7, 4.9, 1.8],
    [6.7, 3.3, 5.7, 2.1], [7.2, 3.2, 6.0, 1.8], [6.2, 2.8, 4.8, 1.8], [6.1, 3.0, 4.9, 1.8],
    [6.4, 2.8, 5.6, 2.1], [7.2, 3.0, 5.8, 1.6], [7.4, 2.8, 6.1, 1.9], [7.9, 3.8, 6.4, 2.0],
    [6.4, 2.8, 5.6, 2.2], [6.3, 2.8, 5.1, 1.5], [6.1, 2.6, 5.6, 1.4], [7.7, 3.0, 6.1, 2.3],
    [6.3, 3.4, 5.6, 2.4], [6.4, 3.1, 5.5, 1.8], [6.0, 3.0, 4.8, 1.8], [6.9, 3.1, 5.4, 2.1],
    [6.7, 3.1, 5.6, 2.4], [6.9, 3.1, 5.1, 2.3], [5.8, 2.7, 5.1, 1.9], [6.8, 3.2, 5.9, 2.3],
    [6.7, 3.3, 5.7, 2.5], [6.7, 3.0, 5.2, 2.3], [6.3, 2.5, 5.0, 1.9], [6.5, 3.0, 5.2, 2.0],
    [6.2, 3.4, 5.4, 2.3], [5.9, 3.0, 5.1, 1.8],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iris_has_fifty_samples_per_class() {
        let data = iris();
        assert_eq!(data.len(), 150);
        assert_eq!(data.n_features(), 4);
        assert_eq!(data.n_classes(), 3);

        for class in 0..3 {
            let count = data.targets().iter().filter(|&&t| t == class).count();
            assert_eq!(count, 50);
        }
    }

    #[test]
    fn iris_first_and_last_samples() {
        let data = iris();
        assert_eq!(data.sample(0).to_vec(), vec![5.1, 3.5, 1.4, 0.2]);
        assert_eq!(data.targets()[0], 0);
        assert_eq!(data.sample(149).to_vec(), vec![5.9, 3.0, 5.1, 1.8]);
        assert_eq!(data.targets()[149], 2);
    }

    #[test]
    fn new_rejects_length_mismatch() {
        let features = Array2::zeros((3, 2));
        let err = Dataset::new(features, vec![0, 1], vec!["a".into(), "b".into()]).unwrap_err();
        assert!(matches!(err, DataError::LengthMismatch { rows: 3, targets: 2 }));
    }

    #[test]
    fn new_rejects_unknown_class() {
        let features = Array2::zeros((2, 2));
        let err = Dataset::new(features, vec![0, 2], vec!["a".into(), "b".into()]).unwrap_err();
        assert!(matches!(
            err,
            DataError::UnknownClass { index: 1, target: 2, classes: 2 }
        ));
    }
}
