use crate::ClassifierError;

/// A fitted model mapping a feature vector to one of a fixed set of classes.
///
/// A `Classifier` only answers queries. It does not:
/// - own class labels,
/// - know how it was trained,
/// - mutate itself while predicting.
///
/// Implementations must be safe to share between request handlers.
pub trait Classifier: Send + Sync {
    /// Returns the length of the feature vectors accepted by `predict`.
    fn n_features(&self) -> usize;

    /// Returns the number of distinct classes this model can emit.
    fn n_classes(&self) -> usize;

    /// Predicts the class index for a single feature vector.
    ///
    /// # Errors
    /// Returns `ClassifierError::ShapeMismatch` if `features` has the wrong length.
    fn predict(&self, features: &[f64]) -> Result<usize, ClassifierError>;
}
