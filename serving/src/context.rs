use classifier::{Classifier, ForestParams, ModelArtifact, RandomForest, data};
use log::info;

use crate::{
    ApiError, ModelSource, ServerError,
    schema::{FeatureVector, N_FEATURES},
};

/// Everything a request handler needs to answer a prediction.
///
/// Built once at startup and never mutated afterwards, so handlers share it
/// without locking.
pub struct ServiceContext {
    classifier: Box<dyn Classifier>,
    labels: Vec<String>,
}

impl ServiceContext {
    /// Pairs a classifier with the label of each of its classes.
    ///
    /// # Errors
    /// Returns `ServerError::FeatureMismatch` if the classifier does not take
    /// the four request measurements, or `ServerError::LabelMismatch` if there
    /// is not exactly one label per class.
    pub fn new(classifier: Box<dyn Classifier>, labels: Vec<String>) -> Result<Self, ServerError> {
        if classifier.n_features() != N_FEATURES {
            return Err(ServerError::FeatureMismatch {
                features: classifier.n_features(),
                expected: N_FEATURES,
            });
        }
        if labels.len() != classifier.n_classes() {
            return Err(ServerError::LabelMismatch {
                labels: labels.len(),
                classes: classifier.n_classes(),
            });
        }

        Ok(Self { classifier, labels })
    }

    /// # Errors
    /// Same as `new`.
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ServerError> {
        let (model, labels) = artifact.into_parts();
        Self::new(Box::new(model), labels)
    }

    /// Obtains the model from `source`, either by fitting it on the bundled
    /// dataset or by reading an artifact.
    ///
    /// # Errors
    /// Returns `ServerError` if training fails or the artifact cannot be loaded.
    pub fn acquire(source: &ModelSource) -> Result<Self, ServerError> {
        match source {
            ModelSource::Train { seed } => {
                info!("training model on the bundled dataset");
                let dataset = data::iris();
                let params = ForestParams::default().with_seed(*seed);
                let forest = RandomForest::fit(&dataset, &params)?;
                Self::new(Box::new(forest), dataset.class_names().to_vec())
            }
            ModelSource::Load { path } => {
                info!("loading model from {}", path.display());
                let artifact = ModelArtifact::load(path)?;
                Self::from_artifact(artifact)
            }
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the label of the class predicted for `features`.
    ///
    /// # Errors
    /// Returns `ApiError::Prediction` if the classifier fails, or
    /// `ApiError::UnknownClass` if it emits a class index without a label.
    pub fn predict(&self, features: &FeatureVector) -> Result<&str, ApiError> {
        let class = self
            .classifier
            .predict(features.as_slice())
            .map_err(ApiError::Prediction)?;

        self.labels
            .get(class)
            .map(String::as_str)
            .ok_or(ApiError::UnknownClass {
                class,
                labels: self.labels.len(),
            })
    }
}
