pub mod artifact;
pub mod data;
mod error;
pub mod forest;
mod model;
pub mod tree;

pub use artifact::{ArtifactError, ModelArtifact};
pub use data::{DataError, Dataset};
pub use error::ClassifierError;
pub use forest::{ForestParams, MaxFeatures, RandomForest};
pub use model::Classifier;
