use std::{
    fmt,
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{Classifier, ClassifierError, RandomForest, data::IRIS_FEATURE_NAMES};

/// Tag identifying the artifact kind.
pub const ARTIFACT_FORMAT: &str = "iris-random-forest";

/// Artifact schema version written by this build.
pub const ARTIFACT_VERSION: u32 = 1;

/// Errors produced while persisting or restoring a model artifact.
#[derive(Debug)]
pub enum ArtifactError {
    /// The file could not be opened, read or written.
    Io(io::Error),
    /// The file is not a valid artifact document.
    Malformed(serde_json::Error),
    /// The document is tagged with another artifact kind.
    UnsupportedFormat { found: String },
    /// The document was written by an incompatible schema version.
    UnsupportedVersion { found: u32, expected: u32 },
    /// The label sequence does not cover exactly the model's classes.
    LabelMismatch { labels: usize, classes: usize },
    /// The model does not take the Iris measurements as input.
    FeatureMismatch { features: usize, expected: usize },
    /// The embedded model is structurally invalid.
    Model(ClassifierError),
}

impl fmt::Display for ArtifactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactError::Io(e) => write!(f, "io error: {e}"),
            ArtifactError::Malformed(e) => write!(f, "malformed artifact: {e}"),
            ArtifactError::UnsupportedFormat { found } => {
                write!(f, "unsupported artifact format '{found}', expected '{ARTIFACT_FORMAT}'")
            }
            ArtifactError::UnsupportedVersion { found, expected } => {
                write!(f, "unsupported artifact version {found}, expected {expected}")
            }
            ArtifactError::LabelMismatch { labels, classes } => write!(
                f,
                "artifact has {labels} class labels but the model has {classes} classes"
            ),
            ArtifactError::FeatureMismatch { features, expected } => write!(
                f,
                "model expects {features} features, the Iris schema has {expected}"
            ),
            ArtifactError::Model(e) => write!(f, "invalid model: {e}"),
        }
    }
}

impl std::error::Error for ArtifactError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArtifactError::Io(e) => Some(e),
            ArtifactError::Malformed(e) => Some(e),
            ArtifactError::Model(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ArtifactError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ArtifactError {
    fn from(value: serde_json::Error) -> Self {
        Self::Malformed(value)
    }
}

impl From<ClassifierError> for ArtifactError {
    fn from(value: ClassifierError) -> Self {
        Self::Model(value)
    }
}

/// On-disk layout. The header fields are checked before the model is trusted.
#[derive(Serialize, Deserialize)]
struct Document<M> {
    format: String,
    version: u32,
    class_names: Vec<String>,
    model: M,
}

/// Only the header, so an unknown version is reported as such even when the
/// model layout changed.
#[derive(Deserialize)]
struct Header {
    format: String,
    version: u32,
}

/// A fitted forest together with the label of each of its classes.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifact {
    model: RandomForest,
    class_names: Vec<String>,
}

impl ModelArtifact {
    /// Pairs a fitted model with its class labels.
    ///
    /// # Errors
    /// Returns `ArtifactError::LabelMismatch` if there is not exactly one
    /// label per class, or `ArtifactError::FeatureMismatch` if the model does
    /// not take one input per Iris measurement.
    pub fn new(model: RandomForest, class_names: Vec<String>) -> Result<Self, ArtifactError> {
        if model.n_features() != IRIS_FEATURE_NAMES.len() {
            return Err(ArtifactError::FeatureMismatch {
                features: model.n_features(),
                expected: IRIS_FEATURE_NAMES.len(),
            });
        }
        if class_names.len() != model.n_classes() {
            return Err(ArtifactError::LabelMismatch {
                labels: class_names.len(),
                classes: model.n_classes(),
            });
        }

        Ok(Self { model, class_names })
    }

    pub fn model(&self) -> &RandomForest {
        &self.model
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn into_parts(self) -> (RandomForest, Vec<String>) {
        (self.model, self.class_names)
    }

    /// Writes the artifact as JSON, creating or truncating the file at `path`.
    ///
    /// # Errors
    /// Returns `ArtifactError::Io` if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ArtifactError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;

        info!(path:? = path, classes = self.class_names.len(); "saved model artifact");
        Ok(())
    }

    /// Reads and validates the artifact at `path`.
    ///
    /// # Errors
    /// Returns `ArtifactError` if the file is missing, malformed, tagged with
    /// another format or version, or internally inconsistent.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let value: serde_json::Value = serde_json::from_reader(reader)?;
        let artifact = Self::from_value(value)?;

        info!(path:? = path, classes = artifact.class_names.len(); "loaded model artifact");
        Ok(artifact)
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), ArtifactError> {
        let document = Document {
            format: ARTIFACT_FORMAT.to_string(),
            version: ARTIFACT_VERSION,
            class_names: self.class_names.clone(),
            model: &self.model,
        };

        serde_json::to_writer(writer, &document)?;
        Ok(())
    }

    /// Parses an artifact from an in-memory JSON document.
    ///
    /// # Errors
    /// Same as `load`, minus the I/O failures.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    fn from_value(value: serde_json::Value) -> Result<Self, ArtifactError> {
        let header = Header::deserialize(&value)?;
        if header.format != ARTIFACT_FORMAT {
            return Err(ArtifactError::UnsupportedFormat {
                found: header.format,
            });
        }
        if header.version != ARTIFACT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                found: header.version,
                expected: ARTIFACT_VERSION,
            });
        }

        let document: Document<RandomForest> = serde_json::from_value(value)?;
        document.model.validate()?;
        debug!(trees = document.model.trees().len(); "artifact model is consistent");

        Self::new(document.model, document.class_names)
    }
}
