use std::{error::Error, fmt, io};

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use classifier::{ArtifactError, ClassifierError};

use crate::schema::ErrorBody;

/// Startup failures. All of them prevent the server from starting.
#[derive(Debug)]
pub enum ServerError {
    InvalidConfig(String),
    Artifact(ArtifactError),
    Training(ClassifierError),
    LabelMismatch { labels: usize, classes: usize },
    FeatureMismatch { features: usize, expected: usize },
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            ServerError::Artifact(e) => write!(f, "cannot load model artifact: {e}"),
            ServerError::Training(e) => write!(f, "cannot train model: {e}"),
            ServerError::LabelMismatch { labels, classes } => write!(
                f,
                "got {labels} class labels for a model with {classes} classes"
            ),
            ServerError::FeatureMismatch { features, expected } => write!(
                f,
                "model expects {features} features, requests carry {expected}"
            ),
        }
    }
}

impl Error for ServerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ServerError::Artifact(e) => Some(e),
            ServerError::Training(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ArtifactError> for ServerError {
    fn from(value: ArtifactError) -> Self {
        Self::Artifact(value)
    }
}

impl From<ClassifierError> for ServerError {
    fn from(value: ClassifierError) -> Self {
        Self::Training(value)
    }
}

/// Boundary conversion for the binary's `main`.
impl From<ServerError> for io::Error {
    fn from(value: ServerError) -> Self {
        match value {
            ServerError::Artifact(ArtifactError::Io(e)) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}

/// Request failures, rendered as `{"error": "..."}` bodies.
#[derive(Debug)]
pub enum ApiError {
    /// At least one feature is absent or null.
    MissingFeatures,
    /// The body is not a JSON object with numeric features.
    InvalidBody(String),
    /// The model could not produce a class.
    Prediction(ClassifierError),
    /// The model produced a class that has no label.
    UnknownClass { class: usize, labels: usize },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::MissingFeatures => write!(f, "Missing features"),
            ApiError::InvalidBody(msg) => write!(f, "Invalid request body: {msg}"),
            ApiError::Prediction(e) => write!(f, "Prediction failed: {e}"),
            ApiError::UnknownClass { class, labels } => write!(
                f,
                "Prediction failed: class {class} has no label, model has {labels} labels"
            ),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiError::Prediction(e) => Some(e),
            _ => None,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingFeatures | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Prediction(_) | ApiError::UnknownClass { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}
