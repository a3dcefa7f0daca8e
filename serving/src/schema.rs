//! Request and response bodies of the HTTP API.

use classifier::data::IRIS_FEATURE_NAMES;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ApiError;

/// Number of measurements in every prediction request.
pub const N_FEATURES: usize = IRIS_FEATURE_NAMES.len();

/// Body of `POST /predict`.
///
/// Every field is optional at the wire level so that an absent or `null`
/// feature is reported as missing instead of as a decoding failure. Unknown
/// keys are ignored. Anything but a JSON object, or a feature that is not a
/// number, fails to decode.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct PredictRequest {
    pub sepal_length: Option<f64>,
    pub sepal_width: Option<f64>,
    pub petal_length: Option<f64>,
    pub petal_width: Option<f64>,
}

impl PredictRequest {
    /// Returns the feature vector if all four features are present.
    ///
    /// # Errors
    /// Returns `ApiError::MissingFeatures` otherwise.
    pub fn validate(&self) -> Result<FeatureVector, ApiError> {
        match (
            self.sepal_length,
            self.sepal_width,
            self.petal_length,
            self.petal_width,
        ) {
            (Some(sl), Some(sw), Some(pl), Some(pw)) => Ok(FeatureVector([sl, sw, pl, pw])),
            _ => Err(ApiError::MissingFeatures),
        }
    }
}

impl TryFrom<Map<String, Value>> for PredictRequest {
    type Error = String;

    fn try_from(body: Map<String, Value>) -> Result<Self, Self::Error> {
        let feature = |key: &str| match body.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| format!("{key} is not representable as a float")),
            Some(other) => Err(format!("{key} must be a number, got {other}")),
        };

        Ok(Self {
            sepal_length: feature("sepal_length")?,
            sepal_width: feature("sepal_width")?,
            petal_length: feature("petal_length")?,
            petal_width: feature("petal_width")?,
        })
    }
}

/// The four Iris measurements in training column order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; N_FEATURES]);

impl FeatureVector {
    pub fn new(sepal_length: f64, sepal_width: f64, petal_length: f64, petal_width: f64) -> Self {
        Self([sepal_length, sepal_width, petal_length, petal_width])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Body of a successful `POST /predict`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: String,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_request_keeps_column_order() {
        let req: PredictRequest = serde_json::from_str(
            r#"{"petal_width": 0.2, "sepal_length": 5.1, "petal_length": 1.4, "sepal_width": 3.5}"#,
        )
        .unwrap();

        let features = req.validate().unwrap();
        assert_eq!(features.as_slice(), &[5.1, 3.5, 1.4, 0.2]);
        assert_eq!(features, FeatureVector::new(5.1, 3.5, 1.4, 0.2));
    }

    #[test]
    fn absent_or_null_feature_is_missing() {
        let absent: PredictRequest =
            serde_json::from_str(r#"{"sepal_length": 5.1, "sepal_width": 3.5, "petal_length": 1.4}"#)
                .unwrap();
        assert!(matches!(absent.validate(), Err(ApiError::MissingFeatures)));

        let null: PredictRequest = serde_json::from_str(
            r#"{"sepal_length": 5.1, "sepal_width": null, "petal_length": 1.4, "petal_width": 0.2}"#,
        )
        .unwrap();
        assert!(matches!(null.validate(), Err(ApiError::MissingFeatures)));
    }

    #[test]
    fn integers_are_accepted_and_extra_keys_ignored() {
        let req: PredictRequest = serde_json::from_str(
            r#"{"sepal_length": 5, "sepal_width": 3, "petal_length": 1, "petal_width": 0, "id": "x"}"#,
        )
        .unwrap();
        assert_eq!(req.validate().unwrap().as_slice(), &[5.0, 3.0, 1.0, 0.0]);
    }

    #[test]
    fn non_numeric_feature_does_not_decode() {
        let err = serde_json::from_str::<PredictRequest>(r#"{"sepal_length": "long"}"#).unwrap_err();
        assert!(err.to_string().contains("sepal_length must be a number"), "{err}");
    }

    #[test]
    fn positional_array_does_not_decode() {
        let res = serde_json::from_str::<PredictRequest>("[5.1, 3.5, 1.4, 0.2]");
        assert!(res.is_err());
    }
}
