use std::{
    fs,
    path::{Path, PathBuf},
};

use classifier::{
    ArtifactError, Classifier, ClassifierError, ForestParams, ModelArtifact, RandomForest, data,
};
use serving::{ModelSource, ServerError, ServiceContext, schema::FeatureVector};

/// Answers class 0 for any input of its declared width.
struct Fixed {
    n_features: usize,
}

impl Classifier for Fixed {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        3
    }

    fn predict(&self, _features: &[f64]) -> Result<usize, ClassifierError> {
        Ok(0)
    }
}

fn labels() -> Vec<String> {
    data::IRIS_CLASS_NAMES.iter().map(|s| s.to_string()).collect()
}

fn scratch_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("serving-{}-{name}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir.join("model.json")
}

fn write_artifact(path: &Path) -> ModelArtifact {
    let dataset = data::iris();
    let params = ForestParams::default().with_seed(Some(11));
    let forest = RandomForest::fit(&dataset, &params).unwrap();
    let artifact = ModelArtifact::new(forest, dataset.class_names().to_vec()).unwrap();
    artifact.save(path).unwrap();
    artifact
}

#[test]
fn loaded_model_answers_like_the_trained_one() {
    let path = scratch_path("load");
    let artifact = write_artifact(&path);

    let loaded = ServiceContext::acquire(&ModelSource::Load { path: path.clone() }).unwrap();
    let original = ServiceContext::from_artifact(artifact).unwrap();
    assert_eq!(loaded.labels(), original.labels());

    let dataset = data::iris();
    for i in 0..dataset.len() {
        let x = dataset.sample(i);
        let features = FeatureVector::new(x[0], x[1], x[2], x[3]);
        assert_eq!(
            loaded.predict(&features).unwrap(),
            original.predict(&features).unwrap(),
            "sample {i}"
        );
    }

    fs::remove_file(&path).unwrap();
}

#[test]
fn missing_artifact_prevents_startup() {
    let path = scratch_path("missing").with_file_name("absent.json");
    let res = ServiceContext::acquire(&ModelSource::Load { path });
    assert!(matches!(
        res,
        Err(ServerError::Artifact(ArtifactError::Io(_)))
    ));
}

#[test]
fn corrupt_artifact_prevents_startup() {
    let path = scratch_path("corrupt");
    fs::write(&path, b"{\"model\": ").unwrap();

    let res = ServiceContext::acquire(&ModelSource::Load { path: path.clone() });
    assert!(matches!(
        res,
        Err(ServerError::Artifact(ArtifactError::Malformed(_)))
    ));

    fs::remove_file(&path).unwrap();
}

#[test]
fn trained_context_uses_iris_labels() {
    let context = ServiceContext::acquire(&ModelSource::Train { seed: Some(3) }).unwrap();
    assert_eq!(context.labels(), ["setosa", "versicolor", "virginica"]);
}

#[test]
fn label_count_must_match_classes() {
    let dataset = data::iris();
    let params = ForestParams::default().with_n_trees(2).with_seed(Some(1));
    let forest = RandomForest::fit(&dataset, &params).unwrap();

    let res = ServiceContext::new(Box::new(forest), vec!["setosa".into()]);
    assert!(matches!(
        res,
        Err(ServerError::LabelMismatch { labels: 1, classes: 3 })
    ));
}

#[test]
fn model_with_other_feature_count_prevents_startup() {
    let path = scratch_path("features");
    write_artifact(&path);

    let mut doc: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    doc["model"]["n_features"] = 5.into();
    fs::write(&path, doc.to_string()).unwrap();

    let res = ServiceContext::acquire(&ModelSource::Load { path: path.clone() });
    assert!(matches!(
        res,
        Err(ServerError::Artifact(ArtifactError::FeatureMismatch { features: 5, expected: 4 }))
    ));

    fs::remove_file(&path).unwrap();
}

#[test]
fn classifier_must_take_four_features() {
    let res = ServiceContext::new(Box::new(Fixed { n_features: 3 }), labels());
    assert!(matches!(
        res,
        Err(ServerError::FeatureMismatch { features: 3, expected: 4 })
    ));

    assert!(ServiceContext::new(Box::new(Fixed { n_features: 4 }), labels()).is_ok());
}
