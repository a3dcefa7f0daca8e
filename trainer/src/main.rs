use std::{env, path::PathBuf};

use anyhow::{Context, Result};
use classifier::{ForestParams, ModelArtifact, RandomForest, data};
use env_logger::Env;
use log::info;

const DEFAULT_MODEL_PATH: &str = "model.json";

/// Where to write the artifact and how to seed the fit.
#[derive(Debug, PartialEq, Eq)]
struct TrainerArgs {
    path: PathBuf,
    seed: Option<u64>,
}

impl TrainerArgs {
    /// Resolves the output path (argument, then `MODEL_PATH`, then the
    /// default) and the optional `SEED`.
    fn resolve<F>(arg: Option<String>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = arg
            .or_else(|| lookup("MODEL_PATH"))
            .unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string())
            .into();

        let seed = lookup("SEED")
            .map(|s| {
                s.parse::<u64>()
                    .with_context(|| format!("SEED '{s}' must be an unsigned integer"))
            })
            .transpose()?;

        Ok(Self { path, seed })
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let TrainerArgs { path, seed } =
        TrainerArgs::resolve(env::args().nth(1), |key| env::var(key).ok())?;

    let dataset = data::iris();
    info!(samples = dataset.len(), classes = dataset.n_classes(); "loaded bundled dataset");

    let forest = RandomForest::fit(&dataset, &ForestParams::default().with_seed(seed))?;
    let accuracy = forest.accuracy(&dataset)?;
    info!("training accuracy: {:.3}", accuracy);

    let artifact = ModelArtifact::new(forest, dataset.class_names().to_vec())?;
    artifact
        .save(&path)
        .with_context(|| format!("cannot write model to {}", path.display()))?;

    info!("model written to {}", path.display());
    Ok(())
}
