use std::{env, path::PathBuf};

use crate::ServerError;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MODEL_PATH: &str = "model.json";

/// Where the served model comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Fit a forest on the bundled dataset at startup.
    Train { seed: Option<u64> },
    /// Read a previously written artifact.
    Load { path: PathBuf },
}

/// Startup configuration of the prediction server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_source: ModelSource,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            model_source: ModelSource::Train { seed: None },
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    ///
    /// Recognized variables: `HOST`, `PORT`, `MODEL_SOURCE` (`train` or
    /// `load`), `MODEL_PATH` and `SEED`.
    ///
    /// # Errors
    /// Returns `ServerError::InvalidConfig` if a variable holds an invalid value.
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Args
    /// * `lookup` - Returns the value of a variable, or `None` if it is unset.
    ///
    /// # Errors
    /// Returns `ServerError::InvalidConfig` if a variable holds an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(port) => port
                .parse()
                .map_err(|e| ServerError::InvalidConfig(format!("PORT '{port}': {e}")))?,
            None => DEFAULT_PORT,
        };

        let model_source = match lookup("MODEL_SOURCE").as_deref().unwrap_or("train") {
            "train" => {
                let seed = match lookup("SEED") {
                    Some(seed) => Some(
                        seed.parse()
                            .map_err(|e| ServerError::InvalidConfig(format!("SEED '{seed}': {e}")))?,
                    ),
                    None => None,
                };
                ModelSource::Train { seed }
            }
            "load" => {
                let path = lookup("MODEL_PATH").unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string());
                ModelSource::Load { path: path.into() }
            }
            other => {
                return Err(ServerError::InvalidConfig(format!(
                    "MODEL_SOURCE must be 'train' or 'load', got '{other}'"
                )));
            }
        };

        Ok(Self {
            host,
            port,
            model_source,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn parse(vars: &[(&str, &str)]) -> Result<ServerConfig, ServerError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = parse(&[]).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.addr(), "0.0.0.0:5000");
    }

    #[test]
    fn load_source_with_custom_path() {
        let config = parse(&[
            ("MODEL_SOURCE", "load"),
            ("MODEL_PATH", "/srv/iris.json"),
            ("PORT", "8080"),
            ("HOST", "127.0.0.1"),
        ])
        .unwrap();

        assert_eq!(
            config.model_source,
            ModelSource::Load {
                path: "/srv/iris.json".into()
            }
        );
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn load_source_defaults_path() {
        let config = parse(&[("MODEL_SOURCE", "load")]).unwrap();
        assert_eq!(
            config.model_source,
            ModelSource::Load {
                path: DEFAULT_MODEL_PATH.into()
            }
        );
    }

    #[test]
    fn train_source_with_seed() {
        let config = parse(&[("MODEL_SOURCE", "train"), ("SEED", "42")]).unwrap();
        assert_eq!(config.model_source, ModelSource::Train { seed: Some(42) });
    }

    #[test]
    fn rejects_unknown_source() {
        let err = parse(&[("MODEL_SOURCE", "download")]).unwrap_err();
        assert!(matches!(err, ServerError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_invalid_port() {
        assert!(matches!(
            parse(&[("PORT", "http")]),
            Err(ServerError::InvalidConfig(_))
        ));
        assert!(matches!(
            parse(&[("PORT", "70000")]),
            Err(ServerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_invalid_seed() {
        let err = parse(&[("SEED", "-1")]).unwrap_err();
        assert!(matches!(err, ServerError::InvalidConfig(_)));
    }
}
