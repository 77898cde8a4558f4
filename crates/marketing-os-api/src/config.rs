//! Console settings: defaults, then an optional YAML file, then `MOS_*` env keys.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "MOS_CONFIG_PATH";

const LOAD_DELAY_MS_ENV: &str = "MOS_LOAD_DELAY_MS";
const SUCCESS_PROBABILITY_ENV: &str = "MOS_SUCCESS_PROBABILITY";
const PAGE_SIZE_ENV: &str = "MOS_PAGE_SIZE";
const RNG_SEED_ENV: &str = "MOS_RNG_SEED";
const MAX_UPLOAD_BYTES_ENV: &str = "MOS_MAX_UPLOAD_BYTES";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsoleConfig {
    pub load_delay_ms: u64,
    pub success_probability: f64,
    pub page_size: usize,
    pub rng_seed: Option<u64>,
    pub max_upload_bytes: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            load_delay_ms: 1_500,
            success_probability: 0.8,
            page_size: 10,
            rng_seed: None,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ConsoleConfig {
    /// Resolve from `explicit_path` (or `MOS_CONFIG_PATH`) plus the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for unreadable files, malformed YAML, or out-of-range values.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let env = std::env::vars().collect::<HashMap<_, _>>();
        Self::load_from(explicit_path, &env)
    }

    /// # Errors
    /// See [`ConsoleConfig::load`].
    pub fn load_from(
        explicit_path: Option<&Path>,
        env: &HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let env_path = env
            .get(CONFIG_PATH_ENV)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(Path::new);

        let mut config = match explicit_path.or(env_path) {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
        Self::from_yaml_str(&raw)
            .map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })
    }

    /// An empty document yields the defaults.
    ///
    /// # Errors
    /// Returns the underlying YAML error.
    pub fn from_yaml_str(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    fn apply_env(&mut self, env: &HashMap<String, String>) -> Result<(), ConfigError> {
        if let Some(value) = parse_env(env, LOAD_DELAY_MS_ENV)? {
            self.load_delay_ms = value;
        }
        if let Some(value) = parse_env(env, SUCCESS_PROBABILITY_ENV)? {
            self.success_probability = value;
        }
        if let Some(value) = parse_env(env, PAGE_SIZE_ENV)? {
            self.page_size = value;
        }
        if let Some(value) = parse_env(env, RNG_SEED_ENV)? {
            self.rng_seed = Some(value);
        }
        if let Some(value) = parse_env(env, MAX_UPLOAD_BYTES_ENV)? {
            self.max_upload_bytes = value;
        }
        Ok(())
    }

    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.success_probability) {
            return Err(ConfigError::Invalid {
                key: "success_probability",
                message: format!("{} is outside [0, 1]", self.success_probability),
            });
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "page_size",
                message: "must be at least 1".to_string(),
            });
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid {
                key: "max_upload_bytes",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_delay_ms)
    }
}

fn parse_env<T>(env: &HashMap<String, String>, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = env.get(key).map(|value| value.trim()).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    raw.parse::<T>()
        .map(Some)
        .map_err(|err| ConfigError::Invalid { key, message: format!("`{raw}`: {err}") })
}
