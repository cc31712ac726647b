//! Configuration — a YAML base file merged with `SEOGEN_*` environment overrides.
//!
//! Built once in `main` and passed by value into `AppState` and the oracle
//! constructors. Nothing reads configuration through a global.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::{debug, info};

/// Prefix that marks an environment variable as a config override.
/// `SEOGEN_SEO_MODEL_NAME` → `seo.model.name`.
pub const ENV_PREFIX: &str = "SEOGEN_";
const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid value for '{key}': {reason}")]
    Invalid { key: String, reason: String },
}

// ────────────────────────────────────────────────────────────────────────────
// Raw key/value tree
// ────────────────────────────────────────────────────────────────────────────

/// The merged key/value tree. Lookups walk nested mappings by key path.
#[derive(Debug, Clone, Default)]
pub struct ConfigTree {
    root: Mapping,
}

impl ConfigTree {
    pub fn from_yaml_str(path: &Path, text: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let root = match value {
            Value::Mapping(m) => m,
            // An empty file parses as null.
            Value::Null => Mapping::new(),
            _ => {
                return Err(ConfigError::Invalid {
                    key: "<root>".to_string(),
                    reason: "top level of the config file must be a mapping".to_string(),
                })
            }
        };
        Ok(Self { root })
    }

    /// Applies every `SEOGEN_*` variable in `vars` as a nested override.
    /// The remainder after the prefix is lower-cased and split on `_`.
    pub fn apply_env_overrides<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in vars {
            let Some(rest) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let path: Vec<String> = rest.to_lowercase().split('_').map(str::to_string).collect();
            if path.iter().any(String::is_empty) {
                continue;
            }
            debug!("Config override from environment: {}", path.join("."));
            set_nested(&mut self.root, &path, Value::String(value.into()));
        }
    }

    /// Walks `keys` through nested mappings. `None` when any segment is missing.
    pub fn get(&self, keys: &[&str]) -> Option<&Value> {
        let (first, rest) = keys.split_first()?;
        let mut current = self.root.get(*first)?;
        for key in rest {
            current = current.as_mapping()?.get(*key)?;
        }
        Some(current)
    }

    pub fn get_str(&self, keys: &[&str], default: &str) -> String {
        match self.get(keys) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => default.to_string(),
        }
    }

    pub fn get_opt_str(&self, keys: &[&str]) -> Option<String> {
        match self.get(keys) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }

    /// Numeric lookup. Strings are parsed, since environment overrides arrive as text.
    pub fn get_u64(&self, keys: &[&str], default: u64) -> Result<u64, ConfigError> {
        match self.get(keys) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Number(n)) => n.as_u64().ok_or_else(|| invalid(keys, "expected a non-negative integer")),
            Some(Value::String(s)) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| invalid(keys, &format!("'{s}' is not a non-negative integer"))),
            Some(_) => Err(invalid(keys, "expected a non-negative integer")),
        }
    }

    pub fn get_bool(&self, keys: &[&str], default: bool) -> Result<bool, ConfigError> {
        match self.get(keys) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" => Ok(false),
                _ => Err(invalid(keys, &format!("'{s}' is not a boolean"))),
            },
            Some(_) => Err(invalid(keys, "expected a boolean")),
        }
    }
}

fn set_nested(map: &mut Mapping, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut current = map;
    for part in parents {
        let key = Value::String(part.clone());
        let slot = current
            .entry(key)
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        // A scalar in the way of a nested override is replaced by a mapping.
        if !slot.is_mapping() {
            *slot = Value::Mapping(Mapping::new());
        }
        current = match slot {
            Value::Mapping(m) => m,
            _ => unreachable!("slot was just made a mapping"),
        };
    }
    current.insert(Value::String(last.clone()), value);
}

fn invalid(keys: &[&str], reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key: keys.join("."),
        reason: reason.to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Typed configuration
// ────────────────────────────────────────────────────────────────────────────

/// Settings for the generation oracle and its guard.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub endpoint: String,
    pub token: Option<String>,
    pub timeout: Duration,
    pub retries: u32,
    pub concurrency: usize,
    pub warmup: bool,
}

/// Application configuration. Immutable after `load`.
#[derive(Debug, Clone)]
pub struct Config {
    pub model_name: String,
    /// Oracle context window, in whitespace-delimited units.
    pub max_input_length: usize,
    pub batch_size: usize,
    pub oracle: OracleConfig,
    pub port: u16,
    pub log_level: String,
}

impl Config {
    /// Loads `.env`, the YAML base file, and environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let explicit = std::env::var("CONFIG_PATH").ok();
        let path = PathBuf::from(explicit.as_deref().unwrap_or(DEFAULT_CONFIG_PATH));

        Self::load_from(&path, explicit.is_some(), std::env::vars())
    }

    /// Reads `path`, then applies `vars` as overrides. A missing file is only
    /// tolerated when the path was not set explicitly.
    pub fn load_from<I, K, V>(path: &Path, explicit: bool, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut tree = match std::fs::read_to_string(path) {
            Ok(text) => ConfigTree::from_yaml_str(path, &text)?,
            Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => {
                info!("No config file at {}, using defaults", path.display());
                ConfigTree::default()
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        tree.apply_env_overrides(vars);

        Self::from_tree(&tree)
    }

    pub fn from_tree(tree: &ConfigTree) -> Result<Self, ConfigError> {
        let batch_size = tree.get_u64(&["seo", "batch", "size"], 16)? as usize;
        if batch_size == 0 {
            return Err(invalid(&["seo", "batch", "size"], "must be at least 1"));
        }

        let concurrency = tree.get_u64(&["seo", "oracle", "concurrency"], 4)? as usize;
        if concurrency == 0 {
            return Err(invalid(&["seo", "oracle", "concurrency"], "must be at least 1"));
        }

        let port = tree.get_u64(&["server", "port"], 8080)?;
        let port = u16::try_from(port)
            .map_err(|_| invalid(&["server", "port"], &format!("{port} is not a valid port")))?;

        let retries = tree.get_u64(&["seo", "oracle", "retries"], 2)?;

        Ok(Config {
            model_name: tree.get_str(&["seo", "model", "name"], "t5-base"),
            max_input_length: tree.get_u64(&["seo", "model", "window"], 512)? as usize,
            batch_size,
            oracle: OracleConfig {
                endpoint: tree.get_str(
                    &["seo", "oracle", "endpoint"],
                    "https://api-inference.huggingface.co",
                ),
                token: tree.get_opt_str(&["seo", "oracle", "token"]),
                timeout: Duration::from_secs(tree.get_u64(&["seo", "oracle", "timeout"], 60)?),
                retries: u32::try_from(retries).unwrap_or(u32::MAX),
                concurrency,
                warmup: tree.get_bool(&["seo", "oracle", "warmup"], true)?,
            },
            port,
            log_level: tree.get_str(&["log", "level"], "info"),
        })
    }
}
