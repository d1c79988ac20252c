//! Resolved settings with provenance

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;

pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_TEMPLATES_PATH: &str = "PATH_YAML";
pub const ENV_PARAMETER_NAMES: &str = "SSM_PM_NAMES";
pub const ENV_TIMEOUT_SECONDS: &str = "RUN_TIMEOUT_SECONDS";
pub const ENV_ASSIGNMENT: &str = "SSM_ASSIGNMENT";

/// Upper bound for the run deadline
const MAX_TIMEOUT_SECONDS: u64 = 3600;

/// Settings errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SSM parameter name must be defined")]
    MissingParameterNames,

    #[error("SSM parameter name at position {position} is empty")]
    EmptyParameterName { position: usize },

    #[error("timeout_seconds must be in (0, 3600], got {value}")]
    TimeoutOutOfBounds { value: u64 },

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("unknown entry assignment {0:?} (expected \"broadcast\" or \"positional\")")]
    UnknownAssignment(String),

    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("TOML parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid settings: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// How a template's identifier maps onto the configured parameter names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryAssignment {
    /// Every template writes its identifier to every name, in order
    #[default]
    Broadcast,
    /// Template `i` writes only to name `i`
    Positional,
}

impl FromStr for EntryAssignment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "broadcast" => Ok(Self::Broadcast),
            "positional" => Ok(Self::Positional),
            other => Err(ConfigError::UnknownAssignment(other.to_string())),
        }
    }
}

impl fmt::Display for EntryAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Broadcast => write!(f, "broadcast"),
            Self::Positional => write!(f, "positional"),
        }
    }
}

/// Origin of a settings layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    File,
    Env,
    Cli,
}

/// A contributing settings layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 of the raw file bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Merged layer contents before validation
#[derive(Debug, Deserialize)]
struct RawSettings {
    region: String,
    templates_path: String,
    #[serde(default)]
    parameter_names: Vec<String>,
    timeout_seconds: u64,
    assignment: String,
}

/// Fully resolved process settings
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub region: String,
    pub templates_path: PathBuf,
    /// Parameter store entries that receive template identifiers
    pub parameter_names: Vec<String>,
    pub timeout_seconds: u64,
    pub assignment: EntryAssignment,
    /// Contributing layers in precedence order
    pub sources: Vec<ConfigSource>,
}

impl Settings {
    /// Resolve settings from all layers
    ///
    /// `env` looks up an environment variable; pass `|k| std::env::var(k).ok()`
    /// in production. `cli` holds only the flags that were given.
    pub fn resolve<F>(
        settings_file: Option<&Path>,
        env: F,
        cli: Option<Value>,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut layers = vec![BuiltinDefaults::default().to_value()];
        let mut sources = vec![ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        }];

        if let Some(path) = settings_file {
            let (value, digest) = Self::load_toml_file(path)?;
            layers.push(value);
            sources.push(ConfigSource {
                origin: ConfigOrigin::File,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        let env_layer = Self::env_layer(env)?;
        if !env_layer.is_empty() {
            layers.push(Value::Object(env_layer));
            sources.push(ConfigSource {
                origin: ConfigOrigin::Env,
                path: None,
                digest: None,
            });
        }

        if let Some(cli) = cli {
            layers.push(cli);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let raw: RawSettings = serde_json::from_value(merge_layers(layers))?;
        Self::validate(raw, sources)
    }

    /// Deadline budget for the whole run
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Split a comma separated list of parameter names
    pub fn split_names(raw: &str) -> Vec<String> {
        raw.split(',').map(str::to_string).collect()
    }

    fn validate(raw: RawSettings, sources: Vec<ConfigSource>) -> Result<Self, ConfigError> {
        if raw.parameter_names.is_empty() {
            return Err(ConfigError::MissingParameterNames);
        }
        if let Some(position) = raw.parameter_names.iter().position(|n| n.is_empty()) {
            return Err(ConfigError::EmptyParameterName { position });
        }
        if raw.timeout_seconds == 0 || raw.timeout_seconds > MAX_TIMEOUT_SECONDS {
            return Err(ConfigError::TimeoutOutOfBounds {
                value: raw.timeout_seconds,
            });
        }
        let assignment = raw.assignment.parse()?;

        Ok(Self {
            region: raw.region,
            templates_path: PathBuf::from(raw.templates_path),
            parameter_names: raw.parameter_names,
            timeout_seconds: raw.timeout_seconds,
            assignment,
            sources,
        })
    }

    /// Environment layer; empty variables count as unset
    fn env_layer<F>(env: F) -> Result<Map<String, Value>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env(key).filter(|v| !v.is_empty());
        let mut layer = Map::new();

        if let Some(region) = lookup(ENV_REGION) {
            layer.insert("region".to_string(), Value::String(region));
        }
        if let Some(path) = lookup(ENV_TEMPLATES_PATH) {
            layer.insert("templates_path".to_string(), Value::String(path));
        }
        if let Some(names) = lookup(ENV_PARAMETER_NAMES) {
            layer.insert(
                "parameter_names".to_string(),
                Value::from(Self::split_names(&names)),
            );
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECONDS) {
            let seconds: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_TIMEOUT_SECONDS,
                value: raw.clone(),
            })?;
            layer.insert("timeout_seconds".to_string(), Value::from(seconds));
        }
        if let Some(assignment) = lookup(ENV_ASSIGNMENT) {
            layer.insert("assignment".to_string(), Value::String(assignment));
        }

        Ok(layer)
    }

    /// Load and parse a TOML file, returning the value and digest
    fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
        let bytes = fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: format!("invalid UTF-8: {}", e),
        })?;
        let toml_value: toml::Value = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok((Self::toml_to_json(toml_value), digest))
    }

    fn toml_to_json(toml: toml::Value) -> Value {
        match toml {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Number(i.into()),
            toml::Value::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(arr) => Value::Array(arr.into_iter().map(Self::toml_to_json).collect()),
            toml::Value::Table(table) => Value::Object(
                table
                    .into_iter()
                    .map(|(k, v)| (k, Self::toml_to_json(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_defaults() {
        let settings = Settings::resolve(
            None,
            env_of(&[
                (ENV_REGION, "us-west-2"),
                (ENV_TEMPLATES_PATH, "test.yaml"),
                (ENV_PARAMETER_NAMES, "test-ssm"),
            ]),
            None,
        )
        .unwrap();

        assert_eq!(settings.region, "us-west-2");
        assert_eq!(settings.templates_path, PathBuf::from("test.yaml"));
        assert_eq!(settings.parameter_names, vec!["test-ssm"]);
    }

    #[test]
    fn test_multiple_parameter_names() {
        let settings = Settings::resolve(
            None,
            env_of(&[(ENV_PARAMETER_NAMES, "test-ssm,test-ssm2,test-ssm3")]),
            None,
        )
        .unwrap();
        assert_eq!(settings.parameter_names, vec!["test-ssm", "test-ssm2", "test-ssm3"]);
    }

    #[test]
    fn test_defaults_apply() {
        let settings =
            Settings::resolve(None, env_of(&[(ENV_PARAMETER_NAMES, "test-ssm")]), None).unwrap();
        assert_eq!(settings.region, "us-east-1");
        assert_eq!(settings.templates_path, PathBuf::from("example.yaml"));
        assert_eq!(settings.timeout(), Duration::from_secs(30));
        assert_eq!(settings.assignment, EntryAssignment::Broadcast);
        assert_eq!(settings.sources.len(), 2);
    }

    #[test]
    fn test_missing_parameter_names() {
        let err = Settings::resolve(None, env_of(&[]), None).unwrap_err();
        assert_eq!(err.to_string(), "SSM parameter name must be defined");

        let err = Settings::resolve(None, env_of(&[(ENV_PARAMETER_NAMES, "")]), None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingParameterNames));
    }

    #[test]
    fn test_empty_name_segment_rejected() {
        let err =
            Settings::resolve(None, env_of(&[(ENV_PARAMETER_NAMES, "a,,b")]), None).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyParameterName { position: 1 }));
    }

    #[test]
    fn test_timeout_bounds() {
        let err = Settings::resolve(
            None,
            env_of(&[(ENV_PARAMETER_NAMES, "a"), (ENV_TIMEOUT_SECONDS, "0")]),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::TimeoutOutOfBounds { value: 0 }));

        let err = Settings::resolve(
            None,
            env_of(&[(ENV_PARAMETER_NAMES, "a"), (ENV_TIMEOUT_SECONDS, "soon")]),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_TIMEOUT_SECONDS, .. }));
    }

    #[test]
    fn test_unknown_assignment() {
        let err = Settings::resolve(
            None,
            env_of(&[(ENV_PARAMETER_NAMES, "a"), (ENV_ASSIGNMENT, "keyed")]),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownAssignment(ref v) if v == "keyed"));
    }

    #[test]
    fn test_cli_wins_over_env_and_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "region = \"eu-central-1\"\nparameter_names = [\"from-file\"]\nassignment = \"positional\""
        )
        .unwrap();

        let settings = Settings::resolve(
            Some(file.path()),
            env_of(&[(ENV_REGION, "us-west-2")]),
            Some(json!({"timeout_seconds": 120})),
        )
        .unwrap();

        assert_eq!(settings.region, "us-west-2");
        assert_eq!(settings.parameter_names, vec!["from-file"]);
        assert_eq!(settings.assignment, EntryAssignment::Positional);
        assert_eq!(settings.timeout_seconds, 120);

        let origins: Vec<_> = settings.sources.iter().map(|s| s.origin).collect();
        assert_eq!(
            origins,
            vec![ConfigOrigin::Builtin, ConfigOrigin::File, ConfigOrigin::Env, ConfigOrigin::Cli]
        );
        assert!(settings.sources[1].digest.is_some());
    }

    #[test]
    fn test_settings_file_missing() {
        let err = Settings::resolve(
            Some(Path::new("/nonexistent/settings.toml")),
            env_of(&[(ENV_PARAMETER_NAMES, "a")]),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
