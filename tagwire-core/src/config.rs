//! Codec configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via TAGWIRE_CONFIG)
//! 3. Environment variables

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tagwire_protocol::{
    ReadLimits, DEFAULT_MAX_CONTAINER_LEN, DEFAULT_MAX_DEPTH, DEFAULT_MAX_STRING_LEN,
};

/// What to do when a variant record arrives with more than one field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantPolicy {
    /// Fail the decode with `VariantConflict`.
    #[default]
    Reject,
    /// Keep the field decoded last and log a warning.
    KeepLast,
}

impl std::str::FromStr for VariantPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reject" => Ok(VariantPolicy::Reject),
            "keep_last" | "keep-last" => Ok(VariantPolicy::KeepLast),
            other => Err(ConfigError::ValidationError(format!(
                "unknown variant policy '{}'",
                other
            ))),
        }
    }
}

/// Record codec configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Maximum nesting of records and containers.
    pub max_depth: usize,
    /// Maximum length in bytes of a single string or binary value.
    pub max_string_len: usize,
    /// Maximum element count of a single list, set or map.
    pub max_container_len: usize,
    /// Handling of variant records with several fields on the wire.
    pub variant_policy: VariantPolicy,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_string_len: DEFAULT_MAX_STRING_LEN,
            max_container_len: DEFAULT_MAX_CONTAINER_LEN,
            variant_policy: VariantPolicy::Reject,
        }
    }
}

impl CodecConfig {
    /// Loads configuration from file, then applies environment variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("TAGWIRE_CONFIG") {
            config = Self::from_file(&path)?;
        }

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        let config: CodecConfig = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from environment variables only.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup`, which maps a variable name to its value.
    ///
    /// Values that fail to parse are ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(n) = lookup("TAGWIRE_MAX_DEPTH").and_then(|v| v.parse().ok()) {
            self.max_depth = n;
        }
        if let Some(n) = lookup("TAGWIRE_MAX_STRING_LEN").and_then(|v| v.parse().ok()) {
            self.max_string_len = n;
        }
        if let Some(n) = lookup("TAGWIRE_MAX_CONTAINER_LEN").and_then(|v| v.parse().ok()) {
            self.max_container_len = n;
        }
        if let Some(policy) = lookup("TAGWIRE_VARIANT_POLICY").and_then(|v| v.parse().ok()) {
            self.variant_policy = policy;
        }
    }

    /// Validates limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::ValidationError(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.max_string_len > i32::MAX as usize {
            return Err(ConfigError::ValidationError(format!(
                "max_string_len {} exceeds the wire limit {}",
                self.max_string_len,
                i32::MAX
            )));
        }
        if self.max_container_len > i32::MAX as usize {
            return Err(ConfigError::ValidationError(format!(
                "max_container_len {} exceeds the wire limit {}",
                self.max_container_len,
                i32::MAX
            )));
        }
        Ok(())
    }

    /// Saves configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        Ok(())
    }

    /// Size limits to install on a protocol reader.
    pub fn read_limits(&self) -> ReadLimits {
        ReadLimits {
            max_string_len: self.max_string_len,
            max_container_len: self.max_container_len,
        }
    }
}

/// Configuration error.
#[derive(Debug)]
pub enum ConfigError {
    IoError(PathBuf, std::io::Error),
    ParseError(PathBuf, String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, e) => {
                write!(f, "failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::ValidationError(msg) => {
                write!(f, "configuration validation failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = CodecConfig::default();
        assert_eq!(config.max_depth, 64);
        assert_eq!(config.max_string_len, 16 * 1024 * 1024);
        assert_eq!(config.max_container_len, 1024 * 1024);
        assert_eq!(config.variant_policy, VariantPolicy::Reject);
        assert_eq!(config.read_limits(), ReadLimits::default());
        config.validate().unwrap();
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = CodecConfig {
            max_depth: 8,
            variant_policy: VariantPolicy::KeepLast,
            ..Default::default()
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("keep_last"));
        let parsed: CodecConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let parsed: CodecConfig = serde_yaml::from_str("max_depth: 10\n").unwrap();
        assert_eq!(parsed.max_depth, 10);
        assert_eq!(parsed.max_container_len, DEFAULT_MAX_CONTAINER_LEN);
    }

    #[test]
    fn test_file_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagwire.yaml");

        let config = CodecConfig {
            max_string_len: 1024,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(CodecConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_file_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.yaml");
        assert!(matches!(
            CodecConfig::from_file(&missing),
            Err(ConfigError::IoError(..))
        ));

        let bad = dir.path().join("bad.yaml");
        std::fs::write(&bad, "max_depth: [oops").unwrap();
        let err = CodecConfig::from_file(&bad).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(..)));
        assert!(err.to_string().contains("bad.yaml"));

        let zero = dir.path().join("zero.yaml");
        std::fs::write(&zero, "max_depth: 0\n").unwrap();
        assert!(matches!(
            CodecConfig::from_file(&zero),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TAGWIRE_MAX_DEPTH", "12"),
            ("TAGWIRE_MAX_CONTAINER_LEN", "not-a-number"),
            ("TAGWIRE_VARIANT_POLICY", "keep_last"),
        ]
        .into_iter()
        .collect();

        let mut config = CodecConfig::default();
        config.apply_overrides_from(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.max_depth, 12);
        assert_eq!(config.max_container_len, DEFAULT_MAX_CONTAINER_LEN);
        assert_eq!(config.variant_policy, VariantPolicy::KeepLast);
    }

    #[test]
    fn test_variant_policy_parse() {
        assert_eq!("Reject".parse::<VariantPolicy>().unwrap(), VariantPolicy::Reject);
        assert_eq!("keep-last".parse::<VariantPolicy>().unwrap(), VariantPolicy::KeepLast);
        assert!("first".parse::<VariantPolicy>().is_err());
    }
}
