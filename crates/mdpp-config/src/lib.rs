//! Configuration management for mdpp preprocessors.
//!
//! Each preprocessor reads its own `[preprocessor.<name>]` table from the
//! host's book configuration, which arrives as JSON inside the invocation
//! context. Tables are parsed with serde, every key is optional, and keys
//! owned by the host (`command`, `renderers`, `before`, `after`, `optional`)
//! are ignored.
//!
//! ```toml
//! [preprocessor.wavejson]
//! language = "wavejson"
//!
//! [preprocessor.reggen]
//! path-pattern = 'ip/.+/data/.+\.hjson'
//! params = { NumAlerts = 2 }
//! ```
//!
//! Configuration is validated right after loading; see [`ConfigError`].

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Preprocessor name of the waveform block expander.
pub const WAVEJSON: &str = "wavejson";

/// Preprocessor name of the register descriptor expander.
pub const REGGEN: &str = "reggen";

/// Default fence info string for waveform blocks.
const DEFAULT_LANGUAGE: &str = "wavejson";

/// Default pattern selecting register descriptor chapters.
const DEFAULT_PATH_PATTERN: &str = r"ip/.+/data/.+\.hjson";

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The table does not have the expected shape.
    #[error("Configuration parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Load a preprocessor table, falling back to defaults when it is absent.
fn load_table<T: DeserializeOwned + Default>(table: Option<&Value>) -> Result<T, ConfigError> {
    match table {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => Ok(T::deserialize(value)?),
    }
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Configuration of the waveform block expander.
#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct WaveJsonConfig {
    /// Fence info string marking waveform blocks.
    pub language: String,
}

impl Default for WaveJsonConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_owned(),
        }
    }
}

impl WaveJsonConfig {
    /// Load and validate configuration from a `[preprocessor.wavejson]` table.
    pub fn load(table: Option<&Value>) -> Result<Self, ConfigError> {
        let config: Self = load_table(table)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.language, "language")?;
        if self
            .language
            .chars()
            .any(|c| c.is_whitespace() || c == '`' || c == '~')
        {
            return Err(ConfigError::Validation(format!(
                "language must be a single fence info word, got {:?}",
                self.language
            )));
        }
        Ok(())
    }
}

/// Parameter override value: descriptors accept both forms.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Integer value.
    Int(u64),
    /// Text value, parsed by the consumer.
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// Configuration of the register descriptor expander.
#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RegGenConfig {
    /// Regular expression matched against chapter source paths.
    pub path_pattern: String,
    /// Parameter default overrides handed to the descriptor parser.
    pub params: BTreeMap<String, ParamValue>,
}

impl Default for RegGenConfig {
    fn default() -> Self {
        Self {
            path_pattern: DEFAULT_PATH_PATTERN.to_owned(),
            params: BTreeMap::new(),
        }
    }
}

impl RegGenConfig {
    /// Load and validate configuration from a `[preprocessor.reggen]` table.
    pub fn load(table: Option<&Value>) -> Result<Self, ConfigError> {
        let config: Self = load_table(table)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// The path pattern must be a valid regular expression.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.path_pattern, "path-pattern")?;
        regex::Regex::new(&self.path_pattern).map_err(|e| {
            ConfigError::Validation(format!("path-pattern is not a valid regex: {e}"))
        })?;

        for name in self.params.keys() {
            require_non_empty(name, "params key")?;
        }
        Ok(())
    }

    /// Parameter overrides as `(name, value)` pairs, sorted by name.
    #[must_use]
    pub fn param_overrides(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_wavejson_defaults() {
        let config = WaveJsonConfig::load(None).unwrap();
        assert_eq!(config.language, "wavejson");

        let config = WaveJsonConfig::load(Some(&Value::Null)).unwrap();
        assert_eq!(config.language, "wavejson");
    }

    #[test]
    fn test_wavejson_host_keys_ignored() {
        let table = json!({"command": "mdbook-wavejson", "renderers": ["html"], "before": ["links"]});

        let config = WaveJsonConfig::load(Some(&table)).unwrap();

        assert_eq!(config.language, "wavejson");
    }

    #[test]
    fn test_wavejson_custom_language() {
        let table = json!({"language": "wavedrom"});

        let config = WaveJsonConfig::load(Some(&table)).unwrap();

        assert_eq!(config.language, "wavedrom");
    }

    #[test]
    fn test_wavejson_rejects_bad_language() {
        for language in ["", "wave json", "wave`", "~~~"] {
            let table = json!({ "language": language });
            let err = WaveJsonConfig::load(Some(&table)).unwrap_err();
            assert!(
                matches!(err, ConfigError::Validation(_)),
                "Expected ConfigError::Validation for {language:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_wavejson_wrong_type_is_parse_error() {
        let table = json!({"language": 3});

        let err = WaveJsonConfig::load(Some(&table)).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)), "{err:?}");
    }

    #[test]
    fn test_reggen_defaults() {
        let config = RegGenConfig::load(None).unwrap();

        assert_eq!(config.path_pattern, r"ip/.+/data/.+\.hjson");
        assert!(config.params.is_empty());
        assert!(config.param_overrides().is_empty());
    }

    #[test]
    fn test_reggen_params() {
        let table = json!({
            "path-pattern": r"^hw/ip/.+\.hjson$",
            "params": {"NumAlerts": 4, "Width": "0x20"}
        });

        let config = RegGenConfig::load(Some(&table)).unwrap();

        assert_eq!(config.path_pattern, r"^hw/ip/.+\.hjson$");
        assert_eq!(
            config.param_overrides(),
            vec![
                ("NumAlerts".to_owned(), "4".to_owned()),
                ("Width".to_owned(), "0x20".to_owned()),
            ]
        );
    }

    #[test]
    fn test_reggen_invalid_pattern() {
        let table = json!({"path-pattern": "ip/(unclosed"});

        let err = RegGenConfig::load(Some(&table)).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("path-pattern"));
    }

    #[test]
    fn test_reggen_empty_pattern() {
        let table = json!({"path-pattern": ""});

        let err = RegGenConfig::load(Some(&table)).unwrap_err();

        assert!(err.to_string().contains("path-pattern cannot be empty"));
    }

    #[test]
    fn test_reggen_table_must_be_object() {
        let table = json!("not a table");

        let err = RegGenConfig::load(Some(&table)).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
