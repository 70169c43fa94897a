use std::path::Path;

use serde::Deserialize;

use crate::error::TableError;

/// Default prefix token selecting a starts-with match.
pub const DEFAULT_STARTS_WITH_TOKEN: &str = "*|";
/// Default suffix token selecting an ends-with match.
pub const DEFAULT_ENDS_WITH_TOKEN: &str = "|*";
/// Page size used when `length` is missing or malformed.
pub const DEFAULT_TAKE: u64 = 10;

/// Tunable parser behaviour.
///
/// Options can be given in code or loaded from YAML, either as a bare mapping
/// or nested under a top-level `tableq` key:
///
/// ```yaml
/// tableq:
///   starts_with_token: "^"
///   ends_with_token: "$"
///   default_take: 25
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    pub starts_with_token: String,
    pub ends_with_token: String,
    pub default_take: u64,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            starts_with_token: DEFAULT_STARTS_WITH_TOKEN.to_string(),
            ends_with_token: DEFAULT_ENDS_WITH_TOKEN.to_string(),
            default_take: DEFAULT_TAKE,
        }
    }
}

#[derive(Deserialize)]
struct Nested {
    tableq: ParserOptions,
}

impl ParserOptions {
    pub fn starts_with_token(mut self, token: impl Into<String>) -> Self {
        self.starts_with_token = token.into();
        self
    }

    pub fn ends_with_token(mut self, token: impl Into<String>) -> Self {
        self.ends_with_token = token.into();
        self
    }

    pub fn default_take(mut self, take: u64) -> Self {
        self.default_take = take;
        self
    }

    /// Parse options from a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, TableError> {
        let value: serde_yaml::Value =
            serde_yaml::from_str(yaml).map_err(|e| TableError::Config(e.to_string()))?;
        let options = if value.get("tableq").is_some() {
            serde_yaml::from_value::<Nested>(value).map(|n| n.tableq)
        } else if value.is_null() {
            Ok(ParserOptions::default())
        } else {
            serde_yaml::from_value::<ParserOptions>(value)
        }
        .map_err(|e| TableError::Config(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a YAML file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no parser options file, using defaults");
            return Ok(ParserOptions::default());
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| TableError::Config(e.to_string()))?;
        Self::from_yaml_str(&content)
    }

    /// Reject token pairs the match-mode selection cannot tell apart.
    pub fn validate(&self) -> Result<(), TableError> {
        if self.starts_with_token.is_empty() || self.ends_with_token.is_empty() {
            return Err(TableError::Config("match tokens must not be empty".into()));
        }
        if self.starts_with_token == self.ends_with_token {
            return Err(TableError::Config(format!(
                "starts-with and ends-with tokens must differ (both are '{}')",
                self.starts_with_token
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ParserOptions::default();
        assert_eq!(options.starts_with_token, "*|");
        assert_eq!(options.ends_with_token, "|*");
        assert_eq!(options.default_take, 10);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_bare_mapping() {
        let options = ParserOptions::from_yaml_str("default_take: 25").unwrap();
        assert_eq!(options.default_take, 25);
        assert_eq!(options.starts_with_token, "*|");
    }

    #[test]
    fn test_nested_mapping() {
        let yaml = r#"
tableq:
  starts_with_token: "^"
  ends_with_token: "$"
"#;
        let options = ParserOptions::from_yaml_str(yaml).unwrap();
        assert_eq!(options.starts_with_token, "^");
        assert_eq!(options.ends_with_token, "$");
        assert_eq!(options.default_take, 10);
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(ParserOptions::from_yaml_str("").unwrap(), ParserOptions::default());
    }

    #[test]
    fn test_identical_tokens_rejected() {
        let err = ParserOptions::from_yaml_str("starts_with_token: '|'\nends_with_token: '|'")
            .unwrap_err();
        assert!(matches!(err, TableError::Config(_)));
    }

    #[test]
    fn test_malformed_yaml_rejected() {
        let err = ParserOptions::from_yaml_str("default_take: [1, 2").unwrap_err();
        assert!(matches!(err, TableError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tableq:\n  default_take: 50").unwrap();
        let options = ParserOptions::load(file.path()).unwrap();
        assert_eq!(options.default_take, 50);
        assert_eq!(options.ends_with_token, "|*");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let options = ParserOptions::load("/definitely/not/here/tableq.yaml").unwrap();
        assert_eq!(options, ParserOptions::default());
    }
}
