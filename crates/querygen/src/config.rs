//! Dialect parameters and generator settings.
//!
//! Settings are usually loaded from a TOML file:
//!
//! ```toml
//! dialect = "postgres"
//! case = "snake"
//!
//! [query]
//! parameter_character = "@"
//! escape_start = "\""
//! escape_end = "\""
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::case::CaseConvention;
use crate::error::OrmResult;
use crate::generator::Dialect;

/// Parameter prefix and identifier escaping for one statement.
///
/// Missing fields deserialize to the generic dialect's values (`@`, `[`, `]`, escaping on).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub parameter_character: String,
    pub escape_start: String,
    pub escape_end: String,
    /// When false, identifiers are emitted verbatim.
    pub escape: bool,
}

impl QueryConfig {
    pub fn new(
        parameter_character: impl Into<String>,
        escape_start: impl Into<String>,
        escape_end: impl Into<String>,
        escape: bool,
    ) -> Self {
        Self {
            parameter_character: parameter_character.into(),
            escape_start: escape_start.into(),
            escape_end: escape_end.into(),
            escape,
        }
    }

    /// `@param`, `[identifier]`.
    pub fn generic() -> Self {
        Self::new("@", "[", "]", true)
    }

    /// `:param`, `"identifier"`.
    pub fn postgres() -> Self {
        Self::new(":", "\"", "\"", true)
    }

    /// `@param`, `"identifier"`.
    pub fn sqlite() -> Self {
        Self::new("@", "\"", "\"", true)
    }

    /// Same parameter character, escaping disabled.
    pub fn unescaped(mut self) -> Self {
        self.escape = false;
        self
    }

    pub fn with_parameter_character(mut self, parameter_character: impl Into<String>) -> Self {
        self.parameter_character = parameter_character.into();
        self
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self::generic()
    }
}

/// Supplies the config used when a call does not pass one.
pub trait QueryConfigProvider: Send + Sync {
    fn query_config(&self, dialect: Dialect) -> QueryConfig;
}

/// Hands out each dialect's built-in config.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConfigProvider;

impl QueryConfigProvider for DefaultConfigProvider {
    fn query_config(&self, dialect: Dialect) -> QueryConfig {
        dialect.default_config()
    }
}

/// Always returns the same config, whatever the dialect.
#[derive(Debug, Clone)]
pub struct StaticConfigProvider(pub QueryConfig);

impl QueryConfigProvider for StaticConfigProvider {
    fn query_config(&self, _dialect: Dialect) -> QueryConfig {
        self.0.clone()
    }
}

/// Everything needed to build a [`QueryService`](crate::QueryService) from a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GeneratorSettings {
    #[serde(default)]
    pub dialect: Dialect,
    /// Applied to column wire names.
    #[serde(default)]
    pub case: CaseConvention,
    /// Overrides the dialect's default config when present.
    #[serde(default)]
    pub query: Option<QueryConfig>,
}

impl GeneratorSettings {
    pub fn from_toml_str(raw: &str) -> OrmResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> OrmResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// The config calls fall back to: the explicit `[query]` table, else the dialect default.
    pub fn query_config(&self) -> QueryConfig {
        self.query
            .clone()
            .unwrap_or_else(|| self.dialect.default_config())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrmError;

    #[test]
    fn presets() {
        assert_eq!(QueryConfig::default(), QueryConfig::new("@", "[", "]", true));
        assert_eq!(QueryConfig::postgres().parameter_character, ":");
        assert_eq!(QueryConfig::sqlite().escape_start, "\"");
        assert!(!QueryConfig::generic().unescaped().escape);
    }

    #[test]
    fn providers() {
        assert_eq!(
            DefaultConfigProvider.query_config(Dialect::Postgres),
            QueryConfig::postgres()
        );
        let fixed = StaticConfigProvider(QueryConfig::postgres().with_parameter_character("@"));
        assert_eq!(fixed.query_config(Dialect::Generic).parameter_character, "@");
        assert_eq!(fixed.query_config(Dialect::Generic).escape_end, "\"");
    }

    #[test]
    fn settings_from_toml() {
        let settings = GeneratorSettings::from_toml_str(
            r#"
dialect = "postgres"
case = "snake"

[query]
parameter_character = "@"
escape_start = "\""
escape_end = "\""
"#,
        )
        .unwrap();

        assert_eq!(settings.dialect, Dialect::Postgres);
        assert_eq!(settings.case, CaseConvention::Snake);
        assert_eq!(settings.query_config(), QueryConfig::new("@", "\"", "\"", true));
    }

    #[test]
    fn empty_settings_use_defaults() {
        let settings = GeneratorSettings::from_toml_str("").unwrap();
        assert_eq!(settings, GeneratorSettings::default());
        assert_eq!(settings.query_config(), QueryConfig::generic());

        let settings = GeneratorSettings::from_toml_str("dialect = \"sqlite\"").unwrap();
        assert_eq!(settings.query_config(), QueryConfig::sqlite());
    }

    #[test]
    fn partial_query_table_fills_generic_defaults() {
        let settings = GeneratorSettings::from_toml_str("[query]\nescape = false\n").unwrap();
        assert_eq!(settings.query_config(), QueryConfig::generic().unescaped());
    }

    #[test]
    fn bad_settings_are_config_errors() {
        let err = GeneratorSettings::from_toml_str("dialect = \"oracle\"").unwrap_err();
        assert!(matches!(err, OrmError::Config(_)));

        let err = GeneratorSettings::from_path("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, OrmError::Config(_)));
    }
}
