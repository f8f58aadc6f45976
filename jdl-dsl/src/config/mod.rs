//! Configuration for the JDL front end.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration:
//!
//! ```toml
//! [parser]
//! profile = "full"      # or "reduced"
//! recovery = true
//!
//! [compiler]
//! database_type = "postgresql"
//! check_patterns = true
//! ```

use crate::error::JdlResult;
use jdl_core::Dialect;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Which grammar the parser accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrammarProfile {
    /// Every declaration kind; commas between fields and between
    /// validations are optional.
    #[default]
    Full,
    /// Constants and entities only; fields must be comma-separated and
    /// validations whitespace-separated.
    Reduced,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    pub profile: GrammarProfile,
    /// Resynchronize after a malformed declaration instead of stopping.
    pub recovery: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            profile: GrammarProfile::Full,
            recovery: true,
        }
    }
}

impl ParserConfig {
    pub fn reduced() -> Self {
        Self {
            profile: GrammarProfile::Reduced,
            ..Self::default()
        }
    }

    pub fn without_recovery(mut self) -> Self {
        self.recovery = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Database type to check validations against. When unset, the first
    /// application's `databaseType` is used, then `sql`.
    pub database_type: Option<String>,
    /// Compile `pattern(...)` literals and report the ones that fail.
    pub check_patterns: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            database_type: None,
            check_patterns: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JdlConfig {
    pub parser: ParserConfig,
    pub compiler: CompilerConfig,
}

impl JdlConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: JdlConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Load from `path`, or fall back to the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> JdlResult<Self> {
        match path {
            Some(path) => Ok(Self::from_path(path)?),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(database_type) = &self.compiler.database_type {
            Dialect::for_database(database_type).map_err(|e| ConfigError::InvalidValue {
                field: "compiler.database_type",
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }
}
