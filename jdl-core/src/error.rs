//! Error types for the JDL domain model

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Contract violations of the field-type compatibility checker.
///
/// These are caller bugs, not bad input text, and are returned immediately.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldTypeError {
    #[error("null pointer: {message}")]
    NullPointer { message: String },

    #[error(
        "illegal argument: the passed database type must either be 'sql', 'mysql', 'mariadb', \
         'postgresql', 'oracle', 'mssql', 'mongodb', 'couchbase', or 'cassandra', got '{database_type}'"
    )]
    IllegalArgument { database_type: String },
}

/// Errors raised when a validation is assembled from loose parts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unknown validation: {name}")]
    UnknownValidation { name: String },

    #[error("validation '{name}' requires a value")]
    MissingValue { name: String },
}

/// Violated requirements of an application configuration.
///
/// The variant names double as the stable error codes reported to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationErrorCase {
    NoApplication,
    NoName,
    NoPackageNameOrFolder,
    NoAuthenticationType,
    NoHibernateCache,
    NoDatabaseType,
    NoDevDatabaseType,
    NoProdDatabaseType,
    NoBuildTool,
    NoApplicationType,
    NoClientFramework,
    NoChosenLanguage,
}

impl ApplicationErrorCase {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoApplication => "NoApplication",
            Self::NoName => "NoName",
            Self::NoPackageNameOrFolder => "NoPackageNameOrFolder",
            Self::NoAuthenticationType => "NoAuthenticationType",
            Self::NoHibernateCache => "NoHibernateCache",
            Self::NoDatabaseType => "NoDatabaseType",
            Self::NoDevDatabaseType => "NoDevDatabaseType",
            Self::NoProdDatabaseType => "NoProdDatabaseType",
            Self::NoBuildTool => "NoBuildTool",
            Self::NoApplicationType => "NoApplicationType",
            Self::NoClientFramework => "NoClientFramework",
            Self::NoChosenLanguage => "NoChosenLanguage",
        }
    }
}

impl fmt::Display for ApplicationErrorCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// TESTS
// =============================================================================
