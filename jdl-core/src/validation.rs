//! Field validations

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The validation keywords a field may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationKind {
    Required,
    Min,
    Max,
    MinLength,
    MaxLength,
    Pattern,
    MinBytes,
    MaxBytes,
}

impl ValidationKind {
    pub const ALL: [ValidationKind; 8] = [
        ValidationKind::Required,
        ValidationKind::Min,
        ValidationKind::Max,
        ValidationKind::MinLength,
        ValidationKind::MaxLength,
        ValidationKind::Pattern,
        ValidationKind::MinBytes,
        ValidationKind::MaxBytes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Min => "min",
            Self::Max => "max",
            Self::MinLength => "minlength",
            Self::MaxLength => "maxlength",
            Self::Pattern => "pattern",
            Self::MinBytes => "minbytes",
            Self::MaxBytes => "maxbytes",
        }
    }

    /// Whether this kind carries a parenthesized argument.
    pub fn takes_value(&self) -> bool {
        !matches!(self, Self::Required)
    }

    /// Whether this kind is one of the numeric bound keywords.
    pub fn is_min_max(&self) -> bool {
        matches!(
            self,
            Self::Min | Self::Max | Self::MinLength | Self::MaxLength | Self::MinBytes | Self::MaxBytes
        )
    }
}

impl FromStr for ValidationKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownValidation { name: s.to_string() })
    }
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Argument of a validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationValue {
    Integer(i64),
    /// Reference to a named constant, resolved during model compilation.
    Constant(String),
    /// Regular expression body, without the surrounding slashes.
    Pattern(String),
}

impl fmt::Display for ValidationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{}", n),
            Self::Constant(name) => f.write_str(name),
            Self::Pattern(re) => write!(f, "/{}/", re),
        }
    }
}

/// A validation attached to a field, e.g. `required` or `min(42)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JdlValidation {
    pub name: ValidationKind,
    pub value: Option<ValidationValue>,
}

impl Default for JdlValidation {
    fn default() -> Self {
        Self {
            name: ValidationKind::Required,
            value: None,
        }
    }
}

impl JdlValidation {
    pub fn new(name: ValidationKind, value: Option<ValidationValue>) -> Self {
        Self { name, value }
    }

    pub fn required() -> Self {
        Self::default()
    }

    /// Build a validation from a keyword and an optional argument.
    pub fn from_parts(name: &str, value: Option<ValidationValue>) -> Result<Self, ValidationError> {
        let kind: ValidationKind = name.parse()?;
        let validation = Self::new(kind, value);
        if !validation.is_valid() {
            return Err(ValidationError::MissingValue {
                name: name.to_string(),
            });
        }
        Ok(validation)
    }

    /// A validation is valid when it carries a value exactly when its kind needs one.
    pub fn is_valid(&self) -> bool {
        !self.name.takes_value() || self.value.is_some()
    }
}

impl fmt::Display for JdlValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            None => write!(f, "{}", self.name),
            Some(value) => write!(f, "{}({})", self.name, value),
        }
    }
}
