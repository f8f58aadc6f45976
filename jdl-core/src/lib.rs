//! JDL Core - Domain Model
//!
//! Typed building blocks shared by every stage of the JDL toolchain:
//! validation kinds and values, the field-type/validation compatibility
//! tables per database dialect, and the application configuration with its
//! defaults and derived secrets. This crate knows nothing about source text.

pub mod application;
pub mod error;
pub mod field_types;
pub mod validation;

pub use application::{check_validity, is_valid, ApplicationConfig, JdlApplication, OptionValue};
pub use error::*;
pub use field_types::{DatabaseType, Dialect};
pub use validation::{JdlValidation, ValidationKind, ValidationValue};
