//! Field types and their legal validations per database dialect
//!
//! Every supported database engine belongs to one of two dialects. The
//! relational/document engines share one table of field types, the
//! wide-column engine (Cassandra) has its own. A user-defined enumeration is
//! looked up as `Enum`, which only the relational/document table knows.

use crate::error::FieldTypeError;
use crate::validation::ValidationKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use ValidationKind::{MaxBytes, MaxLength, MinBytes, MinLength, Pattern, Required};

const NUMERIC: &[ValidationKind] = &[Required, ValidationKind::Min, ValidationKind::Max];
const TEXTUAL: &[ValidationKind] = &[Required, MinLength, MaxLength, Pattern];
const BINARY: &[ValidationKind] = &[Required, MinBytes, MaxBytes];
const PRESENCE: &[ValidationKind] = &[Required];

/// Field type name used for any user-defined enumeration.
pub const ENUM_TYPE: &str = "Enum";

const COMMON_DB_VALIDATIONS: &[(&str, &[ValidationKind])] = &[
    ("String", TEXTUAL),
    ("Integer", NUMERIC),
    ("Long", NUMERIC),
    ("BigDecimal", NUMERIC),
    ("Float", NUMERIC),
    ("Double", NUMERIC),
    (ENUM_TYPE, PRESENCE),
    ("Boolean", PRESENCE),
    ("LocalDate", PRESENCE),
    ("ZonedDateTime", PRESENCE),
    ("Blob", BINARY),
    ("AnyBlob", BINARY),
    ("ImageBlob", BINARY),
    ("TextBlob", BINARY),
    ("Instant", PRESENCE),
];

const CASSANDRA_VALIDATIONS: &[(&str, &[ValidationKind])] = &[
    ("String", TEXTUAL),
    ("Integer", NUMERIC),
    ("Long", NUMERIC),
    ("BigDecimal", NUMERIC),
    ("Float", NUMERIC),
    ("Double", NUMERIC),
    ("Boolean", PRESENCE),
    ("Date", PRESENCE),
    ("UUID", PRESENCE),
    ("Instant", PRESENCE),
];

/// Database engines a model can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    Sql,
    Mysql,
    Mariadb,
    Postgresql,
    Oracle,
    Mssql,
    Mongodb,
    Couchbase,
    Cassandra,
}

impl DatabaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sql => "sql",
            Self::Mysql => "mysql",
            Self::Mariadb => "mariadb",
            Self::Postgresql => "postgresql",
            Self::Oracle => "oracle",
            Self::Mssql => "mssql",
            Self::Mongodb => "mongodb",
            Self::Couchbase => "couchbase",
            Self::Cassandra => "cassandra",
        }
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            Self::Cassandra => Dialect::WideColumn,
            _ => Dialect::Common,
        }
    }
}

impl FromStr for DatabaseType {
    type Err = FieldTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err(FieldTypeError::NullPointer {
                message: "The passed database type must not be nil.".to_string(),
            }),
            "sql" => Ok(Self::Sql),
            "mysql" => Ok(Self::Mysql),
            "mariadb" => Ok(Self::Mariadb),
            "postgresql" => Ok(Self::Postgresql),
            "oracle" => Ok(Self::Oracle),
            "mssql" => Ok(Self::Mssql),
            "mongodb" => Ok(Self::Mongodb),
            "couchbase" => Ok(Self::Couchbase),
            "cassandra" => Ok(Self::Cassandra),
            other => Err(FieldTypeError::IllegalArgument {
                database_type: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A family of database engines sharing one compatibility table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// Relational and document engines.
    Common,
    /// Cassandra.
    WideColumn,
}

impl Dialect {
    /// Resolve the dialect of a database type identifier.
    pub fn for_database(database_type: &str) -> Result<Self, FieldTypeError> {
        database_type.parse::<DatabaseType>().map(|db| db.dialect())
    }

    fn table(&self) -> &'static [(&'static str, &'static [ValidationKind])] {
        match self {
            Self::Common => COMMON_DB_VALIDATIONS,
            Self::WideColumn => CASSANDRA_VALIDATIONS,
        }
    }

    /// Field type names known to this dialect, in table order.
    pub fn field_types(&self) -> impl Iterator<Item = &'static str> {
        self.table().iter().map(|(name, _)| *name)
    }

    /// Validations legal for a field type, or `None` if the type is unknown here.
    pub fn validations_for(
        &self,
        field_type: &str,
        is_enum: bool,
    ) -> Result<Option<&'static [ValidationKind]>, FieldTypeError> {
        let field_type = resolve_type(field_type, is_enum)?;
        Ok(self
            .table()
            .iter()
            .find(|(name, _)| *name == field_type)
            .map(|(_, kinds)| *kinds))
    }

    /// Whether the field type belongs to this dialect.
    pub fn is_type(&self, field_type: &str, is_enum: bool) -> Result<bool, FieldTypeError> {
        Ok(self.validations_for(field_type, is_enum)?.is_some())
    }

    /// Whether `kind` is legal for the field type under this dialect.
    pub fn supports(
        &self,
        field_type: &str,
        kind: ValidationKind,
        is_enum: bool,
    ) -> Result<bool, FieldTypeError> {
        Ok(self
            .validations_for(field_type, is_enum)?
            .is_some_and(|kinds| kinds.contains(&kind)))
    }

    /// Same as [`Dialect::supports`] with the validation given by keyword.
    ///
    /// Unknown keywords are simply not supported; an empty one is a contract violation.
    pub fn has_validation(
        &self,
        field_type: &str,
        validation: &str,
        is_enum: bool,
    ) -> Result<bool, FieldTypeError> {
        if field_type.is_empty() || validation.is_empty() {
            return Err(FieldTypeError::NullPointer {
                message: "The passed type and value must not be nil.".to_string(),
            });
        }
        match validation.parse::<ValidationKind>() {
            Ok(kind) => self.supports(field_type, kind, is_enum),
            Err(_) => Ok(false),
        }
    }
}

fn resolve_type(field_type: &str, is_enum: bool) -> Result<&str, FieldTypeError> {
    if field_type.is_empty() {
        return Err(FieldTypeError::NullPointer {
            message: "The passed type must not be nil.".to_string(),
        });
    }
    Ok(if is_enum { ENUM_TYPE } else { field_type })
}

/// Whether the type belongs to the relational/document table.
pub fn is_common_db_type(field_type: &str, is_enum: bool) -> Result<bool, FieldTypeError> {
    Dialect::Common.is_type(field_type, is_enum)
}

/// Whether the type belongs to the Cassandra table. Enumerations never do.
pub fn is_cassandra_type(field_type: &str, is_enum: bool) -> Result<bool, FieldTypeError> {
    Dialect::WideColumn.is_type(field_type, is_enum)
}

/// Check a validation against the table of the given database type's dialect.
pub fn has_validation(
    database_type: &str,
    field_type: &str,
    validation: &str,
    is_enum: bool,
) -> Result<bool, FieldTypeError> {
    Dialect::for_database(database_type)?.has_validation(field_type, validation, is_enum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_validations_under_common_dialect() {
        assert_eq!(Dialect::Common.has_validation("String", "required", false), Ok(true));
        assert_eq!(Dialect::Common.has_validation("String", "pattern", false), Ok(true));
        assert_eq!(Dialect::Common.has_validation("String", "minbytes", false), Ok(false));
    }

    #[test]
    fn test_uuid_only_under_wide_column() {
        assert_eq!(Dialect::WideColumn.has_validation("UUID", "required", false), Ok(true));
        assert_eq!(Dialect::Common.has_validation("UUID", "required", false), Ok(false));
    }

    #[test]
    fn test_enum_resolution() {
        assert_eq!(Dialect::Common.has_validation("Language", "required", true), Ok(true));
        assert_eq!(Dialect::Common.has_validation("Language", "min", true), Ok(false));
        assert_eq!(Dialect::WideColumn.has_validation("Language", "required", true), Ok(false));
        assert_eq!(is_cassandra_type("Language", true), Ok(false));
        assert_eq!(is_common_db_type("Language", true), Ok(true));
    }

    #[test]
    fn test_blob_types_take_byte_bounds() {
        for blob in ["Blob", "AnyBlob", "ImageBlob", "TextBlob"] {
            assert_eq!(Dialect::Common.supports(blob, MaxBytes, false), Ok(true));
            assert_eq!(Dialect::Common.supports(blob, MaxLength, false), Ok(false));
        }
        assert_eq!(is_cassandra_type("Blob", false), Ok(false));
    }

    #[test]
    fn test_database_types_map_to_dialects() {
        for db in ["sql", "mysql", "mariadb", "postgresql", "oracle", "mssql", "mongodb", "couchbase"] {
            assert_eq!(Dialect::for_database(db), Ok(Dialect::Common));
        }
        assert_eq!(Dialect::for_database("cassandra"), Ok(Dialect::WideColumn));
    }

    #[test]
    fn test_unknown_database_type_is_illegal_argument() {
        assert_eq!(
            has_validation("neo4j", "String", "required", false),
            Err(FieldTypeError::IllegalArgument {
                database_type: "neo4j".to_string()
            })
        );
    }

    #[test]
    fn test_nil_arguments_are_null_pointer_errors() {
        assert!(matches!(
            Dialect::Common.has_validation("", "required", false),
            Err(FieldTypeError::NullPointer { .. })
        ));
        assert!(matches!(
            Dialect::Common.has_validation("String", "", false),
            Err(FieldTypeError::NullPointer { .. })
        ));
        assert!(matches!(
            Dialect::for_database(""),
            Err(FieldTypeError::NullPointer { .. })
        ));
    }

    #[test]
    fn test_unknown_validation_keyword_is_not_supported() {
        assert_eq!(Dialect::Common.has_validation("String", "unique", false), Ok(false));
    }

    #[test]
    fn test_field_type_listing() {
        let common: Vec<_> = Dialect::Common.field_types().collect();
        assert_eq!(common.len(), 15);
        assert!(common.contains(&"ZonedDateTime"));
        let wide: Vec<_> = Dialect::WideColumn.field_types().collect();
        assert_eq!(wide.len(), 10);
        assert!(wide.contains(&"Date"));
    }
}
