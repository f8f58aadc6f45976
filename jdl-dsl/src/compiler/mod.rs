//! Model compiler - Transform AST to a checked domain model
//!
//! The compiler resolves constant references, builds applications over the
//! default option table and checks every field against the compatibility
//! table of the target database dialect.
//!
//! # Pipeline
//!
//! ```text
//! JDL Source → Lexer → Parser → CST → AstBuilder → Program → ModelCompiler → JdlModel
//!                                                                  ↓
//!                                                          SemanticError list
//! ```
//!
//! Findings never abort compilation: the model always comes back, next to
//! the ordered list of everything that was wrong with it.

use crate::ast::{EnumDecl, FieldDecl, OptionDecl, Program, RelationshipDecl};
use crate::config::CompilerConfig;
use crate::error::JdlResult;
use indexmap::IndexMap;
use jdl_core::{
    ApplicationErrorCase, Dialect, JdlApplication, JdlValidation, ValidationKind, ValidationValue,
};
use rand::CryptoRng;
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// Database type used when neither the configuration nor an application names one.
pub const DEFAULT_DATABASE_TYPE: &str = "sql";

// ============================================================================
// SEMANTIC ERRORS
// ============================================================================

/// Problems found while compiling a program into a model.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum SemanticError {
    #[error("duplicate definition: entity '{name}' is already defined")]
    DuplicateEntity { name: String },

    #[error("duplicate definition: constant '{name}' is already defined")]
    DuplicateConstant { name: String },

    #[error("duplicate definition: enum '{name}' is already defined")]
    DuplicateEnum { name: String },

    #[error("duplicate definition: field '{field}' is already defined in entity '{entity}'")]
    DuplicateField { entity: String, field: String },

    #[error("undefined reference: constant '{constant}' used by {entity}.{field} is not defined")]
    UndefinedConstant {
        entity: String,
        field: String,
        constant: String,
    },

    #[error("unsupported field type '{field_type}' for {entity}.{field} under the {database_type} database")]
    UnsupportedFieldType {
        entity: String,
        field: String,
        field_type: String,
        database_type: String,
    },

    #[error("validation '{validation}' is not allowed on {entity}.{field} of type {field_type} under the {database_type} database")]
    IncompatibleValidation {
        entity: String,
        field: String,
        field_type: String,
        validation: ValidationKind,
        database_type: String,
    },

    #[error("invalid pattern /{pattern}/ on {entity}.{field}: {reason}")]
    InvalidPattern {
        entity: String,
        field: String,
        pattern: String,
        reason: String,
    },

    #[error("application '{}' is invalid: {}", display_name(.base_name), join_cases(.cases))]
    InvalidApplication {
        base_name: Option<String>,
        cases: Vec<ApplicationErrorCase>,
    },

    #[error("unknown database type: {reason}")]
    UnknownDatabaseType {
        database_type: String,
        reason: String,
    },
}

fn display_name(base_name: &Option<String>) -> &str {
    base_name.as_deref().unwrap_or("?")
}

fn join_cases(cases: &[ApplicationErrorCase]) -> String {
    cases
        .iter()
        .map(ApplicationErrorCase::code)
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// MODEL TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JdlField {
    pub name: String,
    pub field_type: String,
    /// Whether `field_type` names an enum declared in the same program.
    pub is_enum: bool,
    /// Constant references resolved to integers; source order kept.
    pub validations: Vec<JdlValidation>,
}

impl JdlField {
    pub fn has(&self, kind: ValidationKind) -> bool {
        self.validations.iter().any(|v| v.name == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JdlEntity {
    pub name: String,
    pub table_name: Option<String>,
    pub fields: Vec<JdlField>,
}

impl JdlEntity {
    pub fn field(&self, name: &str) -> Option<&JdlField> {
        self.fields.iter().find(|field| field.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JdlEnum {
    pub name: String,
    pub values: Vec<String>,
}

/// The compiled model. Relationships and entity options are carried over
/// from the AST unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JdlModel {
    pub applications: Vec<JdlApplication>,
    pub entities: Vec<JdlEntity>,
    pub enums: Vec<JdlEnum>,
    pub constants: IndexMap<String, i64>,
    pub relationships: Vec<RelationshipDecl>,
    pub options: Vec<OptionDecl>,
    /// Dialect the fields were checked against, if it could be resolved.
    pub dialect: Option<Dialect>,
}

impl JdlModel {
    pub fn entity(&self, name: &str) -> Option<&JdlEntity> {
        self.entities.iter().find(|entity| entity.name == name)
    }
}

/// Model plus the ordered semantic errors met while building it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Compilation {
    pub model: JdlModel,
    pub errors: Vec<SemanticError>,
}

impl Compilation {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The model, or the first semantic error if there was any.
    pub fn into_model(self) -> JdlResult<JdlModel> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error.into()),
            None => Ok(self.model),
        }
    }
}

// ============================================================================
// COMPILER IMPLEMENTATION
// ============================================================================

/// Compiles a [`Program`] into a [`JdlModel`].
///
/// Declarations are visited in three passes: applications, constants and
/// enums first (so later passes can refer to them regardless of source
/// order), then the dialect is resolved, then entities are checked.
#[derive(Debug, Clone, Default)]
pub struct ModelCompiler {
    config: CompilerConfig,
}

struct Pass {
    model: JdlModel,
    errors: Vec<SemanticError>,
    database_type: String,
}

impl Pass {
    fn report(&mut self, error: SemanticError) {
        debug!(%error, "semantic error");
        self.errors.push(error);
    }
}

impl ModelCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile, drawing application secrets from the thread-local CSPRNG.
    pub fn compile(&self, program: &Program) -> Compilation {
        self.compile_with_rng(program, &mut rand::rng())
    }

    /// Compile, drawing application secrets from `rng`.
    pub fn compile_with_rng<R: CryptoRng + ?Sized>(&self, program: &Program, rng: &mut R) -> Compilation {
        let mut pass = Pass {
            model: JdlModel::default(),
            errors: Vec::new(),
            database_type: String::new(),
        };

        for decl in program.applications() {
            let application = JdlApplication::with_rng(decl.config.clone(), rng);
            let cases = application.check_validity();
            if !cases.is_empty() {
                pass.report(SemanticError::InvalidApplication {
                    base_name: application.base_name().map(str::to_string),
                    cases,
                });
            }
            pass.model.applications.push(application);
        }

        for constant in program.constants() {
            if pass.model.constants.contains_key(&constant.name) {
                pass.report(SemanticError::DuplicateConstant {
                    name: constant.name.clone(),
                });
                continue;
            }
            pass.model.constants.insert(constant.name.clone(), constant.value);
        }

        for decl in program.enums() {
            self.compile_enum(&mut pass, decl);
        }

        self.resolve_dialect(&mut pass);

        let enum_names: HashSet<String> = pass.model.enums.iter().map(|e| e.name.clone()).collect();
        let mut entity_names = HashSet::new();
        for decl in program.entities() {
            if !entity_names.insert(decl.name.clone()) {
                pass.report(SemanticError::DuplicateEntity {
                    name: decl.name.clone(),
                });
                continue;
            }
            let mut entity = JdlEntity {
                name: decl.name.clone(),
                table_name: decl.table_name.clone(),
                fields: Vec::with_capacity(decl.fields.len()),
            };
            for field in &decl.fields {
                if entity.field(&field.name).is_some() {
                    pass.report(SemanticError::DuplicateField {
                        entity: decl.name.clone(),
                        field: field.name.clone(),
                    });
                    continue;
                }
                let compiled = self.compile_field(&mut pass, &decl.name, field, &enum_names);
                entity.fields.push(compiled);
            }
            pass.model.entities.push(entity);
        }

        pass.model.relationships = program.relationships().cloned().collect();
        pass.model.options = program.options().cloned().collect();

        debug!(
            applications = pass.model.applications.len(),
            entities = pass.model.entities.len(),
            enums = pass.model.enums.len(),
            constants = pass.model.constants.len(),
            errors = pass.errors.len(),
            database_type = %pass.database_type,
            "compiled model"
        );

        Compilation {
            model: pass.model,
            errors: pass.errors,
        }
    }

    fn compile_enum(&self, pass: &mut Pass, decl: &EnumDecl) {
        if pass.model.enums.iter().any(|e| e.name == decl.name) {
            pass.report(SemanticError::DuplicateEnum {
                name: decl.name.clone(),
            });
            return;
        }
        pass.model.enums.push(JdlEnum {
            name: decl.name.clone(),
            values: decl.values.clone(),
        });
    }

    /// Configured database type, else the first application's, else `sql`.
    fn resolve_dialect(&self, pass: &mut Pass) {
        let database_type = self
            .config
            .database_type
            .clone()
            .or_else(|| {
                pass.model
                    .applications
                    .first()
                    .and_then(|app| app.database_type())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| DEFAULT_DATABASE_TYPE.to_string());

        match Dialect::for_database(&database_type) {
            Ok(dialect) => pass.model.dialect = Some(dialect),
            Err(e) => pass.report(SemanticError::UnknownDatabaseType {
                database_type: database_type.clone(),
                reason: e.to_string(),
            }),
        }
        pass.database_type = database_type;
    }

    fn compile_field(
        &self,
        pass: &mut Pass,
        entity: &str,
        field: &FieldDecl,
        enum_names: &HashSet<String>,
    ) -> JdlField {
        let is_enum = enum_names.contains(&field.field_type);

        // `None` when the dialect is unknown or the type unsupported: no
        // validation can be checked against it then.
        let allowed = match pass.model.dialect {
            Some(dialect) => match dialect.validations_for(&field.field_type, is_enum) {
                Ok(Some(kinds)) => Some(kinds),
                Ok(None) | Err(_) => {
                    pass.report(SemanticError::UnsupportedFieldType {
                        entity: entity.to_string(),
                        field: field.name.clone(),
                        field_type: field.field_type.clone(),
                        database_type: pass.database_type.clone(),
                    });
                    None
                }
            },
            None => None,
        };

        let mut validations = Vec::with_capacity(field.validations.len());
        for decl in &field.validations {
            if let Some(kinds) = allowed {
                if !kinds.contains(&decl.kind) {
                    pass.report(SemanticError::IncompatibleValidation {
                        entity: entity.to_string(),
                        field: field.name.clone(),
                        field_type: field.field_type.clone(),
                        validation: decl.kind,
                        database_type: pass.database_type.clone(),
                    });
                }
            }

            let value = match &decl.param {
                Some(ValidationValue::Constant(name)) => match pass.model.constants.get(name) {
                    Some(n) => Some(ValidationValue::Integer(*n)),
                    None => {
                        pass.report(SemanticError::UndefinedConstant {
                            entity: entity.to_string(),
                            field: field.name.clone(),
                            constant: name.clone(),
                        });
                        continue;
                    }
                },
                Some(ValidationValue::Pattern(pattern)) => {
                    if self.config.check_patterns {
                        if let Err(e) = regex::Regex::new(pattern) {
                            pass.report(SemanticError::InvalidPattern {
                                entity: entity.to_string(),
                                field: field.name.clone(),
                                pattern: pattern.clone(),
                                reason: e.to_string(),
                            });
                        }
                    }
                    Some(ValidationValue::Pattern(pattern.clone()))
                }
                other => other.clone(),
            };
            validations.push(JdlValidation::new(decl.kind, value));
        }

        JdlField {
            name: field.name.clone(),
            field_type: field.field_type.clone(),
            is_enum,
            validations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ConstantDecl, Declaration, EntityDecl, ValidationDecl};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn field(name: &str, field_type: &str, validations: Vec<ValidationDecl>) -> FieldDecl {
        FieldDecl {
            name: name.to_string(),
            field_type: field_type.to_string(),
            validations,
        }
    }

    fn entity(name: &str, fields: Vec<FieldDecl>) -> Declaration {
        Declaration::Entity(EntityDecl {
            name: name.to_string(),
            table_name: None,
            fields,
        })
    }

    fn compile(program: &Program) -> Compilation {
        ModelCompiler::default().compile_with_rng(program, &mut StdRng::seed_from_u64(7))
    }

    #[test]
    fn test_empty_program_uses_sql_dialect() {
        let compilation = compile(&Program::default());
        assert!(compilation.is_ok());
        assert_eq!(compilation.model.dialect, Some(Dialect::Common));
    }

    #[test]
    fn test_constant_reference_is_resolved() {
        let program = Program {
            declarations: vec![
                entity(
                    "A",
                    vec![field(
                        "name",
                        "String",
                        vec![ValidationDecl {
                            kind: ValidationKind::MaxLength,
                            param: Some(ValidationValue::Constant("MAX".into())),
                        }],
                    )],
                ),
                Declaration::Constant(ConstantDecl {
                    name: "MAX".into(),
                    value: 42,
                }),
            ],
        };
        let compilation = compile(&program);
        assert!(compilation.is_ok(), "{:?}", compilation.errors);
        let field = compilation.model.entity("A").unwrap().field("name").unwrap();
        assert_eq!(
            field.validations,
            vec![JdlValidation::new(ValidationKind::MaxLength, Some(ValidationValue::Integer(42)))]
        );
    }

    #[test]
    fn test_undefined_constant_drops_validation() {
        let program = Program {
            declarations: vec![entity(
                "A",
                vec![field(
                    "age",
                    "Integer",
                    vec![
                        ValidationDecl::required(),
                        ValidationDecl {
                            kind: ValidationKind::Min,
                            param: Some(ValidationValue::Constant("LOW".into())),
                        },
                    ],
                )],
            )],
        };
        let compilation = compile(&program);
        assert_eq!(
            compilation.errors,
            vec![SemanticError::UndefinedConstant {
                entity: "A".into(),
                field: "age".into(),
                constant: "LOW".into(),
            }]
        );
        let field = compilation.model.entity("A").unwrap().field("age").unwrap();
        assert_eq!(field.validations, vec![JdlValidation::required()]);
    }

    #[test]
    fn test_configured_wide_column_dialect() {
        let compiler = ModelCompiler::new(CompilerConfig {
            database_type: Some("cassandra".into()),
            ..CompilerConfig::default()
        });
        let program = Program {
            declarations: vec![entity(
                "A",
                vec![
                    field("id", "UUID", vec![ValidationDecl::required()]),
                    field("at", "LocalDate", vec![]),
                ],
            )],
        };
        let compilation = compiler.compile_with_rng(&program, &mut StdRng::seed_from_u64(1));
        assert_eq!(compilation.model.dialect, Some(Dialect::WideColumn));
        assert_eq!(
            compilation.errors,
            vec![SemanticError::UnsupportedFieldType {
                entity: "A".into(),
                field: "at".into(),
                field_type: "LocalDate".into(),
                database_type: "cassandra".into(),
            }]
        );
    }

    #[test]
    fn test_unknown_database_type_skips_field_checks() {
        let compiler = ModelCompiler::new(CompilerConfig {
            database_type: Some("neo4j".into()),
            ..CompilerConfig::default()
        });
        let program = Program {
            declarations: vec![entity("A", vec![field("x", "Whatever", vec![])])],
        };
        let compilation = compiler.compile_with_rng(&program, &mut StdRng::seed_from_u64(1));
        assert_eq!(compilation.model.dialect, None);
        assert_eq!(compilation.errors.len(), 1);
        assert!(matches!(
            compilation.errors[0],
            SemanticError::UnknownDatabaseType { .. }
        ));
    }

    #[test]
    fn test_pattern_check_can_be_disabled() {
        let program = Program {
            declarations: vec![entity(
                "A",
                vec![field(
                    "code",
                    "String",
                    vec![ValidationDecl {
                        kind: ValidationKind::Pattern,
                        param: Some(ValidationValue::Pattern("[unclosed".into())),
                    }],
                )],
            )],
        };
        let checked = compile(&program);
        assert!(matches!(
            checked.errors.as_slice(),
            [SemanticError::InvalidPattern { .. }]
        ));

        let unchecked = ModelCompiler::new(CompilerConfig {
            check_patterns: false,
            ..CompilerConfig::default()
        })
        .compile_with_rng(&program, &mut StdRng::seed_from_u64(1));
        assert!(unchecked.is_ok());
    }

    #[test]
    fn test_invalid_application_message() {
        let error = SemanticError::InvalidApplication {
            base_name: Some("shop".into()),
            cases: vec![ApplicationErrorCase::NoBuildTool, ApplicationErrorCase::NoClientFramework],
        };
        assert_eq!(
            error.to_string(),
            "application 'shop' is invalid: NoBuildTool, NoClientFramework"
        );
    }
}
