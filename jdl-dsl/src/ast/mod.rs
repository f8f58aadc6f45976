//! Abstract Syntax Tree types

pub mod builder;

pub use builder::*;

use jdl_core::{ApplicationConfig, JdlValidation, ValidationKind, ValidationValue};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// AST TYPES
// ============================================================================

/// The root AST node: every declaration in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub declarations: Vec<Declaration>,
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Declaration {
    Application(ApplicationDecl),
    Constant(ConstantDecl),
    Entity(EntityDecl),
    Relationship(RelationshipDecl),
    Enum(EnumDecl),
    Option(OptionDecl),
    Comment { text: String },
}

/// `application { config { ... } }`, holding the options exactly as written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDecl {
    pub config: ApplicationConfig,
}

/// `NAME = 42`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantDecl {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDecl {
    pub name: String,
    pub table_name: Option<String>,
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub field_type: String,
    /// In source order, duplicates kept.
    pub validations: Vec<ValidationDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationDecl {
    pub kind: ValidationKind,
    pub param: Option<ValidationValue>,
}

impl ValidationDecl {
    pub fn required() -> Self {
        Self {
            kind: ValidationKind::Required,
            param: None,
        }
    }

    pub fn to_validation(&self) -> JdlValidation {
        JdlValidation::new(self.kind, self.param.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationshipKind {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OneToOne => "OneToOne",
            Self::OneToMany => "OneToMany",
            Self::ManyToOne => "ManyToOne",
            Self::ManyToMany => "ManyToMany",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipDecl {
    pub kind: RelationshipKind,
    pub pairs: Vec<RelationshipPair>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipPair {
    pub from: RelationshipSide,
    pub to: RelationshipSide,
}

/// One end of a relationship: `Entity{field(display) required}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipSide {
    pub entity: String,
    pub injected_field: Option<String>,
    pub display_field: Option<String>,
    pub required: bool,
    /// Comment written right before this side.
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDecl {
    pub name: String,
    pub values: Vec<String>,
}

/// Entity-level options applied to a selection of entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OptionKind {
    Dto,
    Paginate,
    Service,
    Microservice,
    Search,
    SkipClient,
    SkipServer,
    NoFluentMethod,
    Filter,
    AngularSuffix,
}

impl OptionKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Dto => "dto",
            Self::Paginate => "paginate",
            Self::Service => "service",
            Self::Microservice => "microservice",
            Self::Search => "search",
            Self::SkipClient => "skipClient",
            Self::SkipServer => "skipServer",
            Self::NoFluentMethod => "noFluentMethod",
            Self::Filter => "filter",
            Self::AngularSuffix => "angularSuffix",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitySelection {
    /// `*` or `all`
    All,
    Names(Vec<String>),
}

impl EntitySelection {
    pub fn includes(&self, entity: &str) -> bool {
        match self {
            Self::All => true,
            Self::Names(names) => names.iter().any(|name| name == entity),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDecl {
    pub kind: OptionKind,
    pub selection: EntitySelection,
    /// The `with` argument, e.g. `mapstruct` or `serviceImpl`.
    pub method: Option<String>,
    pub excluded: Vec<String>,
}

impl OptionDecl {
    /// Whether the option applies to `entity` once exclusions are taken out.
    pub fn applies_to(&self, entity: &str) -> bool {
        self.selection.includes(entity) && !self.excluded.iter().any(|name| name == entity)
    }
}

// ============================================================================
// PROGRAM ACCESSORS
// ============================================================================

impl Program {
    pub fn applications(&self) -> impl Iterator<Item = &ApplicationDecl> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Application(app) => Some(app),
            _ => None,
        })
    }

    pub fn constants(&self) -> impl Iterator<Item = &ConstantDecl> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Constant(constant) => Some(constant),
            _ => None,
        })
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityDecl> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Entity(entity) => Some(entity),
            _ => None,
        })
    }

    pub fn relationships(&self) -> impl Iterator<Item = &RelationshipDecl> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Relationship(relationship) => Some(relationship),
            _ => None,
        })
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumDecl> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Enum(decl) => Some(decl),
            _ => None,
        })
    }

    pub fn options(&self) -> impl Iterator<Item = &OptionDecl> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Option(option) => Some(option),
            _ => None,
        })
    }

    pub fn comments(&self) -> impl Iterator<Item = &str> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Comment { text } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn entity(&self, name: &str) -> Option<&EntityDecl> {
        self.entities().find(|entity| entity.name == name)
    }
}

impl EntityDecl {
    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|field| field.name == name)
    }
}
