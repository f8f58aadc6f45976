//! Grammar rule tags.
//!
//! Every CST node carries the rule that produced it, and every rule is an
//! entry point of its own (see [`JdlParser::parse_rule`](super::JdlParser::parse_rule)).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rule {
    Program,
    ApplicationDeclaration,
    ApplicationBody,
    ApplicationConfig,
    ConfigOption,
    ConstantDeclaration,
    EntityDeclaration,
    EntityTableNameDeclaration,
    EntityBody,
    FieldDeclaration,
    FieldType,
    Validation,
    MinMaxValidation,
    Pattern,
    RelationshipDeclaration,
    RelationshipType,
    RelationshipBody,
    RelationshipSide,
    EnumDeclaration,
    EnumPropList,
    DtoDeclaration,
    PaginationDeclaration,
    ServiceDeclaration,
    MicroserviceDeclaration,
    SearchEngineDeclaration,
    NoClientDeclaration,
    NoServerDeclaration,
    NoFluentMethod,
    FilterDeclaration,
    AngularSuffixDeclaration,
    EntityList,
    Method,
    Exclusion,
    Comment,
}

impl Rule {
    pub const ALL: &'static [Rule] = &[
        Rule::Program,
        Rule::ApplicationDeclaration,
        Rule::ApplicationBody,
        Rule::ApplicationConfig,
        Rule::ConfigOption,
        Rule::ConstantDeclaration,
        Rule::EntityDeclaration,
        Rule::EntityTableNameDeclaration,
        Rule::EntityBody,
        Rule::FieldDeclaration,
        Rule::FieldType,
        Rule::Validation,
        Rule::MinMaxValidation,
        Rule::Pattern,
        Rule::RelationshipDeclaration,
        Rule::RelationshipType,
        Rule::RelationshipBody,
        Rule::RelationshipSide,
        Rule::EnumDeclaration,
        Rule::EnumPropList,
        Rule::DtoDeclaration,
        Rule::PaginationDeclaration,
        Rule::ServiceDeclaration,
        Rule::MicroserviceDeclaration,
        Rule::SearchEngineDeclaration,
        Rule::NoClientDeclaration,
        Rule::NoServerDeclaration,
        Rule::NoFluentMethod,
        Rule::FilterDeclaration,
        Rule::AngularSuffixDeclaration,
        Rule::EntityList,
        Rule::Method,
        Rule::Exclusion,
        Rule::Comment,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Rule::Program => "program",
            Rule::ApplicationDeclaration => "applicationDeclaration",
            Rule::ApplicationBody => "applicationBody",
            Rule::ApplicationConfig => "applicationConfig",
            Rule::ConfigOption => "configOption",
            Rule::ConstantDeclaration => "constantDeclaration",
            Rule::EntityDeclaration => "entityDeclaration",
            Rule::EntityTableNameDeclaration => "entityTableNameDeclaration",
            Rule::EntityBody => "entityBody",
            Rule::FieldDeclaration => "fieldDeclaration",
            Rule::FieldType => "fieldType",
            Rule::Validation => "validation",
            Rule::MinMaxValidation => "minMaxValidation",
            Rule::Pattern => "pattern",
            Rule::RelationshipDeclaration => "relationshipDeclaration",
            Rule::RelationshipType => "relationshipType",
            Rule::RelationshipBody => "relationshipBody",
            Rule::RelationshipSide => "relationshipSide",
            Rule::EnumDeclaration => "enumDeclaration",
            Rule::EnumPropList => "enumPropList",
            Rule::DtoDeclaration => "dtoDeclaration",
            Rule::PaginationDeclaration => "paginationDeclaration",
            Rule::ServiceDeclaration => "serviceDeclaration",
            Rule::MicroserviceDeclaration => "microserviceDeclaration",
            Rule::SearchEngineDeclaration => "searchEngineDeclaration",
            Rule::NoClientDeclaration => "noClientDeclaration",
            Rule::NoServerDeclaration => "noServerDeclaration",
            Rule::NoFluentMethod => "noFluentMethod",
            Rule::FilterDeclaration => "filterDeclaration",
            Rule::AngularSuffixDeclaration => "angularSuffixDeclaration",
            Rule::EntityList => "entityList",
            Rule::Method => "method",
            Rule::Exclusion => "exclusion",
            Rule::Comment => "comment",
        }
    }

    /// Whether this rule is one of the alternatives of `program`.
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            Rule::ApplicationDeclaration
                | Rule::ConstantDeclaration
                | Rule::EntityDeclaration
                | Rule::RelationshipDeclaration
                | Rule::EnumDeclaration
                | Rule::DtoDeclaration
                | Rule::PaginationDeclaration
                | Rule::ServiceDeclaration
                | Rule::MicroserviceDeclaration
                | Rule::SearchEngineDeclaration
                | Rule::NoClientDeclaration
                | Rule::NoServerDeclaration
                | Rule::NoFluentMethod
                | Rule::FilterDeclaration
                | Rule::AngularSuffixDeclaration
        )
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown grammar rule: {0}")]
pub struct UnknownRule(pub String);

impl FromStr for Rule {
    type Err = UnknownRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rule::ALL
            .iter()
            .copied()
            .find(|rule| rule.name() == s)
            .ok_or_else(|| UnknownRule(s.to_string()))
    }
}
