//! CST to AST transform.
//!
//! [`AstBuilder::build`] dispatches on the rule tag of a CST node and
//! returns the matching [`AstNode`]. Optional child lists that are empty map
//! to `None`, repeated lists map to `Vec`s in source order.

use super::*;
use crate::lexer::{Token, TokenKind};
use crate::parser::{CstElement, CstNode, Rule};
use jdl_core::application::{LANGUAGES, TEST_FRAMEWORKS};
use jdl_core::{OptionValue, ValidationKind, ValidationValue};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("{rule} node was produced by error recovery")]
    RecoveredNode { rule: Rule },

    #[error("{rule} node is missing its {label}")]
    MissingChild { rule: Rule, label: &'static str },

    #[error("expected a {expected} node, found {found}")]
    UnexpectedRule { expected: &'static str, found: Rule },
}

/// Result of building one CST node.
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    Program(Program),
    Declaration(Declaration),
    ApplicationConfig(ApplicationConfig),
    ConfigOption { name: String, value: OptionValue },
    TableName(String),
    Fields(Vec<FieldDecl>),
    Field(FieldDecl),
    FieldType(String),
    Validation(ValidationDecl),
    RelationshipKind(RelationshipKind),
    RelationshipPair(RelationshipPair),
    RelationshipSide(RelationshipSide),
    EntityList {
        selection: EntitySelection,
        method: Option<String>,
    },
    /// Enum values, exclusion lists.
    Names(Vec<String>),
    Method(String),
    Comment(String),
}

type BuildResult<T> = Result<T, BuildError>;

#[derive(Debug, Clone, Copy, Default)]
pub struct AstBuilder;

impl AstBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the AST node for any CST node.
    pub fn build(&self, node: &CstNode) -> BuildResult<AstNode> {
        if node.recovered {
            return Err(BuildError::RecoveredNode { rule: node.rule });
        }
        Ok(match node.rule {
            Rule::Program => AstNode::Program(self.program(node)),
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
            | Rule::AngularSuffixDeclaration => AstNode::Declaration(self.declaration(node)?),
            Rule::ApplicationBody => AstNode::ApplicationConfig(self.application_body(node)?),
            Rule::ApplicationConfig => AstNode::ApplicationConfig(self.application_config(node)?),
            Rule::ConfigOption => {
                let (name, value) = self.config_option(node)?;
                AstNode::ConfigOption { name, value }
            }
            Rule::EntityTableNameDeclaration => AstNode::TableName(self.name(node)?),
            Rule::EntityBody => AstNode::Fields(self.entity_body(node)?),
            Rule::FieldDeclaration => AstNode::Field(self.field(node)?),
            Rule::FieldType => AstNode::FieldType(self.name(node)?),
            Rule::Validation => AstNode::Validation(self.validation(node)?),
            Rule::MinMaxValidation => AstNode::Validation(self.min_max_validation(node)?),
            Rule::Pattern => AstNode::Validation(self.pattern(node)?),
            Rule::RelationshipType => AstNode::RelationshipKind(self.relationship_type(node)?),
            Rule::RelationshipBody => AstNode::RelationshipPair(self.relationship_body(node)?),
            Rule::RelationshipSide => AstNode::RelationshipSide(self.relationship_side(node)?),
            Rule::EnumPropList | Rule::Exclusion => AstNode::Names(names(node)),
            Rule::EntityList => {
                let (selection, method) = self.entity_list(node)?;
                AstNode::EntityList { selection, method }
            }
            Rule::Method => AstNode::Method(self.name(node)?),
            Rule::Comment => AstNode::Comment(self.comment(node)?),
        })
    }

    /// Build a program, leaving out declarations that were recovered from
    /// or that cannot be built.
    pub fn program(&self, node: &CstNode) -> Program {
        let mut declarations = Vec::new();
        for element in node.elements() {
            match element {
                CstElement::Token(token) => {
                    if let TokenKind::Comment(text) = &token.kind {
                        declarations.push(Declaration::Comment { text: text.clone() });
                    }
                }
                CstElement::Node(child) => match self.declaration(child) {
                    Ok(declaration) => declarations.push(declaration),
                    Err(error) => {
                        debug!(rule = child.rule.name(), %error, "skipping declaration");
                    }
                },
            }
        }
        Program { declarations }
    }

    pub fn declaration(&self, node: &CstNode) -> BuildResult<Declaration> {
        if node.has_recovered() {
            return Err(BuildError::RecoveredNode { rule: node.rule });
        }
        let declaration = match node.rule {
            Rule::ApplicationDeclaration => {
                let config = match node.node(Rule::ApplicationBody) {
                    Some(body) => self.application_body(body)?,
                    None => ApplicationConfig::new(),
                };
                Declaration::Application(ApplicationDecl { config })
            }
            Rule::ConstantDeclaration => Declaration::Constant(self.constant(node)?),
            Rule::EntityDeclaration => Declaration::Entity(self.entity(node)?),
            Rule::RelationshipDeclaration => Declaration::Relationship(self.relationship(node)?),
            Rule::EnumDeclaration => Declaration::Enum(self.enum_declaration(node)?),
            Rule::Comment => Declaration::Comment {
                text: self.comment(node)?,
            },
            rule => match option_kind(rule) {
                Some(kind) => Declaration::Option(self.option(kind, node)?),
                None => {
                    return Err(BuildError::UnexpectedRule {
                        expected: "declaration",
                        found: rule,
                    })
                }
            },
        };
        Ok(declaration)
    }

    fn application_body(&self, node: &CstNode) -> BuildResult<ApplicationConfig> {
        let config = child(node, Rule::ApplicationConfig)?;
        self.application_config(config)
    }

    fn application_config(&self, node: &CstNode) -> BuildResult<ApplicationConfig> {
        let mut config = ApplicationConfig::new();
        for option in node.nodes(Rule::ConfigOption) {
            let (name, value) = self.config_option(option)?;
            config.insert(name, value);
        }
        Ok(config)
    }

    fn config_option(&self, node: &CstNode) -> BuildResult<(String, OptionValue)> {
        let name = token(node, "OPTION")?.text.clone();
        let values: Vec<&Token> = node
            .entries
            .iter()
            .filter(|entry| entry.label == "NAME" || entry.label == "INTEGER")
            .filter_map(|entry| match &entry.element {
                CstElement::Token(token) => Some(token),
                CstElement::Node(_) => None,
            })
            .collect();
        let is_list = name == LANGUAGES || name == TEST_FRAMEWORKS;

        let value = match values.as_slice() {
            [] if is_list => OptionValue::List(Vec::new()),
            [] => OptionValue::Null,
            [single] if !is_list => scalar_value(single),
            many => OptionValue::list(many.iter().map(|t| t.text.clone())),
        };
        Ok((name, value))
    }

    fn constant(&self, node: &CstNode) -> BuildResult<ConstantDecl> {
        let name = token(node, "NAME")?.text.clone();
        let value = integer(token(node, "INTEGER")?).ok_or(BuildError::MissingChild {
            rule: node.rule,
            label: "INTEGER",
        })?;
        Ok(ConstantDecl { name, value })
    }

    fn entity(&self, node: &CstNode) -> BuildResult<EntityDecl> {
        let name = self.name(node)?;
        let table_name = node
            .node(Rule::EntityTableNameDeclaration)
            .map(|table| self.name(table))
            .transpose()?;
        let fields = match node.node(Rule::EntityBody) {
            Some(body) => self.entity_body(body)?,
            None => Vec::new(),
        };
        Ok(EntityDecl {
            name,
            table_name,
            fields,
        })
    }

    fn entity_body(&self, node: &CstNode) -> BuildResult<Vec<FieldDecl>> {
        node.nodes(Rule::FieldDeclaration)
            .map(|field| self.field(field))
            .collect()
    }

    fn field(&self, node: &CstNode) -> BuildResult<FieldDecl> {
        let name = self.name(node)?;
        let field_type = self.name(child(node, Rule::FieldType)?)?;
        let validations = node
            .nodes(Rule::Validation)
            .map(|validation| self.validation(validation))
            .collect::<BuildResult<Vec<_>>>()?;
        Ok(FieldDecl {
            name,
            field_type,
            validations,
        })
    }

    fn validation(&self, node: &CstNode) -> BuildResult<ValidationDecl> {
        if node.token("REQUIRED").is_some() {
            Ok(ValidationDecl::required())
        } else if let Some(min_max) = node.node(Rule::MinMaxValidation) {
            self.min_max_validation(min_max)
        } else if let Some(pattern) = node.node(Rule::Pattern) {
            self.pattern(pattern)
        } else {
            Err(BuildError::MissingChild {
                rule: node.rule,
                label: "validation",
            })
        }
    }

    fn min_max_validation(&self, node: &CstNode) -> BuildResult<ValidationDecl> {
        let kind = match token(node, "MIN_MAX_KEYWORD")?.kind {
            TokenKind::MinMax(kind) => kind,
            _ => {
                return Err(BuildError::MissingChild {
                    rule: node.rule,
                    label: "MIN_MAX_KEYWORD",
                })
            }
        };
        let param = if let Some(n) = node.token("INTEGER").and_then(integer) {
            ValidationValue::Integer(n)
        } else {
            ValidationValue::Constant(token(node, "NAME")?.text.clone())
        };
        Ok(ValidationDecl {
            kind,
            param: Some(param),
        })
    }

    fn pattern(&self, node: &CstNode) -> BuildResult<ValidationDecl> {
        match &token(node, "REGEX")?.kind {
            TokenKind::Regex(body) => Ok(ValidationDecl {
                kind: ValidationKind::Pattern,
                param: Some(ValidationValue::Pattern(body.clone())),
            }),
            _ => Err(BuildError::MissingChild {
                rule: node.rule,
                label: "REGEX",
            }),
        }
    }

    fn relationship(&self, node: &CstNode) -> BuildResult<RelationshipDecl> {
        let kind = self.relationship_type(child(node, Rule::RelationshipType)?)?;
        let pairs = node
            .nodes(Rule::RelationshipBody)
            .map(|body| self.relationship_body(body))
            .collect::<BuildResult<Vec<_>>>()?;
        Ok(RelationshipDecl { kind, pairs })
    }

    fn relationship_type(&self, node: &CstNode) -> BuildResult<RelationshipKind> {
        match token(node, "RELATIONSHIP_TYPE")?.kind {
            TokenKind::OneToOne => Ok(RelationshipKind::OneToOne),
            TokenKind::OneToMany => Ok(RelationshipKind::OneToMany),
            TokenKind::ManyToOne => Ok(RelationshipKind::ManyToOne),
            TokenKind::ManyToMany => Ok(RelationshipKind::ManyToMany),
            _ => Err(BuildError::MissingChild {
                rule: node.rule,
                label: "RELATIONSHIP_TYPE",
            }),
        }
    }

    fn relationship_body(&self, node: &CstNode) -> BuildResult<RelationshipPair> {
        let mut sides = node.nodes(Rule::RelationshipSide);
        let (Some(from), Some(to)) = (sides.next(), sides.next()) else {
            return Err(BuildError::MissingChild {
                rule: node.rule,
                label: "relationshipSide",
            });
        };
        Ok(RelationshipPair {
            from: self.relationship_side(from)?,
            to: self.relationship_side(to)?,
        })
    }

    fn relationship_side(&self, node: &CstNode) -> BuildResult<RelationshipSide> {
        let comment = node
            .node(Rule::Comment)
            .map(|comment| self.comment(comment))
            .transpose()?;
        Ok(RelationshipSide {
            entity: self.name(node)?,
            injected_field: node.token("INJECTED_FIELD").map(|t| t.text.clone()),
            display_field: node.token("DISPLAY_FIELD").map(|t| t.text.clone()),
            required: node.token("REQUIRED").is_some(),
            comment,
        })
    }

    fn enum_declaration(&self, node: &CstNode) -> BuildResult<EnumDecl> {
        Ok(EnumDecl {
            name: self.name(node)?,
            values: names(child(node, Rule::EnumPropList)?),
        })
    }

    fn option(&self, kind: OptionKind, node: &CstNode) -> BuildResult<OptionDecl> {
        let (selection, method) = self.entity_list(child(node, Rule::EntityList)?)?;
        let excluded = node.node(Rule::Exclusion).map(names).unwrap_or_default();
        Ok(OptionDecl {
            kind,
            selection,
            method,
            excluded,
        })
    }

    fn entity_list(&self, node: &CstNode) -> BuildResult<(EntitySelection, Option<String>)> {
        let selection = if node.token("STAR").is_some() || node.token("ALL").is_some() {
            EntitySelection::All
        } else {
            EntitySelection::Names(names(node))
        };
        let method = node
            .node(Rule::Method)
            .map(|method| self.name(method))
            .transpose()?;
        Ok((selection, method))
    }

    fn comment(&self, node: &CstNode) -> BuildResult<String> {
        match &token(node, "COMMENT")?.kind {
            TokenKind::Comment(text) => Ok(text.clone()),
            _ => Err(BuildError::MissingChild {
                rule: node.rule,
                label: "COMMENT",
            }),
        }
    }

    /// Text of the first `NAME` token.
    fn name(&self, node: &CstNode) -> BuildResult<String> {
        Ok(token(node, "NAME")?.text.clone())
    }
}

fn option_kind(rule: Rule) -> Option<OptionKind> {
    Some(match rule {
        Rule::DtoDeclaration => OptionKind::Dto,
        Rule::PaginationDeclaration => OptionKind::Paginate,
        Rule::ServiceDeclaration => OptionKind::Service,
        Rule::MicroserviceDeclaration => OptionKind::Microservice,
        Rule::SearchEngineDeclaration => OptionKind::Search,
        Rule::NoClientDeclaration => OptionKind::SkipClient,
        Rule::NoServerDeclaration => OptionKind::SkipServer,
        Rule::NoFluentMethod => OptionKind::NoFluentMethod,
        Rule::FilterDeclaration => OptionKind::Filter,
        Rule::AngularSuffixDeclaration => OptionKind::AngularSuffix,
        _ => return None,
    })
}

fn child(node: &CstNode, rule: Rule) -> BuildResult<&CstNode> {
    node.node(rule).ok_or(BuildError::MissingChild {
        rule: node.rule,
        label: rule.name(),
    })
}

fn token<'a>(node: &'a CstNode, label: &'static str) -> BuildResult<&'a Token> {
    node.token(label).ok_or(BuildError::MissingChild {
        rule: node.rule,
        label,
    })
}

fn names(node: &CstNode) -> Vec<String> {
    node.tokens("NAME").map(|t| t.text.clone()).collect()
}

fn integer(token: &Token) -> Option<i64> {
    match token.kind {
        TokenKind::Integer(n) => Some(n),
        _ => None,
    }
}

/// `true`/`false` become booleans, `null` becomes null, integers stay
/// integers and everything else is text.
fn scalar_value(token: &Token) -> OptionValue {
    if let Some(n) = integer(token) {
        return OptionValue::Integer(n);
    }
    match token.text.as_str() {
        "true" => OptionValue::Boolean(true),
        "false" => OptionValue::Boolean(false),
        "null" => OptionValue::Null,
        text => OptionValue::text(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::JdlParser;

    fn build_rule(rule: Rule, source: &str) -> AstNode {
        let out = JdlParser::default().parse_rule(rule, source);
        assert!(out.is_ok(), "{:?}", out.errors);
        AstBuilder::new().build(&out.cst).unwrap()
    }

    #[test]
    fn test_field_with_validations() {
        let node = build_rule(Rule::FieldDeclaration, "age Integer min(0) max(MAX)");
        let AstNode::Field(field) = node else {
            panic!("expected field, got {:?}", node);
        };
        assert_eq!(field.name, "age");
        assert_eq!(field.field_type, "Integer");
        assert_eq!(
            field.validations,
            vec![
                ValidationDecl {
                    kind: ValidationKind::Min,
                    param: Some(ValidationValue::Integer(0)),
                },
                ValidationDecl {
                    kind: ValidationKind::Max,
                    param: Some(ValidationValue::Constant("MAX".to_string())),
                },
            ]
        );
    }

    #[test]
    fn test_pattern_validation() {
        let node = build_rule(Rule::Validation, r"pattern(/^[A-Z]\d+$/)");
        assert_eq!(
            node,
            AstNode::Validation(ValidationDecl {
                kind: ValidationKind::Pattern,
                param: Some(ValidationValue::Pattern(r"^[A-Z]\d+$".to_string())),
            })
        );
    }

    #[test]
    fn test_config_values() {
        let node = build_rule(
            Rule::ApplicationConfig,
            "config { baseName myApp serverPort 8081 useSass true languages en, fr, en testFrameworks frontEndBuilder }",
        );
        let AstNode::ApplicationConfig(config) = node else {
            panic!("expected config, got {:?}", node);
        };
        assert_eq!(config.get("baseName"), Some(&OptionValue::text("myApp")));
        assert_eq!(config.get("serverPort"), Some(&OptionValue::Integer(8081)));
        assert_eq!(config.get("useSass"), Some(&OptionValue::Boolean(true)));
        assert_eq!(config.get("languages"), Some(&OptionValue::list(["en", "fr"])));
        assert_eq!(config.get("testFrameworks"), Some(&OptionValue::List(Vec::new())));
        assert_eq!(config.get("frontEndBuilder"), Some(&OptionValue::Null));
    }

    #[test]
    fn test_single_language_is_a_list() {
        let node = build_rule(Rule::ConfigOption, "languages en");
        assert_eq!(
            node,
            AstNode::ConfigOption {
                name: "languages".to_string(),
                value: OptionValue::list(["en"]),
            }
        );
    }

    #[test]
    fn test_relationship_sides() {
        let node = build_rule(
            Rule::RelationshipDeclaration,
            "relationship OneToMany {\n  // owner\n  Owner{car(plate) required} to Car{owner}\n  A to B\n}",
        );
        let AstNode::Declaration(Declaration::Relationship(rel)) = node else {
            panic!("expected relationship, got {:?}", node);
        };
        assert_eq!(rel.kind, RelationshipKind::OneToMany);
        assert_eq!(rel.pairs.len(), 2);
        let from = &rel.pairs[0].from;
        assert_eq!(from.entity, "Owner");
        assert_eq!(from.injected_field.as_deref(), Some("car"));
        assert_eq!(from.display_field.as_deref(), Some("plate"));
        assert!(from.required);
        assert_eq!(from.comment.as_deref(), Some("// owner"));
        assert_eq!(rel.pairs[0].to.injected_field.as_deref(), Some("owner"));
        assert_eq!(rel.pairs[1].to, RelationshipSide {
            entity: "B".to_string(),
            ..RelationshipSide::default()
        });
    }

    #[test]
    fn test_option_declaration() {
        let node = build_rule(Rule::ServiceDeclaration, "service A, B with serviceImpl except B");
        let AstNode::Declaration(Declaration::Option(option)) = node else {
            panic!("expected option, got {:?}", node);
        };
        assert_eq!(option.kind, OptionKind::Service);
        assert_eq!(option.selection, EntitySelection::Names(vec!["A".into(), "B".into()]));
        assert_eq!(option.method.as_deref(), Some("serviceImpl"));
        assert!(option.applies_to("A"));
        assert!(!option.applies_to("B"));
    }

    #[test]
    fn test_recovered_node_is_rejected() {
        let out = JdlParser::default().parse_rule(Rule::EntityDeclaration, "entity A { name }");
        assert!(!out.is_ok());
        assert_eq!(
            AstBuilder::new().build(&out.cst),
            Err(BuildError::RecoveredNode {
                rule: Rule::EntityDeclaration
            })
        );
    }

    #[test]
    fn test_program_skips_recovered_declarations() {
        let out = JdlParser::default().parse("entity A\nentity B { x }\n// tail\nentity C");
        assert_eq!(out.errors.len(), 1);
        let program = AstBuilder::new().program(&out.cst);
        let names: Vec<_> = program.entities().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(program.comments().collect::<Vec<_>>(), vec!["// tail"]);
    }
}
