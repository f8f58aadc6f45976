//! Lexer token types

use jdl_core::ValidationKind;
use std::fmt;

// ============================================================================
// LEXER TYPES
// ============================================================================

/// Application option names recognized as keywords inside `config { ... }`.
pub const OPTION_KEYWORDS: &[&str] = &[
    "baseName",
    "path",
    "packageName",
    "packageFolder",
    "authenticationType",
    "hibernateCache",
    "clusteredHttpSession",
    "websocket",
    "databaseType",
    "devDatabaseType",
    "prodDatabaseType",
    "useCompass",
    "buildTool",
    "searchEngine",
    "enableTranslation",
    "applicationType",
    "testFrameworks",
    "languages",
    "serverPort",
    "enableSocialSignIn",
    "enableSwaggerCodegen",
    "useSass",
    "jhiPrefix",
    "messageBroker",
    "serviceDiscoveryType",
    "clientPackageManager",
    "clientFramework",
    "nativeLanguage",
    "frontEndBuilder",
    "skipUserManagement",
    "skipClient",
    "skipServer",
];

/// Token kinds for JDL.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Declaration keywords
    Application,
    Config,
    Entity,
    Relationship,
    Enum,
    Dto,
    Paginate,
    Service,
    Microservice,
    Search,
    NoFluentMethod,
    Filter,
    AngularSuffix,

    // Clause keywords
    With,
    Except,
    For,
    To,
    All,

    // Relationship kinds
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,

    // Validations
    Required,
    Pattern,
    /// One of min, max, minlength, maxlength, minbytes, maxbytes.
    MinMax(ValidationKind),

    /// An application option name; `skipClient` and `skipServer` double as
    /// declaration keywords at top level.
    OptionKeyword(&'static str),

    // Delimiters
    LBrace,
    RBrace,
    LParen,
    RParen,
    Comma,
    Equals,
    Star,

    // Literals
    Identifier(String),
    Integer(i64),
    /// Body of a `/.../` literal, slashes stripped.
    Regex(String),
    Comment(String),

    // Special
    Eof,
    Error(String),
}

impl TokenKind {
    /// Whether this kind is shaped like an identifier (identifiers and keywords).
    pub fn is_word(&self) -> bool {
        !matches!(
            self,
            TokenKind::LBrace
                | TokenKind::RBrace
                | TokenKind::LParen
                | TokenKind::RParen
                | TokenKind::Comma
                | TokenKind::Equals
                | TokenKind::Star
                | TokenKind::Integer(_)
                | TokenKind::Regex(_)
                | TokenKind::Comment(_)
                | TokenKind::Eof
                | TokenKind::Error(_)
        )
    }

    /// Child-list label used for this token in CST nodes.
    pub fn label(&self) -> &'static str {
        match self {
            TokenKind::Application => "APPLICATION",
            TokenKind::Config => "CONFIG",
            TokenKind::Entity => "ENTITY",
            TokenKind::Relationship => "RELATIONSHIP",
            TokenKind::Enum => "ENUM",
            TokenKind::Dto => "DTO",
            TokenKind::Paginate => "PAGINATE",
            TokenKind::Service => "SERVICE",
            TokenKind::Microservice => "MICROSERVICE",
            TokenKind::Search => "SEARCH",
            TokenKind::NoFluentMethod => "NO_FLUENT_METHOD",
            TokenKind::Filter => "FILTER",
            TokenKind::AngularSuffix => "ANGULAR_SUFFIX",
            TokenKind::With => "WITH",
            TokenKind::Except => "EXCEPT",
            TokenKind::For => "FOR",
            TokenKind::To => "TO",
            TokenKind::All => "ALL",
            TokenKind::OneToOne
            | TokenKind::OneToMany
            | TokenKind::ManyToOne
            | TokenKind::ManyToMany => "RELATIONSHIP_TYPE",
            TokenKind::Required => "REQUIRED",
            TokenKind::Pattern => "PATTERN",
            TokenKind::MinMax(_) => "MIN_MAX_KEYWORD",
            TokenKind::OptionKeyword(_) => "OPTION",
            TokenKind::LBrace => "LCURLY",
            TokenKind::RBrace => "RCURLY",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::Comma => "COMMA",
            TokenKind::Equals => "EQUALS",
            TokenKind::Star => "STAR",
            TokenKind::Identifier(_) => "NAME",
            TokenKind::Integer(_) => "INTEGER",
            TokenKind::Regex(_) => "REGEX",
            TokenKind::Comment(_) => "COMMENT",
            TokenKind::Eof => "EOF",
            TokenKind::Error(_) => "ERROR",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier(name) => write!(f, "identifier '{}'", name),
            TokenKind::Integer(n) => write!(f, "integer {}", n),
            TokenKind::Regex(re) => write!(f, "regex /{}/", re),
            TokenKind::Comment(_) => f.write_str("comment"),
            TokenKind::OptionKeyword(name) => write!(f, "'{}'", name),
            TokenKind::MinMax(kind) => write!(f, "'{}'", kind),
            TokenKind::Eof => f.write_str("end of input"),
            TokenKind::Error(msg) => write!(f, "invalid input ({})", msg),
            other => write!(f, "'{}'", keyword_text(other).unwrap_or(other.label())),
        }
    }
}

/// Source text of fixed keywords and delimiters.
fn keyword_text(kind: &TokenKind) -> Option<&'static str> {
    Some(match kind {
        TokenKind::Application => "application",
        TokenKind::Config => "config",
        TokenKind::Entity => "entity",
        TokenKind::Relationship => "relationship",
        TokenKind::Enum => "enum",
        TokenKind::Dto => "dto",
        TokenKind::Paginate => "paginate",
        TokenKind::Service => "service",
        TokenKind::Microservice => "microservice",
        TokenKind::Search => "search",
        TokenKind::NoFluentMethod => "noFluentMethod",
        TokenKind::Filter => "filter",
        TokenKind::AngularSuffix => "angularSuffix",
        TokenKind::With => "with",
        TokenKind::Except => "except",
        TokenKind::For => "for",
        TokenKind::To => "to",
        TokenKind::All => "all",
        TokenKind::OneToOne => "OneToOne",
        TokenKind::OneToMany => "OneToMany",
        TokenKind::ManyToOne => "ManyToOne",
        TokenKind::ManyToMany => "ManyToMany",
        TokenKind::Required => "required",
        TokenKind::Pattern => "pattern",
        TokenKind::LBrace => "{",
        TokenKind::RBrace => "}",
        TokenKind::LParen => "(",
        TokenKind::RParen => ")",
        TokenKind::Comma => ",",
        TokenKind::Equals => "=",
        TokenKind::Star => "*",
        _ => return None,
    })
}

/// Classify an identifier-shaped lexeme. Keyword matching is exact and case-sensitive.
pub fn keyword(ident: &str) -> Option<TokenKind> {
    let kind = match ident {
        "application" => TokenKind::Application,
        "config" => TokenKind::Config,
        "entity" => TokenKind::Entity,
        "relationship" => TokenKind::Relationship,
        "enum" => TokenKind::Enum,
        "dto" => TokenKind::Dto,
        "paginate" => TokenKind::Paginate,
        "service" => TokenKind::Service,
        "microservice" => TokenKind::Microservice,
        "search" => TokenKind::Search,
        "noFluentMethod" => TokenKind::NoFluentMethod,
        "filter" => TokenKind::Filter,
        "angularSuffix" => TokenKind::AngularSuffix,
        "with" => TokenKind::With,
        "except" => TokenKind::Except,
        "for" => TokenKind::For,
        "to" => TokenKind::To,
        "all" => TokenKind::All,
        "OneToOne" => TokenKind::OneToOne,
        "OneToMany" => TokenKind::OneToMany,
        "ManyToOne" => TokenKind::ManyToOne,
        "ManyToMany" => TokenKind::ManyToMany,
        "required" => TokenKind::Required,
        "pattern" => TokenKind::Pattern,
        "min" => TokenKind::MinMax(ValidationKind::Min),
        "max" => TokenKind::MinMax(ValidationKind::Max),
        "minlength" => TokenKind::MinMax(ValidationKind::MinLength),
        "maxlength" => TokenKind::MinMax(ValidationKind::MaxLength),
        "minbytes" => TokenKind::MinMax(ValidationKind::MinBytes),
        "maxbytes" => TokenKind::MinMax(ValidationKind::MaxBytes),
        _ => {
            return OPTION_KEYWORDS
                .iter()
                .copied()
                .find(|option| *option == ident)
                .map(TokenKind::OptionKeyword)
        }
    };
    Some(kind)
}

/// Source location span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Default for Span {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            line: 1,
            column: 1,
        }
    }
}

/// A token with its kind, raw text and source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    /// The raw text if the token can stand for a bare name.
    pub fn as_word(&self) -> Option<&str> {
        self.kind.is_word().then_some(self.text.as_str())
    }
}
