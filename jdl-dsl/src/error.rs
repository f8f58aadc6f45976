//! Error types for the JDL front end

use crate::ast::BuildError;
use crate::compiler::SemanticError;
use crate::config::ConfigError;
use crate::lexer::LexError;
use crate::parser::SyntaxError;
use thiserror::Error;

/// Master error type for the JDL front end.
#[derive(Debug, Error)]
pub enum JdlError {
    #[error("Lex error: {0}")]
    Lex(#[from] LexError),

    #[error("{} syntax error(s), first: {}", .errors.len(), first(.errors))]
    Syntax { errors: Vec<SyntaxError> },

    #[error("AST error: {0}")]
    Build(#[from] BuildError),

    #[error("Semantic error: {0}")]
    Semantic(#[from] SemanticError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

fn first(errors: &[SyntaxError]) -> String {
    errors.first().map(ToString::to_string).unwrap_or_default()
}

impl From<Vec<SyntaxError>> for JdlError {
    fn from(errors: Vec<SyntaxError>) -> Self {
        JdlError::Syntax { errors }
    }
}

/// Result type alias for JDL front-end operations.
pub type JdlResult<T> = Result<T, JdlError>;

// =============================================================================
// TESTS
// =============================================================================
