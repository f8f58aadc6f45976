//! JDL DSL - Lexer, Parser, AST Builder & Model Compiler
//!
//! This crate turns JDL source text into a checked domain model.
//!
//! Architecture:
//! ```text
//! JDL Source
//!     ↓
//! Lexer (tokens, comments kept)
//!     ↓
//! Parser (CST + recoverable syntax errors)
//!     ↓
//! AstBuilder (typed Program)
//!     ↓
//! ModelCompiler (JdlModel + semantic errors)
//! ```
//!
//! Every grammar rule is also a standalone entry point, see
//! [`JdlParser::parse_rule`].

pub mod ast;
pub mod compiler;
pub mod config;
pub mod error;
pub mod lexer;
pub mod parser;

// Re-export key types for convenience
pub use ast::{AstBuilder, AstNode, BuildError, Declaration, Program};
pub use compiler::{Compilation, JdlEntity, JdlEnum, JdlField, JdlModel, ModelCompiler, SemanticError};
pub use config::{CompilerConfig, ConfigError, GrammarProfile, JdlConfig, ParserConfig};
pub use error::{JdlError, JdlResult};
pub use lexer::{lex, LexError, Lexer, Token, TokenKind};
pub use parser::{CstNode, JdlParser, ParseOutput, Rule, SyntaxError, SyntaxErrorKind};

/// Tokenize `source`, failing on the first unrecognized input.
pub fn tokenize(source: &str) -> JdlResult<Vec<Token>> {
    Ok(lex(source)?)
}

/// Parse `source` with the default (full) grammar, recovering from errors.
pub fn parse(source: &str) -> ParseOutput {
    JdlParser::default().parse(source)
}

/// Parse and build a program, failing if any syntax error was recorded.
pub fn parse_program(source: &str) -> JdlResult<Program> {
    parse_program_with(source, &ParserConfig::default())
}

pub fn parse_program_with(source: &str, config: &ParserConfig) -> JdlResult<Program> {
    let output = JdlParser::new(config.clone()).parse(source);
    if !output.is_ok() {
        return Err(JdlError::Syntax {
            errors: output.errors,
        });
    }
    Ok(AstBuilder::new().program(&output.cst))
}

/// Parse `source` as a single `rule` and build its AST node.
pub fn parse_node(rule: Rule, source: &str, config: &ParserConfig) -> JdlResult<AstNode> {
    let output = JdlParser::new(config.clone()).parse_rule(rule, source);
    if !output.is_ok() {
        return Err(JdlError::Syntax {
            errors: output.errors,
        });
    }
    Ok(AstBuilder::new().build(&output.cst)?)
}

/// Parse, build and compile `source` under `config`.
///
/// Syntax errors fail the call; semantic errors are returned inside the
/// [`Compilation`].
pub fn compile(source: &str, config: &JdlConfig) -> JdlResult<Compilation> {
    let program = parse_program_with(source, &config.parser)?;
    Ok(ModelCompiler::new(config.compiler.clone()).compile(&program))
}

/// Like [`compile`], but the first semantic error fails the call.
pub fn compile_strict(source: &str, config: &JdlConfig) -> JdlResult<JdlModel> {
    compile(source, config)?.into_model()
}
