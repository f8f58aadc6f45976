//! Syntax errors.

use super::rule::Rule;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntaxErrorKind {
    /// Input the lexer could not classify.
    Lexical,
    /// A token that does not fit the rule being parsed.
    Unexpected,
    /// A standalone rule finished before the end of its input.
    TrailingInput,
}

/// A recoverable syntax error. The parser accumulates these next to the CST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind} at line {line}, column {column}{}: expected {expected}, found {found}", in_rule(.rule))]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    /// Innermost rule being parsed, if any.
    pub rule: Option<Rule>,
    pub expected: String,
    pub found: String,
    pub line: usize,
    pub column: usize,
}

fn in_rule(rule: &Option<Rule>) -> String {
    rule.map(|rule| format!(" in {}", rule)).unwrap_or_default()
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SyntaxErrorKind::Lexical => "Lexical error",
            SyntaxErrorKind::Unexpected => "Syntax error",
            SyntaxErrorKind::TrailingInput => "Trailing input",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let error = SyntaxError {
            kind: SyntaxErrorKind::Unexpected,
            rule: Some(Rule::EntityBody),
            expected: "'}'".to_string(),
            found: "end of input".to_string(),
            line: 3,
            column: 1,
        };
        assert_eq!(
            error.to_string(),
            "Syntax error at line 3, column 1 in entityBody: expected '}', found end of input"
        );
    }

    #[test]
    fn test_display_without_rule() {
        let error = SyntaxError {
            kind: SyntaxErrorKind::Lexical,
            rule: None,
            expected: "a token".to_string(),
            found: "invalid input (Unexpected character: #)".to_string(),
            line: 1,
            column: 8,
        };
        assert!(error.to_string().starts_with("Lexical error at line 1, column 8: "));
    }
}
