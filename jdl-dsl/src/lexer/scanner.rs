//! Lexer implementation

use super::token::*;
use std::iter::Peekable;
use std::str::CharIndices;
use thiserror::Error;

/// The first character the lexer could not classify.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Lexical error at line {line}, column {column}: {message}")]
pub struct LexError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

// ============================================================================
// LEXER IMPLEMENTATION
// ============================================================================

/// Lexer for JDL.
///
/// Never fails: unrecognized input becomes `TokenKind::Error` tokens so the
/// parser can report them and keep going. Use [`lex`] for the strict form.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            line: 1,
            column: 1,
            pos: 0,
        }
    }

    /// Tokenize the entire source. The last token is always `Eof`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        tokens
    }

    /// Get the next token from the source.
    fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start_pos = self.pos;
        let start_line = self.line;
        let start_col = self.column;

        let kind = match self.peek_char() {
            None => TokenKind::Eof,
            Some(c) => match c {
                '{' => {
                    self.advance();
                    TokenKind::LBrace
                }
                '}' => {
                    self.advance();
                    TokenKind::RBrace
                }
                '(' => {
                    self.advance();
                    TokenKind::LParen
                }
                ')' => {
                    self.advance();
                    TokenKind::RParen
                }
                ',' => {
                    self.advance();
                    TokenKind::Comma
                }
                '=' => {
                    self.advance();
                    TokenKind::Equals
                }
                '*' => {
                    self.advance();
                    TokenKind::Star
                }

                '/' => match self.peek_next_char() {
                    Some('/') => self.scan_line_comment(),
                    Some('*') => self.scan_block_comment(),
                    _ => self.scan_regex(),
                },

                '-' => {
                    self.advance();
                    if self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                        self.scan_integer(start_pos)
                    } else {
                        TokenKind::Error("Unexpected character: -".to_string())
                    }
                }

                c if c.is_ascii_digit() => self.scan_integer(start_pos),

                c if c.is_ascii_alphabetic() || c == '_' => self.scan_identifier(),

                c => {
                    self.advance();
                    TokenKind::Error(format!("Unexpected character: {}", c))
                }
            },
        };

        Token {
            kind,
            text: self.source[start_pos..self.pos].to_string(),
            span: Span {
                start: start_pos,
                end: self.pos,
                line: start_line,
                column: start_col,
            },
        }
    }

    /// Scan an identifier or keyword.
    fn scan_identifier(&mut self) -> TokenKind {
        let start = self.pos;

        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                self.advance();
            } else {
                break;
            }
        }

        let ident = &self.source[start..self.pos];
        keyword(ident).unwrap_or_else(|| TokenKind::Identifier(ident.to_string()))
    }

    /// Scan a decimal integer, the sign (if any) already consumed from `start`.
    fn scan_integer(&mut self, start: usize) -> TokenKind {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        let text = &self.source[start..self.pos];
        match text.parse::<i64>() {
            Ok(n) => TokenKind::Integer(n),
            Err(_) => TokenKind::Error(format!("Integer out of range: {}", text)),
        }
    }

    /// Scan a `/.../` literal. It must close on the same line.
    fn scan_regex(&mut self) -> TokenKind {
        self.advance(); // opening slash
        let mut body = String::new();

        loop {
            match self.peek_char() {
                None | Some('\n') => return TokenKind::Error("Unterminated regex".to_string()),
                Some('/') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek_char() {
                        Some('/') => {
                            self.advance();
                            body.push('/');
                        }
                        // Other escapes belong to the regex itself.
                        _ => body.push('\\'),
                    }
                }
                Some(c) => {
                    self.advance();
                    body.push(c);
                }
            }
        }

        TokenKind::Regex(body)
    }

    fn scan_line_comment(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
        TokenKind::Comment(self.source[start..self.pos].trim_end().to_string())
    }

    fn scan_block_comment(&mut self) -> TokenKind {
        let start = self.pos;
        self.advance(); // /
        self.advance(); // *
        loop {
            match self.peek_char() {
                None => return TokenKind::Error("Unterminated block comment".to_string()),
                Some('*') if self.peek_next_char() == Some('/') => {
                    self.advance();
                    self.advance();
                    break;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        TokenKind::Comment(self.source[start..self.pos].to_string())
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_next_char(&self) -> Option<char> {
        let mut iter = self.source[self.pos..].chars();
        iter.next();
        iter.next()
    }

    fn advance(&mut self) -> Option<char> {
        let (i, c) = self.chars.next()?;
        self.pos = i + c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }
}

/// Tokenize `source`, failing on the first unrecognized input.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let tokens = Lexer::new(source).tokenize();
    if let Some(token) = tokens.iter().find(|t| matches!(t.kind, TokenKind::Error(_))) {
        let message = match &token.kind {
            TokenKind::Error(msg) => msg.clone(),
            _ => "Lexer error".to_string(),
        };
        return Err(LexError {
            message,
            line: token.span.line,
            column: token.span.column,
        });
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jdl_core::ValidationKind;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).tokenize().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_lexer_keywords() {
        let tokens = kinds("application config entity relationship enum dto paginate service");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Application,
                TokenKind::Config,
                TokenKind::Entity,
                TokenKind::Relationship,
                TokenKind::Enum,
                TokenKind::Dto,
                TokenKind::Paginate,
                TokenKind::Service,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lexer_min_max_family() {
        let tokens = kinds("min max minlength maxlength minbytes maxbytes");
        assert_eq!(tokens[0], TokenKind::MinMax(ValidationKind::Min));
        assert_eq!(tokens[3], TokenKind::MinMax(ValidationKind::MaxLength));
        assert_eq!(tokens[5], TokenKind::MinMax(ValidationKind::MaxBytes));
    }

    #[test]
    fn test_lexer_keyword_match_is_exact() {
        let tokens = kinds("Entity entityName required_field");
        assert_eq!(tokens[0], TokenKind::Identifier("Entity".to_string()));
        assert_eq!(tokens[1], TokenKind::Identifier("entityName".to_string()));
        assert_eq!(tokens[2], TokenKind::Identifier("required_field".to_string()));
    }

    #[test]
    fn test_lexer_option_keywords() {
        let tokens = kinds("baseName skipClient jhiPrefix");
        assert_eq!(tokens[0], TokenKind::OptionKeyword("baseName"));
        assert_eq!(tokens[1], TokenKind::OptionKeyword("skipClient"));
        assert_eq!(tokens[2], TokenKind::OptionKeyword("jhiPrefix"));
    }

    #[test]
    fn test_lexer_delimiters() {
        let tokens = kinds("{ } ( ) , = *");
        assert_eq!(
            tokens,
            vec![
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Comma,
                TokenKind::Equals,
                TokenKind::Star,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lexer_integers() {
        let tokens = kinds("42 -10 0");
        assert_eq!(tokens[0], TokenKind::Integer(42));
        assert_eq!(tokens[1], TokenKind::Integer(-10));
        assert_eq!(tokens[2], TokenKind::Integer(0));
    }

    #[test]
    fn test_lexer_dotted_identifier() {
        let tokens = kinds("com.mycompany.myapp zh-cn");
        assert_eq!(tokens[0], TokenKind::Identifier("com.mycompany.myapp".to_string()));
        assert_eq!(tokens[1], TokenKind::Identifier("zh-cn".to_string()));
    }

    #[test]
    fn test_lexer_regex_literal() {
        let tokens = kinds(r"pattern(/[A-Z]+\/x/)");
        assert_eq!(tokens[0], TokenKind::Pattern);
        assert_eq!(tokens[1], TokenKind::LParen);
        assert_eq!(tokens[2], TokenKind::Regex("[A-Z]+/x".to_string()));
        assert_eq!(tokens[3], TokenKind::RParen);
    }

    #[test]
    fn test_lexer_comments_are_tokens() {
        let tokens = Lexer::new("// a note\nentity /* block\ncomment */ A").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Comment("// a note".to_string()));
        assert_eq!(tokens[1].kind, TokenKind::Entity);
        assert_eq!(tokens[2].kind, TokenKind::Comment("/* block\ncomment */".to_string()));
        assert_eq!(tokens[3].kind, TokenKind::Identifier("A".to_string()));
        assert_eq!(tokens[3].span.line, 3);
    }

    #[test]
    fn test_lexer_positions() {
        let tokens = Lexer::new("entity A {\n  name String\n}").tokenize();
        assert_eq!((tokens[0].span.line, tokens[0].span.column), (1, 1));
        assert_eq!((tokens[1].span.line, tokens[1].span.column), (1, 8));
        assert_eq!((tokens[3].span.line, tokens[3].span.column), (2, 3));
        assert_eq!(tokens[3].text, "name");
        assert_eq!((tokens[5].span.line, tokens[5].span.column), (3, 1));
    }

    #[test]
    fn test_lexer_error_tokens() {
        let tokens = kinds("entity # A");
        assert_eq!(tokens[1], TokenKind::Error("Unexpected character: #".to_string()));
        assert_eq!(tokens[2], TokenKind::Identifier("A".to_string()));
    }

    #[test]
    fn test_lex_reports_first_error() {
        let err = lex("entity A {\n  name String @\n}").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 15);
        assert!(err.message.contains('@'));
    }

    #[test]
    fn test_unterminated_regex() {
        let err = lex("pattern(/abc\n)").unwrap_err();
        assert_eq!(err.message, "Unterminated regex");
    }

    #[test]
    fn test_empty_source_is_eof() {
        assert_eq!(kinds("   \n\t"), vec![TokenKind::Eof]);
    }
}
