//! Recursive-descent parser producing a CST.
//!
//! Each [`Rule`] maps to one method through a static table, so any rule can
//! be run on its own fragment and a parser can be pointed at new input any
//! number of times. Top-level declarations that fail are kept in the CST as
//! `recovered` nodes; the parser then skips ahead to the next declaration.

use super::cst::CstNode;
use super::error::{SyntaxError, SyntaxErrorKind};
use super::rule::Rule;
use crate::config::{GrammarProfile, ParserConfig};
use crate::lexer::{Lexer, Span, Token, TokenKind};
use tracing::{debug, trace};

type PResult<T> = Result<T, SyntaxError>;
type RuleFn = fn(&mut JdlParser, &mut CstNode) -> PResult<()>;

/// CST plus every syntax error met on the way, ordered by position.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput {
    pub cst: CstNode,
    pub errors: Vec<SyntaxError>,
}

impl ParseOutput {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug)]
pub struct JdlParser {
    config: ParserConfig,
    /// Always ends in `Eof`, even before any input is set.
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<SyntaxError>,
    rule_stack: Vec<Rule>,
    halted: bool,
}

impl Default for JdlParser {
    fn default() -> Self {
        Self {
            config: ParserConfig::default(),
            tokens: vec![Token {
                kind: TokenKind::Eof,
                text: String::new(),
                span: Span::default(),
            }],
            pos: 0,
            errors: Vec::new(),
            rule_stack: Vec::new(),
            halted: false,
        }
    }
}

fn rule_body(rule: Rule) -> RuleFn {
    match rule {
        Rule::Program => JdlParser::program,
        Rule::ApplicationDeclaration => JdlParser::application_declaration,
        Rule::ApplicationBody => JdlParser::application_body,
        Rule::ApplicationConfig => JdlParser::application_config,
        Rule::ConfigOption => JdlParser::config_option,
        Rule::ConstantDeclaration => JdlParser::constant_declaration,
        Rule::EntityDeclaration => JdlParser::entity_declaration,
        Rule::EntityTableNameDeclaration => JdlParser::entity_table_name_declaration,
        Rule::EntityBody => JdlParser::entity_body,
        Rule::FieldDeclaration => JdlParser::field_declaration,
        Rule::FieldType => JdlParser::field_type,
        Rule::Validation => JdlParser::validation,
        Rule::MinMaxValidation => JdlParser::min_max_validation,
        Rule::Pattern => JdlParser::pattern,
        Rule::RelationshipDeclaration => JdlParser::relationship_declaration,
        Rule::RelationshipType => JdlParser::relationship_type,
        Rule::RelationshipBody => JdlParser::relationship_body,
        Rule::RelationshipSide => JdlParser::relationship_side,
        Rule::EnumDeclaration => JdlParser::enum_declaration,
        Rule::EnumPropList => JdlParser::enum_prop_list,
        Rule::DtoDeclaration
        | Rule::PaginationDeclaration
        | Rule::ServiceDeclaration
        | Rule::MicroserviceDeclaration
        | Rule::SearchEngineDeclaration
        | Rule::AngularSuffixDeclaration => JdlParser::entity_option_declaration,
        Rule::NoClientDeclaration
        | Rule::NoServerDeclaration
        | Rule::NoFluentMethod
        | Rule::FilterDeclaration => JdlParser::negative_option_declaration,
        Rule::EntityList => JdlParser::entity_list,
        Rule::Method => JdlParser::method,
        Rule::Exclusion => JdlParser::exclusion,
        Rule::Comment => JdlParser::comment,
    }
}

/// Leading keyword of the option declarations sharing one rule body.
fn option_keyword(rule: Rule) -> Option<TokenKind> {
    Some(match rule {
        Rule::DtoDeclaration => TokenKind::Dto,
        Rule::PaginationDeclaration => TokenKind::Paginate,
        Rule::ServiceDeclaration => TokenKind::Service,
        Rule::MicroserviceDeclaration => TokenKind::Microservice,
        Rule::SearchEngineDeclaration => TokenKind::Search,
        Rule::AngularSuffixDeclaration => TokenKind::AngularSuffix,
        Rule::NoClientDeclaration => TokenKind::OptionKeyword("skipClient"),
        Rule::NoServerDeclaration => TokenKind::OptionKeyword("skipServer"),
        Rule::NoFluentMethod => TokenKind::NoFluentMethod,
        Rule::FilterDeclaration => TokenKind::Filter,
        _ => return None,
    })
}

/// Keywords that open a top-level declaration wherever they appear.
fn is_declaration_keyword(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Application
            | TokenKind::Entity
            | TokenKind::Relationship
            | TokenKind::Enum
            | TokenKind::Dto
            | TokenKind::Paginate
            | TokenKind::Service
            | TokenKind::Microservice
            | TokenKind::Search
            | TokenKind::NoFluentMethod
            | TokenKind::Filter
            | TokenKind::AngularSuffix
    )
}

fn is_validation_keyword(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Required | TokenKind::MinMax(_) | TokenKind::Pattern
    )
}

fn is_config_value(kind: &TokenKind) -> bool {
    matches!(kind, TokenKind::Integer(_))
        || (kind.is_word() && !matches!(kind, TokenKind::OptionKeyword(_)))
}

/// Words usable as entity names in entity lists.
fn is_list_name(kind: &TokenKind) -> bool {
    kind.is_word() && !matches!(kind, TokenKind::With | TokenKind::Except)
}

impl JdlParser {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Lex `source` and reset all per-parse state.
    pub fn set_input(&mut self, source: &str) {
        let tokens = Lexer::new(source).tokenize();
        self.set_tokens(tokens);
    }

    /// Point the parser at an existing token stream. `Error` tokens are
    /// reported as lexical errors and dropped.
    pub fn set_tokens(&mut self, tokens: Vec<Token>) {
        self.pos = 0;
        self.errors.clear();
        self.rule_stack.clear();
        self.halted = false;
        self.tokens = Vec::with_capacity(tokens.len());

        for token in tokens {
            if let TokenKind::Error(message) = &token.kind {
                self.errors.push(SyntaxError {
                    kind: SyntaxErrorKind::Lexical,
                    rule: None,
                    expected: "a token".to_string(),
                    found: message.clone(),
                    line: token.span.line,
                    column: token.span.column,
                });
                continue;
            }
            let is_eof = token.kind == TokenKind::Eof;
            self.tokens.push(token);
            if is_eof {
                break;
            }
        }

        if self.tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            let span = self
                .tokens
                .last()
                .map(|t| Span {
                    start: t.span.end,
                    end: t.span.end,
                    line: t.span.line,
                    column: t.span.column + t.text.chars().count(),
                })
                .unwrap_or_default();
            self.tokens.push(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                span,
            });
        }
    }

    /// Parse a whole program.
    pub fn parse(&mut self, source: &str) -> ParseOutput {
        self.parse_rule(Rule::Program, source)
    }

    /// Parse `source` as a single `rule`. Input left over after the rule is
    /// reported as a trailing-input error.
    pub fn parse_rule(&mut self, rule: Rule, source: &str) -> ParseOutput {
        self.set_input(source);
        self.run_current(rule)
    }

    /// Run `rule` over the tokens set with [`JdlParser::set_tokens`].
    pub fn run_current(&mut self, rule: Rule) -> ParseOutput {
        let (cst, result) = self.run(rule);
        match result {
            Err(error) => self.record(error),
            Ok(()) if !self.is_at_end() && !self.halted => {
                let token = self.current();
                let error = SyntaxError {
                    kind: SyntaxErrorKind::TrailingInput,
                    rule: Some(rule),
                    expected: "end of input".to_string(),
                    found: token.kind.to_string(),
                    line: token.span.line,
                    column: token.span.column,
                };
                self.record(error);
            }
            Ok(()) => {}
        }

        let mut errors = std::mem::take(&mut self.errors);
        errors.sort_by_key(|e| (e.line, e.column));
        ParseOutput { cst, errors }
    }

    // ------------------------------------------------------------------
    // Rule plumbing
    // ------------------------------------------------------------------

    fn run(&mut self, rule: Rule) -> (CstNode, PResult<()>) {
        trace!(rule = rule.name(), line = self.current().span.line, "enter rule");
        let mut node = CstNode::new(rule);
        self.rule_stack.push(rule);
        let result = rule_body(rule)(self, &mut node);
        self.rule_stack.pop();
        if result.is_err() {
            node.recovered = true;
        }
        (node, result)
    }

    fn subrule(&mut self, rule: Rule, parent: &mut CstNode) -> PResult<()> {
        let (node, result) = self.run(rule);
        parent.push_node(node);
        result
    }

    fn record(&mut self, error: SyntaxError) {
        debug!(
            rule = error.rule.map(|r| r.name()),
            line = error.line,
            column = error.column,
            expected = %error.expected,
            found = %error.found,
            "syntax error"
        );
        self.errors.push(error);
    }

    /// Record a failed declaration and skip to where the next one can start.
    fn recover(&mut self, error: SyntaxError, start: usize) {
        let rule = error.rule;
        let (line, column) = (error.line, error.column);
        self.record(error);
        if !self.config.recovery {
            self.halted = true;
            return;
        }
        let skipped = self.resync(start);
        debug!(
            rule = rule.map(|r| r.name()),
            line,
            column,
            skipped,
            "recovered from syntax error"
        );
    }

    /// Skip tokens until a declaration keyword, or a top-level sync point,
    /// or the `}` that closes the braces opened since `start`. Always
    /// consumes at least one token when nothing was consumed since `start`.
    fn resync(&mut self, start: usize) -> usize {
        let mut depth: usize = 0;
        for token in &self.tokens[start..self.pos] {
            match token.kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth = depth.saturating_sub(1),
                _ => {}
            }
        }

        let mut skipped = 0;
        if self.pos == start && !self.is_at_end() {
            match self.current().kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.advance();
            skipped += 1;
        }

        while !self.is_at_end() {
            let kind = &self.current().kind;
            if is_declaration_keyword(kind) || (depth == 0 && self.at_top_level_sync_point()) {
                break;
            }
            match kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace if depth > 0 => {
                    depth -= 1;
                    self.advance();
                    skipped += 1;
                    if depth == 0 {
                        break;
                    }
                    continue;
                }
                _ => {}
            }
            self.advance();
            skipped += 1;
        }
        skipped
    }

    fn at_top_level_sync_point(&self) -> bool {
        match &self.current().kind {
            TokenKind::Comment(_) => true,
            TokenKind::OptionKeyword(name) => *name == "skipClient" || *name == "skipServer",
            TokenKind::Identifier(_) => self.peek(1).kind == TokenKind::Equals,
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------

    fn current(&self) -> &Token {
        self.peek(0)
    }

    fn peek(&self, offset: usize) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + offset).min(last)]
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    fn is_at_end(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind)
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        let token = self.current();
        SyntaxError {
            kind: SyntaxErrorKind::Unexpected,
            rule: self.rule_stack.last().copied(),
            expected: expected.to_string(),
            found: token.kind.to_string(),
            line: token.span.line,
            column: token.span.column,
        }
    }

    fn consume(&mut self, node: &mut CstNode, kind: TokenKind) -> PResult<()> {
        if self.check(&kind) {
            node.push_token(self.advance());
            Ok(())
        } else {
            Err(self.unexpected(&kind.to_string()))
        }
    }

    fn consume_if(&mut self, node: &mut CstNode, kind: TokenKind) -> bool {
        if self.check(&kind) {
            node.push_token(self.advance());
            true
        } else {
            false
        }
    }

    /// Consume any identifier-shaped token (keywords included) as a name.
    fn consume_word(&mut self, node: &mut CstNode, label: &'static str, expected: &str) -> PResult<()> {
        if self.current().kind.is_word() {
            node.push_token_as(label, self.advance());
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn starts_validation(&self, offset: usize) -> bool {
        match self.peek(offset).kind {
            TokenKind::Required => true,
            TokenKind::MinMax(_) | TokenKind::Pattern => {
                self.peek(offset + 1).kind == TokenKind::LParen
            }
            _ => false,
        }
    }

    /// Whether a comma at the cursor separates two validations rather than
    /// two fields.
    fn validation_follows_comma(&self) -> bool {
        match self.peek(1).kind {
            TokenKind::Required => {
                let next = &self.peek(2).kind;
                matches!(next, TokenKind::Comma | TokenKind::RBrace | TokenKind::Eof)
                    || is_validation_keyword(next)
            }
            _ => self.starts_validation(1),
        }
    }

    /// The declaration rule the cursor can start, under the active profile.
    fn declaration_at_cursor(&self) -> Option<Rule> {
        let kind = &self.current().kind;
        let rule = match kind {
            TokenKind::Comment(_) => Rule::Comment,
            TokenKind::Entity => Rule::EntityDeclaration,
            TokenKind::Identifier(_) if self.peek(1).kind == TokenKind::Equals => {
                Rule::ConstantDeclaration
            }
            TokenKind::Application => Rule::ApplicationDeclaration,
            TokenKind::Relationship => Rule::RelationshipDeclaration,
            TokenKind::Enum => Rule::EnumDeclaration,
            TokenKind::Dto => Rule::DtoDeclaration,
            TokenKind::Paginate => Rule::PaginationDeclaration,
            TokenKind::Service => Rule::ServiceDeclaration,
            TokenKind::Microservice => Rule::MicroserviceDeclaration,
            TokenKind::Search => Rule::SearchEngineDeclaration,
            TokenKind::OptionKeyword("skipClient") => Rule::NoClientDeclaration,
            TokenKind::OptionKeyword("skipServer") => Rule::NoServerDeclaration,
            TokenKind::NoFluentMethod => Rule::NoFluentMethod,
            TokenKind::Filter => Rule::FilterDeclaration,
            TokenKind::AngularSuffix => Rule::AngularSuffixDeclaration,
            _ => return None,
        };
        match self.config.profile {
            GrammarProfile::Full => Some(rule),
            GrammarProfile::Reduced => matches!(
                rule,
                Rule::Comment | Rule::EntityDeclaration | Rule::ConstantDeclaration
            )
            .then_some(rule),
        }
    }

    /// Whether a keyword at the cursor opens the next declaration rather than
    /// naming a field. Only consulted inside entity bodies, where an
    /// unclosed `{` would otherwise swallow the declaration that follows.
    fn at_declaration_start(&self) -> bool {
        let next = &self.peek(1).kind;
        match &self.current().kind {
            TokenKind::Entity => {
                next.is_word()
                    && matches!(
                        self.peek(2).kind,
                        TokenKind::LBrace | TokenKind::LParen | TokenKind::Eof
                    )
            }
            TokenKind::Enum => next.is_word() && self.peek(2).kind == TokenKind::LBrace,
            TokenKind::Relationship => matches!(
                next,
                TokenKind::OneToOne
                    | TokenKind::OneToMany
                    | TokenKind::ManyToOne
                    | TokenKind::ManyToMany
            ),
            TokenKind::Application => *next == TokenKind::LBrace,
            TokenKind::Dto
            | TokenKind::Paginate
            | TokenKind::Service
            | TokenKind::Microservice
            | TokenKind::Search
            | TokenKind::NoFluentMethod
            | TokenKind::Filter
            | TokenKind::AngularSuffix
            | TokenKind::OptionKeyword("skipClient" | "skipServer") => {
                matches!(next, TokenKind::Star | TokenKind::All | TokenKind::For)
                    || (next.is_word()
                        && matches!(self.peek(2).kind, TokenKind::With | TokenKind::Except))
            }
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // Rules
    // ------------------------------------------------------------------

    fn program(&mut self, node: &mut CstNode) -> PResult<()> {
        while !self.is_at_end() && !self.halted {
            let start = self.pos;
            match self.declaration_at_cursor() {
                Some(Rule::Comment) => {
                    node.push_token(self.advance());
                }
                Some(rule) => {
                    let (child, result) = self.run(rule);
                    node.push_node(child);
                    if let Err(error) = result {
                        self.recover(error, start);
                    }
                }
                None => {
                    let expected = match self.config.profile {
                        GrammarProfile::Full => "a declaration",
                        GrammarProfile::Reduced => "a constant or entity declaration",
                    };
                    let error = self.unexpected(expected);
                    self.recover(error, start);
                }
            }
        }
        Ok(())
    }

    fn application_declaration(&mut self, node: &mut CstNode) -> PResult<()> {
        self.consume(node, TokenKind::Application)?;
        if self.check(&TokenKind::LBrace) {
            self.subrule(Rule::ApplicationBody, node)?;
        }
        Ok(())
    }

    fn application_body(&mut self, node: &mut CstNode) -> PResult<()> {
        self.consume(node, TokenKind::LBrace)?;
        self.subrule(Rule::ApplicationConfig, node)?;
        self.consume(node, TokenKind::RBrace)
    }

    fn application_config(&mut self, node: &mut CstNode) -> PResult<()> {
        self.consume(node, TokenKind::Config)?;
        self.consume(node, TokenKind::LBrace)?;
        while matches!(self.current().kind, TokenKind::OptionKeyword(_)) {
            self.subrule(Rule::ConfigOption, node)?;
        }
        if self.check(&TokenKind::RBrace) {
            node.push_token(self.advance());
            Ok(())
        } else {
            Err(self.unexpected("an application option or '}'"))
        }
    }

    /// `option [value (, value)*]`. An option with no value stands for null
    /// or an empty list.
    fn config_option(&mut self, node: &mut CstNode) -> PResult<()> {
        if !matches!(self.current().kind, TokenKind::OptionKeyword(_)) {
            return Err(self.unexpected("an application option"));
        }
        node.push_token(self.advance());

        if !is_config_value(&self.current().kind) {
            return Ok(());
        }
        self.config_value(node);
        while self.check(&TokenKind::Comma) && is_config_value(&self.peek(1).kind) {
            node.push_token(self.advance());
            self.config_value(node);
        }
        Ok(())
    }

    fn config_value(&mut self, node: &mut CstNode) {
        let token = self.advance();
        match token.kind {
            TokenKind::Integer(_) => node.push_token(token),
            _ => node.push_token_as("NAME", token),
        }
    }

    fn constant_declaration(&mut self, node: &mut CstNode) -> PResult<()> {
        if !matches!(self.current().kind, TokenKind::Identifier(_)) {
            return Err(self.unexpected("constant name"));
        }
        node.push_token(self.advance());
        self.consume(node, TokenKind::Equals)?;
        if matches!(self.current().kind, TokenKind::Integer(_)) {
            node.push_token(self.advance());
            Ok(())
        } else {
            Err(self.unexpected("integer"))
        }
    }

    fn entity_declaration(&mut self, node: &mut CstNode) -> PResult<()> {
        self.consume(node, TokenKind::Entity)?;
        self.consume_word(node, "NAME", "entity name")?;
        if self.check(&TokenKind::LParen) {
            self.subrule(Rule::EntityTableNameDeclaration, node)?;
        }
        if self.check(&TokenKind::LBrace) {
            self.subrule(Rule::EntityBody, node)?;
        }
        Ok(())
    }

    fn entity_table_name_declaration(&mut self, node: &mut CstNode) -> PResult<()> {
        self.consume(node, TokenKind::LParen)?;
        self.consume_word(node, "NAME", "table name")?;
        self.consume(node, TokenKind::RParen)
    }

    fn entity_body(&mut self, node: &mut CstNode) -> PResult<()> {
        self.consume(node, TokenKind::LBrace)?;
        match self.config.profile {
            GrammarProfile::Full => loop {
                if self.check(&TokenKind::Comment(String::new())) {
                    node.push_token(self.advance());
                } else if self.at_declaration_start() {
                    break;
                } else if self.current().kind.is_word() {
                    self.subrule(Rule::FieldDeclaration, node)?;
                    self.consume_if(node, TokenKind::Comma);
                } else {
                    break;
                }
            },
            GrammarProfile::Reduced => {
                if self.current().kind.is_word() && !self.at_declaration_start() {
                    self.subrule(Rule::FieldDeclaration, node)?;
                    while self.consume_if(node, TokenKind::Comma) {
                        if self.at_declaration_start() {
                            break;
                        }
                        self.subrule(Rule::FieldDeclaration, node)?;
                    }
                }
            }
        }
        if self.check(&TokenKind::RBrace) {
            node.push_token(self.advance());
            Ok(())
        } else {
            Err(self.unexpected("a field declaration or '}'"))
        }
    }

    fn field_declaration(&mut self, node: &mut CstNode) -> PResult<()> {
        self.consume_word(node, "NAME", "field name")?;
        self.subrule(Rule::FieldType, node)?;
        loop {
            if self.starts_validation(0) {
                self.subrule(Rule::Validation, node)?;
            } else if self.config.profile == GrammarProfile::Full
                && self.check(&TokenKind::Comma)
                && self.validation_follows_comma()
            {
                node.push_token(self.advance());
                self.subrule(Rule::Validation, node)?;
            } else {
                return Ok(());
            }
        }
    }

    fn field_type(&mut self, node: &mut CstNode) -> PResult<()> {
        self.consume_word(node, "NAME", "field type")
    }

    fn validation(&mut self, node: &mut CstNode) -> PResult<()> {
        match self.current().kind {
            TokenKind::Required => {
                node.push_token(self.advance());
                Ok(())
            }
            TokenKind::MinMax(_) => self.subrule(Rule::MinMaxValidation, node),
            TokenKind::Pattern => self.subrule(Rule::Pattern, node),
            _ => Err(self.unexpected("a validation")),
        }
    }

    fn min_max_validation(&mut self, node: &mut CstNode) -> PResult<()> {
        if !matches!(self.current().kind, TokenKind::MinMax(_)) {
            return Err(self.unexpected("min, max, minlength, maxlength, minbytes or maxbytes"));
        }
        node.push_token(self.advance());
        self.consume(node, TokenKind::LParen)?;
        match self.current().kind {
            TokenKind::Integer(_) => node.push_token(self.advance()),
            TokenKind::Identifier(_) => node.push_token(self.advance()),
            _ => return Err(self.unexpected("integer or constant name")),
        }
        self.consume(node, TokenKind::RParen)
    }

    fn pattern(&mut self, node: &mut CstNode) -> PResult<()> {
        self.consume(node, TokenKind::Pattern)?;
        self.consume(node, TokenKind::LParen)?;
        if !matches!(self.current().kind, TokenKind::Regex(_)) {
            return Err(self.unexpected("regex literal"));
        }
        node.push_token(self.advance());
        self.consume(node, TokenKind::RParen)
    }

    fn relationship_declaration(&mut self, node: &mut CstNode) -> PResult<()> {
        self.consume(node, TokenKind::Relationship)?;
        self.subrule(Rule::RelationshipType, node)?;
        self.consume(node, TokenKind::LBrace)?;
        self.subrule(Rule::RelationshipBody, node)?;
        loop {
            self.consume_if(node, TokenKind::Comma);
            let kind = &self.current().kind;
            if kind.is_word() || matches!(kind, TokenKind::Comment(_)) {
                self.subrule(Rule::RelationshipBody, node)?;
            } else {
                break;
            }
        }
        if self.check(&TokenKind::RBrace) {
            node.push_token(self.advance());
            Ok(())
        } else {
            Err(self.unexpected("a relationship or '}'"))
        }
    }

    fn relationship_type(&mut self, node: &mut CstNode) -> PResult<()> {
        match self.current().kind {
            TokenKind::OneToOne
            | TokenKind::OneToMany
            | TokenKind::ManyToOne
            | TokenKind::ManyToMany => {
                node.push_token(self.advance());
                Ok(())
            }
            _ => Err(self.unexpected("OneToOne, OneToMany, ManyToOne or ManyToMany")),
        }
    }

    fn relationship_body(&mut self, node: &mut CstNode) -> PResult<()> {
        self.subrule(Rule::RelationshipSide, node)?;
        self.consume(node, TokenKind::To)?;
        self.subrule(Rule::RelationshipSide, node)
    }

    /// `[comment] Entity [{ field [(display)] [required] }]`
    fn relationship_side(&mut self, node: &mut CstNode) -> PResult<()> {
        if self.check(&TokenKind::Comment(String::new())) {
            self.subrule(Rule::Comment, node)?;
        }
        self.consume_word(node, "NAME", "entity name")?;
        if self.consume_if(node, TokenKind::LBrace) {
            self.consume_word(node, "INJECTED_FIELD", "injected field name")?;
            if self.consume_if(node, TokenKind::LParen) {
                self.consume_word(node, "DISPLAY_FIELD", "display field name")?;
                self.consume(node, TokenKind::RParen)?;
            }
            self.consume_if(node, TokenKind::Required);
            self.consume(node, TokenKind::RBrace)?;
        }
        Ok(())
    }

    fn enum_declaration(&mut self, node: &mut CstNode) -> PResult<()> {
        self.consume(node, TokenKind::Enum)?;
        self.consume_word(node, "NAME", "enum name")?;
        self.consume(node, TokenKind::LBrace)?;
        self.subrule(Rule::EnumPropList, node)?;
        self.consume(node, TokenKind::RBrace)
    }

    fn enum_prop_list(&mut self, node: &mut CstNode) -> PResult<()> {
        self.consume_word(node, "NAME", "enum value")?;
        while self.consume_if(node, TokenKind::Comma) {
            self.consume_word(node, "NAME", "enum value")?;
        }
        Ok(())
    }

    /// `keyword entityList [except ...]`
    fn entity_option_declaration(&mut self, node: &mut CstNode) -> PResult<()> {
        self.declaration_keyword(node)?;
        self.entity_list_and_exclusion(node)
    }

    /// `keyword [for] entityList [except ...]`
    fn negative_option_declaration(&mut self, node: &mut CstNode) -> PResult<()> {
        self.declaration_keyword(node)?;
        self.consume_if(node, TokenKind::For);
        self.entity_list_and_exclusion(node)
    }

    fn declaration_keyword(&mut self, node: &mut CstNode) -> PResult<()> {
        let rule = node.rule;
        match option_keyword(rule) {
            Some(keyword) if self.current().kind == keyword => {
                node.push_token_as("KEYWORD", self.advance());
                Ok(())
            }
            Some(keyword) => Err(self.unexpected(&keyword.to_string())),
            None => Err(self.unexpected(rule.name())),
        }
    }

    fn entity_list_and_exclusion(&mut self, node: &mut CstNode) -> PResult<()> {
        self.subrule(Rule::EntityList, node)?;
        if self.check(&TokenKind::Except) {
            self.subrule(Rule::Exclusion, node)?;
        }
        Ok(())
    }

    /// `* | all | Name (, Name)*`, then an optional `with method`.
    fn entity_list(&mut self, node: &mut CstNode) -> PResult<()> {
        if !(self.consume_if(node, TokenKind::Star) || self.consume_if(node, TokenKind::All)) {
            if !is_list_name(&self.current().kind) {
                return Err(self.unexpected("entity names, '*' or 'all'"));
            }
            node.push_token_as("NAME", self.advance());
            while self.check(&TokenKind::Comma) && is_list_name(&self.peek(1).kind) {
                node.push_token(self.advance());
                node.push_token_as("NAME", self.advance());
            }
        }
        if self.consume_if(node, TokenKind::With) {
            self.subrule(Rule::Method, node)?;
        }
        Ok(())
    }

    fn method(&mut self, node: &mut CstNode) -> PResult<()> {
        self.consume_word(node, "NAME", "method name")
    }

    fn exclusion(&mut self, node: &mut CstNode) -> PResult<()> {
        self.consume(node, TokenKind::Except)?;
        self.consume_word(node, "NAME", "entity name")?;
        while self.consume_if(node, TokenKind::Comma) {
            self.consume_word(node, "NAME", "entity name")?;
        }
        Ok(())
    }

    fn comment(&mut self, node: &mut CstNode) -> PResult<()> {
        if self.check(&TokenKind::Comment(String::new())) {
            node.push_token(self.advance());
            Ok(())
        } else {
            Err(self.unexpected("comment"))
        }
    }
}
