//! Core cursor machinery shared by every parsing submodule (C2, §4.2).

mod declarations;
mod expressions;
mod statements;
mod types;

use glint_diagnostics::{error_codes, Diagnostic, NodeId, Span, SpanMap};
use glint_lexer::{Token, TokenKind};

pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    file_name: &'a str,
    pub(crate) spans: SpanMap,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

/// Tokens that `synchronize()` treats as a safe point to resume parsing
/// after a syntax error (§4.2).
const SAFE_POINT_KEYWORDS: &[TokenKind] = &[
    TokenKind::KwFn,
    TokenKind::KwType,
    TokenKind::KwClass,
    TokenKind::KwStruct,
    TokenKind::KwNamespace,
    TokenKind::KwIf,
    TokenKind::KwWhile,
    TokenKind::KwFor,
];

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, file_name: &'a str) -> Self {
        Self {
            tokens,
            pos: 0,
            file_name,
            spans: SpanMap::new(),
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_at(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    pub(crate) fn kind(&self) -> TokenKind {
        self.peek().kind
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.kind() == TokenKind::EndOfFile
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    pub(crate) fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        tok
    }

    pub(crate) fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume `kind`, emitting a diagnostic and leaving the cursor in
    /// place (for the caller to recover) if it is not present.
    pub(crate) fn expect(&mut self, kind: TokenKind, what: &str) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            self.error_here(format!("expected {what}, found `{}`", self.peek().text));
            false
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().range.to_diagnostic_span(self.file_name)
    }

    pub(crate) fn alloc_node(&mut self, span: Span) -> NodeId {
        self.spans.alloc(span)
    }

    pub(crate) fn error_here(&mut self, message: String) {
        self.diagnostics
            .push(Diagnostic::error(error_codes::SYNTAX_ERROR, message, self.current_span()));
    }

    pub(crate) fn error_node(&mut self) -> NodeId {
        let span = self.current_span();
        self.alloc_node(span)
    }

    /// Skip tokens until the next safe point: `;`, `}`, `{`, or a
    /// top-level keyword (§4.2).
    pub(crate) fn synchronize(&mut self) {
        while !self.is_at_end() {
            match self.kind() {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::LBrace | TokenKind::RBrace => return,
                k if SAFE_POINT_KEYWORDS.contains(&k) => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    pub(crate) fn consume_ident(&mut self) -> String {
        if self.check(TokenKind::Ident) {
            self.advance().text
        } else {
            self.error_here(format!("expected identifier, found `{}`", self.peek().text));
            String::new()
        }
    }

    /// Consumes the parser, handing back the span table and any
    /// diagnostics collected while parsing.
    pub fn finish(self) -> (SpanMap, Vec<Diagnostic>) {
        (self.spans, self.diagnostics)
    }
}

pub use declarations::parse_compilation_unit;
