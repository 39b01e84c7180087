//! Type-reference parsing, including the `>>`-splitting edge case for
//! nested generic argument lists (§4.2).

use super::Parser;
use glint_ast::TypeRef;
use glint_lexer::TokenKind;

const PRIMITIVE_KEYWORDS: &[TokenKind] = &[
    TokenKind::KwI32,
    TokenKind::KwI64,
    TokenKind::KwU32,
    TokenKind::KwU64,
    TokenKind::KwF32,
    TokenKind::KwF64,
    TokenKind::KwBool,
    TokenKind::KwChar,
    TokenKind::KwVoid,
];

impl<'a> Parser<'a> {
    pub(crate) fn parse_type_ref(&mut self) -> TypeRef {
        if self.check(TokenKind::Star) || self.check(TokenKind::KwPtr) {
            let start = self.current_span();
            self.advance();
            let inner = Box::new(self.parse_type_ref());
            let id = self.alloc_node(start);
            return TypeRef::Pointer { id, inner };
        }

        if self.check(TokenKind::LBracket) {
            let start = self.current_span();
            self.advance();
            let inner = Box::new(self.parse_type_ref());
            let size = if self.match_kind(TokenKind::Semicolon) {
                Some(Box::new(self.parse_expression()))
            } else {
                None
            };
            self.expect(TokenKind::RBracket, "`]` to close array type");
            let id = self.alloc_node(start);
            return TypeRef::Array { id, inner, size };
        }

        if self.check(TokenKind::KwFn) {
            let start = self.current_span();
            self.advance();
            self.expect(TokenKind::LParen, "`(` after `fn` in function type");
            let mut params = Vec::new();
            if !self.check(TokenKind::RParen) {
                loop {
                    params.push(self.parse_type_ref());
                    if !self.match_kind(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen, "`)` to close function type parameters");
            let return_type = if self.match_kind(TokenKind::Colon) {
                Box::new(self.parse_type_ref())
            } else {
                Box::new(TypeRef::Primitive {
                    id: self.alloc_node(self.current_span()),
                    name: "void".to_string(),
                })
            };
            let id = self.alloc_node(start);
            return TypeRef::Function { id, params, return_type };
        }

        if PRIMITIVE_KEYWORDS.contains(&self.kind()) {
            let start = self.current_span();
            let tok = self.advance();
            let id = self.alloc_node(start);
            return TypeRef::Primitive { id, name: tok.text };
        }

        if self.check(TokenKind::Ident) {
            let start = self.current_span();
            let mut path = vec![self.advance().text];
            while self.check(TokenKind::Dot) {
                self.advance();
                path.push(self.consume_ident());
            }
            // Generic type arguments: Name<T, U<V>>
            let mut type_args = Vec::new();
            if self.check(TokenKind::Lt) {
                self.advance();
                if !self.at_generic_close() {
                    loop {
                        type_args.push(self.parse_type_ref());
                        if !self.match_kind(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.consume_generic_close();
            }
            let id = self.alloc_node(start);
            return TypeRef::Named { id, path, type_args };
        }

        self.error_here(format!("expected a type, found `{}`", self.peek().text));
        TypeRef::Error { id: self.error_node() }
    }

    /// True when the next token closes a generic argument list, i.e. is
    /// `>` or the leading half of a lexed `>>`.
    fn at_generic_close(&self) -> bool {
        self.check(TokenKind::Gt) || self.check(TokenKind::RShift)
    }

    /// Consume one `>` from the generic-argument closer. If the lexer
    /// produced a single `>>` token (because it was lexed without
    /// knowledge of the surrounding generic-argument nesting), split it
    /// in place into two logical `>` closes by only consuming one and
    /// rewriting the remaining token to a bare `Gt` (§4.2 edge case).
    pub(crate) fn consume_generic_close(&mut self) {
        if self.check(TokenKind::Gt) {
            self.advance();
            return;
        }
        if self.check(TokenKind::RShift) {
            self.tokens[self.pos].kind = TokenKind::Gt;
            self.tokens[self.pos].text = ">".to_string();
            return;
        }
        self.expect(TokenKind::Gt, "`>` to close generic argument list");
    }

    /// Parse `<T, U: Bound>`-style declaration generic parameters,
    /// returning the bare names (bounds are recorded as a second
    /// return value for future use by the symbol table).
    pub(crate) fn parse_generic_params(&mut self) -> Vec<String> {
        if !self.match_kind(TokenKind::Lt) {
            return Vec::new();
        }
        let mut params = Vec::new();
        if !self.at_generic_close() {
            loop {
                params.push(self.consume_ident());
                if self.match_kind(TokenKind::Colon) {
                    // Trait-bound-style constraint; C3's Type system does
                    // not model bounds yet, so the name is parsed and
                    // discarded rather than left unconsumed.
                    let _ = self.consume_ident();
                }
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume_generic_close();
        params
    }
}
