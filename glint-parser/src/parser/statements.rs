//! Statement parsing (§4.2): blocks, control flow, locals.

use super::Parser;
use glint_ast::{Block, Statement, VariableDecl};
use glint_lexer::TokenKind;

impl<'a> Parser<'a> {
    pub(crate) fn parse_block(&mut self) -> Block {
        let span = self.current_span();
        self.expect(TokenKind::LBrace, "`{` to open block");
        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            statements.push(self.parse_statement());
        }
        self.expect(TokenKind::RBrace, "`}` to close block");
        let id = self.alloc_node(span);
        Block { id, statements }
    }

    pub(crate) fn parse_statement(&mut self) -> Statement {
        match self.kind() {
            TokenKind::KwVar => self.parse_local(),
            TokenKind::KwIf => self.parse_if_statement(),
            TokenKind::KwWhile => self.parse_while_statement(),
            TokenKind::KwFor => self.parse_for_statement(),
            TokenKind::KwReturn => self.parse_return_statement(),
            TokenKind::KwBreak => {
                let span = self.current_span();
                self.advance();
                self.expect(TokenKind::Semicolon, "`;` after `break`");
                let id = self.alloc_node(span);
                Statement::Break { id }
            }
            TokenKind::KwContinue => {
                let span = self.current_span();
                self.advance();
                self.expect(TokenKind::Semicolon, "`;` after `continue`");
                let id = self.alloc_node(span);
                Statement::Continue { id }
            }
            TokenKind::LBrace => Statement::Block(self.parse_block()),
            _ => {
                let span = self.current_span();
                let expr = self.parse_expression();
                self.expect(TokenKind::Semicolon, "`;` after expression statement");
                let id = self.alloc_node(span);
                Statement::Expression { id, expr }
            }
        }
    }

    fn parse_local(&mut self) -> Statement {
        let span = self.current_span();
        self.advance();
        let name = self.consume_ident();
        let declared_type = if self.match_kind(TokenKind::Colon) {
            Some(self.parse_type_ref())
        } else {
            None
        };
        let initializer = if self.match_kind(TokenKind::Eq) {
            Some(self.parse_expression())
        } else {
            None
        };
        self.expect(TokenKind::Semicolon, "`;` after local variable declaration");
        let id = self.alloc_node(span);
        Statement::Local(VariableDecl {
            id,
            name,
            declared_type,
            initializer,
        })
    }

    fn parse_if_statement(&mut self) -> Statement {
        let span = self.current_span();
        self.advance();
        let condition = self.parse_expression();
        let then_block = self.parse_block();
        let else_block = if self.match_kind(TokenKind::KwElse) {
            if self.check(TokenKind::KwIf) {
                // Chained `else if` desugars to a nested single-statement
                // block so the AST keeps its uniform `Statement::If` shape.
                let nested_span = self.current_span();
                let nested = self.parse_if_statement();
                let block_id = self.alloc_node(nested_span);
                Some(Block {
                    id: block_id,
                    statements: vec![nested],
                })
            } else {
                Some(self.parse_block())
            }
        } else {
            None
        };
        let id = self.alloc_node(span);
        Statement::If {
            id,
            condition,
            then_block,
            else_block,
        }
    }

    fn parse_while_statement(&mut self) -> Statement {
        let span = self.current_span();
        self.advance();
        let condition = self.parse_expression();
        let body = self.parse_block();
        let id = self.alloc_node(span);
        Statement::While { id, condition, body }
    }

    /// `for (init; cond; post) { ... }` or, when an identifier is
    /// immediately followed by `in`, a for-in loop desugared here into
    /// the same C-style `Statement::For` shape using a hidden iterator
    /// local and a `HasNext`/`Next`-style condition left for semantic
    /// analysis to lower against the runtime's iterator protocol.
    fn parse_for_statement(&mut self) -> Statement {
        let span = self.current_span();
        self.advance();
        self.expect(TokenKind::LParen, "`(` after `for`");

        if self.check(TokenKind::Ident) && self.peek_at(1).kind == TokenKind::KwIn {
            return self.parse_for_in(span);
        }

        let init = if self.check(TokenKind::Semicolon) {
            self.advance();
            None
        } else if self.check(TokenKind::KwVar) {
            let local = self.parse_local();
            Some(Box::new(local))
        } else {
            let expr_span = self.current_span();
            let expr = self.parse_expression();
            self.expect(TokenKind::Semicolon, "`;` after for-loop initializer");
            let id = self.alloc_node(expr_span);
            Some(Box::new(Statement::Expression { id, expr }))
        };

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression())
        };
        self.expect(TokenKind::Semicolon, "`;` after for-loop condition");

        let post = if self.check(TokenKind::RParen) {
            None
        } else {
            let post_span = self.current_span();
            let expr = self.parse_expression();
            let id = self.alloc_node(post_span);
            Some(Box::new(Statement::Expression { id, expr }))
        };
        self.expect(TokenKind::RParen, "`)` to close for-loop header");

        let body = self.parse_block();
        let id = self.alloc_node(span);
        Statement::For {
            id,
            init,
            condition,
            post,
            body,
        }
    }

    /// Lowers `for (x in iterable) { body }` to the AST's plain C-style
    /// `for` shape: a hidden iterator local, a `MoveNext()` condition call,
    /// and a `Current` binding prepended to the loop body. Later passes
    /// only ever see `Statement::For`.
    fn parse_for_in(&mut self, span: glint_diagnostics::Span) -> Statement {
        let binding_name = self.consume_ident();
        self.expect(TokenKind::KwIn, "`in` in for-in loop");
        let iterable = self.parse_expression();
        self.expect(TokenKind::RParen, "`)` to close for-in header");

        let iter_name = format!("__iter_{}", binding_name);
        let iter_decl_span = span.clone();
        let iter_id = self.alloc_node(iter_decl_span.clone());
        let init_member = glint_ast::Expression::MemberAccess {
            id: self.alloc_node(iter_decl_span.clone()),
            object: Box::new(iterable),
            member: "iterator".to_string(),
        };
        let init_call = glint_ast::Expression::Call {
            id: self.alloc_node(iter_decl_span.clone()),
            callee: Box::new(init_member),
            args: Vec::new(),
        };
        let init = Some(Box::new(Statement::Local(VariableDecl {
            id: iter_id,
            name: iter_name.clone(),
            declared_type: None,
            initializer: Some(init_call),
        })));

        let condition_callee = glint_ast::Expression::MemberAccess {
            id: self.alloc_node(iter_decl_span.clone()),
            object: Box::new(glint_ast::Expression::Name {
                id: self.alloc_node(iter_decl_span.clone()),
                path: vec![iter_name.clone()],
            }),
            member: "moveNext".to_string(),
        };
        let condition = Some(glint_ast::Expression::Call {
            id: self.alloc_node(iter_decl_span.clone()),
            callee: Box::new(condition_callee),
            args: Vec::new(),
        });

        let mut body = self.parse_block();
        let current_member = glint_ast::Expression::MemberAccess {
            id: self.alloc_node(iter_decl_span.clone()),
            object: Box::new(glint_ast::Expression::Name {
                id: self.alloc_node(iter_decl_span.clone()),
                path: vec![iter_name],
            }),
            member: "current".to_string(),
        };
        let binding_id = self.alloc_node(iter_decl_span);
        body.statements.insert(
            0,
            Statement::Local(VariableDecl {
                id: binding_id,
                name: binding_name,
                declared_type: None,
                initializer: Some(current_member),
            }),
        );

        let id = self.alloc_node(span);
        Statement::For {
            id,
            init,
            condition,
            post: None,
            body,
        }
    }

    fn parse_return_statement(&mut self) -> Statement {
        let span = self.current_span();
        self.advance();
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression())
        };
        self.expect(TokenKind::Semicolon, "`;` after `return`");
        let id = self.alloc_node(span);
        Statement::Return { id, value }
    }
}
