//! Pratt / precedence-climbing expression parser (§4.2).
//!
//! Precedence table (low → high): assignment (right-assoc), ternary
//! conditional (right-assoc; not named in the operator table itself but
//! conventionally binds just above assignment), logical-or, logical-and,
//! equality, comparison, range, additive, multiplicative, unary
//! (right-assoc), postfix (call / index / member / `++` / `--`),
//! primary.

use super::Parser;
use glint_ast::{BinaryOp, Expression, Literal, MatchArm, Pattern, PostfixOp, UnaryOp};
use glint_lexer::{LiteralValue, TokenKind};

const PRIMITIVE_KEYWORDS_SET: &[TokenKind] = &[
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
    pub(crate) fn parse_expression(&mut self) -> Expression {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Expression {
        let start = self.current_span();
        let target = self.parse_conditional();
        if self.match_kind(TokenKind::Eq) {
            let value = Box::new(self.parse_assignment());
            let id = self.alloc_node(start);
            return Expression::Assignment {
                id,
                target: Box::new(target),
                value,
            };
        }
        target
    }

    /// Ternary `cond ? then : else`, right-associative.
    fn parse_conditional(&mut self) -> Expression {
        let start = self.current_span();
        let condition = self.parse_logical_or();
        if self.match_kind(TokenKind::Question) {
            let then_branch = Box::new(self.parse_assignment());
            self.expect(TokenKind::Colon, "`:` in conditional expression");
            let else_branch = Box::new(self.parse_conditional());
            let id = self.alloc_node(start);
            return Expression::Conditional {
                id,
                condition: Box::new(condition),
                then_branch,
                else_branch,
            };
        }
        condition
    }

    fn parse_logical_or(&mut self) -> Expression {
        let mut left = self.parse_logical_and();
        while self.check(TokenKind::OrOr) {
            let start = left.id();
            let _ = start;
            let span = self.current_span();
            self.advance();
            let right = self.parse_logical_and();
            let id = self.alloc_node(span);
            left = Expression::Binary {
                id,
                left: Box::new(left),
                op: BinaryOp::Or,
                right: Box::new(right),
            };
        }
        left
    }

    fn parse_logical_and(&mut self) -> Expression {
        let mut left = self.parse_equality();
        while self.check(TokenKind::AndAnd) {
            let span = self.current_span();
            self.advance();
            let right = self.parse_equality();
            let id = self.alloc_node(span);
            left = Expression::Binary {
                id,
                left: Box::new(left),
                op: BinaryOp::And,
                right: Box::new(right),
            };
        }
        left
    }

    fn parse_equality(&mut self) -> Expression {
        let mut left = self.parse_comparison();
        loop {
            let op = match self.kind() {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::NotEq,
                _ => break,
            };
            let span = self.current_span();
            self.advance();
            let right = self.parse_comparison();
            let id = self.alloc_node(span);
            left = Expression::Binary {
                id,
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        left
    }

    fn parse_comparison(&mut self) -> Expression {
        let mut left = self.parse_range();
        loop {
            let op = match self.kind() {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            let span = self.current_span();
            self.advance();
            let right = self.parse_range();
            let id = self.alloc_node(span);
            left = Expression::Binary {
                id,
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        left
    }

    fn parse_range(&mut self) -> Expression {
        // A range may omit its start entirely: `..10`, `..=10`, `..`.
        if self.check(TokenKind::DotDot) || self.check(TokenKind::DotDotEq) {
            let span = self.current_span();
            let inclusive = self.kind() == TokenKind::DotDotEq;
            self.advance();
            let end = if self.starts_expression() {
                Some(Box::new(self.parse_additive()))
            } else {
                None
            };
            let id = self.alloc_node(span);
            return Expression::Range {
                id,
                start: None,
                end,
                inclusive,
            };
        }

        let left = self.parse_additive();
        if self.check(TokenKind::DotDot) || self.check(TokenKind::DotDotEq) {
            let span = self.current_span();
            let inclusive = self.kind() == TokenKind::DotDotEq;
            self.advance();
            let end = if self.starts_expression() {
                Some(Box::new(self.parse_additive()))
            } else {
                None
            };
            let id = self.alloc_node(span);
            return Expression::Range {
                id,
                start: Some(Box::new(left)),
                end,
                inclusive,
            };
        }
        left
    }

    fn parse_additive(&mut self) -> Expression {
        let mut left = self.parse_multiplicative();
        loop {
            let op = match self.kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            let span = self.current_span();
            self.advance();
            let right = self.parse_multiplicative();
            let id = self.alloc_node(span);
            left = Expression::Binary {
                id,
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        left
    }

    fn parse_multiplicative(&mut self) -> Expression {
        let mut left = self.parse_unary();
        loop {
            let op = match self.kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            let span = self.current_span();
            self.advance();
            let right = self.parse_unary();
            let id = self.alloc_node(span);
            left = Expression::Binary {
                id,
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        left
    }

    fn parse_unary(&mut self) -> Expression {
        let op = match self.kind() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            let span = self.current_span();
            self.advance();
            let operand = Box::new(self.parse_unary());
            let id = self.alloc_node(span);
            return Expression::Unary { id, op, operand };
        }
        if self.check(TokenKind::LParen) && self.looks_like_cast() {
            let span = self.current_span();
            self.advance();
            let target_type = self.parse_type_ref();
            self.expect(TokenKind::RParen, "`)` to close cast target type");
            let expr = Box::new(self.parse_unary());
            let id = self.alloc_node(span);
            return Expression::Cast { id, expr, target_type };
        }
        self.parse_postfix()
    }

    /// `(Type)expr` cast, grounded on the C-style cast shape the
    /// original implementation's `CastExpressionNode` describes.
    /// Restricted to primitive keywords and bare/pointer named types
    /// followed by something that clearly starts an operand, so a
    /// plain parenthesized expression like `(x)` is never misread as a
    /// cast of type `x`.
    fn looks_like_cast(&self) -> bool {
        let mut i = self.pos + 1;
        let is_type_start = PRIMITIVE_KEYWORDS_SET.contains(&self.peek_at(1).kind)
            || self.peek_at(1).kind == TokenKind::Ident
            || self.peek_at(1).kind == TokenKind::Star
            || self.peek_at(1).kind == TokenKind::KwPtr;
        if !is_type_start {
            return false;
        }
        let mut depth = 1i32;
        loop {
            let tok = &self.tokens[i.min(self.tokens.len() - 1)];
            match tok.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                TokenKind::EndOfFile => return false,
                _ => {}
            }
            i += 1;
        }
        let after = &self.tokens[(i + 1).min(self.tokens.len() - 1)];
        matches!(
            after.kind,
            TokenKind::Ident
                | TokenKind::IntLiteral
                | TokenKind::HexLiteral
                | TokenKind::BinaryLiteral
                | TokenKind::OctalLiteral
                | TokenKind::FloatLiteral
                | TokenKind::StringLiteral
                | TokenKind::CharLiteral
                | TokenKind::KwThis
                | TokenKind::KwNew
                | TokenKind::Bang
                | TokenKind::LParen
        )
    }

    fn parse_postfix(&mut self) -> Expression {
        let mut expr = self.parse_primary();
        loop {
            match self.kind() {
                TokenKind::LParen => {
                    let span = self.current_span();
                    self.advance();
                    let mut args = Vec::new();
                    if !self.check(TokenKind::RParen) {
                        loop {
                            args.push(self.parse_expression());
                            if !self.match_kind(TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(TokenKind::RParen, "`)` to close call arguments");
                    let id = self.alloc_node(span);
                    expr = Expression::Call {
                        id,
                        callee: Box::new(expr),
                        args,
                    };
                }
                TokenKind::Dot => {
                    let span = self.current_span();
                    self.advance();
                    let member = self.consume_ident();
                    let id = self.alloc_node(span);
                    expr = Expression::MemberAccess {
                        id,
                        object: Box::new(expr),
                        member,
                    };
                }
                TokenKind::LBracket => {
                    let span = self.current_span();
                    self.advance();
                    let index = self.parse_expression();
                    self.expect(TokenKind::RBracket, "`]` to close index expression");
                    let id = self.alloc_node(span);
                    expr = Expression::Indexer {
                        id,
                        object: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let span = self.current_span();
                    let op = if self.kind() == TokenKind::PlusPlus {
                        PostfixOp::Increment
                    } else {
                        PostfixOp::Decrement
                    };
                    self.advance();
                    let id = self.alloc_node(span);
                    expr = Expression::PostfixOp {
                        id,
                        op,
                        operand: Box::new(expr),
                    };
                }
                _ => break,
            }
        }
        expr
    }

    fn parse_primary(&mut self) -> Expression {
        let span = self.current_span();
        match self.kind() {
            TokenKind::IntLiteral
            | TokenKind::HexLiteral
            | TokenKind::BinaryLiteral
            | TokenKind::OctalLiteral
            | TokenKind::FloatLiteral
            | TokenKind::StringLiteral
            | TokenKind::CharLiteral
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null => {
                let tok = self.advance();
                let value = match tok.literal {
                    Some(LiteralValue::Integer(v)) => Literal::Integer(v),
                    Some(LiteralValue::Float(v)) => Literal::Float(v),
                    Some(LiteralValue::Str(v)) => Literal::Str(v),
                    Some(LiteralValue::Char(v)) => Literal::Char(v),
                    Some(LiteralValue::Bool(v)) => Literal::Bool(v),
                    Some(LiteralValue::Null) | None => Literal::Null,
                };
                let id = self.alloc_node(span);
                Expression::Literal { id, value }
            }
            TokenKind::KwThis => {
                self.advance();
                let id = self.alloc_node(span);
                Expression::This { id }
            }
            TokenKind::KwNew => self.parse_new(),
            TokenKind::KwMatch => self.parse_match(),
            TokenKind::KwIf => self.parse_if_expression(),
            TokenKind::LBrace => self.parse_block_expression(),
            TokenKind::LParen => self.parse_paren_or_lambda(),
            TokenKind::Ident => self.parse_ident_led(),
            _ => {
                self.error_here(format!("expected an expression, found `{}`", self.peek().text));
                let id = self.error_node();
                self.advance();
                Expression::Error { id }
            }
        }
    }

    fn parse_ident_led(&mut self) -> Expression {
        let span = self.current_span();
        let name = self.advance().text;
        match name.as_str() {
            "typeof" if self.check(TokenKind::LParen) => {
                self.advance();
                let expr = Box::new(self.parse_expression());
                self.expect(TokenKind::RParen, "`)` to close `typeof(...)`");
                let id = self.alloc_node(span);
                return Expression::Typeof { id, expr };
            }
            "sizeof" if self.check(TokenKind::LParen) => {
                self.advance();
                let target_type = self.parse_type_ref();
                self.expect(TokenKind::RParen, "`)` to close `sizeof(...)`");
                let id = self.alloc_node(span);
                return Expression::Sizeof { id, target_type };
            }
            _ => {}
        }
        // Further `.member` access is handled uniformly by `parse_postfix`
        // as `MemberAccess`, not folded into this name.
        let id = self.alloc_node(span);
        Expression::Name { id, path: vec![name] }
    }

    fn parse_new(&mut self) -> Expression {
        let span = self.current_span();
        self.advance();
        let type_name = self.consume_ident();
        let mut args = Vec::new();
        if self.match_kind(TokenKind::LParen) {
            if !self.check(TokenKind::RParen) {
                loop {
                    args.push(self.parse_expression());
                    if !self.match_kind(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen, "`)` to close constructor arguments");
        }
        let id = self.alloc_node(span);
        Expression::New { id, type_name, args }
    }

    fn parse_match(&mut self) -> Expression {
        let span = self.current_span();
        self.advance();
        let scrutinee = Box::new(self.parse_expression());
        self.expect(TokenKind::LBrace, "`{` to open `match` body");
        let mut arms = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            let pattern = self.parse_pattern();
            let guard = if self.check(TokenKind::KwIf) {
                self.advance();
                Some(self.parse_expression())
            } else {
                None
            };
            self.expect(TokenKind::FatArrow, "`=>` after match pattern");
            let body = self.parse_expression();
            arms.push(MatchArm { pattern, guard, body });
            if !self.match_kind(TokenKind::Comma) && !self.check(TokenKind::RBrace) {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "`}` to close `match` body");
        let id = self.alloc_node(span);
        Expression::Match { id, scrutinee, arms }
    }

    fn parse_pattern(&mut self) -> Pattern {
        match self.kind() {
            TokenKind::Ident if self.peek().text == "_" => {
                self.advance();
                Pattern::Wildcard
            }
            TokenKind::Ident => {
                let name = self.advance().text;
                if self.match_kind(TokenKind::Dot) {
                    let variant = self.consume_ident();
                    let mut bindings = Vec::new();
                    if self.match_kind(TokenKind::LParen) {
                        if !self.check(TokenKind::RParen) {
                            loop {
                                bindings.push(self.consume_ident());
                                if !self.match_kind(TokenKind::Comma) {
                                    break;
                                }
                            }
                        }
                        self.expect(TokenKind::RParen, "`)` to close enum pattern bindings");
                    }
                    Pattern::EnumCase { name: variant, bindings: std::iter::once(name).chain(bindings).collect() }
                } else {
                    Pattern::Binding(name)
                }
            }
            TokenKind::IntLiteral | TokenKind::FloatLiteral | TokenKind::StringLiteral | TokenKind::CharLiteral | TokenKind::True | TokenKind::False => {
                let tok = self.advance();
                let lit = match tok.literal {
                    Some(LiteralValue::Integer(v)) => Literal::Integer(v),
                    Some(LiteralValue::Float(v)) => Literal::Float(v),
                    Some(LiteralValue::Str(v)) => Literal::Str(v),
                    Some(LiteralValue::Char(v)) => Literal::Char(v),
                    Some(LiteralValue::Bool(v)) => Literal::Bool(v),
                    _ => Literal::Null,
                };
                Pattern::Literal(lit)
            }
            _ => {
                self.error_here("expected a pattern".to_string());
                Pattern::Wildcard
            }
        }
    }

    fn parse_if_expression(&mut self) -> Expression {
        let span = self.current_span();
        self.advance();
        let condition = Box::new(self.parse_expression());
        let then_branch = Box::new(self.parse_block_expression());
        let else_branch = if self.match_kind(TokenKind::KwElse) {
            if self.check(TokenKind::KwIf) {
                Some(Box::new(self.parse_if_expression()))
            } else {
                Some(Box::new(self.parse_block_expression()))
            }
        } else {
            None
        };
        let id = self.alloc_node(span);
        Expression::If {
            id,
            condition,
            then_branch,
            else_branch,
        }
    }

    /// `{ stmt; stmt; tail }` — the last statement without a trailing
    /// `;` becomes the block's value (§4.2: "if, match, and block are
    /// expressions").
    pub(crate) fn parse_block_expression(&mut self) -> Expression {
        let span = self.current_span();
        self.expect(TokenKind::LBrace, "`{` to open block");
        let mut statements = Vec::new();
        let mut tail = None;
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            if self.starts_statement_keyword() {
                statements.push(self.parse_statement());
                continue;
            }
            let checkpoint = self.pos;
            let expr = self.parse_expression();
            if self.match_kind(TokenKind::Semicolon) {
                let id = self.alloc_node(self.current_span());
                statements.push(glint_ast::Statement::Expression { id, expr });
            } else if self.check(TokenKind::RBrace) {
                tail = Some(Box::new(expr));
                break;
            } else {
                self.pos = checkpoint;
                statements.push(self.parse_statement());
            }
        }
        self.expect(TokenKind::RBrace, "`}` to close block");
        let id = self.alloc_node(span);
        Expression::Block { id, statements, tail }
    }

    /// Disambiguates `(expr)` from a lambda `(params) => expr`: scans
    /// ahead for the matching `)` and checks whether `=>` follows.
    fn parse_paren_or_lambda(&mut self) -> Expression {
        if self.looks_like_lambda_params() {
            return self.parse_lambda();
        }
        let span = self.current_span();
        self.advance();
        let inner = self.parse_expression();
        self.expect(TokenKind::RParen, "`)` to close parenthesized expression");
        let _ = span;
        inner
    }

    fn looks_like_lambda_params(&self) -> bool {
        let mut depth = 0i32;
        let mut i = self.pos;
        loop {
            let tok = &self.tokens[i.min(self.tokens.len() - 1)];
            match tok.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        let next = &self.tokens[(i + 1).min(self.tokens.len() - 1)];
                        return next.kind == TokenKind::FatArrow;
                    }
                }
                TokenKind::EndOfFile => return false,
                _ => {}
            }
            i += 1;
        }
    }

    fn parse_lambda(&mut self) -> Expression {
        let span = self.current_span();
        self.expect(TokenKind::LParen, "`(` to open lambda parameters");
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                let param_span = self.current_span();
                let name = self.consume_ident();
                let declared_type = if self.match_kind(TokenKind::Colon) {
                    self.parse_type_ref()
                } else {
                    glint_ast::TypeRef::Error { id: self.alloc_node(param_span.clone()) }
                };
                let param_id = self.alloc_node(param_span);
                params.push(glint_ast::ParameterDecl {
                    id: param_id,
                    name,
                    declared_type,
                });
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "`)` to close lambda parameters");
        let return_type = if self.match_kind(TokenKind::Colon) {
            Some(self.parse_type_ref())
        } else {
            None
        };
        self.expect(TokenKind::FatArrow, "`=>` after lambda parameters");
        let body = Box::new(self.parse_expression());
        let id = self.alloc_node(span);
        Expression::Lambda {
            id,
            params,
            return_type,
            body,
        }
    }

    fn starts_expression(&self) -> bool {
        !matches!(
            self.kind(),
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket | TokenKind::Comma | TokenKind::EndOfFile
        )
    }

    pub(crate) fn starts_statement_keyword(&self) -> bool {
        matches!(
            self.kind(),
            TokenKind::KwVar
                | TokenKind::KwReturn
                | TokenKind::KwBreak
                | TokenKind::KwContinue
                | TokenKind::KwWhile
                | TokenKind::KwFor
        )
    }
}
