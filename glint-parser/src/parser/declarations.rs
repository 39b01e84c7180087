//! Declaration parsing (§4.2): the compilation unit, namespaces, type
//! declarations and their members, and free functions.
//!
//! Constructors and destructors share no dedicated keyword with the
//! original implementation's grammar beyond destructors' leading `~`
//! (`ast_declarations.hpp`'s `DestructorDeclarationNode::tildeToken`);
//! a member is recognized as a constructor when its name matches the
//! enclosing type's name, the conventional C#/Java-family rule used
//! here in its absence.

use super::Parser;
use glint_ast::{
    AccessorKind, CompilationUnit, ConstructorDecl, Declaration, DestructorDecl, EnumCaseDecl,
    FunctionDecl, MemberVariableDecl, Modifiers, NamespaceDecl, ParameterDecl,
    PropertyAccessorDecl, TypeDecl, TypeDeclKind,
};
use glint_lexer::TokenKind;

pub fn parse_compilation_unit(parser: &mut Parser) -> CompilationUnit {
    let span = parser.current_span();
    let mut declarations = Vec::new();
    while !parser.is_at_end() {
        if let Some(decl) = parser.parse_top_level_declaration() {
            declarations.push(decl);
        }
    }
    let id = parser.alloc_node(span);
    CompilationUnit { id, declarations }
}

impl<'a> Parser<'a> {
    fn parse_top_level_declaration(&mut self) -> Option<Declaration> {
        if self.match_kind(TokenKind::KwUsing) {
            // `using` directives narrow name resolution only; C4's symbol
            // table consumes the imported path, so nothing is retained in
            // the tree beyond having consumed the statement.
            let mut path = vec![self.consume_ident()];
            while self.match_kind(TokenKind::Dot) {
                path.push(self.consume_ident());
            }
            self.expect(TokenKind::Semicolon, "`;` after `using` directive");
            let _ = path;
            return None;
        }

        if self.check(TokenKind::KwNamespace) {
            return Some(self.parse_namespace());
        }

        let modifiers = self.parse_modifiers();

        match self.kind() {
            TokenKind::KwType | TokenKind::KwClass | TokenKind::KwStruct | TokenKind::KwEnum => {
                Some(Declaration::Type(self.parse_type_decl(modifiers)))
            }
            TokenKind::KwFn => Some(Declaration::Function(self.parse_function_decl(modifiers))),
            _ => {
                self.error_here(format!(
                    "expected a declaration, found `{}`",
                    self.peek().text
                ));
                self.synchronize();
                None
            }
        }
    }

    fn parse_modifiers(&mut self) -> Modifiers {
        let mut modifiers = Modifiers::default();
        loop {
            match self.kind() {
                TokenKind::KwStatic => modifiers.is_static = true,
                TokenKind::KwVirtual => modifiers.is_virtual = true,
                TokenKind::KwOverride => modifiers.is_override = true,
                TokenKind::KwExtern => modifiers.is_extern = true,
                TokenKind::KwPublic => modifiers.is_public = true,
                TokenKind::KwPrivate => modifiers.is_private = true,
                _ => break,
            }
            self.advance();
        }
        modifiers
    }

    fn parse_namespace(&mut self) -> Declaration {
        let span = self.current_span();
        self.advance();
        let mut path = vec![self.consume_ident()];
        while self.match_kind(TokenKind::Dot) {
            path.push(self.consume_ident());
        }

        let (members, is_block_scoped) = if self.check(TokenKind::LBrace) {
            self.advance();
            let mut members = Vec::new();
            while !self.check(TokenKind::RBrace) && !self.is_at_end() {
                if let Some(decl) = self.parse_top_level_declaration() {
                    members.push(decl);
                }
            }
            self.expect(TokenKind::RBrace, "`}` to close namespace body");
            (members, true)
        } else {
            self.expect(TokenKind::Semicolon, "`;` after file-scoped namespace declaration");
            let mut members = Vec::new();
            while !self.is_at_end() {
                if let Some(decl) = self.parse_top_level_declaration() {
                    members.push(decl);
                }
            }
            (members, false)
        };

        let id = self.alloc_node(span);
        Declaration::Namespace(NamespaceDecl {
            id,
            path,
            is_block_scoped,
            members,
        })
    }

    fn parse_type_decl(&mut self, modifiers: Modifiers) -> TypeDecl {
        let span = self.current_span();
        let kind = match self.advance().kind {
            TokenKind::KwClass if modifiers.is_static => TypeDeclKind::Static,
            TokenKind::KwClass => TypeDeclKind::RefType,
            TokenKind::KwStruct => TypeDeclKind::ValueType,
            TokenKind::KwEnum => TypeDeclKind::Enum,
            _ => TypeDeclKind::Type,
        };
        let name = self.consume_ident();
        let generic_params = self.parse_generic_params();
        let base = if self.match_kind(TokenKind::Colon) {
            Some(self.consume_ident())
        } else {
            None
        };

        self.expect(TokenKind::LBrace, "`{` to open type body");
        let mut members = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            if kind == TypeDeclKind::Enum {
                members.push(self.parse_enum_case());
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
                continue;
            }
            members.extend(self.parse_member(&name));
        }
        self.expect(TokenKind::RBrace, "`}` to close type body");

        let id = self.alloc_node(span);
        TypeDecl {
            id,
            name,
            kind,
            generic_params,
            base,
            members,
        }
    }

    fn parse_enum_case(&mut self) -> Declaration {
        let span = self.current_span();
        let name = self.consume_ident();
        let mut associated_types = Vec::new();
        if self.match_kind(TokenKind::LParen) {
            if !self.check(TokenKind::RParen) {
                loop {
                    associated_types.push(self.parse_type_ref());
                    if !self.match_kind(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen, "`)` to close enum case payload");
        }
        let id = self.alloc_node(span);
        Declaration::EnumCase(EnumCaseDecl {
            id,
            name,
            associated_types,
        })
    }

    fn parse_member(&mut self, enclosing_type_name: &str) -> Vec<Declaration> {
        let modifiers = self.parse_modifiers();

        if self.check(TokenKind::Tilde) {
            return vec![self.parse_destructor()];
        }

        if self.check(TokenKind::Ident)
            && self.peek().text == enclosing_type_name
            && self.peek_at(1).kind == TokenKind::LParen
        {
            return vec![self.parse_constructor()];
        }

        if self.match_kind(TokenKind::KwFn) {
            return vec![Declaration::Function(self.finish_function_decl(modifiers))];
        }

        if self.check(TokenKind::Ident) {
            return self.parse_member_variable_or_property(modifiers);
        }

        self.error_here(format!(
            "expected a member declaration, found `{}`",
            self.peek().text
        ));
        self.synchronize();
        Vec::new()
    }

    fn parse_constructor(&mut self) -> Declaration {
        let span = self.current_span();
        self.advance(); // constructor name
        let params = self.parse_parameter_list();
        let base_call_args = if self.match_kind(TokenKind::Colon) {
            self.expect(TokenKind::LParen, "`(` after base constructor call");
            let mut args = Vec::new();
            if !self.check(TokenKind::RParen) {
                loop {
                    args.push(self.parse_expression());
                    if !self.match_kind(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen, "`)` to close base constructor call");
            Some(args)
        } else {
            None
        };
        let body = self.parse_block();
        let id = self.alloc_node(span);
        Declaration::Constructor(ConstructorDecl {
            id,
            params,
            base_call_args,
            body,
        })
    }

    fn parse_destructor(&mut self) -> Declaration {
        let span = self.current_span();
        self.advance(); // `~`
        self.consume_ident(); // destructor name, discarded: one per type
        self.expect(TokenKind::LParen, "`(` in destructor declaration");
        self.expect(TokenKind::RParen, "`)` in destructor declaration (destructors take no parameters)");
        let body = self.parse_block();
        let id = self.alloc_node(span);
        Declaration::Destructor(DestructorDecl { id, body })
    }

    fn parse_function_decl(&mut self, modifiers: Modifiers) -> FunctionDecl {
        self.advance(); // `fn`
        self.finish_function_decl(modifiers)
    }

    fn finish_function_decl(&mut self, modifiers: Modifiers) -> FunctionDecl {
        let span = self.current_span();
        let name = self.consume_ident();
        let params = self.parse_parameter_list();
        let return_type = if self.match_kind(TokenKind::Colon) {
            Some(self.parse_type_ref())
        } else {
            None
        };
        let body = if modifiers.is_extern {
            self.expect(TokenKind::Semicolon, "`;` after extern function signature");
            None
        } else {
            Some(self.parse_block())
        };
        let id = self.alloc_node(span);
        FunctionDecl {
            id,
            name,
            modifiers,
            params,
            return_type,
            body,
        }
    }

    fn parse_parameter_list(&mut self) -> Vec<ParameterDecl> {
        self.expect(TokenKind::LParen, "`(` to open parameter list");
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                let span = self.current_span();
                let name = self.consume_ident();
                self.expect(TokenKind::Colon, "`:` before parameter type");
                let declared_type = self.parse_type_ref();
                let id = self.alloc_node(span);
                params.push(ParameterDecl {
                    id,
                    name,
                    declared_type,
                });
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "`)` to close parameter list");
        params
    }

    /// A bare `name: Type;` is a field; `name: Type { get ... set ... }`
    /// is a property — the field node plus one `PropertyAccessor`
    /// declaration per accessor, returned as sibling members.
    fn parse_member_variable_or_property(&mut self, modifiers: Modifiers) -> Vec<Declaration> {
        let span = self.current_span();
        let name = self.consume_ident();
        self.expect(TokenKind::Colon, "`:` before member type");
        let declared_type = self.parse_type_ref();

        if self.match_kind(TokenKind::Semicolon) {
            let id = self.alloc_node(span);
            return vec![Declaration::MemberVariable(MemberVariableDecl {
                id,
                name,
                declared_type,
                modifiers,
            })];
        }

        // Property with accessor block: `name: Type { get { ... } set { ... } }`
        self.expect(TokenKind::LBrace, "`;` or `{` after member type");
        let mut declarations = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            let accessor_span = self.current_span();
            let kind = if self.peek().text == "get" {
                self.advance();
                AccessorKind::Get
            } else if self.peek().text == "set" {
                self.advance();
                AccessorKind::Set
            } else {
                self.error_here(format!(
                    "expected `get` or `set`, found `{}`",
                    self.peek().text
                ));
                self.synchronize();
                continue;
            };
            let body = if self.check(TokenKind::LBrace) {
                Some(self.parse_block())
            } else {
                self.expect(TokenKind::Semicolon, "`;` after auto-property accessor");
                None
            };
            let id = self.alloc_node(accessor_span);
            declarations.push(Declaration::PropertyAccessor(PropertyAccessorDecl {
                id,
                property_name: name.clone(),
                kind,
                body,
            }));
        }
        self.expect(TokenKind::RBrace, "`}` to close property accessor block");

        let id = self.alloc_node(span);
        declarations.insert(
            0,
            Declaration::MemberVariable(MemberVariableDecl {
                id,
                name,
                declared_type,
                modifiers,
            }),
        );
        declarations
    }
}
