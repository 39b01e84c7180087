//! Visitor interface over the AST (§4.3: "a visitor interface exposing
//! one `visit(T*)` per concrete node").
//!
//! `DefaultVisitor` walks children in source order and does nothing
//! else; implement the trait and override individual methods to act on
//! specific node kinds while still getting the traversal for free via
//! the provided `walk_*` free functions. `StructuralVisitor` additionally
//! descends into nested declarations (e.g. a type declaration's member
//! list), which passes that must traverse bodies (like semantic
//! analysis) need and passes that only care about top-level shape do
//! not.

use crate::node::*;

pub trait Visitor {
    fn visit_declaration(&mut self, decl: &Declaration) {
        walk_declaration(self, decl);
    }
    fn visit_statement(&mut self, stmt: &Statement) {
        walk_statement(self, stmt);
    }
    fn visit_expression(&mut self, expr: &Expression) {
        walk_expression(self, expr);
    }
    fn visit_type_ref(&mut self, type_ref: &TypeRef) {
        walk_type_ref(self, type_ref);
    }
}

pub fn walk_type_ref<V: Visitor + ?Sized>(visitor: &mut V, type_ref: &TypeRef) {
    match type_ref {
        TypeRef::Primitive { .. } | TypeRef::Error { .. } => {}
        TypeRef::Named { type_args, .. } => {
            for arg in type_args {
                visitor.visit_type_ref(arg);
            }
        }
        TypeRef::Pointer { inner, .. } => visitor.visit_type_ref(inner),
        TypeRef::Array { inner, size, .. } => {
            visitor.visit_type_ref(inner);
            if let Some(size) = size {
                visitor.visit_expression(size);
            }
        }
        TypeRef::Function { params, return_type, .. } => {
            for param in params {
                visitor.visit_type_ref(param);
            }
            visitor.visit_type_ref(return_type);
        }
    }
}

pub fn walk_declaration<V: Visitor + ?Sized>(visitor: &mut V, decl: &Declaration) {
    match decl {
        Declaration::Variable(var) => {
            if let Some(ty) = &var.declared_type {
                visitor.visit_type_ref(ty);
            }
            if let Some(init) = &var.initializer {
                visitor.visit_expression(init);
            }
        }
        Declaration::Parameter(param) => visitor.visit_type_ref(&param.declared_type),
        Declaration::Function(func) => {
            for param in &func.params {
                visitor.visit_type_ref(&param.declared_type);
            }
            if let Some(ret) = &func.return_type {
                visitor.visit_type_ref(ret);
            }
            if let Some(body) = &func.body {
                walk_block(visitor, body);
            }
        }
        Declaration::Constructor(ctor) => {
            for param in &ctor.params {
                visitor.visit_type_ref(&param.declared_type);
            }
            if let Some(args) = &ctor.base_call_args {
                for arg in args {
                    visitor.visit_expression(arg);
                }
            }
            walk_block(visitor, &ctor.body);
        }
        Declaration::Destructor(dtor) => walk_block(visitor, &dtor.body),
        Declaration::MemberVariable(member) => visitor.visit_type_ref(&member.declared_type),
        Declaration::PropertyAccessor(accessor) => {
            if let Some(body) = &accessor.body {
                walk_block(visitor, body);
            }
        }
        Declaration::EnumCase(case) => {
            for ty in &case.associated_types {
                visitor.visit_type_ref(ty);
            }
        }
        Declaration::Type(type_decl) => {
            for member in &type_decl.members {
                visitor.visit_declaration(member);
            }
        }
        Declaration::Namespace(ns) => {
            for member in &ns.members {
                visitor.visit_declaration(member);
            }
        }
    }
}

pub fn walk_block<V: Visitor + ?Sized>(visitor: &mut V, block: &Block) {
    for stmt in &block.statements {
        visitor.visit_statement(stmt);
    }
}

pub fn walk_statement<V: Visitor + ?Sized>(visitor: &mut V, stmt: &Statement) {
    match stmt {
        Statement::Local(var) => {
            if let Some(ty) = &var.declared_type {
                visitor.visit_type_ref(ty);
            }
            if let Some(init) = &var.initializer {
                visitor.visit_expression(init);
            }
        }
        Statement::Expression { expr, .. } => visitor.visit_expression(expr),
        Statement::If {
            condition,
            then_block,
            else_block,
            ..
        } => {
            visitor.visit_expression(condition);
            walk_block(visitor, then_block);
            if let Some(else_block) = else_block {
                walk_block(visitor, else_block);
            }
        }
        Statement::While { condition, body, .. } => {
            visitor.visit_expression(condition);
            walk_block(visitor, body);
        }
        Statement::For {
            init,
            condition,
            post,
            body,
            ..
        } => {
            if let Some(init) = init {
                visitor.visit_statement(init);
            }
            if let Some(condition) = condition {
                visitor.visit_expression(condition);
            }
            if let Some(post) = post {
                visitor.visit_statement(post);
            }
            walk_block(visitor, body);
        }
        Statement::Return { value, .. } => {
            if let Some(value) = value {
                visitor.visit_expression(value);
            }
        }
        Statement::Break { .. } | Statement::Continue { .. } => {}
        Statement::Block(block) => walk_block(visitor, block),
    }
}

pub fn walk_expression<V: Visitor + ?Sized>(visitor: &mut V, expr: &Expression) {
    match expr {
        Expression::Literal { .. } | Expression::Name { .. } | Expression::This { .. } | Expression::Error { .. } => {}
        Expression::Binary { left, right, .. } => {
            visitor.visit_expression(left);
            visitor.visit_expression(right);
        }
        Expression::Unary { operand, .. } | Expression::PostfixOp { operand, .. } => {
            visitor.visit_expression(operand)
        }
        Expression::Conditional {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            visitor.visit_expression(condition);
            visitor.visit_expression(then_branch);
            visitor.visit_expression(else_branch);
        }
        Expression::Assignment { target, value, .. } => {
            visitor.visit_expression(target);
            visitor.visit_expression(value);
        }
        Expression::Call { callee, args, .. } => {
            visitor.visit_expression(callee);
            for arg in args {
                visitor.visit_expression(arg);
            }
        }
        Expression::MemberAccess { object, .. } => visitor.visit_expression(object),
        Expression::Indexer { object, index, .. } => {
            visitor.visit_expression(object);
            visitor.visit_expression(index);
        }
        Expression::Cast { expr, target_type, .. } => {
            visitor.visit_expression(expr);
            visitor.visit_type_ref(target_type);
        }
        Expression::New { args, .. } => {
            for arg in args {
                visitor.visit_expression(arg);
            }
        }
        Expression::Lambda {
            params,
            return_type,
            body,
            ..
        } => {
            for param in params {
                visitor.visit_type_ref(&param.declared_type);
            }
            if let Some(ret) = return_type {
                visitor.visit_type_ref(ret);
            }
            visitor.visit_expression(body);
        }
        Expression::Range { start, end, .. } => {
            if let Some(start) = start {
                visitor.visit_expression(start);
            }
            if let Some(end) = end {
                visitor.visit_expression(end);
            }
        }
        Expression::Typeof { expr, .. } => visitor.visit_expression(expr),
        Expression::Sizeof { target_type, .. } => visitor.visit_type_ref(target_type),
        Expression::Match { scrutinee, arms, .. } => {
            visitor.visit_expression(scrutinee);
            for arm in arms {
                if let Some(guard) = &arm.guard {
                    visitor.visit_expression(guard);
                }
                visitor.visit_expression(&arm.body);
            }
        }
        Expression::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            visitor.visit_expression(condition);
            visitor.visit_expression(then_branch);
            if let Some(else_branch) = else_branch {
                visitor.visit_expression(else_branch);
            }
        }
        Expression::Block { statements, tail, .. } => {
            for stmt in statements {
                visitor.visit_statement(stmt);
            }
            if let Some(tail) = tail {
                visitor.visit_expression(tail);
            }
        }
    }
}

/// Plain source-order traversal with no extra behavior.
#[derive(Default)]
pub struct DefaultVisitor;

impl Visitor for DefaultVisitor {}

/// `walk_declaration` already descends into nested type/namespace
/// members, so this is behaviorally identical to `DefaultVisitor` today;
/// kept as a distinct type so whole-unit passes (registration, codegen)
/// can name the traversal they depend on rather than relying on an
/// implementation detail of `DefaultVisitor`.
#[derive(Default)]
pub struct StructuralVisitor;

impl Visitor for StructuralVisitor {}
