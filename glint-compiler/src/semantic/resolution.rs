//! Phase B — resolution & checking (§4.5): walk every body, type every
//! expression, resolve names and calls, and record the usage graph.

use super::ir::UsageEdge;
use super::registration::resolve_type_ref;
use crate::symbol_table::{MethodSymbol, SymbolTable, ValueCategory};
use glint_ast::{
    Block, CompilationUnit, Conversion, Declaration, Expression, Literal, Statement, TypeId, TypeSystem,
};
use glint_diagnostics::{error_codes, DiagnosticEngine, NodeId, Span, SpanMap};
use std::collections::HashMap;

pub struct BodyContext<'a> {
    pub symbols: &'a mut SymbolTable,
    pub types: &'a TypeSystem,
    pub diagnostics: &'a mut DiagnosticEngine,
    pub spans: &'a SpanMap,
    pub current_class: Option<String>,
    pub return_type: TypeId,
    pub usage_graph: &'a mut Vec<UsageEdge>,
    pub expr_types: &'a mut HashMap<NodeId, (TypeId, ValueCategory)>,
    pub resolved_calls: &'a mut HashMap<NodeId, String>,
}

impl<'a> BodyContext<'a> {
    fn span(&self, id: NodeId) -> Span {
        self.spans.get_or_unknown(id)
    }

    fn type_name(&self, ty: TypeId) -> String {
        format!("{:?}", self.types.get(ty))
    }

    fn record(&mut self, id: NodeId, ty: TypeId, category: ValueCategory) {
        self.expr_types.insert(id, (ty, category));
    }
}

pub fn resolve_bodies(
    unit: &CompilationUnit,
    symbols: &mut SymbolTable,
    types: &TypeSystem,
    diagnostics: &mut DiagnosticEngine,
    spans: &SpanMap,
    usage_graph: &mut Vec<UsageEdge>,
    expr_types: &mut HashMap<NodeId, (TypeId, ValueCategory)>,
    resolved_calls: &mut HashMap<NodeId, String>,
) {
    resolve_decls(&unit.declarations, symbols, types, diagnostics, spans, usage_graph, expr_types, resolved_calls);
}

#[allow(clippy::too_many_arguments)]
fn resolve_decls(
    decls: &[Declaration],
    symbols: &mut SymbolTable,
    types: &TypeSystem,
    diagnostics: &mut DiagnosticEngine,
    spans: &SpanMap,
    usage_graph: &mut Vec<UsageEdge>,
    expr_types: &mut HashMap<NodeId, (TypeId, ValueCategory)>,
    resolved_calls: &mut HashMap<NodeId, String>,
) {
    for decl in decls {
        match decl {
            Declaration::Namespace(ns) => {
                resolve_decls(&ns.members, symbols, types, diagnostics, spans, usage_graph, expr_types, resolved_calls);
            }
            Declaration::Function(f) => {
                if let Some(body) = &f.body {
                    let return_type = f
                        .return_type
                        .as_ref()
                        .map(|t| resolve_type_ref(t, symbols, types))
                        .unwrap_or_else(|| types.predefined().void);
                    let mut ctx = BodyContext {
                        symbols,
                        types,
                        diagnostics,
                        spans,
                        current_class: None,
                        return_type,
                        usage_graph,
                        expr_types,
                        resolved_calls,
                    };
                    ctx.symbols.push_scope();
                    for param in &f.params {
                        let ty = resolve_type_ref(&param.declared_type, ctx.symbols, ctx.types);
                        ctx.symbols.declare_variable(&param.name, ty, ValueCategory::LValue);
                    }
                    check_block(body, &mut ctx);
                    ctx.symbols.pop_scope();
                }
            }
            Declaration::Type(type_decl) => {
                for member in &type_decl.members {
                    resolve_member(&type_decl.name, member, symbols, types, diagnostics, spans, usage_graph, expr_types, resolved_calls);
                }
            }
            _ => {}
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve_member(
    class_name: &str,
    member: &Declaration,
    symbols: &mut SymbolTable,
    types: &TypeSystem,
    diagnostics: &mut DiagnosticEngine,
    spans: &SpanMap,
    usage_graph: &mut Vec<UsageEdge>,
    expr_types: &mut HashMap<NodeId, (TypeId, ValueCategory)>,
    resolved_calls: &mut HashMap<NodeId, String>,
) {
    let this_type = symbols.find_class(class_name).map(|c| types.get_named(c.symbol_id));

    let (params, body, return_type): (Vec<&glint_ast::ParameterDecl>, Option<&Block>, TypeId) = match member {
        Declaration::Function(f) => {
            let ret = f
                .return_type
                .as_ref()
                .map(|t| resolve_type_ref(t, symbols, types))
                .unwrap_or_else(|| types.predefined().void);
            (f.params.iter().collect(), f.body.as_ref(), ret)
        }
        Declaration::Constructor(c) => (c.params.iter().collect(), Some(&c.body), types.predefined().void),
        Declaration::Destructor(d) => (Vec::new(), Some(&d.body), types.predefined().void),
        Declaration::PropertyAccessor(p) => (Vec::new(), p.body.as_ref(), types.predefined().void),
        _ => return,
    };

    let Some(body) = body else { return };

    let mut ctx = BodyContext {
        symbols,
        types,
        diagnostics,
        spans,
        current_class: Some(class_name.to_string()),
        return_type,
        usage_graph,
        expr_types,
        resolved_calls,
    };
    ctx.symbols.push_scope();
    if let Some(this_ty) = this_type {
        ctx.symbols.declare_variable("this", this_ty, ValueCategory::RValue);
    }
    for param in params {
        let ty = resolve_type_ref(&param.declared_type, ctx.symbols, ctx.types);
        ctx.symbols.declare_variable(&param.name, ty, ValueCategory::LValue);
    }
    check_block(body, &mut ctx);
    ctx.symbols.pop_scope();
}

fn is_convertible(conv: Conversion) -> bool {
    !matches!(conv, Conversion::NoConversion)
}

fn unify_bool(ctx: &mut BodyContext, ty: TypeId, span: Span) {
    let bool_ty = ctx.types.predefined().bool;
    if ctx.types.classify_conversion(ty, bool_ty) == Conversion::NoConversion {
        let found = ctx.type_name(ty);
        ctx.diagnostics.type_mismatch("bool", &found, span);
    }
}

fn check_block(block: &Block, ctx: &mut BodyContext) {
    ctx.symbols.push_scope();
    for stmt in &block.statements {
        check_statement(stmt, ctx);
    }
    ctx.symbols.pop_scope();
}

fn check_statement(stmt: &Statement, ctx: &mut BodyContext) {
    match stmt {
        Statement::Local(var) => {
            let declared = var.declared_type.as_ref().map(|t| resolve_type_ref(t, ctx.symbols, ctx.types));
            let init_ty = var.initializer.as_ref().map(|init| check_expression(init, ctx).0);
            let final_ty = match (declared, init_ty) {
                (Some(d), Some(i)) => {
                    let conv = ctx.types.classify_conversion(i, d);
                    if !is_convertible(conv) {
                        let (expected, found) = (ctx.type_name(d), ctx.type_name(i));
                        ctx.diagnostics.type_mismatch(&expected, &found, ctx.span(var.id));
                    }
                    d
                }
                (Some(d), None) => d,
                (None, Some(i)) => {
                    let inferred = ctx.type_name(i);
                    ctx.diagnostics.type_inferred(&var.name, &inferred, ctx.span(var.id));
                    i
                }
                (None, None) => ctx.types.get_unresolved(),
            };
            ctx.symbols.declare_variable(&var.name, final_ty, ValueCategory::LValue);
            ctx.record(var.id, final_ty, ValueCategory::LValue);
        }
        Statement::Expression { expr, .. } => {
            check_expression(expr, ctx);
        }
        Statement::If { condition, then_block, else_block, .. } => {
            let (ty, _) = check_expression(condition, ctx);
            let span = ctx.span(condition.id());
            unify_bool(ctx, ty, span);
            check_block(then_block, ctx);
            if let Some(else_block) = else_block {
                check_block(else_block, ctx);
            }
        }
        Statement::While { condition, body, .. } => {
            let (ty, _) = check_expression(condition, ctx);
            let span = ctx.span(condition.id());
            unify_bool(ctx, ty, span);
            check_block(body, ctx);
        }
        Statement::For { init, condition, post, body, .. } => {
            ctx.symbols.push_scope();
            if let Some(init) = init {
                check_statement(init, ctx);
            }
            if let Some(condition) = condition {
                let (ty, _) = check_expression(condition, ctx);
                let span = ctx.span(condition.id());
                unify_bool(ctx, ty, span);
            }
            if let Some(post) = post {
                check_statement(post, ctx);
            }
            for stmt in &body.statements {
                check_statement(stmt, ctx);
            }
            ctx.symbols.pop_scope();
        }
        Statement::Return { value, id } => {
            let void_ty = ctx.types.predefined().void;
            match value {
                Some(expr) => {
                    let (ty, _) = check_expression(expr, ctx);
                    let conv = ctx.types.classify_conversion(ty, ctx.return_type);
                    if !is_convertible(conv) {
                        let (expected, found) = (ctx.type_name(ctx.return_type), ctx.type_name(ty));
                        ctx.diagnostics.type_mismatch(&expected, &found, ctx.span(*id));
                    }
                }
                None => {
                    if ctx.return_type != void_ty {
                        let expected = ctx.type_name(ctx.return_type);
                        ctx.diagnostics.type_mismatch(&expected, "void", ctx.span(*id));
                    }
                }
            }
        }
        Statement::Break { .. } | Statement::Continue { .. } => {}
        Statement::Block(block) => check_block(block, ctx),
    }
}

fn numeric_binary_result(ctx: &BodyContext, lhs: TypeId, rhs: TypeId) -> Option<TypeId> {
    if lhs == rhs {
        return Some(lhs);
    }
    match ctx.types.classify_conversion(lhs, rhs) {
        Conversion::ImplicitNumeric => Some(rhs),
        _ => match ctx.types.classify_conversion(rhs, lhs) {
            Conversion::ImplicitNumeric => Some(lhs),
            _ => None,
        },
    }
}

fn check_expression(expr: &Expression, ctx: &mut BodyContext) -> (TypeId, ValueCategory) {
    let result = match expr {
        Expression::Literal { value, .. } => {
            let ty = match value {
                Literal::Integer(_) => ctx.types.predefined().i32,
                Literal::Float(_) => ctx.types.predefined().f64,
                Literal::Bool(_) => ctx.types.predefined().bool,
                Literal::Char(_) => ctx.types.predefined().char,
                Literal::Str(_) => match ctx.symbols.find_class("string") {
                    Some(c) => ctx.types.get_named(c.symbol_id),
                    None => ctx.types.get_unresolved(),
                },
                Literal::Null => ctx.types.get_pointer(ctx.types.predefined().void),
            };
            (ty, ValueCategory::RValue)
        }
        Expression::Name { path, id } => {
            let joined = path.join(".");
            if let Some((ty, cat)) = ctx.symbols.find_variable(&joined) {
                (ty, cat)
            } else if path.len() == 1 {
                let name = &path[0];
                let field = ctx.current_class.as_ref().and_then(|cn| {
                    ctx.symbols.find_class(cn).and_then(|c| c.field_index(name)).map(|_| cn.clone())
                });
                if let Some(class_name) = field {
                    let field_ty = ctx
                        .symbols
                        .find_class(&class_name)
                        .and_then(|c| c.field_names.iter().find(|f| &f.name == name).cloned());
                    match field_ty {
                        Some(f) => {
                            let ty = resolve_type_ref(&f.ast_type, ctx.symbols, ctx.types);
                            (ty, ValueCategory::LValue)
                        }
                        None => (ctx.types.get_unresolved(), ValueCategory::RValue),
                    }
                } else {
                    ctx.diagnostics.undefined_variable(name, ctx.span(*id), Vec::new());
                    (ctx.types.get_unresolved(), ValueCategory::RValue)
                }
            } else {
                (ctx.types.get_unresolved(), ValueCategory::RValue)
            }
        }
        Expression::This { .. } => {
            let ty = ctx
                .current_class
                .as_ref()
                .and_then(|cn| ctx.symbols.find_class(cn))
                .map(|c| ctx.types.get_named(c.symbol_id))
                .unwrap_or_else(|| ctx.types.get_unresolved());
            (ty, ValueCategory::RValue)
        }
        Expression::Binary { left, right, op, id } => {
            let (lt, _) = check_expression(left, ctx);
            let (rt, _) = check_expression(right, ctx);
            use glint_ast::BinaryOp::*;
            let ty = match op {
                Eq | NotEq | Lt | LtEq | Gt | GtEq | And | Or => ctx.types.predefined().bool,
                _ => match numeric_binary_result(ctx, lt, rt) {
                    Some(t) => t,
                    None => {
                        let (a, b) = (ctx.type_name(lt), ctx.type_name(rt));
                        ctx.diagnostics.type_mismatch(&a, &b, ctx.span(*id));
                        lt
                    }
                },
            };
            (ty, ValueCategory::RValue)
        }
        Expression::Unary { operand, .. } => {
            let (ty, _) = check_expression(operand, ctx);
            (ty, ValueCategory::RValue)
        }
        Expression::PostfixOp { operand, id, .. } => {
            let (ty, cat) = check_expression(operand, ctx);
            if cat != ValueCategory::LValue {
                let found = ctx.type_name(ty);
                ctx.diagnostics.type_mismatch("lvalue", &found, ctx.span(*id));
            }
            (ty, ValueCategory::RValue)
        }
        Expression::Conditional { condition, then_branch, else_branch, .. } => {
            let (cond_ty, _) = check_expression(condition, ctx);
            let span = ctx.span(condition.id());
            unify_bool(ctx, cond_ty, span);
            let (then_ty, _) = check_expression(then_branch, ctx);
            let (else_ty, _) = check_expression(else_branch, ctx);
            if then_ty != else_ty && ctx.types.classify_conversion(else_ty, then_ty) == Conversion::NoConversion {
                let (a, b) = (ctx.type_name(then_ty), ctx.type_name(else_ty));
                ctx.diagnostics.type_mismatch(&a, &b, ctx.span(else_branch.id()));
            }
            (then_ty, ValueCategory::RValue)
        }
        Expression::Assignment { target, value, id } => {
            let (target_ty, target_cat) = check_expression(target, ctx);
            let (value_ty, _) = check_expression(value, ctx);
            if target_cat != ValueCategory::LValue {
                let found = ctx.type_name(target_ty);
                ctx.diagnostics.type_mismatch("lvalue", &found, ctx.span(*id));
            }
            let conv = ctx.types.classify_conversion(value_ty, target_ty);
            if !is_convertible(conv) {
                let (expected, found) = (ctx.type_name(target_ty), ctx.type_name(value_ty));
                ctx.diagnostics.type_mismatch(&expected, &found, ctx.span(*id));
            }
            (target_ty, ValueCategory::RValue)
        }
        Expression::Call { callee, args, id } => check_call(callee, args, *id, ctx),
        Expression::MemberAccess { object, member, id } => {
            let (obj_ty, _) = check_expression(object, ctx);
            let class_name = symbol_id_to_class_name(ctx, obj_ty);
            match class_name.and_then(|cn| {
                ctx.symbols
                    .find_class(&cn)
                    .and_then(|c| c.field_names.iter().find(|f| &f.name == member).cloned())
            }) {
                Some(field) => {
                    let ty = resolve_type_ref(&field.ast_type, ctx.symbols, ctx.types);
                    (ty, ValueCategory::LValue)
                }
                None => {
                    ctx.diagnostics.emit_error(
                        error_codes::NO_SUCH_FIELD,
                        format!("no field `{}` on this type", member),
                        ctx.span(*id),
                    );
                    (ctx.types.get_unresolved(), ValueCategory::RValue)
                }
            }
        }
        Expression::Indexer { object, index, id } => {
            let (obj_ty, _) = check_expression(object, ctx);
            let (index_ty, _) = check_expression(index, ctx);
            let i32_ty = ctx.types.predefined().i32;
            if ctx.types.classify_conversion(index_ty, i32_ty) == Conversion::NoConversion {
                let found = ctx.type_name(index_ty);
                ctx.diagnostics.type_mismatch("i32", &found, ctx.span(*id));
            }
            let elem = match ctx.types.get(obj_ty) {
                glint_ast::Type::Array(elem, _) => elem,
                glint_ast::Type::Pointer(elem) => elem,
                _ => ctx.types.get_unresolved(),
            };
            (elem, ValueCategory::LValue)
        }
        Expression::Cast { expr, target_type, id } => {
            let (src_ty, _) = check_expression(expr, ctx);
            let target_ty = resolve_type_ref(target_type, ctx.symbols, ctx.types);
            if ctx.types.classify_conversion(src_ty, target_ty) == Conversion::NoConversion {
                ctx.diagnostics.emit_error(
                    error_codes::INVALID_CAST,
                    format!("cannot cast `{}` to `{}`", ctx.type_name(src_ty), ctx.type_name(target_ty)),
                    ctx.span(*id),
                );
            }
            (target_ty, ValueCategory::RValue)
        }
        Expression::New { type_name, args, id } => check_new(type_name, args, *id, ctx),
        Expression::Lambda { params, return_type, body, .. } => {
            ctx.symbols.push_scope();
            let param_types: Vec<TypeId> = params
                .iter()
                .map(|p| {
                    let ty = resolve_type_ref(&p.declared_type, ctx.symbols, ctx.types);
                    ctx.symbols.declare_variable(&p.name, ty, ValueCategory::LValue);
                    ty
                })
                .collect();
            let (body_ty, _) = check_expression(body, ctx);
            let ret_ty = return_type.as_ref().map(|t| resolve_type_ref(t, ctx.symbols, ctx.types)).unwrap_or(body_ty);
            ctx.symbols.pop_scope();
            (ctx.types.get_function(ret_ty, param_types, false), ValueCategory::RValue)
        }
        Expression::Range { start, end, .. } => {
            if let Some(start) = start {
                check_expression(start, ctx);
            }
            if let Some(end) = end {
                check_expression(end, ctx);
            }
            (ctx.types.predefined().i32, ValueCategory::RValue)
        }
        Expression::Typeof { expr, .. } => {
            check_expression(expr, ctx);
            (ctx.types.predefined().i32, ValueCategory::RValue)
        }
        Expression::Sizeof { target_type, .. } => {
            resolve_type_ref(target_type, ctx.symbols, ctx.types);
            (ctx.types.predefined().i32, ValueCategory::RValue)
        }
        Expression::Match { scrutinee, arms, .. } => {
            check_expression(scrutinee, ctx);
            let mut result = None;
            for arm in arms {
                if let Some(guard) = &arm.guard {
                    let (gty, _) = check_expression(guard, ctx);
                    let span = ctx.span(guard.id());
                    unify_bool(ctx, gty, span);
                }
                let (body_ty, _) = check_expression(&arm.body, ctx);
                result.get_or_insert(body_ty);
            }
            (result.unwrap_or_else(|| ctx.types.predefined().void), ValueCategory::RValue)
        }
        Expression::If { condition, then_branch, else_branch, .. } => {
            let (cond_ty, _) = check_expression(condition, ctx);
            let span = ctx.span(condition.id());
            unify_bool(ctx, cond_ty, span);
            let (then_ty, _) = check_expression(then_branch, ctx);
            if let Some(else_branch) = else_branch {
                check_expression(else_branch, ctx);
            }
            (then_ty, ValueCategory::RValue)
        }
        Expression::Block { statements, tail, .. } => {
            ctx.symbols.push_scope();
            for stmt in statements {
                check_statement(stmt, ctx);
            }
            let ty = match tail {
                Some(tail) => check_expression(tail, ctx).0,
                None => ctx.types.predefined().void,
            };
            ctx.symbols.pop_scope();
            (ty, ValueCategory::RValue)
        }
        Expression::Error { .. } => (ctx.types.get_unresolved(), ValueCategory::RValue),
    };
    ctx.record(expr.id(), result.0, result.1);
    result
}

fn symbol_id_to_class_name(ctx: &BodyContext, ty: TypeId) -> Option<String> {
    match ctx.types.get(ty) {
        glint_ast::Type::Named(symbol_id) => ctx.symbols.find_class_by_symbol_id(symbol_id).map(|c| c.qualified_name.clone()),
        _ => None,
    }
}

fn overload_resolve<'s>(candidates: &[&'s MethodSymbol], arg_types: &[TypeId], types: &TypeSystem) -> Result<Option<&'s MethodSymbol>, ()> {
    let mut best: Option<(&MethodSymbol, i32)> = None;
    let mut tied = false;
    for cand in candidates {
        if cand.param_types.len() != arg_types.len() {
            continue;
        }
        let mut score = 0;
        let mut viable = true;
        for (param_ty, arg_ty) in cand.param_types.iter().zip(arg_types) {
            match types.classify_conversion(*arg_ty, *param_ty) {
                Conversion::Identity => score += 2,
                Conversion::ImplicitNumeric => score += 1,
                _ => {
                    viable = false;
                    break;
                }
            }
        }
        if !viable {
            continue;
        }
        match best {
            None => best = Some((cand, score)),
            Some((_, best_score)) if score > best_score => {
                best = Some((cand, score));
                tied = false;
            }
            Some((_, best_score)) if score == best_score => tied = true,
            _ => {}
        }
    }
    if tied {
        Err(())
    } else {
        Ok(best.map(|(m, _)| m))
    }
}

fn record_usage(ctx: &mut BodyContext, callee: &MethodSymbol, call_span: Span, call_line: usize) {
    ctx.usage_graph.push(UsageEdge {
        context_class: ctx.current_class.clone(),
        callee_qualified_name: callee.qualified_name.clone(),
        location: call_span,
        is_forward: callee.declared_line > call_line,
    });
}

fn check_call(callee: &Expression, args: &[Expression], id: NodeId, ctx: &mut BodyContext) -> (TypeId, ValueCategory) {
    let arg_types: Vec<TypeId> = args.iter().map(|a| check_expression(a, ctx).0).collect();
    let call_span = ctx.span(id);
    let call_line = call_span.line;

    let candidates_owned: Vec<MethodSymbol>;
    let (method_name, candidates): (String, Vec<&MethodSymbol>) = match callee {
        Expression::Name { path, .. } if path.len() == 1 => {
            let name = path[0].clone();
            let class_candidates = ctx
                .current_class
                .as_ref()
                .map(|cn| ctx.symbols.find_overloads_in_class(cn, &name))
                .unwrap_or_default();
            if !class_candidates.is_empty() {
                (name, class_candidates)
            } else {
                candidates_owned = ctx.symbols.find_overloads(&name).to_vec();
                (name, candidates_owned.iter().collect())
            }
        }
        Expression::MemberAccess { object, member, .. } => {
            let (obj_ty, _) = check_expression(object, ctx);
            let class_name = symbol_id_to_class_name(ctx, obj_ty);
            let found = class_name.as_ref().map(|cn| ctx.symbols.find_overloads_in_class(cn, member)).unwrap_or_default();
            (member.clone(), found)
        }
        _ => {
            check_expression(callee, ctx);
            (String::new(), Vec::new())
        }
    };

    if candidates.is_empty() {
        ctx.diagnostics.emit_error(
            error_codes::NO_SUCH_METHOD,
            format!("no method `{}` takes {} argument(s)", method_name, arg_types.len()),
            call_span,
        );
        return (ctx.types.get_unresolved(), ValueCategory::RValue);
    }

    match overload_resolve(&candidates, &arg_types, ctx.types) {
        Ok(Some(resolved)) => {
            let qualified = resolved.qualified_name.clone();
            let return_type = resolved.return_type;
            record_usage(ctx, resolved, call_span.clone(), call_line);
            ctx.resolved_calls.insert(id, qualified);
            (return_type, ValueCategory::RValue)
        }
        Ok(None) => {
            ctx.diagnostics.argument_count_mismatch(&method_name, candidates[0].param_types.len(), arg_types.len(), call_span);
            (ctx.types.get_unresolved(), ValueCategory::RValue)
        }
        Err(()) => {
            ctx.diagnostics.emit_error(
                error_codes::AMBIGUOUS_TYPE,
                format!("call to `{}` is ambiguous among {} overloads", method_name, candidates.len()),
                call_span,
            );
            (ctx.types.get_unresolved(), ValueCategory::RValue)
        }
    }
}

fn check_new(type_name: &str, args: &[Expression], id: NodeId, ctx: &mut BodyContext) -> (TypeId, ValueCategory) {
    let arg_types: Vec<TypeId> = args.iter().map(|a| check_expression(a, ctx).0).collect();
    let span = ctx.span(id);
    let class = ctx.symbols.find_class(type_name).cloned();
    let Some(class) = class else {
        ctx.diagnostics.undefined_variable(type_name, span, Vec::new());
        return (ctx.types.get_unresolved(), ValueCategory::RValue);
    };
    let result_ty = ctx.types.get_named(class.symbol_id);

    let ctor_overloads = ctx.symbols.find_overloads(&format!("{}.<ctor>", type_name)).to_vec();
    if ctor_overloads.is_empty() {
        if !args.is_empty() {
            ctx.diagnostics.argument_count_mismatch(type_name, 0, args.len(), span);
        }
        return (result_ty, ValueCategory::RValue);
    }
    let candidates: Vec<&MethodSymbol> = ctor_overloads.iter().collect();
    match overload_resolve(&candidates, &arg_types, ctx.types) {
        Ok(Some(resolved)) => {
            record_usage(ctx, resolved, span.clone(), span.line);
            ctx.resolved_calls.insert(id, resolved.qualified_name.clone());
        }
        Ok(None) => {
            ctx.diagnostics.argument_count_mismatch(type_name, candidates[0].param_types.len(), arg_types.len(), span);
        }
        Err(()) => {
            ctx.diagnostics.emit_error(
                error_codes::AMBIGUOUS_TYPE,
                format!("constructor call for `{}` is ambiguous among {} overloads", type_name, candidates.len()),
                span,
            );
        }
    }
    (result_ty, ValueCategory::RValue)
}
