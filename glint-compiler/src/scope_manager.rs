//! ARC scope tracking for the code generator (C7, §4.7).
//!
//! Mirrors `codegen_ast::scope_management`'s scope-stack shape — a stack
//! pushed per function/block/loop, with `pop_scope` walking its
//! registrations in reverse to emit cleanup — generalized from the
//! teacher's named-type (`Vec`/`Box`/`String`/`Map`) destructor dispatch
//! to ARC release calls on any class-typed local.

use inkwell::builder::Builder;
use inkwell::types::PointerType;
use inkwell::values::{FunctionValue, PointerValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Function,
    Block,
    Loop,
}

/// One ARC-managed local: the stack slot holding its header pointer, the
/// class it was constructed or assigned as, and its source name (used
/// only to name the generated `load`/`call` instructions).
pub struct ArcRegistration<'ctx> {
    pub slot_alloca: PointerValue<'ctx>,
    pub class_name: String,
    pub variable_name: String,
    owned: bool,
}

struct Scope<'ctx> {
    kind: ScopeKind,
    name: String,
    arc_registrations: Vec<ArcRegistration<'ctx>>,
}

/// A stack of `{ ScopeKind, name, arc_registrations }` frames (§4.7).
/// Owned by the code generator; one instance per compilation unit.
pub struct ScopeManager<'ctx> {
    scopes: Vec<Scope<'ctx>>,
}

impl<'ctx> Default for ScopeManager<'ctx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'ctx> ScopeManager<'ctx> {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    pub fn push_scope(&mut self, kind: ScopeKind, name: impl Into<String>) {
        self.scopes.push(Scope {
            kind,
            name: name.into(),
            arc_registrations: Vec::new(),
        });
    }

    pub fn current_kind(&self) -> Option<ScopeKind> {
        self.scopes.last().map(|s| s.kind)
    }

    /// The kind of the scope at `index`, as used by `break`/`continue`
    /// cleanup to know when it has walked back up to the enclosing loop.
    pub fn kind_at(&self, index: usize) -> Option<ScopeKind> {
        self.scopes.get(index).map(|s| s.kind)
    }

    /// Finds the innermost `Loop` scope's name, for `break`/`continue`
    /// target resolution.
    pub fn innermost_loop_name(&self) -> Option<&str> {
        self.scopes.iter().rev().find(|s| s.kind == ScopeKind::Loop).map(|s| s.name.as_str())
    }

    pub fn register_arc_managed_object(&mut self, slot_alloca: PointerValue<'ctx>, class_name: String, variable_name: String) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.arc_registrations.push(ArcRegistration {
                slot_alloca,
                class_name,
                variable_name,
                owned: true,
            });
        }
    }

    /// Marks a registration as moved out (its value flowed out via
    /// `return`) so scope exit no longer releases it.
    pub fn disown(&mut self, slot_alloca: PointerValue<'ctx>) {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(reg) = scope.arc_registrations.iter_mut().find(|r| r.slot_alloca == slot_alloca) {
                reg.owned = false;
                return;
            }
        }
    }

    /// Emits `Object_release` for every still-owned registration in the
    /// current scope, innermost-registered first, without popping it —
    /// so a subsequent terminator (`ret`/`br`) can still be issued after
    /// an early-exit statement (`return`, `break`, `continue`).
    pub fn cleanup_current_scope_early(
        &self,
        builder: &Builder<'ctx>,
        ptr_type: PointerType<'ctx>,
        object_release: FunctionValue<'ctx>,
    ) -> Result<(), String> {
        if self.scopes.is_empty() {
            return Ok(());
        }
        self.cleanup_scope_at(self.scopes.len() - 1, builder, ptr_type, object_release)
    }

    /// Pops the current scope without emitting any cleanup calls. Used
    /// when the block that owned it already ended in a terminator
    /// (`return`/`break`/`continue` already ran `cleanup_current_scope_early`
    /// itself) — emitting a call after a terminator would be invalid IR,
    /// but the scope still has to come off the bookkeeping stack so
    /// sibling blocks don't inherit its registrations.
    pub fn pop_without_emitting(&mut self) {
        self.scopes.pop();
    }

    /// Emits cleanup for the current scope then pops it. Every normal
    /// (non-early-exit) scope exit goes through this path.
    pub fn pop_scope(
        &mut self,
        builder: &Builder<'ctx>,
        ptr_type: PointerType<'ctx>,
        object_release: FunctionValue<'ctx>,
    ) -> Result<(), String> {
        self.cleanup_current_scope_early(builder, ptr_type, object_release)?;
        self.scopes.pop();
        Ok(())
    }

    /// A `return` nested inside blocks/loops must release every scope
    /// between the statement and the function boundary, not just the
    /// innermost one — the caller emits one `cleanup_current_scope_early`
    /// call per frame in this slice, innermost first, then issues the
    /// terminator. Scopes are not popped: the normal unwind back up the
    /// statement visitor still runs `pop_scope` for each of them.
    pub fn scopes_to_function_boundary(&self) -> impl Iterator<Item = usize> {
        let function_index = self
            .scopes
            .iter()
            .rposition(|s| s.kind == ScopeKind::Function)
            .unwrap_or(0);
        (function_index..self.scopes.len()).rev()
    }

    pub fn cleanup_scope_at(
        &self,
        index: usize,
        builder: &Builder<'ctx>,
        ptr_type: PointerType<'ctx>,
        object_release: FunctionValue<'ctx>,
    ) -> Result<(), String> {
        let Some(scope) = self.scopes.get(index) else { return Ok(()) };
        for reg in scope.arc_registrations.iter().rev() {
            if !reg.owned {
                continue;
            }
            let header = builder
                .build_load(ptr_type, reg.slot_alloca, &format!("{}_cleanup_load", reg.variable_name))
                .map_err(|e| format!("failed to load `{}` for ARC cleanup: {e}", reg.variable_name))?;
            builder
                .build_call(object_release, &[header.into()], &format!("{}_release", reg.variable_name))
                .map_err(|e| format!("failed to call Object_release for `{}`: {e}", reg.variable_name))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_tracks_depth() {
        let mut mgr: ScopeManager = ScopeManager::new();
        mgr.push_scope(ScopeKind::Function, "Main");
        mgr.push_scope(ScopeKind::Block, "then");
        assert_eq!(mgr.current_kind(), Some(ScopeKind::Block));
        mgr.scopes.pop();
        assert_eq!(mgr.current_kind(), Some(ScopeKind::Function));
    }

    #[test]
    fn innermost_loop_name_skips_intervening_blocks() {
        let mut mgr: ScopeManager = ScopeManager::new();
        mgr.push_scope(ScopeKind::Function, "Main");
        mgr.push_scope(ScopeKind::Loop, "for_0");
        mgr.push_scope(ScopeKind::Block, "body");
        assert_eq!(mgr.innermost_loop_name(), Some("for_0"));
    }

    #[test]
    fn function_boundary_stops_at_nearest_function_scope() {
        let mut mgr: ScopeManager = ScopeManager::new();
        mgr.push_scope(ScopeKind::Function, "Main");
        mgr.push_scope(ScopeKind::Loop, "for_0");
        mgr.push_scope(ScopeKind::Block, "body");
        let indices: Vec<usize> = mgr.scopes_to_function_boundary().collect();
        assert_eq!(indices, vec![2, 1, 0]);
    }
}
