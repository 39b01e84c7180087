//! Statement lowering (§4.6 Pass 2). Control-flow statements create
//! labeled basic blocks with a guaranteed terminator on every exit edge;
//! `return`/`break`/`continue` run scope cleanup up to their target
//! before issuing the branch (§4.6 "ARC insertion", §4.7).

use super::{Codegen, CodegenError, CodegenResult};
use glint_ast::Statement;

impl<'ctx, 'ir> Codegen<'ctx, 'ir> {
    pub(crate) fn codegen_statement(&mut self, stmt: &Statement) -> CodegenResult<()> {
        match stmt {
            Statement::Local(decl) => self.codegen_local(decl),
            Statement::Expression { expr, .. } => {
                self.codegen_expr(expr)?;
                Ok(())
            }
            Statement::If {
                condition,
                then_block,
                else_block,
                ..
            } => self.codegen_if_statement(condition, then_block, else_block.as_ref()),
            Statement::While { condition, body, .. } => self.codegen_while(condition, body),
            Statement::For { init, condition, post, body, .. } => self.codegen_for(init.as_deref(), condition.as_ref(), post.as_deref(), body),
            Statement::Return { value, .. } => self.codegen_return(value.as_ref()),
            Statement::Break { .. } => self.codegen_break(),
            Statement::Continue { .. } => self.codegen_continue(),
            Statement::Block(block) => {
                self.push_block_scope(crate::scope_manager::ScopeKind::Block, "block");
                for s in &block.statements {
                    self.codegen_statement(s)?;
                }
                if self.builder.get_insert_block().map(|b| b.get_terminator().is_none()).unwrap_or(false) {
                    self.pop_block_scope()
                } else {
                    self.scope.pop_without_emitting();
                    self.locals.pop();
                    Ok(())
                }
            }
        }
    }

    fn codegen_local(&mut self, decl: &glint_ast::VariableDecl) -> CodegenResult<()> {
        let ty = self
            .ir
            .expr_type(decl.id)
            .or_else(|| decl.initializer.as_ref().and_then(|init| self.ir.expr_type(init.id())))
            .ok_or_else(|| CodegenError::internal("codegen_local", format!("local `{}` has no resolved type", decl.name)))?;
        let llvm_ty = self.llvm_type_of(ty)?;
        let slot = self
            .builder
            .build_alloca(llvm_ty, &decl.name)
            .map_err(|e| CodegenError::builder("codegen_local/alloca", e))?;

        if let Some(init) = &decl.initializer {
            let is_new_expr = matches!(init, glint_ast::Expression::New { .. });
            let value = self.codegen_expr_value(init)?;
            self.builder.build_store(slot, value).map_err(|e| CodegenError::builder("codegen_local/store", e))?;
            if self.is_class_typed(ty) && !self.is_string_type(ty) {
                if !is_new_expr {
                    self.emit_retain(value.into_pointer_value())?;
                }
                self.scope.register_arc_managed_object(slot, self.class_name_of(ty).unwrap_or_default(), decl.name.clone());
            }
        } else {
            let zero = llvm_ty.const_zero();
            self.builder.build_store(slot, zero).map_err(|e| CodegenError::builder("codegen_local/zero_store", e))?;
        }

        self.declare_local(&decl.name, slot, ty);
        Ok(())
    }

    fn codegen_if_statement(&mut self, condition: &glint_ast::Expression, then_block: &glint_ast::Block, else_block: Option<&glint_ast::Block>) -> CodegenResult<()> {
        let function = self.current_function()?;
        let cond = self.codegen_expr_value(condition)?.into_int_value();
        let then_bb = self.context.append_basic_block(function, "then");
        let else_bb = self.context.append_basic_block(function, "else");
        self.builder
            .build_conditional_branch(cond, then_bb, else_bb)
            .map_err(|e| CodegenError::builder("codegen_if_statement/branch", e))?;

        self.builder.position_at_end(then_bb);
        self.push_block_scope(crate::scope_manager::ScopeKind::Block, "if_then");
        for s in &then_block.statements {
            self.codegen_statement(s)?;
        }
        let then_terminated = self.builder.get_insert_block().map(|b| b.get_terminator().is_some()).unwrap_or(true);
        if !then_terminated {
            self.pop_block_scope()?;
        } else {
            self.scope.pop_without_emitting();
            self.locals.pop();
        }

        self.builder.position_at_end(else_bb);
        self.push_block_scope(crate::scope_manager::ScopeKind::Block, "if_else");
        if let Some(b) = else_block {
            for s in &b.statements {
                self.codegen_statement(s)?;
            }
        }
        let else_terminated = self.builder.get_insert_block().map(|b| b.get_terminator().is_some()).unwrap_or(true);
        if !else_terminated {
            self.pop_block_scope()?;
        } else {
            self.scope.pop_without_emitting();
            self.locals.pop();
        }

        // Guaranteed-terminator rule (§4.6): when both branches already
        // terminate (e.g. each ends in `return`), no merge block is
        // created at all.
        if then_terminated && else_terminated {
            return Ok(());
        }
        let merge_bb = self.context.append_basic_block(function, "if_merge");
        if !then_terminated {
            let saved = self.builder.get_insert_block();
            self.builder.position_at_end(then_bb);
            self.builder.build_unconditional_branch(merge_bb).map_err(|e| CodegenError::builder("if/then_to_merge", e))?;
            if let Some(b) = saved {
                self.builder.position_at_end(b);
            }
        }
        if !else_terminated {
            let saved = self.builder.get_insert_block();
            self.builder.position_at_end(else_bb);
            self.builder.build_unconditional_branch(merge_bb).map_err(|e| CodegenError::builder("if/else_to_merge", e))?;
            if let Some(b) = saved {
                self.builder.position_at_end(b);
            }
        }
        self.builder.position_at_end(merge_bb);
        Ok(())
    }

    fn codegen_while(&mut self, condition: &glint_ast::Expression, body: &glint_ast::Block) -> CodegenResult<()> {
        let function = self.current_function()?;
        let cond_bb = self.context.append_basic_block(function, "while_cond");
        let body_bb = self.context.append_basic_block(function, "while_body");
        let exit_bb = self.context.append_basic_block(function, "while_exit");

        self.builder.build_unconditional_branch(cond_bb).map_err(|e| CodegenError::builder("while/to_cond", e))?;
        self.builder.position_at_end(cond_bb);
        let cond = self.codegen_expr_value(condition)?.into_int_value();
        self.builder
            .build_conditional_branch(cond, body_bb, exit_bb)
            .map_err(|e| CodegenError::builder("while/branch", e))?;

        self.builder.position_at_end(body_bb);
        self.push_block_scope(crate::scope_manager::ScopeKind::Loop, "while");
        self.loop_stack.push((exit_bb, cond_bb));
        for s in &body.statements {
            self.codegen_statement(s)?;
        }
        self.loop_stack.pop();
        if self.builder.get_insert_block().map(|b| b.get_terminator().is_none()).unwrap_or(false) {
            self.pop_block_scope()?;
            self.builder.build_unconditional_branch(cond_bb).map_err(|e| CodegenError::builder("while/loop_back", e))?;
        } else {
            self.scope.pop_without_emitting();
            self.locals.pop();
        }

        self.builder.position_at_end(exit_bb);
        Ok(())
    }

    fn codegen_for(
        &mut self,
        init: Option<&Statement>,
        condition: Option<&glint_ast::Expression>,
        post: Option<&Statement>,
        body: &glint_ast::Block,
    ) -> CodegenResult<()> {
        let function = self.current_function()?;
        self.push_block_scope(crate::scope_manager::ScopeKind::Block, "for_init");
        if let Some(s) = init {
            self.codegen_statement(s)?;
        }

        let cond_bb = self.context.append_basic_block(function, "for_cond");
        let body_bb = self.context.append_basic_block(function, "for_body");
        let post_bb = self.context.append_basic_block(function, "for_post");
        let exit_bb = self.context.append_basic_block(function, "for_exit");

        self.builder.build_unconditional_branch(cond_bb).map_err(|e| CodegenError::builder("for/to_cond", e))?;
        self.builder.position_at_end(cond_bb);
        match condition {
            Some(c) => {
                let cond = self.codegen_expr_value(c)?.into_int_value();
                self.builder
                    .build_conditional_branch(cond, body_bb, exit_bb)
                    .map_err(|e| CodegenError::builder("for/branch", e))?;
            }
            None => {
                self.builder.build_unconditional_branch(body_bb).map_err(|e| CodegenError::builder("for/to_body", e))?;
            }
        }

        self.builder.position_at_end(body_bb);
        self.push_block_scope(crate::scope_manager::ScopeKind::Loop, "for");
        self.loop_stack.push((exit_bb, post_bb));
        for s in &body.statements {
            self.codegen_statement(s)?;
        }
        self.loop_stack.pop();
        if self.builder.get_insert_block().map(|b| b.get_terminator().is_none()).unwrap_or(false) {
            self.pop_block_scope()?;
            self.builder.build_unconditional_branch(post_bb).map_err(|e| CodegenError::builder("for/to_post", e))?;
        } else {
            self.scope.pop_without_emitting();
            self.locals.pop();
        }

        self.builder.position_at_end(post_bb);
        if let Some(s) = post {
            self.codegen_statement(s)?;
        }
        self.builder.build_unconditional_branch(cond_bb).map_err(|e| CodegenError::builder("for/loop_back", e))?;

        self.builder.position_at_end(exit_bb);
        self.pop_block_scope()
    }

    fn codegen_return(&mut self, value: Option<&glint_ast::Expression>) -> CodegenResult<()> {
        let ptr_ty = self.context.ptr_type(inkwell::AddressSpace::default());
        match value {
            Some(expr) => {
                let ret_value = self.codegen_expr_value(expr)?;
                // §4.6 "return expression carrying an ARC object": the
                // value flows out, so the local it came from (if any)
                // must not also release it at scope exit.
                if let glint_ast::Expression::Name { path, .. } = expr {
                    if let Some((slot, _)) = self.find_local(&path.join(".")) {
                        self.scope.disown(slot);
                    }
                }
                for idx in self.scope.scopes_to_function_boundary().collect::<Vec<_>>() {
                    self.scope
                        .cleanup_scope_at(idx, &self.builder, ptr_ty, self.runtime.object_release)
                        .map_err(|e| CodegenError::internal("codegen_return", e))?;
                }
                self.builder.build_return(Some(&ret_value)).map_err(|e| CodegenError::builder("codegen_return", e))?;
            }
            None => {
                for idx in self.scope.scopes_to_function_boundary().collect::<Vec<_>>() {
                    self.scope
                        .cleanup_scope_at(idx, &self.builder, ptr_ty, self.runtime.object_release)
                        .map_err(|e| CodegenError::internal("codegen_return", e))?;
                }
                self.builder.build_return(None).map_err(|e| CodegenError::builder("codegen_return", e))?;
            }
        }
        Ok(())
    }

    fn codegen_break(&mut self) -> CodegenResult<()> {
        let (exit_bb, _) = *self.loop_stack.last().ok_or_else(|| CodegenError::internal("codegen_break", "`break` outside a loop"))?;
        self.cleanup_to_innermost_loop()?;
        self.builder.build_unconditional_branch(exit_bb).map_err(|e| CodegenError::builder("codegen_break", e))?;
        Ok(())
    }

    fn codegen_continue(&mut self) -> CodegenResult<()> {
        let (_, continue_bb) = *self.loop_stack.last().ok_or_else(|| CodegenError::internal("codegen_continue", "`continue` outside a loop"))?;
        self.cleanup_to_innermost_loop()?;
        self.builder.build_unconditional_branch(continue_bb).map_err(|e| CodegenError::builder("codegen_continue", e))?;
        Ok(())
    }

    /// Release every scope from here up to and including the innermost
    /// `Loop` scope, without popping — mirrors `scopes_to_function_boundary`
    /// but stops at the nearest loop rather than the function (§4.7).
    fn cleanup_to_innermost_loop(&mut self) -> CodegenResult<()> {
        let ptr_ty = self.context.ptr_type(inkwell::AddressSpace::default());
        for idx in self.scope.scopes_to_function_boundary().collect::<Vec<_>>() {
            self.scope
                .cleanup_scope_at(idx, &self.builder, ptr_ty, self.runtime.object_release)
                .map_err(|e| CodegenError::internal("cleanup_to_innermost_loop", e))?;
            if self.scope.kind_at(idx) == Some(crate::scope_manager::ScopeKind::Loop) {
                break;
            }
        }
        Ok(())
    }
}
