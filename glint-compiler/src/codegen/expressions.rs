//! Expression lowering (§4.6 Pass 2). Every expression's resolved type
//! and value category already live in `SemanticIR::expr_types` (Phase B,
//! §4.5) — codegen trusts that IR rather than re-deriving types, and
//! only has to decide how to *produce* a value of the type already
//! recorded for each node.

use super::{Codegen, CodegenError, CodegenResult};
use glint_ast::{BinaryOp, Expression, Literal, PrimitiveKind, Type, UnaryOp};
use inkwell::values::BasicValueEnum;
use inkwell::{FloatPredicate, IntPredicate};

impl<'ctx, 'ir> Codegen<'ctx, 'ir> {
    fn expr_type_of(&self, expr: &Expression) -> CodegenResult<glint_ast::TypeId> {
        self.ir
            .expr_type(expr.id())
            .ok_or_else(|| CodegenError::internal("expr_type_of", format!("node {:?} has no resolved type", expr.id())))
    }

    /// Lower an expression used in value position. `None` only for a
    /// void-typed call used purely for its side effect.
    pub(crate) fn codegen_expr(&mut self, expr: &Expression) -> CodegenResult<Option<BasicValueEnum<'ctx>>> {
        match expr {
            Expression::Literal { value, .. } => self.codegen_literal(value, expr).map(Some),
            Expression::Name { path, .. } => self.codegen_name(path, expr),
            Expression::This { .. } => self.codegen_this(),
            Expression::Binary { left, op, right, .. } => self.codegen_binary(left, *op, right, expr).map(Some),
            Expression::Unary { op, operand, .. } => self.codegen_unary(*op, operand).map(Some),
            Expression::PostfixOp { op, operand, .. } => self.codegen_postfix(*op, operand).map(Some),
            Expression::Conditional {
                condition,
                then_branch,
                else_branch,
                ..
            } => self.codegen_conditional(condition, then_branch, else_branch, expr),
            Expression::Assignment { target, value, .. } => self.codegen_assignment(target, value).map(Some),
            Expression::Call { callee, args, .. } => self.codegen_call(callee, args, expr),
            Expression::MemberAccess { object, member, .. } => self.codegen_member_access(object, member, expr).map(Some),
            Expression::Indexer { object, index, .. } => self.codegen_indexer(object, index, expr).map(Some),
            Expression::Cast { expr: inner, target_type, .. } => self.codegen_cast(inner, target_type, expr).map(Some),
            Expression::New { type_name, args, .. } => self.codegen_new_expr(type_name, args).map(|p| Some(p.into())),
            Expression::Sizeof { target_type, .. } => self.codegen_sizeof(target_type).map(Some),
            Expression::Block { statements, tail, .. } => self.codegen_block_expr(statements, tail),
            Expression::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => self.codegen_if_expr(condition, then_branch, else_branch.as_deref(), expr),
            Expression::Typeof { expr: inner, .. } => self.codegen_typeof(inner),
            Expression::Error { .. } => Err(CodegenError::internal("codegen_expr", "error node reached codegen")),
            // Lambdas, ranges, and pattern matches have no dedicated
            // runtime representation in this core (§4.6 names no
            // lowering rule for them); they are out of codegen's scope
            // for now, tracked in DESIGN.md.
            Expression::Lambda { .. } => Err(CodegenError::internal("codegen_expr", "lambda codegen not supported")),
            Expression::Range { .. } => Err(CodegenError::internal("codegen_expr", "range codegen not supported")),
            Expression::Match { .. } => Err(CodegenError::internal("codegen_expr", "match codegen not supported")),
        }
    }

    pub(crate) fn codegen_expr_value(&mut self, expr: &Expression) -> CodegenResult<BasicValueEnum<'ctx>> {
        self.codegen_expr(expr)?
            .ok_or_else(|| CodegenError::internal("codegen_expr_value", "void expression used in value position"))
    }

    fn codegen_literal(&mut self, literal: &Literal, expr: &Expression) -> CodegenResult<BasicValueEnum<'ctx>> {
        Ok(match literal {
            Literal::Integer(n) => {
                let ty = self.expr_type_of(expr)?;
                match self.ir.types.get(ty) {
                    Type::Primitive(PrimitiveKind::I64) => self.context.i64_type().const_int(*n as u64, true).into(),
                    _ => self.context.i32_type().const_int(*n as u64, true).into(),
                }
            }
            Literal::Float(f) => {
                let ty = self.expr_type_of(expr)?;
                match self.ir.types.get(ty) {
                    Type::Primitive(PrimitiveKind::F32) => self.context.f32_type().const_float(*f).into(),
                    _ => self.context.f64_type().const_float(*f).into(),
                }
            }
            Literal::Bool(b) => self.context.bool_type().const_int(*b as u64, false).into(),
            Literal::Char(c) => self.context.i32_type().const_int(*c as u64, false).into(),
            Literal::Str(s) => self.codegen_string_literal(s)?,
            Literal::Null => self.context.ptr_type(inkwell::AddressSpace::default()).const_null().into(),
        })
    }

    fn codegen_string_literal(&mut self, s: &str) -> CodegenResult<BasicValueEnum<'ctx>> {
        let data = self
            .builder
            .build_global_string_ptr(s, "str_lit")
            .map_err(|e| CodegenError::builder("codegen_string_literal", e))?;
        let len = self.context.i64_type().const_int(s.len() as u64, false);
        let call = self
            .builder
            .build_call(
                self.runtime.string_new_from_literal,
                &[data.as_pointer_value().into(), len.into()],
                "string_lit",
            )
            .map_err(|e| CodegenError::builder("codegen_string_literal/call", e))?;
        call.try_as_basic_value()
            .left()
            .ok_or_else(|| CodegenError::internal("codegen_string_literal", "String_new_from_literal returned void"))
    }

    fn codegen_name(&mut self, path: &[String], expr: &Expression) -> CodegenResult<Option<BasicValueEnum<'ctx>>> {
        let name = path.join(".");
        if let Some((ptr, ty)) = self.find_local(&name) {
            let llvm_ty = self.llvm_type_of(ty)?;
            let value = self
                .builder
                .build_load(llvm_ty, ptr, &format!("{name}_load"))
                .map_err(|e| CodegenError::builder("codegen_name", e))?;
            return Ok(Some(value));
        }
        // Implicit `this.field` (§4.5): an unshadowed identifier that
        // names a field of the current class.
        if let Some(class_name) = self.current_class.clone() {
            if let Some(class) = self.ir.symbols.find_class(&class_name) {
                if class.field_index(&name).is_some() {
                    return self.codegen_member_access(&Expression::This { id: expr.id() }, &name, expr).map(Some);
                }
            }
        }
        Err(CodegenError::UnresolvedSymbol(name))
    }

    fn codegen_this(&mut self) -> CodegenResult<Option<BasicValueEnum<'ctx>>> {
        let (ptr, ty) = self.find_local("this").ok_or_else(|| CodegenError::internal("codegen_this", "`this` used outside an instance method"))?;
        let llvm_ty = self.llvm_type_of(ty)?;
        let value = self
            .builder
            .build_load(llvm_ty, ptr, "this_load")
            .map_err(|e| CodegenError::builder("codegen_this", e))?;
        Ok(Some(value))
    }

    fn codegen_binary(&mut self, left: &Expression, op: BinaryOp, right: &Expression, expr: &Expression) -> CodegenResult<BasicValueEnum<'ctx>> {
        if op == BinaryOp::Add && (self.is_string_type(self.expr_type_of(left)?) || self.is_string_type(self.expr_type_of(right)?)) {
            return self.codegen_string_concat(left, right);
        }
        if op == BinaryOp::And || op == BinaryOp::Or {
            return self.codegen_short_circuit(left, op, right, expr);
        }

        let lhs = self.codegen_expr_value(left)?;
        let rhs = self.codegen_expr_value(right)?;
        let lty = self.ir.types.get(self.expr_type_of(left)?);
        let is_float = matches!(lty, Type::Primitive(PrimitiveKind::F32) | Type::Primitive(PrimitiveKind::F64));

        if is_float {
            let (l, r) = (lhs.into_float_value(), rhs.into_float_value());
            Ok(match op {
                BinaryOp::Add => self.builder.build_float_add(l, r, "fadd"),
                BinaryOp::Sub => self.builder.build_float_sub(l, r, "fsub"),
                BinaryOp::Mul => self.builder.build_float_mul(l, r, "fmul"),
                BinaryOp::Div => self.builder.build_float_div(l, r, "fdiv"),
                BinaryOp::Mod => self.builder.build_float_rem(l, r, "frem"),
                BinaryOp::Eq => return self.build_fcmp(FloatPredicate::OEQ, l, r),
                BinaryOp::NotEq => return self.build_fcmp(FloatPredicate::ONE, l, r),
                BinaryOp::Lt => return self.build_fcmp(FloatPredicate::OLT, l, r),
                BinaryOp::LtEq => return self.build_fcmp(FloatPredicate::OLE, l, r),
                BinaryOp::Gt => return self.build_fcmp(FloatPredicate::OGT, l, r),
                BinaryOp::GtEq => return self.build_fcmp(FloatPredicate::OGE, l, r),
                BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
            }
            .map_err(|e| CodegenError::builder("codegen_binary/float", e))?
            .into())
        } else {
            let (l, r) = (lhs.into_int_value(), rhs.into_int_value());
            Ok(match op {
                BinaryOp::Add => self.builder.build_int_add(l, r, "iadd").map_err(|e| CodegenError::builder("add", e))?.into(),
                BinaryOp::Sub => self.builder.build_int_sub(l, r, "isub").map_err(|e| CodegenError::builder("sub", e))?.into(),
                BinaryOp::Mul => self.builder.build_int_mul(l, r, "imul").map_err(|e| CodegenError::builder("mul", e))?.into(),
                BinaryOp::Div => self.builder.build_int_signed_div(l, r, "idiv").map_err(|e| CodegenError::builder("div", e))?.into(),
                BinaryOp::Mod => self.builder.build_int_signed_rem(l, r, "irem").map_err(|e| CodegenError::builder("rem", e))?.into(),
                BinaryOp::Eq => self
                    .builder
                    .build_int_compare(IntPredicate::EQ, l, r, "icmp_eq")
                    .map_err(|e| CodegenError::builder("eq", e))?
                    .into(),
                BinaryOp::NotEq => self
                    .builder
                    .build_int_compare(IntPredicate::NE, l, r, "icmp_ne")
                    .map_err(|e| CodegenError::builder("ne", e))?
                    .into(),
                BinaryOp::Lt => self
                    .builder
                    .build_int_compare(IntPredicate::SLT, l, r, "icmp_lt")
                    .map_err(|e| CodegenError::builder("lt", e))?
                    .into(),
                BinaryOp::LtEq => self
                    .builder
                    .build_int_compare(IntPredicate::SLE, l, r, "icmp_le")
                    .map_err(|e| CodegenError::builder("le", e))?
                    .into(),
                BinaryOp::Gt => self
                    .builder
                    .build_int_compare(IntPredicate::SGT, l, r, "icmp_gt")
                    .map_err(|e| CodegenError::builder("gt", e))?
                    .into(),
                BinaryOp::GtEq => self
                    .builder
                    .build_int_compare(IntPredicate::SGE, l, r, "icmp_ge")
                    .map_err(|e| CodegenError::builder("ge", e))?
                    .into(),
                BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
            })
        }
    }

    fn build_fcmp(&self, pred: FloatPredicate, l: inkwell::values::FloatValue<'ctx>, r: inkwell::values::FloatValue<'ctx>) -> CodegenResult<BasicValueEnum<'ctx>> {
        Ok(self
            .builder
            .build_float_compare(pred, l, r, "fcmp")
            .map_err(|e| CodegenError::builder("build_fcmp", e))?
            .into())
    }

    /// `&&`/`||` short-circuit: only evaluate the right operand when the
    /// left one didn't already decide the result.
    fn codegen_short_circuit(&mut self, left: &Expression, op: BinaryOp, right: &Expression, _expr: &Expression) -> CodegenResult<BasicValueEnum<'ctx>> {
        let function = self.current_function()?;
        let lhs = self.codegen_expr_value(left)?.into_int_value();
        let rhs_block = self.context.append_basic_block(function, "logic_rhs");
        let merge_block = self.context.append_basic_block(function, "logic_merge");
        let entry_block = self.builder.get_insert_block().ok_or_else(|| CodegenError::internal("codegen_short_circuit", "no active block"))?;

        if op == BinaryOp::And {
            self.builder
                .build_conditional_branch(lhs, rhs_block, merge_block)
                .map_err(|e| CodegenError::builder("short_circuit/and_branch", e))?;
        } else {
            self.builder
                .build_conditional_branch(lhs, merge_block, rhs_block)
                .map_err(|e| CodegenError::builder("short_circuit/or_branch", e))?;
        }

        self.builder.position_at_end(rhs_block);
        let rhs = self.codegen_expr_value(right)?.into_int_value();
        let rhs_end_block = self.builder.get_insert_block().ok_or_else(|| CodegenError::internal("codegen_short_circuit", "no active block"))?;
        self.builder
            .build_unconditional_branch(merge_block)
            .map_err(|e| CodegenError::builder("short_circuit/to_merge", e))?;

        self.builder.position_at_end(merge_block);
        let phi = self
            .builder
            .build_phi(self.context.bool_type(), "logic_phi")
            .map_err(|e| CodegenError::builder("short_circuit/phi", e))?;
        let short_value = self.context.bool_type().const_int(if op == BinaryOp::Or { 1 } else { 0 }, false);
        phi.add_incoming(&[(&short_value, entry_block), (&rhs, rhs_end_block)]);
        Ok(phi.as_basic_value())
    }

    fn codegen_string_concat(&mut self, left: &Expression, right: &Expression) -> CodegenResult<BasicValueEnum<'ctx>> {
        let lval = self.materialize_as_string(left)?;
        let rval = self.materialize_as_string(right)?;
        let call = self
            .builder
            .build_call(self.runtime.string_concat, &[lval.into(), rval.into()], "string_concat")
            .map_err(|e| CodegenError::builder("codegen_string_concat", e))?;
        call.try_as_basic_value()
            .left()
            .ok_or_else(|| CodegenError::internal("codegen_string_concat", "String_concat returned void"))
    }

    /// Materialize `expr` as a `GlintString*`, converting through the
    /// appropriate `String_from_*` runtime helper when it is not
    /// already string-typed (§4.6 "String operations").
    fn materialize_as_string(&mut self, expr: &Expression) -> CodegenResult<inkwell::values::PointerValue<'ctx>> {
        let ty = self.expr_type_of(expr)?;
        let value = self.codegen_expr_value(expr)?;
        if self.is_string_type(ty) {
            return Ok(value.into_pointer_value());
        }
        let helper = match self.ir.types.get(ty) {
            Type::Primitive(PrimitiveKind::I32) => self.runtime.string_from_int,
            Type::Primitive(PrimitiveKind::I64) => self.runtime.string_from_long,
            Type::Primitive(PrimitiveKind::F32) => self.runtime.string_from_float,
            Type::Primitive(PrimitiveKind::F64) => self.runtime.string_from_double,
            Type::Primitive(PrimitiveKind::Bool) => self.runtime.string_from_bool,
            Type::Primitive(PrimitiveKind::Char) => self.runtime.string_from_char,
            _ => return Err(CodegenError::internal("materialize_as_string", "value has no string conversion")),
        };
        let arg = if matches!(self.ir.types.get(ty), Type::Primitive(PrimitiveKind::Bool)) {
            // `String_from_bool` takes the runtime's 8-bit ABI bool, not
            // the language's `i1`.
            self.builder
                .build_int_z_extend(value.into_int_value(), self.context.i8_type(), "bool_to_i8")
                .map_err(|e| CodegenError::builder("materialize_as_string/bool_ext", e))?
                .into()
        } else {
            value
        };
        let call = self
            .builder
            .build_call(helper, &[arg.into()], "to_string")
            .map_err(|e| CodegenError::builder("materialize_as_string/call", e))?;
        Ok(call
            .try_as_basic_value()
            .left()
            .ok_or_else(|| CodegenError::internal("materialize_as_string", "from_* helper returned void"))?
            .into_pointer_value())
    }

    fn codegen_unary(&mut self, op: UnaryOp, operand: &Expression) -> CodegenResult<BasicValueEnum<'ctx>> {
        let value = self.codegen_expr_value(operand)?;
        Ok(match op {
            UnaryOp::Neg => {
                if value.is_float_value() {
                    self.builder
                        .build_float_neg(value.into_float_value(), "fneg")
                        .map_err(|e| CodegenError::builder("unary_neg", e))?
                        .into()
                } else {
                    self.builder
                        .build_int_neg(value.into_int_value(), "ineg")
                        .map_err(|e| CodegenError::builder("unary_neg", e))?
                        .into()
                }
            }
            UnaryOp::Not => self
                .builder
                .build_not(value.into_int_value(), "not")
                .map_err(|e| CodegenError::builder("unary_not", e))?
                .into(),
        })
    }

    fn codegen_postfix(&mut self, op: glint_ast::PostfixOp, operand: &Expression) -> CodegenResult<BasicValueEnum<'ctx>> {
        let (ptr, ty) = self.lvalue_slot(operand)?;
        let llvm_ty = self.llvm_type_of(ty)?;
        let old = self
            .builder
            .build_load(llvm_ty, ptr, "postfix_old")
            .map_err(|e| CodegenError::builder("codegen_postfix", e))?
            .into_int_value();
        let one = old.get_type().const_int(1, false);
        let new = match op {
            glint_ast::PostfixOp::Increment => self.builder.build_int_add(old, one, "inc").map_err(|e| CodegenError::builder("inc", e))?,
            glint_ast::PostfixOp::Decrement => self.builder.build_int_sub(old, one, "dec").map_err(|e| CodegenError::builder("dec", e))?,
        };
        self.builder.build_store(ptr, new).map_err(|e| CodegenError::builder("codegen_postfix/store", e))?;
        Ok(old.into())
    }

    fn codegen_conditional(
        &mut self,
        condition: &Expression,
        then_branch: &Expression,
        else_branch: &Expression,
        expr: &Expression,
    ) -> CodegenResult<Option<BasicValueEnum<'ctx>>> {
        self.codegen_if_expr(condition, then_branch, Some(else_branch), expr)
    }

    fn codegen_if_expr(
        &mut self,
        condition: &Expression,
        then_branch: &Expression,
        else_branch: Option<&Expression>,
        expr: &Expression,
    ) -> CodegenResult<Option<BasicValueEnum<'ctx>>> {
        let function = self.current_function()?;
        let cond = self.codegen_expr_value(condition)?.into_int_value();
        let then_block = self.context.append_basic_block(function, "if_then");
        let else_block = self.context.append_basic_block(function, "if_else");
        let merge_block = self.context.append_basic_block(function, "if_merge");
        self.builder
            .build_conditional_branch(cond, then_block, else_block)
            .map_err(|e| CodegenError::builder("codegen_if_expr/branch", e))?;

        self.builder.position_at_end(then_block);
        let then_value = self.codegen_expr(then_branch)?;
        let then_end = self.builder.get_insert_block().ok_or_else(|| CodegenError::internal("codegen_if_expr", "no block"))?;
        if then_end.get_terminator().is_none() {
            self.builder.build_unconditional_branch(merge_block).map_err(|e| CodegenError::builder("if/then_to_merge", e))?;
        }

        self.builder.position_at_end(else_block);
        let else_value = match else_branch {
            Some(e) => self.codegen_expr(e)?,
            None => None,
        };
        let else_end = self.builder.get_insert_block().ok_or_else(|| CodegenError::internal("codegen_if_expr", "no block"))?;
        if else_end.get_terminator().is_none() {
            self.builder.build_unconditional_branch(merge_block).map_err(|e| CodegenError::builder("if/else_to_merge", e))?;
        }

        self.builder.position_at_end(merge_block);
        let result_ty = self.ir.expr_type(expr.id());
        match (then_value, else_value, result_ty) {
            (Some(tv), Some(ev), Some(ty)) if !matches!(self.ir.types.get(ty), Type::Primitive(PrimitiveKind::Void)) => {
                let llvm_ty = self.llvm_type_of(ty)?;
                let phi = self.builder.build_phi(llvm_ty, "if_phi").map_err(|e| CodegenError::builder("if/phi", e))?;
                phi.add_incoming(&[(&tv, then_end), (&ev, else_end)]);
                Ok(Some(phi.as_basic_value()))
            }
            _ => Ok(None),
        }
    }

    fn codegen_assignment(&mut self, target: &Expression, value: &Expression) -> CodegenResult<BasicValueEnum<'ctx>> {
        let new_value = self.codegen_expr_value(value)?;
        let value_ty = self.expr_type_of(value)?;
        let is_new_expr = matches!(value, Expression::New { .. });
        let (ptr, target_ty) = self.lvalue_slot(target)?;

        if self.is_class_typed(target_ty) {
            let old = self
                .builder
                .build_load(self.context.ptr_type(inkwell::AddressSpace::default()), ptr, "assign_old")
                .map_err(|e| CodegenError::builder("codegen_assignment", e))?
                .into_pointer_value();
            self.release_if_nonnull(old)?;
            if !is_new_expr {
                self.emit_retain(new_value.into_pointer_value())?;
            }
        }
        let _ = value_ty;
        self.builder.build_store(ptr, new_value).map_err(|e| CodegenError::builder("codegen_assignment/store", e))?;
        Ok(new_value)
    }

    fn release_if_nonnull(&self, ptr: inkwell::values::PointerValue<'ctx>) -> CodegenResult<()> {
        let function = self.current_function()?;
        let is_not_null = self
            .builder
            .build_is_not_null(ptr, "is_not_null")
            .map_err(|e| CodegenError::builder("release_if_nonnull", e))?;
        let release_block = self.context.append_basic_block(function, "release_old");
        let after_block = self.context.append_basic_block(function, "after_release");
        self.builder
            .build_conditional_branch(is_not_null, release_block, after_block)
            .map_err(|e| CodegenError::builder("release_if_nonnull/branch", e))?;
        self.builder.position_at_end(release_block);
        self.emit_release(ptr)?;
        self.builder.build_unconditional_branch(after_block).map_err(|e| CodegenError::builder("release_if_nonnull/to_after", e))?;
        self.builder.position_at_end(after_block);
        Ok(())
    }

    pub(crate) fn is_class_typed(&self, ty: glint_ast::TypeId) -> bool {
        matches!(self.ir.types.get(ty), Type::Named(_))
    }

    /// Resolve `expr` to the stack slot it addresses, for assignment and
    /// `++`/`--` targets.
    fn lvalue_slot(&mut self, expr: &Expression) -> CodegenResult<(inkwell::values::PointerValue<'ctx>, glint_ast::TypeId)> {
        match expr {
            Expression::Name { path, .. } => {
                let name = path.join(".");
                if let Some(slot) = self.find_local(&name) {
                    return Ok(slot);
                }
                if let Some(class_name) = self.current_class.clone() {
                    if let Some(class) = self.ir.symbols.find_class(&class_name) {
                        if let Some(index) = class.field_index(&name) {
                            let field_ty = class.field_names[index as usize].ast_type.clone();
                            let ty = crate::semantic::registration::resolve_type_ref(&field_ty, &self.ir.symbols, &self.ir.types);
                            let ptr = self.field_ptr(&class_name, index)?;
                            return Ok((ptr, ty));
                        }
                    }
                }
                Err(CodegenError::UnresolvedSymbol(name))
            }
            Expression::MemberAccess { object, member, .. } => {
                let object_ty = self.expr_type_of(object)?;
                let class_name = self
                    .class_name_of(object_ty)
                    .ok_or_else(|| CodegenError::internal("lvalue_slot", "member access target is not a class"))?;
                let object_value = self.codegen_expr_value(object)?.into_pointer_value();
                let class = self
                    .ir
                    .symbols
                    .find_class(&class_name)
                    .ok_or_else(|| CodegenError::MissingClass(class_name.clone()))?;
                let index = class
                    .field_index(member)
                    .ok_or_else(|| CodegenError::internal("lvalue_slot", format!("no such field `{member}` on `{class_name}`")))?;
                let field_ty = class.field_names[index as usize].ast_type.clone();
                let ty = crate::semantic::registration::resolve_type_ref(&field_ty, &self.ir.symbols, &self.ir.types);
                let layout = self.classes.get(&class_name).ok_or_else(|| CodegenError::MissingClass(class_name.clone()))?;
                let ptr = self
                    .builder
                    .build_struct_gep(layout.fields_struct, object_value, index, &format!("{member}_ptr"))
                    .map_err(|e| CodegenError::builder("lvalue_slot/member", e))?;
                Ok((ptr, ty))
            }
            _ => Err(CodegenError::internal("lvalue_slot", "expression is not an lvalue")),
        }
    }

    fn field_ptr(&mut self, class_name: &str, index: u32) -> CodegenResult<inkwell::values::PointerValue<'ctx>> {
        let (this_ptr, _) = self.find_local("this").ok_or_else(|| CodegenError::internal("field_ptr", "field access outside an instance method"))?;
        let ptr_t = self.context.ptr_type(inkwell::AddressSpace::default());
        let this_value = self
            .builder
            .build_load(ptr_t, this_ptr, "this_for_field")
            .map_err(|e| CodegenError::builder("field_ptr", e))?
            .into_pointer_value();
        let layout = self.classes.get(class_name).ok_or_else(|| CodegenError::MissingClass(class_name.to_string()))?;
        self.builder
            .build_struct_gep(layout.fields_struct, this_value, index, "field_ptr")
            .map_err(|e| CodegenError::builder("field_ptr/gep", e))
    }

    fn codegen_member_access(&mut self, object: &Expression, member: &str, expr: &Expression) -> CodegenResult<BasicValueEnum<'ctx>> {
        let object_ty = self.expr_type_of(object)?;
        if let Type::Primitive(kind) = self.ir.types.get(object_ty) {
            return self.codegen_primitive_member(object, kind, member);
        }
        if self.is_string_type(object_ty) {
            return self.codegen_string_member(object, member);
        }

        let class_name = self
            .class_name_of(object_ty)
            .ok_or_else(|| CodegenError::internal("codegen_member_access", "member access on a non-class, non-primitive value"))?;
        let (ptr, ty) = self.lvalue_slot(&Expression::MemberAccess {
            id: expr.id(),
            object: Box::new(object.clone()),
            member: member.to_string(),
        })?;
        let _ = class_name;
        let llvm_ty = self.llvm_type_of(ty)?;
        self.builder
            .build_load(llvm_ty, ptr, &format!("{member}_load"))
            .map_err(|e| CodegenError::builder("codegen_member_access", e))
    }

    /// Built-in members on primitive values (§4.6 "Primitive method
    /// dispatch") — dispatched straight to the runtime helper rather
    /// than a user method lookup.
    fn codegen_primitive_member(&mut self, object: &Expression, kind: PrimitiveKind, member: &str) -> CodegenResult<BasicValueEnum<'ctx>> {
        let value = self.codegen_expr_value(object)?;
        let helper = match (kind, member) {
            (PrimitiveKind::I32, "ToString") => self.runtime.string_from_int,
            (PrimitiveKind::I64, "ToString") => self.runtime.string_from_long,
            (PrimitiveKind::F32, "ToString") => self.runtime.string_from_float,
            (PrimitiveKind::F64, "ToString") => self.runtime.string_from_double,
            (PrimitiveKind::Bool, "ToString") => self.runtime.string_from_bool,
            (PrimitiveKind::Char, "ToString") => self.runtime.string_from_char,
            _ => return Err(CodegenError::internal("codegen_primitive_member", format!("no primitive member `{member}` on {kind:?}"))),
        };
        let arg = if kind == PrimitiveKind::Bool {
            self.builder
                .build_int_z_extend(value.into_int_value(), self.context.i8_type(), "bool_to_i8")
                .map_err(|e| CodegenError::builder("codegen_primitive_member/bool_ext", e))?
                .into()
        } else {
            value
        };
        let call = self
            .builder
            .build_call(helper, &[arg.into()], "primitive_to_string")
            .map_err(|e| CodegenError::builder("codegen_primitive_member/call", e))?;
        call.try_as_basic_value()
            .left()
            .ok_or_else(|| CodegenError::internal("codegen_primitive_member", "helper returned void"))
    }

    fn codegen_string_member(&mut self, object: &Expression, member: &str) -> CodegenResult<BasicValueEnum<'ctx>> {
        let value = self.codegen_expr_value(object)?;
        match member {
            "Length" => {
                let call = self
                    .builder
                    .build_call(self.runtime.string_get_length, &[value.into()], "string_length")
                    .map_err(|e| CodegenError::builder("codegen_string_member/length", e))?;
                call.try_as_basic_value().left().ok_or_else(|| CodegenError::internal("codegen_string_member", "String_get_length returned void"))
            }
            _ => Err(CodegenError::internal("codegen_string_member", format!("no string member `{member}`"))),
        }
    }

    fn codegen_call(&mut self, callee: &Expression, args: &[Expression], expr: &Expression) -> CodegenResult<Option<BasicValueEnum<'ctx>>> {
        let mut arg_values = Vec::with_capacity(args.len());
        for a in args {
            arg_values.push(self.codegen_expr_value(a)?);
        }

        // `string.Substring(i)` etc. go through the primitive path above
        // when written as member access; a bare call callee can still be
        // a member access node (`s.Substring(1)`).
        if let Expression::MemberAccess { object, member, .. } = callee {
            let object_ty = self.expr_type_of(object)?;
            if self.is_string_type(object_ty) && member == "Substring" {
                let receiver = self.codegen_expr_value(object)?;
                let mut call_args = vec![receiver];
                call_args.extend(arg_values);
                let metadata: Vec<_> = call_args.iter().map(|v| (*v).into()).collect();
                let call = self
                    .builder
                    .build_call(self.runtime.string_substring, &metadata, "substring")
                    .map_err(|e| CodegenError::builder("codegen_call/substring", e))?;
                return Ok(call.try_as_basic_value().left());
            }
            if let Some(class_name) = self.class_name_of(object_ty) {
                let method = self
                    .ir
                    .symbols
                    .find_method_in_class(&class_name, member)
                    .ok_or_else(|| CodegenError::MissingMethod(format!("{class_name}.{member}")))?
                    .clone();
                let receiver = self.codegen_expr_value(object)?.into_pointer_value();
                if method.is_virtual {
                    return self.emit_virtual_call(&class_name, member, receiver, &arg_values);
                }
                let function = self
                    .functions
                    .get(&method.qualified_name)
                    .copied()
                    .ok_or_else(|| CodegenError::MissingMethod(method.qualified_name.clone()))?;
                let mut call_args: Vec<inkwell::values::BasicMetadataValueEnum> = vec![receiver.into()];
                call_args.extend(arg_values.iter().map(|v| (*v).into()));
                let call = self
                    .builder
                    .build_call(function, &call_args, "method_call")
                    .map_err(|e| CodegenError::builder("codegen_call/method", e))?;
                return Ok(call.try_as_basic_value().left());
            }
        }

        // Free function / resolved-overload call (§4.5 annotates the
        // node with the resolved `MethodSymbol` qualified name).
        let qualified_name = self
            .ir
            .resolved_calls
            .get(&expr.id())
            .cloned()
            .or_else(|| match callee {
                Expression::Name { path, .. } => Some(path.join(".")),
                _ => None,
            })
            .ok_or_else(|| CodegenError::internal("codegen_call", "call node has no resolved target"))?;
        let function = self
            .functions
            .get(&qualified_name)
            .copied()
            .ok_or_else(|| CodegenError::UnresolvedSymbol(qualified_name.clone()))?;
        let metadata: Vec<inkwell::values::BasicMetadataValueEnum> = arg_values.iter().map(|v| (*v).into()).collect();
        let call = self
            .builder
            .build_call(function, &metadata, "call")
            .map_err(|e| CodegenError::builder("codegen_call/free", e))?;
        Ok(call.try_as_basic_value().left())
    }

    fn codegen_indexer(&mut self, object: &Expression, index: &Expression, expr: &Expression) -> CodegenResult<BasicValueEnum<'ctx>> {
        let base = self.codegen_expr_value(object)?.into_pointer_value();
        let idx = self.codegen_expr_value(index)?.into_int_value();
        let elem_ty = self
            .ir
            .expr_type(expr.id())
            .ok_or_else(|| CodegenError::internal("codegen_indexer", "indexer node has no resolved type"))?;
        let llvm_elem_ty = self.llvm_type_of(elem_ty)?;
        let ptr = unsafe {
            self.builder
                .build_gep(llvm_elem_ty, base, &[idx], "index_ptr")
                .map_err(|e| CodegenError::builder("codegen_indexer/gep", e))?
        };
        self.builder
            .build_load(llvm_elem_ty, ptr, "index_load")
            .map_err(|e| CodegenError::builder("codegen_indexer/load", e))
    }

    fn codegen_cast(&mut self, inner: &Expression, target_type: &glint_ast::TypeRef, expr: &Expression) -> CodegenResult<BasicValueEnum<'ctx>> {
        let value = self.codegen_expr_value(inner)?;
        let from_ty = self.expr_type_of(inner)?;
        let to_ty = self
            .ir
            .expr_type(expr.id())
            .unwrap_or_else(|| crate::semantic::registration::resolve_type_ref(target_type, &self.ir.symbols, &self.ir.types));
        if from_ty == to_ty {
            return Ok(value);
        }
        let (from, to) = (self.ir.types.get(from_ty), self.ir.types.get(to_ty));
        match (&from, &to) {
            (Type::Primitive(a), Type::Named(_)) if a.is_numeric() || *a == PrimitiveKind::Bool || *a == PrimitiveKind::Char => {
                self.materialize_as_string(inner)
                    .map(|p| p.into())
            }
            (Type::Primitive(PrimitiveKind::I32), Type::Primitive(PrimitiveKind::I64)) => self
                .builder
                .build_int_s_extend(value.into_int_value(), self.context.i64_type(), "sext")
                .map_err(|e| CodegenError::builder("cast/sext", e))
                .map(Into::into),
            (Type::Primitive(PrimitiveKind::I64), Type::Primitive(PrimitiveKind::I32)) => self
                .builder
                .build_int_truncate(value.into_int_value(), self.context.i32_type(), "trunc")
                .map_err(|e| CodegenError::builder("cast/trunc", e))
                .map(Into::into),
            (Type::Primitive(a), Type::Primitive(b)) if a.is_integer() && !b.is_integer() => {
                let target = self.llvm_type_of(to_ty)?.into_float_type();
                self.builder
                    .build_signed_int_to_float(value.into_int_value(), target, "sitofp")
                    .map_err(|e| CodegenError::builder("cast/sitofp", e))
                    .map(Into::into)
            }
            (Type::Primitive(a), Type::Primitive(b)) if !a.is_integer() && b.is_integer() => {
                let target = self.llvm_type_of(to_ty)?.into_int_type();
                self.builder
                    .build_float_to_signed_int(value.into_float_value(), target, "fptosi")
                    .map_err(|e| CodegenError::builder("cast/fptosi", e))
                    .map(Into::into)
            }
            (Type::Primitive(PrimitiveKind::F32), Type::Primitive(PrimitiveKind::F64)) => self
                .builder
                .build_float_ext(value.into_float_value(), self.context.f64_type(), "fext")
                .map_err(|e| CodegenError::builder("cast/fext", e))
                .map(Into::into),
            (Type::Primitive(PrimitiveKind::F64), Type::Primitive(PrimitiveKind::F32)) => self
                .builder
                .build_float_trunc(value.into_float_value(), self.context.f32_type(), "ftrunc")
                .map_err(|e| CodegenError::builder("cast/ftrunc", e))
                .map(Into::into),
            (Type::Pointer(_), Type::Pointer(_)) => Ok(value),
            (Type::Pointer(_), Type::Primitive(b)) if b.is_integer() => {
                let target = self.llvm_type_of(to_ty)?.into_int_type();
                self.builder
                    .build_ptr_to_int(value.into_pointer_value(), target, "ptrtoint")
                    .map_err(|e| CodegenError::builder("cast/ptrtoint", e))
                    .map(Into::into)
            }
            (Type::Primitive(a), Type::Pointer(_)) if a.is_integer() => {
                let target = self.context.ptr_type(inkwell::AddressSpace::default());
                self.builder
                    .build_int_to_ptr(value.into_int_value(), target, "inttoptr")
                    .map_err(|e| CodegenError::builder("cast/inttoptr", e))
                    .map(Into::into)
            }
            _ => Err(CodegenError::internal("codegen_cast", format!("unsupported cast {from:?} -> {to:?}"))),
        }
    }

    fn codegen_new_expr(&mut self, type_name: &str, args: &[Expression]) -> CodegenResult<inkwell::values::PointerValue<'ctx>> {
        let mut arg_values = Vec::with_capacity(args.len());
        for a in args {
            arg_values.push(self.codegen_expr_value(a)?);
        }
        self.emit_new(type_name, &arg_values)
    }

    fn codegen_sizeof(&mut self, target_type: &glint_ast::TypeRef) -> CodegenResult<BasicValueEnum<'ctx>> {
        let ty = crate::semantic::registration::resolve_type_ref(target_type, &self.ir.symbols, &self.ir.types);
        if let Some(class_name) = self.class_name_of(ty) {
            let layout = self.classes.get(&class_name).ok_or_else(|| CodegenError::MissingClass(class_name))?;
            return layout
                .fields_struct
                .size_of()
                .map(Into::into)
                .ok_or_else(|| CodegenError::internal("codegen_sizeof", "type has no computable size"));
        }
        let llvm_ty = self.llvm_type_of(ty)?;
        llvm_ty
            .size_of()
            .map(Into::into)
            .ok_or_else(|| CodegenError::internal("codegen_sizeof", "type has no computable size"))
    }

    /// Best-effort `typeof`: the runtime `type_id` stamped in the header
    /// for class instances, or a fixed sentinel for primitives (there is
    /// no reflection metadata table in this core).
    fn codegen_typeof(&mut self, inner: &Expression) -> CodegenResult<Option<BasicValueEnum<'ctx>>> {
        let ty = self.expr_type_of(inner)?;
        if self.class_name_of(ty).is_some() {
            let value = self.codegen_expr_value(inner)?.into_pointer_value();
            let header = self.header_from_fields(value)?;
            let i32_t = self.context.i32_type();
            let type_id_ptr = self
                .builder
                .build_struct_gep(
                    self.context.struct_type(&[i32_t.into(), i32_t.into(), self.context.ptr_type(inkwell::AddressSpace::default()).into()], false),
                    header,
                    1,
                    "type_id_ptr",
                )
                .map_err(|e| CodegenError::builder("codegen_typeof", e))?;
            return self
                .builder
                .build_load(i32_t, type_id_ptr, "type_id")
                .map(Some)
                .map_err(|e| CodegenError::builder("codegen_typeof/load", e));
        }
        Ok(Some(self.context.i32_type().const_int(u32::MAX as u64, false).into()))
    }

    fn codegen_block_expr(&mut self, statements: &[glint_ast::Statement], tail: &Option<Box<Expression>>) -> CodegenResult<Option<BasicValueEnum<'ctx>>> {
        self.push_block_scope(crate::scope_manager::ScopeKind::Block, "block_expr");
        for stmt in statements {
            self.codegen_statement(stmt)?;
        }
        if self.builder.get_insert_block().map(|b| b.get_terminator().is_some()).unwrap_or(true) {
            self.scope.pop_without_emitting();
            self.locals.pop();
            return Ok(None);
        }
        let result = match tail {
            Some(e) => self.codegen_expr(e)?,
            None => None,
        };
        self.pop_block_scope()?;
        Ok(result)
    }

    pub(crate) fn current_function(&self) -> CodegenResult<inkwell::values::FunctionValue<'ctx>> {
        self.builder
            .get_insert_block()
            .and_then(|b| b.get_parent())
            .ok_or_else(|| CodegenError::internal("current_function", "builder has no active insertion point"))
    }
}
