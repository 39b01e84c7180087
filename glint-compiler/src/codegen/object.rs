//! Object construction, header/fields pointer arithmetic, and virtual
//! dispatch (§4.6, §6 "Object header layout" / "VTable layout").
//!
//! A class instance is always passed around as its *fields* pointer —
//! the implicit receiver parameter, the result of `new`, the value
//! stored in a class-typed local. The header sits `HEADER_SIZE` bytes
//! before it; this module is the only place that crosses between the
//! two representations.

use super::{Codegen, CodegenError, CodegenResult};
use glint_runtime::header::HEADER_SIZE;
use inkwell::values::{BasicMetadataValueEnum, BasicValueEnum, PointerValue};
use inkwell::AddressSpace;

impl<'ctx, 'ir> Codegen<'ctx, 'ir> {
    pub(crate) fn header_from_fields(&self, fields_ptr: PointerValue<'ctx>) -> CodegenResult<PointerValue<'ctx>> {
        let i8_t = self.context.i8_type();
        let offset = self.context.i64_type().const_int(HEADER_SIZE as u64, false).const_neg();
        unsafe {
            self.builder
                .build_gep(i8_t, fields_ptr, &[offset], "header_from_fields")
                .map_err(|e| CodegenError::builder("header_from_fields", e))
        }
    }

    pub(crate) fn fields_from_header(&self, header_ptr: PointerValue<'ctx>) -> CodegenResult<PointerValue<'ctx>> {
        let i8_t = self.context.i8_type();
        let offset = self.context.i64_type().const_int(HEADER_SIZE as u64, false);
        unsafe {
            self.builder
                .build_gep(i8_t, header_ptr, &[offset], "fields_from_header")
                .map_err(|e| CodegenError::builder("fields_from_header", e))
        }
    }

    pub(crate) fn emit_retain(&self, fields_ptr: PointerValue<'ctx>) -> CodegenResult<()> {
        let header = self.header_from_fields(fields_ptr)?;
        self.builder
            .build_call(self.runtime.object_retain, &[header.into()], "retain")
            .map_err(|e| CodegenError::builder("emit_retain", e))?;
        Ok(())
    }

    pub(crate) fn emit_release(&self, fields_ptr: PointerValue<'ctx>) -> CodegenResult<()> {
        let header = self.header_from_fields(fields_ptr)?;
        self.builder
            .build_call(self.runtime.object_release, &[header.into()], "release")
            .map_err(|e| CodegenError::builder("emit_release", e))?;
        Ok(())
    }

    /// `new T(args)` (§4.6): allocate via the runtime, derive the fields
    /// pointer, call the constructor. No retain at the call site — the
    /// allocator hands back an object with `ref_count == 1` already.
    pub(crate) fn emit_new(&mut self, class_name: &str, args: &[BasicValueEnum<'ctx>]) -> CodegenResult<PointerValue<'ctx>> {
        let class = self
            .ir
            .symbols
            .find_class(class_name)
            .ok_or_else(|| CodegenError::MissingClass(class_name.to_string()))?
            .clone();
        let layout = self
            .classes
            .get(class_name)
            .ok_or_else(|| CodegenError::MissingClass(class_name.to_string()))?;
        let data_size = layout
            .fields_struct
            .size_of()
            .ok_or_else(|| CodegenError::internal("emit_new", "fields struct has no computable size"))?;
        let vtable_ptr = match layout.vtable_global {
            Some(global) => global.as_pointer_value(),
            None => self.context.ptr_type(AddressSpace::default()).const_null(),
        };
        let type_id = self.context.i32_type().const_int(class.symbol_id as u64, false);

        let header = self
            .builder
            .build_call(
                self.runtime.object_alloc,
                &[data_size.into(), type_id.into(), vtable_ptr.into()],
                "object_alloc",
            )
            .map_err(|e| CodegenError::builder("emit_new/alloc", e))?
            .try_as_basic_value()
            .left()
            .ok_or_else(|| CodegenError::internal("emit_new", "Object_alloc returned void"))?
            .into_pointer_value();

        let fields_ptr = self.fields_from_header(header)?;

        let ctor_name = format!("{class_name}.<ctor>");
        if let Some(ctor) = self.functions.get(&ctor_name).copied() {
            let mut call_args: Vec<BasicMetadataValueEnum> = vec![fields_ptr.into()];
            call_args.extend(args.iter().map(|v| (*v).into()));
            self.builder
                .build_call(ctor, &call_args, "ctor_call")
                .map_err(|e| CodegenError::builder("emit_new/ctor", e))?;
        }
        Ok(fields_ptr)
    }

    /// Virtual dispatch (§4.6, §6): load the vtable pointer from the
    /// header, index it at `1 + vtable_slot`, call indirectly.
    pub(crate) fn emit_virtual_call(
        &self,
        static_class: &str,
        method_name: &str,
        fields_ptr: PointerValue<'ctx>,
        args: &[BasicValueEnum<'ctx>],
    ) -> CodegenResult<Option<BasicValueEnum<'ctx>>> {
        let method = self
            .ir
            .symbols
            .find_method_in_class(static_class, method_name)
            .ok_or_else(|| CodegenError::MissingMethod(format!("{static_class}.{method_name}")))?
            .clone();
        let vtable_slot = method
            .vtable_slot
            .ok_or_else(|| CodegenError::internal("emit_virtual_call", "resolved method has no vtable slot"))?;
        let physical_slot = 1 + vtable_slot;

        let layout = self
            .classes
            .get(static_class)
            .ok_or_else(|| CodegenError::MissingClass(static_class.to_string()))?;
        let vtable_struct = layout
            .vtable_struct
            .ok_or_else(|| CodegenError::internal("emit_virtual_call", "class has no vtable but a virtual call targets it"))?;

        let header = self.header_from_fields(fields_ptr)?;
        let ptr_t = self.context.ptr_type(AddressSpace::default());
        let i8_t = self.context.i8_type();
        let vtable_field_offset = self.context.i64_type().const_int(8, false);
        let vtable_field_ptr = unsafe {
            self.builder
                .build_gep(i8_t, header, &[vtable_field_offset], "vtable_field_ptr")
                .map_err(|e| CodegenError::builder("emit_virtual_call/vtable_field_ptr", e))?
        };
        let vtable_ptr = self
            .builder
            .build_load(ptr_t, vtable_field_ptr, "vtable_ptr")
            .map_err(|e| CodegenError::builder("emit_virtual_call/load_vtable", e))?
            .into_pointer_value();

        let slot_ptr = self
            .builder
            .build_struct_gep(vtable_struct, vtable_ptr, physical_slot as u32, "vtable_slot_ptr")
            .map_err(|e| CodegenError::builder("emit_virtual_call/slot_gep", e))?;
        let method_ptr = self
            .builder
            .build_load(ptr_t, slot_ptr, "method_ptr")
            .map_err(|e| CodegenError::builder("emit_virtual_call/load_slot", e))?
            .into_pointer_value();

        let mut param_types = vec![ptr_t.into()];
        for p in &method.param_types {
            param_types.push(self.llvm_type_of(*p)?.into());
        }
        let ret_is_void = matches!(self.ir.types.get(method.return_type), glint_ast::Type::Primitive(glint_ast::PrimitiveKind::Void));
        let fn_type = if ret_is_void {
            self.context.void_type().fn_type(&param_types, false)
        } else {
            self.llvm_type_of(method.return_type)?.fn_type(&param_types, false)
        };

        let mut call_args: Vec<BasicMetadataValueEnum> = vec![fields_ptr.into()];
        call_args.extend(args.iter().map(|v| (*v).into()));
        let call = self
            .builder
            .build_indirect_call(fn_type, method_ptr, &call_args, "virtual_call")
            .map_err(|e| CodegenError::builder("emit_virtual_call/call", e))?;
        Ok(call.try_as_basic_value().left())
    }
}
