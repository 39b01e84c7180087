//! Declarations for the runtime ABI consumed by emitted code (§6). These
//! are `extern "C"` functions the runtime library defines; codegen only
//! ever declares them into the module and calls them, exactly the way
//! `codegen_ast/builtins.rs` declares runtime helpers it doesn't define
//! itself.

use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::values::FunctionValue;
use inkwell::AddressSpace;

pub struct RuntimeFunctions<'ctx> {
    pub object_alloc: FunctionValue<'ctx>,
    pub object_retain: FunctionValue<'ctx>,
    pub object_release: FunctionValue<'ctx>,
    pub object_get_ref_count: FunctionValue<'ctx>,

    pub string_new_from_literal: FunctionValue<'ctx>,
    pub string_get_empty: FunctionValue<'ctx>,
    pub string_concat: FunctionValue<'ctx>,
    pub string_get_length: FunctionValue<'ctx>,
    pub string_substring: FunctionValue<'ctx>,

    pub string_from_int: FunctionValue<'ctx>,
    pub string_from_long: FunctionValue<'ctx>,
    pub string_from_float: FunctionValue<'ctx>,
    pub string_from_double: FunctionValue<'ctx>,
    pub string_from_bool: FunctionValue<'ctx>,
    pub string_from_char: FunctionValue<'ctx>,

    pub string_to_int: FunctionValue<'ctx>,
    pub string_to_long: FunctionValue<'ctx>,
    pub string_to_float: FunctionValue<'ctx>,
    pub string_to_double: FunctionValue<'ctx>,
    pub string_to_bool: FunctionValue<'ctx>,
    pub string_to_char: FunctionValue<'ctx>,
}

impl<'ctx> RuntimeFunctions<'ctx> {
    pub fn declare(context: &'ctx Context, module: &Module<'ctx>) -> Self {
        let ptr = context.ptr_type(AddressSpace::default());
        let i32_t = context.i32_type();
        let i64_t = context.i64_type();
        let f32_t = context.f32_type();
        let f64_t = context.f64_type();
        // Rust's `bool` crosses the `extern "C"` boundary as an 8-bit
        // value, not LLVM `i1` — declarations here must match
        // `glint-runtime`'s actual ABI, not the language's own `bool`.
        let bool_t = context.i8_type();

        let declare = |name: &str, fn_type: inkwell::types::FunctionType<'ctx>| module.add_function(name, fn_type, None);

        RuntimeFunctions {
            object_alloc: declare("Object_alloc", ptr.fn_type(&[i64_t.into(), i32_t.into(), ptr.into()], false)),
            object_retain: declare("Object_retain", context.void_type().fn_type(&[ptr.into()], false)),
            object_release: declare("Object_release", context.void_type().fn_type(&[ptr.into()], false)),
            object_get_ref_count: declare("Object_get_ref_count", i32_t.fn_type(&[ptr.into()], false)),

            string_new_from_literal: declare("String_new_from_literal", ptr.fn_type(&[ptr.into(), i64_t.into()], false)),
            string_get_empty: declare("String_get_empty", ptr.fn_type(&[], false)),
            string_concat: declare("String_concat", ptr.fn_type(&[ptr.into(), ptr.into()], false)),
            string_get_length: declare("String_get_length", i32_t.fn_type(&[ptr.into()], false)),
            string_substring: declare("String_substring", ptr.fn_type(&[ptr.into(), i32_t.into()], false)),

            string_from_int: declare("String_from_int", ptr.fn_type(&[i32_t.into()], false)),
            string_from_long: declare("String_from_long", ptr.fn_type(&[i64_t.into()], false)),
            string_from_float: declare("String_from_float", ptr.fn_type(&[f32_t.into()], false)),
            string_from_double: declare("String_from_double", ptr.fn_type(&[f64_t.into()], false)),
            string_from_bool: declare("String_from_bool", ptr.fn_type(&[bool_t.into()], false)),
            string_from_char: declare("String_from_char", ptr.fn_type(&[i32_t.into()], false)),

            string_to_int: declare("String_to_int", i32_t.fn_type(&[ptr.into()], false)),
            string_to_long: declare("String_to_long", i64_t.fn_type(&[ptr.into()], false)),
            string_to_float: declare("String_to_float", f32_t.fn_type(&[ptr.into()], false)),
            string_to_double: declare("String_to_double", f64_t.fn_type(&[ptr.into()], false)),
            string_to_bool: declare("String_to_bool", bool_t.fn_type(&[ptr.into()], false)),
            string_to_char: declare("String_to_char", i32_t.fn_type(&[ptr.into()], false)),
        }
    }
}
