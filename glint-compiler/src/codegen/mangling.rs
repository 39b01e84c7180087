//! Emitted symbol naming (§6 "Emitted symbol naming").

/// A `MethodSymbol::qualified_name` already has the shape
/// `Class.method`/`Class.<ctor>`/`Class.<dtor>`/`freeFunction` (§4.4,
/// §4.5's registration). The only translation left for the LLVM symbol
/// is the placeholder method-name spelling: `<ctor>`/`<dtor>` internally,
/// `%ctor`/`%dtor` on the wire (§6).
pub fn emitted_function_name(qualified_name: &str) -> String {
    qualified_name.replace("<ctor>", "%ctor").replace("<dtor>", "%dtor")
}

pub fn fields_struct_name(class_name: &str) -> String {
    format!("{class_name}_Fields")
}

pub fn vtable_type_name(class_name: &str) -> String {
    format!("{class_name}_VTable")
}

pub fn vtable_global_name(class_name: &str) -> String {
    format!("{class_name}_vtable_global")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctor_and_dtor_use_percent_spelling() {
        assert_eq!(emitted_function_name("Dog.<ctor>"), "Dog.%ctor");
        assert_eq!(emitted_function_name("Dog.<dtor>"), "Dog.%dtor");
        assert_eq!(emitted_function_name("Dog.speak"), "Dog.speak");
    }
}
