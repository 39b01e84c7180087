//! Symbol table (C4, §4.4): a stack of lexical scopes plus the
//! persistent class/method registries that survive across function
//! bodies for the lifetime of a compilation unit.

use glint_ast::TypeId;
use std::collections::HashMap;

/// A field as recorded by [`SymbolTable::declare_class`]'s inheritance
/// flattening: base fields are prepended, each carrying its index into
/// the flattened LLVM struct.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub name: String,
    pub ast_type: glint_ast::TypeRef,
    pub index: u32,
    pub declared_in: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueCategory {
    LValue,
    RValue,
}

#[derive(Debug, Clone)]
pub struct MethodSymbol {
    pub qualified_name: String,
    pub class_name: String,
    pub method_name: String,
    pub param_types: Vec<TypeId>,
    pub return_type: TypeId,
    pub is_static: bool,
    pub is_virtual: bool,
    pub is_override: bool,
    pub is_constructor: bool,
    pub is_destructor: bool,
    /// Assigned during Phase A for virtual methods; `None` for
    /// non-virtual methods, statics, constructors and destructors.
    pub vtable_slot: Option<u32>,
    pub is_forward_declared: bool,
    pub is_defined: bool,
    pub declared_line: usize,
}

#[derive(Debug, Clone)]
pub struct ClassSymbol {
    /// Stable id used as the `SymbolId` inside `glint_ast::Type::Named`
    /// — assigned once at `declare_class` time and never reused.
    pub symbol_id: u32,
    pub name: String,
    pub qualified_name: String,
    pub base: Option<String>,
    /// Flattened field list: base fields (in base order) prepended to
    /// this class's own fields (§4.4 "Inheritance flattening").
    pub field_names: Vec<FieldInfo>,
    /// `base.name` aliases into `field_names`, so a derived class can
    /// still address an inherited field by its qualified spelling.
    pub base_field_aliases: HashMap<String, u32>,
    /// Qualified names of this class's virtual methods (destructor
    /// excluded — it always lives at physical vtable slot 0) in slot
    /// order; a method's 0-based position here is its `vtable_slot`,
    /// and codegen places it at physical slot `1 + vtable_slot`.
    /// Derived classes reuse an ancestor's index for an override rather
    /// than allocating a new one.
    pub virtual_method_order: Vec<String>,
    pub is_forward_declared: bool,
    pub is_defined: bool,
    pub declared_line: usize,
}

impl ClassSymbol {
    pub fn field_index(&self, name: &str) -> Option<u32> {
        self.field_names
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.index)
            .or_else(|| self.base_field_aliases.get(name).copied())
    }
}

#[derive(Default)]
struct Scope {
    variables: HashMap<String, (TypeId, ValueCategory)>,
}

/// Stack of lexical scopes (`declare_variable`/`find_variable`, §4.4)
/// plus the registries that outlive any one scope.
pub struct SymbolTable {
    scopes: Vec<Scope>,
    classes: HashMap<String, ClassSymbol>,
    classes_by_id: HashMap<u32, String>,
    /// Keyed by `qualified_name` (e.g. `"Dog.speak"`); a `Vec` because a
    /// name may be overloaded with distinct parameter lists.
    methods: HashMap<String, Vec<MethodSymbol>>,
    next_symbol_id: u32,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
            classes: HashMap::new(),
            classes_by_id: HashMap::new(),
            methods: HashMap::new(),
            next_symbol_id: 0,
        }
    }

    /// Allocate a fresh `SymbolId` for a class about to be declared.
    /// Called by the registration pass before it has the full
    /// `ClassSymbol` assembled (field flattening needs the base class
    /// already registered, but the id must exist before that so
    /// self-referential fields — `next: Dog` inside `Dog` — can resolve).
    pub fn allocate_symbol_id(&mut self) -> u32 {
        let id = self.next_symbol_id;
        self.next_symbol_id += 1;
        id
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn pop_scope(&mut self) {
        // The outermost scope is the compilation unit itself; it is
        // never popped.
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn declare_variable(&mut self, name: &str, ty: TypeId, category: ValueCategory) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.variables.insert(name.to_string(), (ty, category));
        }
    }

    /// Innermost scope wins (§4.4).
    pub fn find_variable(&self, name: &str) -> Option<(TypeId, ValueCategory)> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.variables.get(name).copied())
    }

    pub fn declare_class(&mut self, mut class: ClassSymbol) {
        if let Some(base_name) = class.base.clone() {
            if let Some(base) = self.classes.get(&base_name) {
                let mut flattened = base.field_names.clone();
                let mut aliases = base.base_field_aliases.clone();
                for field in &base.field_names {
                    aliases.insert(format!("{base_name}.{}", field.name), field.index);
                }
                let base_len = flattened.len() as u32;
                for field in class.field_names.iter_mut() {
                    field.index += base_len;
                }
                flattened.extend(class.field_names.iter().cloned());
                class.field_names = flattened;
                class.base_field_aliases = aliases;
                // Inherited virtual slots keep their ancestor order;
                // this class's own new virtuals are appended by the
                // registration pass after this call.
                class.virtual_method_order = base.virtual_method_order.clone();
            }
        }
        log::debug!(target: "glint_compiler::symbol_table", "declared class {}", class.qualified_name);
        self.classes_by_id.insert(class.symbol_id, class.qualified_name.clone());
        self.classes.insert(class.qualified_name.clone(), class);
    }

    pub fn find_class(&self, qualified_name: &str) -> Option<&ClassSymbol> {
        self.classes.get(qualified_name)
    }

    pub fn find_class_by_symbol_id(&self, symbol_id: u32) -> Option<&ClassSymbol> {
        self.classes_by_id.get(&symbol_id).and_then(|name| self.classes.get(name))
    }

    pub fn find_class_mut(&mut self, qualified_name: &str) -> Option<&mut ClassSymbol> {
        self.classes.get_mut(qualified_name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassSymbol> {
        self.classes.values()
    }

    pub fn declare_method(&mut self, method: MethodSymbol) {
        log::debug!(target: "glint_compiler::symbol_table", "declared method {}", method.qualified_name);
        self.methods.entry(method.qualified_name.clone()).or_default().push(method);
    }

    /// All overloads registered under exactly this qualified name.
    pub fn find_overloads(&self, qualified_name: &str) -> &[MethodSymbol] {
        self.methods.get(qualified_name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// The first (commonly the only) overload, for call sites that
    /// already know there is exactly one — constructors, destructors,
    /// non-overloaded methods.
    pub fn find_method(&self, qualified_name: &str) -> Option<&MethodSymbol> {
        self.methods.get(qualified_name).and_then(|v| v.first())
    }

    pub fn find_method_mut(&mut self, qualified_name: &str) -> Option<&mut MethodSymbol> {
        self.methods.get_mut(qualified_name).and_then(|v| v.first_mut())
    }

    /// Walks the inheritance chain starting at `class_name`, falling
    /// through to each base's registry entry when the derived class
    /// lacks its own (§4.4). Returns the first overload found.
    pub fn find_method_in_class(&self, class_name: &str, method_name: &str) -> Option<&MethodSymbol> {
        self.find_overloads_in_class(class_name, method_name).first().copied()
    }

    /// Like [`Self::find_method_in_class`] but returns every overload
    /// declared at the nearest ancestor that declares `method_name` at
    /// all — the candidate set overload resolution scores over (§4.5).
    pub fn find_overloads_in_class(&self, class_name: &str, method_name: &str) -> Vec<&MethodSymbol> {
        let mut current = Some(class_name);
        while let Some(name) = current {
            let qualified = format!("{name}.{method_name}");
            let overloads = self.find_overloads(&qualified);
            if !overloads.is_empty() {
                return overloads.iter().collect();
            }
            current = self.classes.get(name).and_then(|c| c.base.as_deref());
        }
        Vec::new()
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodSymbol> {
        self.methods.values().flatten()
    }

    pub fn outstanding_forward_declarations(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .classes
            .values()
            .filter(|c| c.is_forward_declared && !c.is_defined)
            .map(|c| c.qualified_name.clone())
            .collect();
        names.extend(
            self.methods()
                .filter(|m| m.is_forward_declared && !m.is_defined)
                .map(|m| m.qualified_name.clone()),
        );
        names
    }

    pub fn has_unresolved_forward_declarations(&self) -> bool {
        !self.outstanding_forward_declarations().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_ast::TypeId;

    fn dummy_class(table: &mut SymbolTable, name: &str, base: Option<&str>) -> ClassSymbol {
        ClassSymbol {
            symbol_id: table.allocate_symbol_id(),
            name: name.to_string(),
            qualified_name: name.to_string(),
            base: base.map(|b| b.to_string()),
            field_names: Vec::new(),
            base_field_aliases: HashMap::new(),
            virtual_method_order: Vec::new(),
            is_forward_declared: false,
            is_defined: true,
            declared_line: 1,
        }
    }

    #[test]
    fn variable_lookup_prefers_innermost_scope() {
        let mut table = SymbolTable::new();
        table.declare_variable("x", TypeId(0), ValueCategory::LValue);
        table.push_scope();
        table.declare_variable("x", TypeId(1), ValueCategory::LValue);
        assert_eq!(table.find_variable("x").unwrap().0, TypeId(1));
        table.pop_scope();
        assert_eq!(table.find_variable("x").unwrap().0, TypeId(0));
    }

    #[test]
    fn inheritance_flattens_base_fields_first() {
        let mut table = SymbolTable::new();
        let mut base = dummy_class(&mut table, "Animal", None);
        base.field_names.push(FieldInfo {
            name: "name".to_string(),
            ast_type: glint_ast::TypeRef::Error { id: glint_diagnostics::NodeId(0) },
            index: 0,
            declared_in: "Animal".to_string(),
        });
        table.declare_class(base);

        let mut derived = dummy_class(&mut table, "Dog", Some("Animal"));
        derived.field_names.push(FieldInfo {
            name: "breed".to_string(),
            ast_type: glint_ast::TypeRef::Error { id: glint_diagnostics::NodeId(0) },
            index: 0,
            declared_in: "Dog".to_string(),
        });
        table.declare_class(derived);

        let dog = table.find_class("Dog").unwrap();
        assert_eq!(dog.field_index("name"), Some(0));
        assert_eq!(dog.field_index("breed"), Some(1));
        assert_eq!(dog.field_index("Animal.name"), Some(0));
    }

    #[test]
    fn method_lookup_falls_through_to_base() {
        let mut table = SymbolTable::new();
        let animal = dummy_class(&mut table, "Animal", None);
        table.declare_class(animal);
        let dog = dummy_class(&mut table, "Dog", Some("Animal"));
        table.declare_class(dog);
        table.declare_method(MethodSymbol {
            qualified_name: "Animal.speak".to_string(),
            class_name: "Animal".to_string(),
            method_name: "speak".to_string(),
            param_types: Vec::new(),
            return_type: TypeId(0),
            is_static: false,
            is_virtual: true,
            is_override: false,
            is_constructor: false,
            is_destructor: false,
            vtable_slot: Some(0),
            is_forward_declared: false,
            is_defined: true,
            declared_line: 1,
        });
        let found = table.find_method_in_class("Dog", "speak").unwrap();
        assert_eq!(found.qualified_name, "Animal.speak");
    }
}
