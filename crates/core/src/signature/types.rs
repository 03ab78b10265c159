use std::collections::HashMap;

use serde::Serialize;

use super::{ParamShape, ScalarType, compile_type};
use crate::error::RegistryError;

/// Primitive type names, always available and never redefinable.
pub const PRIMITIVE_NAMES: &[&str] = &["string", "int", "float", "bool", "ident", "any"];

const BUILTINS: &[(&str, &[&str])] = &[
    ("Point", &["(int x, int y)"]),
    ("Vector", &["(float x, float y)"]),
    (
        "Rectangle",
        &[
            "(int x, int y, int width, int height)",
            "(Point location, Point size)",
        ],
    ),
    (
        "Color",
        &["(int r, int g, int b)", "(int r, int g, int b, int a)", "ident"],
    ),
];

/// A registered composite type: a closed union of concrete shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDef {
    /// Name as registered.
    pub name: String,
    /// Alternatives in registration order.
    pub shapes: Vec<ParamShape>,
}

/// Named composite types, looked up case-insensitively.
///
/// Shapes are expanded when registered, so a type may only reference
/// primitives and types registered before it.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDef>,
    order: Vec<String>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// A registry holding the built-in `Point`, `Vector`, `Rectangle` and `Color` types.
    pub fn new() -> Self {
        let mut reg = Self::empty();
        for (name, shapes) in BUILTINS {
            // Built-in shape strings are fixed and known to compile.
            if let Err(err) = reg.add(name, shapes) {
                tracing::error!(%err, "built-in type failed to compile");
            }
        }
        reg
    }

    /// A registry with no composite types at all.
    pub fn empty() -> Self {
        Self {
            types: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a composite type from one or more shape strings.
    ///
    /// Each shape is a single type expression: a primitive, a registered
    /// composite, `const LITERAL`, or a parenthesised group.
    pub fn add(&mut self, name: &str, shapes: &[&str]) -> Result<&TypeDef, RegistryError> {
        let key = name.to_ascii_lowercase();
        if ScalarType::from_name(name).is_some()
            || key == "const"
            || self.types.contains_key(&key)
        {
            return Err(RegistryError::DuplicateType(name.to_string()));
        }
        if shapes.is_empty() {
            return Err(RegistryError::EmptyType(name.to_string()));
        }
        let mut expanded = Vec::new();
        for shape in shapes {
            expanded.extend(compile_type(shape, self)?);
        }
        self.order.push(key.clone());
        let def = self.types.entry(key).or_insert(TypeDef {
            name: name.to_string(),
            shapes: expanded,
        });
        Ok(def)
    }

    /// Look up a composite type by name.
    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(&name.to_ascii_lowercase())
    }

    /// Whether a composite type with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Composite types in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDef> {
        self.order.iter().filter_map(|key| self.types.get(key))
    }
}
