//! Compiled command signatures.
//!
//! Signature strings such as `string name, Point at, Point offset = (0, 0)`
//! are compiled once, at registration time, into [`CommandSignature`]s whose
//! parameters carry only concrete [`ParamShape`]s. Composite type names are
//! expanded to one signature per alternative shape, so overload resolution
//! never has to look a type up.

mod compiler;
mod types;

pub use compiler::{compile_signature, compile_type};
pub use types::{PRIMITIVE_NAMES, TypeDef, TypeRegistry};

use serde::Serialize;

use crate::grammar::ast::{CommandParam, PrimitiveKind};
use crate::grammar::emit::emit_param;

/// Scalar parameter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    /// Any scalar; read back as raw text.
    String,
    /// Integer literal.
    Int,
    /// Integer or float literal.
    Float,
    /// `true` / `false`.
    Bool,
    /// Bare identifier (enum member, constant, resource name).
    Ident,
    /// Any node, scalar or array.
    Any,
}

impl ScalarType {
    /// Look up a primitive type name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let t = match name.to_ascii_lowercase().as_str() {
            "string" => ScalarType::String,
            "int" => ScalarType::Int,
            "float" => ScalarType::Float,
            "bool" => ScalarType::Bool,
            "ident" => ScalarType::Ident,
            "any" => ScalarType::Any,
            _ => return None,
        };
        Some(t)
    }

    fn accepts(self, node: &CommandParam) -> bool {
        let Some(kind) = node.primitive() else {
            return self == ScalarType::Any;
        };
        match self {
            ScalarType::String | ScalarType::Any => true,
            ScalarType::Int => kind == PrimitiveKind::Integer,
            ScalarType::Float => matches!(kind, PrimitiveKind::Integer | PrimitiveKind::Float),
            ScalarType::Bool => kind == PrimitiveKind::Boolean,
            ScalarType::Ident => kind == PrimitiveKind::Identifier,
        }
    }
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarType::String => write!(f, "string"),
            ScalarType::Int => write!(f, "int"),
            ScalarType::Float => write!(f, "float"),
            ScalarType::Bool => write!(f, "bool"),
            ScalarType::Ident => write!(f, "ident"),
            ScalarType::Any => write!(f, "any"),
        }
    }
}

/// Concrete argument shape a parameter accepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum ParamShape {
    /// A single literal of the given type.
    Scalar {
        /// Accepted scalar type.
        #[serde(rename = "type")]
        ty: ScalarType,
    },
    /// A required literal token, matched case-insensitively (`const none`).
    Const {
        /// Literal text.
        literal: String,
    },
    /// A parenthesised group; the last element may be variadic.
    Tuple {
        /// Element parameters in order.
        elements: Vec<ParamSpec>,
    },
    /// Any of a composite type's shapes. Only variadic parameters use it, so
    /// each element of the tail may pick a different alternative.
    OneOf {
        /// Alternatives in declaration order.
        alternatives: Vec<ParamShape>,
    },
}

impl ParamShape {
    /// Whether `node` is structurally compatible with this shape.
    ///
    /// Only lexical kind and nesting/arity are checked; value domains are
    /// left to the typed accessors.
    pub fn accepts(&self, node: &CommandParam) -> bool {
        match self {
            ParamShape::Scalar { ty } => ty.accepts(node),
            ParamShape::Const { literal } => node
                .text()
                .is_some_and(|text| text.eq_ignore_ascii_case(literal)),
            ParamShape::Tuple { elements } => {
                if !node.is_array() {
                    return false;
                }
                let kids = node.children();
                match elements.split_last() {
                    Some((last, fixed)) if last.variadic => {
                        kids.len() >= fixed.len()
                            && fixed.iter().zip(kids).all(|(e, k)| e.shape.accepts(k))
                            && kids[fixed.len()..].iter().all(|k| last.shape.accepts(k))
                    }
                    _ => {
                        kids.len() == elements.len()
                            && elements.iter().zip(kids).all(|(e, k)| e.shape.accepts(k))
                    }
                }
            }
            ParamShape::OneOf { alternatives } => alternatives.iter().any(|a| a.accepts(node)),
        }
    }
}

impl std::fmt::Display for ParamShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamShape::Scalar { ty } => write!(f, "{ty}"),
            ParamShape::Const { literal } => write!(f, "const {literal}"),
            ParamShape::Tuple { elements } => {
                f.write_str("(")?;
                for (i, e) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{e}")?;
                }
                f.write_str(")")
            }
            ParamShape::OneOf { alternatives } => {
                for (i, alt) in alternatives.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{alt}")?;
                }
                Ok(())
            }
        }
    }
}

/// One declared parameter of a compiled signature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSpec {
    /// Type name as written (`int`, `Point`, `Sprite`, `const`).
    pub type_name: String,
    /// Parameter name, bound onto matching argument nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Concrete shape after composite expansion.
    pub shape: ParamShape,
    /// Literal used when the argument is omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<CommandParam>,
    /// May be omitted without a default (`int count?`).
    pub optional: bool,
    /// Consumes all remaining sibling arguments (`int frames...`).
    ///
    /// A variadic composite (`Color tints...`) keeps every alternative in a
    /// [`ParamShape::OneOf`], so the tail may mix them (`(1, 2, 3), red`).
    pub variadic: bool,
}

impl ParamSpec {
    /// Whether the parameter can be left out of an invocation.
    pub fn is_omittable(&self) -> bool {
        self.optional || self.variadic || self.default.is_some()
    }
}

impl std::fmt::Display for ParamSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.shape)?;
        if let Some(name) = &self.name {
            write!(f, " {name}")?;
        }
        if self.variadic {
            f.write_str("...")?;
        }
        if self.optional {
            f.write_str("?")?;
        }
        if let Some(default) = &self.default {
            write!(f, " = {}", emit_param(default))?;
        }
        Ok(())
    }
}

/// One concrete overload: an ordered parameter list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandSignature {
    /// Parameters in declaration order.
    pub params: Vec<ParamSpec>,
    /// The signature string this overload was compiled from.
    pub source: String,
}

impl CommandSignature {
    /// Number of parameters that must be supplied.
    pub fn required_count(&self) -> usize {
        self.params.iter().filter(|p| !p.is_omittable()).count()
    }
}

impl std::fmt::Display for CommandSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{p}")?;
        }
        Ok(())
    }
}
