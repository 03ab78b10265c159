use serde::{Deserialize, Serialize};

use super::diag::Span;

/// Lexical kind of a scalar argument, fixed at parse time.
///
/// Accessors may convert representation (`"12"` text to `12i32`) but never
/// reinterpret the kind: a `String` node is never read as an `Integer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    /// Double-quoted text.
    String,
    /// Optionally signed decimal digits.
    Integer,
    /// Numeric text with a decimal point, exponent, or trailing `f`.
    Float,
    /// `true` / `false`.
    Boolean,
    /// Any other bare word (`none`, enum members, resource names).
    Identifier,
}

impl std::fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimitiveKind::String => write!(f, "string"),
            PrimitiveKind::Integer => write!(f, "int"),
            PrimitiveKind::Float => write!(f, "float"),
            PrimitiveKind::Boolean => write!(f, "bool"),
            PrimitiveKind::Identifier => write!(f, "ident"),
        }
    }
}

/// Payload of a [`CommandParam`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ParamValue {
    /// A single literal.
    Scalar {
        /// Kind inferred from the literal's lexical shape.
        primitive: PrimitiveKind,
        /// Literal text (string contents without quotes).
        text: String,
    },
    /// A parenthesised group, or the synthetic tail bound to a variadic parameter.
    Array {
        /// Ordered children.
        children: Vec<CommandParam>,
    },
}

/// A node of the argument tree for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandParam {
    /// Scalar literal or nested array.
    #[serde(flatten)]
    pub value: ParamValue,
    /// Parameter name assigned by the matched signature, if bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Source span of the literal or of the whole parenthesised group.
    #[serde(default)]
    pub span: Span,
}

impl CommandParam {
    /// Build an unnamed scalar node.
    pub fn scalar(primitive: PrimitiveKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            value: ParamValue::Scalar {
                primitive,
                text: text.into(),
            },
            name: None,
            span,
        }
    }

    /// Build an unnamed array node.
    pub fn array(children: Vec<CommandParam>, span: Span) -> Self {
        Self {
            value: ParamValue::Array { children },
            name: None,
            span,
        }
    }

    /// Set the bound name (builder style).
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether this node is an array.
    pub fn is_array(&self) -> bool {
        matches!(self.value, ParamValue::Array { .. })
    }

    /// Children of an array node; empty for scalars.
    pub fn children(&self) -> &[CommandParam] {
        match &self.value {
            ParamValue::Array { children } => children,
            ParamValue::Scalar { .. } => &[],
        }
    }

    /// Primitive kind of a scalar node.
    pub fn primitive(&self) -> Option<PrimitiveKind> {
        match &self.value {
            ParamValue::Scalar { primitive, .. } => Some(*primitive),
            ParamValue::Array { .. } => None,
        }
    }

    /// Literal text of a scalar node.
    pub fn text(&self) -> Option<&str> {
        match &self.value {
            ParamValue::Scalar { text, .. } => Some(text),
            ParamValue::Array { .. } => None,
        }
    }

    /// Compact description of the node's shape, e.g. `(string, (int, int))`.
    pub fn shape(&self) -> String {
        match &self.value {
            ParamValue::Scalar { primitive, .. } => primitive.to_string(),
            ParamValue::Array { children } => {
                let inner: Vec<String> = children.iter().map(CommandParam::shape).collect();
                format!("({})", inner.join(", "))
            }
        }
    }

    /// Set every span in the subtree to `span`.
    pub fn relocate(&mut self, span: Span) {
        self.span = span;
        if let ParamValue::Array { children } = &mut self.value {
            for child in children {
                child.relocate(span);
            }
        }
    }
}

/// One parsed script line: `PREFIX* COMMAND args`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    /// Modifier words that preceded the command name (e.g. `CONTINUE`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefixes: Vec<String>,
    /// Command name as written.
    pub command: String,
    /// Span of the command name.
    pub command_span: Span,
    /// Top-level arguments as an array node.
    pub args: CommandParam,
    /// Span of the whole invocation.
    pub span: Span,
}
