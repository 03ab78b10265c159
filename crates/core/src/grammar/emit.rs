//! Canonical emitter: converts argument trees back into script text.
//!
//! Output is normalized: one space between prefixes, the command name, and
//! its first argument; `", "` between siblings; arrays wrapped in `( )`.
//! Scalar text is reproduced verbatim, so `parse(emit(tree))` yields a tree
//! with the same shapes and values.

use crate::grammar::ast::{CommandParam, Invocation, ParamValue, PrimitiveKind};
use crate::grammar::diag::Span;

/// Emit one argument node.
pub fn emit_param(param: &CommandParam) -> String {
    let mut out = String::new();
    write_param(&mut out, param);
    out
}

/// Emit the children of a root array as a comma-separated argument list.
pub fn emit_args(root: &CommandParam) -> String {
    let mut out = String::new();
    write_list(&mut out, root.children());
    out
}

/// Emit a whole invocation: `PREFIX COMMAND arg, (arg, arg)`.
pub fn emit_invocation(inv: &Invocation) -> String {
    let mut out = String::new();
    for prefix in &inv.prefixes {
        out.push_str(prefix);
        out.push(' ');
    }
    out.push_str(&inv.command);
    if !inv.args.children().is_empty() {
        out.push(' ');
        write_list(&mut out, inv.args.children());
    }
    out
}

fn write_list(out: &mut String, items: &[CommandParam]) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_param(out, item);
    }
}

fn write_param(out: &mut String, param: &CommandParam) {
    match &param.value {
        ParamValue::Scalar {
            primitive: PrimitiveKind::String,
            text,
        } => {
            out.push('"');
            out.push_str(text);
            out.push('"');
        }
        ParamValue::Scalar { text, .. } => out.push_str(text),
        ParamValue::Array { children } => {
            out.push('(');
            write_list(out, children);
            out.push(')');
        }
    }
}

/// Return a copy of the tree with spans zeroed and bound names removed.
///
/// Used to compare trees for structural equality across re-formatting.
pub fn strip_spans(param: &CommandParam) -> CommandParam {
    let value = match &param.value {
        ParamValue::Scalar { primitive, text } => ParamValue::Scalar {
            primitive: *primitive,
            text: text.clone(),
        },
        ParamValue::Array { children } => ParamValue::Array {
            children: children.iter().map(strip_spans).collect(),
        },
    };
    CommandParam {
        value,
        name: None,
        span: Span::default(),
    }
}
