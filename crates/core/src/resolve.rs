//! Overload resolution: pick the first signature that fits an invocation.
//!
//! Candidates are tried strictly in declaration order and the first
//! structural match wins. There is no scoring, so a bare `5` given to a
//! command declared `int x` then `string x` binds the `int` overload, and
//! swapping the declarations changes the outcome. Overloads must be
//! registered most specific first.
//!
//! The quoted form `"5"` is not order sensitive: it parses as a String node,
//! node kinds are never reinterpreted, and `int` only accepts Integer nodes,
//! so it binds `string x` whichever overload comes first. The bare literal is
//! the ambiguous case (`bare_number_binds_int_when_int_is_declared_first` and
//! `swapping_declaration_order_changes_the_winner` in `tests/overloads.rs`).

use crate::grammar::ast::{CommandParam, Invocation, ParamValue};
use crate::grammar::diag::{Diagnostic, Span, codes};
use crate::signature::{CommandSignature, ParamShape, ParamSpec};

/// A successful match.
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    /// Index of the winning candidate in the list passed to [`resolve`].
    pub overload: usize,
    /// Root array of bound arguments: named, defaults filled, variadic tail grouped.
    pub args: CommandParam,
}

/// Match `inv` against `candidates` in order.
///
/// On failure the diagnostic names the command, the argument shape, and every
/// candidate with the reason it was rejected.
pub fn resolve(inv: &Invocation, candidates: &[&CommandSignature]) -> Result<Bound, Diagnostic> {
    let anchor = Span::empty(inv.span.end);
    let mut rejections = Vec::with_capacity(candidates.len());
    for (overload, sig) in candidates.iter().enumerate() {
        match match_signature(sig, inv.args.children(), anchor) {
            Ok(children) => {
                let args = CommandParam::array(children, inv.args.span);
                return Ok(Bound { overload, args });
            }
            Err(reason) => {
                tracing::trace!(command = %inv.command, overload, %reason, "overload rejected");
                rejections.push(reason);
            }
        }
    }

    let shape = inv.args.shape();
    let mut message = format!("no overload of `{}` accepts {shape}", inv.command);
    for (sig, reason) in candidates.iter().zip(&rejections) {
        message.push_str(&format!("\n  {} {sig}  ({reason})", inv.command));
    }
    let span = if inv.args.children().is_empty() {
        inv.command_span
    } else {
        inv.args.span
    };
    Err(
        Diagnostic::error(codes::NO_MATCHING_SIGNATURE, message, Some(span)).with_context(
            crate::grammar::diag::ctx!(
                "command" => inv.command.as_str(),
                "shape" => shape,
                "candidates" => candidates.len().to_string(),
            ),
        ),
    )
}

/// Match one signature against top-level arguments.
///
/// Returns the bound children, or a short reason for the rejection.
pub fn match_signature(
    sig: &CommandSignature,
    args: &[CommandParam],
    anchor: Span,
) -> Result<Vec<CommandParam>, String> {
    let mut bound = Vec::with_capacity(sig.params.len());
    let mut rest = args;
    for (i, spec) in sig.params.iter().enumerate() {
        if spec.variadic {
            if let Some((k, arg)) = rest.iter().enumerate().find(|(_, a)| !spec.shape.accepts(a)) {
                return Err(mismatch(i + k, spec, arg));
            }
            bound.push(variadic_tail(spec, rest, anchor));
            rest = &[];
            break;
        }
        match rest.split_first() {
            Some((arg, tail)) => {
                if !spec.shape.accepts(arg) {
                    return Err(mismatch(i, spec, arg));
                }
                bound.push(bind(arg.clone(), spec));
                rest = tail;
            }
            None => match &spec.default {
                Some(default) => {
                    let mut node = default.clone();
                    node.relocate(anchor);
                    bound.push(bind(node, spec));
                }
                None if spec.optional => {}
                None => return Err(format!("missing argument {} ({spec})", i + 1)),
            },
        }
    }
    if !rest.is_empty() {
        return Err(format!(
            "{} extra argument{}",
            rest.len(),
            if rest.len() == 1 { "" } else { "s" }
        ));
    }
    Ok(bound)
}

fn mismatch(i: usize, spec: &ParamSpec, arg: &CommandParam) -> String {
    format!("argument {}: expected {}, found {}", i + 1, spec.shape, arg.shape())
}

fn variadic_tail(spec: &ParamSpec, rest: &[CommandParam], anchor: Span) -> CommandParam {
    let span = match (rest.first(), rest.last()) {
        (Some(first), Some(last)) => first.span.join(last.span),
        _ => anchor,
    };
    let children = rest.iter().map(|a| bind(a.clone(), spec)).collect();
    let tail = CommandParam::array(children, span);
    match &spec.name {
        Some(name) => tail.named(name.clone()),
        None => tail,
    }
}

/// Name `node` after `spec`, recursing into tuple elements.
fn bind(mut node: CommandParam, spec: &ParamSpec) -> CommandParam {
    if let Some(name) = &spec.name {
        node.name = Some(name.clone());
    }
    bind_elements(node, &spec.shape)
}

fn bind_elements(mut node: CommandParam, shape: &ParamShape) -> CommandParam {
    match shape {
        ParamShape::OneOf { alternatives } => {
            match alternatives.iter().find(|alt| alt.accepts(&node)) {
                Some(alt) => bind_elements(node, alt),
                None => node,
            }
        }
        ParamShape::Tuple { elements } => {
            if let ParamValue::Array { children } = &mut node.value {
                *children = std::mem::take(children)
                    .into_iter()
                    .enumerate()
                    .map(|(i, child)| {
                        match elements.get(i).or_else(|| elements.last().filter(|e| e.variadic)) {
                            Some(element) => bind(child, element),
                            None => child,
                        }
                    })
                    .collect();
            }
            node
        }
        ParamShape::Scalar { .. } | ParamShape::Const { .. } => node,
    }
}
