//! cmdscript core library.
//!
//! A small compiler front end for line-oriented content scripts. Readers
//! register commands with overload signatures, then feed scripts through the
//! interpreter: each line is tokenized, parsed into an untyped argument tree,
//! matched against the command's overloads (first match wins), and handed to
//! the command's callback, which reads typed values back out and may open or
//! close scopes. The main entry points are [`Interpreter`] for registration
//! and [`Interpreter::read_str`] for running scripts.

#![warn(missing_docs)]

/// Typed accessors over bound argument trees.
pub mod access;
/// Reader configuration.
pub mod config;
/// Registration, resource, and script error types.
pub mod error;
/// Script grammar: lexer, parser, argument tree, emitter.
pub mod grammar;
/// The interpreter: registration API and per-line dispatch.
pub mod interpreter;
/// Declarative command sets loaded from JSON.
pub mod manifest;
/// Whole-script reads.
pub mod reader;
/// Command definitions.
pub mod registry;
/// Overload resolution.
pub mod resolve;
/// Name-keyed table of typed resources.
pub mod resource;
/// Modes and the scope stack.
pub mod scope;
/// Signature compiler and composite types.
pub mod signature;
/// Splitting script text into logical lines.
pub mod source;

// ── Convenience re-exports ──────────────────────────────────────────────────
// Flat imports for the most common entry points. The full module paths
// remain available for less common types.

// Parser
pub use grammar::parser::{parse_args, parse_line, parse_line_with};

// Argument tree
pub use grammar::ast::{CommandParam, Invocation, ParamValue, PrimitiveKind};

// Emitter
pub use grammar::emit::{emit_args, emit_invocation, emit_param, strip_spans};

// Diagnostics (re-exported from the diagnostics crate)
pub use grammar::diag::{Diagnostic, ErrorClass, Severity, Span, codes};

// Interpreter
pub use access::{Color, Point, Rect, ScriptEnum, Vector};
pub use config::ReaderConfig;
pub use error::{RegistryError, ResourceError, ScriptError};
pub use interpreter::{Call, Interpreter, Session};
pub use manifest::Manifest;
pub use reader::ReadSummary;
pub use resource::ResourceTable;
pub use scope::{ModeSet, Transition};
pub use signature::{CommandSignature, ParamSpec, TypeRegistry};

// Serialization helpers
pub use grammar::dump::to_pretty_json;
