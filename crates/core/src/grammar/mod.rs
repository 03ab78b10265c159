/// Argument tree types: `CommandParam`, `Invocation`.
pub mod ast;
/// Re-exports from the diagnostics crate.
pub mod diag;
/// JSON serialization helpers for parsed invocations.
pub mod dump;
/// Canonical emitter: converts argument trees back to script text.
pub mod emit;
/// Tokenizer: splits one script line into borrowed tokens.
pub mod lexer;
/// Recursive-descent argument tree parser.
pub mod parser;
