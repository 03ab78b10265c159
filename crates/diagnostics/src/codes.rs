//! Diagnostic ID constants.
//!
//! Codes are grouped by [`ErrorClass`]: `CMD1xxx` are lexical, `CMD2xxx`
//! structural and `CMD3xxx` semantic. Use these instead of string literals
//! to get compile-time typo detection.

use crate::ErrorClass;

// ── Lexical ─────────────────────────────────────────────────────────────

/// A string literal is missing its closing quote.
pub const UNTERMINATED_STRING: &str = "CMD1001";
/// A `)` has no matching `(`, or a `(` is never closed.
pub const UNBALANCED_PAREN: &str = "CMD1002";
/// A character that cannot start any token.
pub const UNEXPECTED_CHAR: &str = "CMD1003";
/// A numeric literal that is neither an integer nor a float.
pub const MALFORMED_NUMBER: &str = "CMD1004";
/// An argument list is syntactically malformed (empty slot, stray token).
pub const EXPECTED_ARGUMENT: &str = "CMD1005";
/// Parenthesised arguments nest deeper than the configured limit.
pub const NESTING_TOO_DEEP: &str = "CMD1006";
/// A line has arguments but no command name.
pub const MISSING_COMMAND: &str = "CMD1007";

// ── Structural ──────────────────────────────────────────────────────────

/// No command is registered under the invoked name.
pub const UNKNOWN_COMMAND: &str = "CMD2001";
/// The arguments match none of the command's signatures.
pub const NO_MATCHING_SIGNATURE: &str = "CMD2002";
/// The command is not valid in the current mode.
pub const MODE_MISMATCH: &str = "CMD2003";
/// A scope was opened inside a parent it may not nest in.
pub const ILLEGAL_NESTING: &str = "CMD2004";
/// A command tried to close a scope that is not open.
pub const NO_SCOPE_TO_CLOSE: &str = "CMD2005";
/// The script ended while scopes were still open.
pub const UNCLOSED_SCOPE: &str = "CMD2006";

// ── Semantic ────────────────────────────────────────────────────────────

/// An argument node has the wrong kind for the requested accessor.
pub const ARG_KIND_MISMATCH: &str = "CMD3001";
/// An accessor index is past the end of the argument list.
pub const ARG_INDEX_OUT_OF_RANGE: &str = "CMD3002";
/// A value lies outside the domain of the requested type.
pub const VALUE_OUT_OF_RANGE: &str = "CMD3003";
/// An identifier does not name a member of the requested enumeration.
pub const INVALID_ENUM: &str = "CMD3004";
/// A referenced resource does not exist.
pub const RESOURCE_MISSING: &str = "CMD3005";
/// A resource name is already bound to a different value.
pub const RESOURCE_DUPLICATE: &str = "CMD3006";
/// A resource exists but holds a different type.
pub const RESOURCE_TYPE_MISMATCH: &str = "CMD3007";
/// A command callback rejected its arguments.
pub const COMMAND_FAILED: &str = "CMD3008";

/// Every known code with its summary line and long explanation.
const TABLE: &[(&str, &str, &str)] = &[
    (
        UNTERMINATED_STRING,
        "unterminated string literal",
        "A string literal opened with `\"` reaches the end of the line without a closing quote. Strings cannot span lines.",
    ),
    (
        UNBALANCED_PAREN,
        "unbalanced parentheses",
        "Every `(` in an argument list must be closed by a `)` on the same line, and every `)` must close an open `(`.",
    ),
    (
        UNEXPECTED_CHAR,
        "unexpected character",
        "The character cannot start an identifier, number, string, or punctuation token.",
    ),
    (
        MALFORMED_NUMBER,
        "malformed number",
        "Numbers are integers (`-12`) or floats (`1.5`, `2e3`, `0.5f`). Anything else that starts like a number is rejected.",
    ),
    (
        EXPECTED_ARGUMENT,
        "malformed argument list",
        "Arguments are separated by single commas. Empty slots (`a,,b`), trailing commas, and stray `=` or `...` tokens are not allowed.",
    ),
    (
        NESTING_TOO_DEEP,
        "arguments nested too deeply",
        "Parenthesised argument groups nest deeper than the reader's configured `max_depth`.",
    ),
    (
        MISSING_COMMAND,
        "missing command name",
        "Each line must start with a command name (optionally preceded by prefixes such as `CONTINUE`).",
    ),
    (
        UNKNOWN_COMMAND,
        "unknown command",
        "No command with this name is registered with the reader. Command names are case-insensitive.",
    ),
    (
        NO_MATCHING_SIGNATURE,
        "no matching signature",
        "The argument shapes match none of the command's registered overloads. Overloads are tried in declaration order and the first structural match wins.",
    ),
    (
        MODE_MISMATCH,
        "command not valid in the current mode",
        "The command is only dispatchable inside certain scopes (for example inside a sprite block). Open the required scope first.",
    ),
    (
        ILLEGAL_NESTING,
        "illegal scope nesting",
        "The scope this command opens may not be nested inside the currently open scope.",
    ),
    (
        NO_SCOPE_TO_CLOSE,
        "no scope to close",
        "The command closes a scope that is not currently open.",
    ),
    (
        UNCLOSED_SCOPE,
        "unclosed scope at end of script",
        "The script ended while a scope opened earlier was still open, and the reader requires every scope to be closed.",
    ),
    (
        ARG_KIND_MISMATCH,
        "argument has the wrong kind",
        "The command asked for a value of one type but the argument was written as another (for example a string where an integer was expected).",
    ),
    (
        ARG_INDEX_OUT_OF_RANGE,
        "argument index out of range",
        "The command read an argument position that was not supplied.",
    ),
    (
        VALUE_OUT_OF_RANGE,
        "value out of range",
        "The value is syntactically valid but outside the allowed domain (for example a color channel above 255, or an alpha other than 0 or 255).",
    ),
    (
        INVALID_ENUM,
        "invalid enumeration value",
        "The identifier does not name any member of the expected enumeration. The message lists the accepted names.",
    ),
    (
        RESOURCE_MISSING,
        "unknown resource",
        "The argument refers to a named resource that has not been defined earlier in the script.",
    ),
    (
        RESOURCE_DUPLICATE,
        "duplicate resource name",
        "A resource with this name is already defined with a different value.",
    ),
    (
        RESOURCE_TYPE_MISMATCH,
        "resource has the wrong type",
        "The named resource exists but is of a different kind than the command expects.",
    ),
    (
        COMMAND_FAILED,
        "command rejected its arguments",
        "The command's handler reported a domain error for otherwise well-formed arguments.",
    ),
];

/// Returns the error class a code belongs to, derived from its numeric range.
pub fn class_of(id: &str) -> Option<ErrorClass> {
    let digits = id.strip_prefix("CMD")?;
    match digits.as_bytes().first()? {
        b'1' => Some(ErrorClass::Lexical),
        b'2' => Some(ErrorClass::Structural),
        b'3' => Some(ErrorClass::Semantic),
        _ => None,
    }
}

/// Returns the one-line summary for a code, if known.
pub fn summary(id: &str) -> Option<&'static str> {
    TABLE.iter().find(|(code, ..)| *code == id).map(|(_, s, _)| *s)
}

/// Returns the long explanation for a code, if known.
pub fn explanation(id: &str) -> Option<&'static str> {
    TABLE.iter().find(|(code, ..)| *code == id).map(|(.., e)| *e)
}

/// All known codes, in numeric order.
pub fn all() -> impl Iterator<Item = &'static str> {
    TABLE.iter().map(|(code, ..)| *code)
}
