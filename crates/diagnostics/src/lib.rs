//! Diagnostics for cmdscript.
//!
//! Provides [`Diagnostic`], [`Severity`], [`ErrorClass`], [`Span`], and
//! [`LineIndex`] types used to report failures from the tokenizer, the
//! argument parser, overload resolution, and command callbacks. Diagnostic
//! codes are defined in the [`codes`] module.

#![warn(missing_docs)]

/// Diagnostic ID constants grouped by error class.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
///
/// ```
/// let ctx = cmdscript_diagnostics::ctx!("command" => "SPRITE", "arg" => "0");
/// assert_eq!(ctx.len(), 2);
/// ```
#[macro_export]
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        ::std::collections::BTreeMap::<String, String>::from([$(($k.into(), $v.into())),+])
    };
}

// ── Line positions ──────────────────────────────────────────────────────

/// Line table for a script: turns byte offsets into the 1-based
/// `line:column` pairs shown to script authors.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Offset of the first byte of every line; the first entry is 0.
    starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    /// Index the line breaks of `text`.
    pub fn new(text: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            starts,
            len: text.len(),
        }
    }

    /// 1-based line and byte column of `offset`, clamped to the text.
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.len);
        let line = self.starts.partition_point(|&s| s <= offset).saturating_sub(1);
        (line + 1, offset - self.starts[line] + 1)
    }

    /// Bytes of the 1-based `line`, excluding its `\n`.
    pub fn line_span(&self, line: usize) -> Option<Span> {
        let start = *self.starts.get(line.checked_sub(1)?)?;
        let end = self.starts.get(line).map_or(self.len, |next| next - 1);
        Some(Span::new(start, end))
    }

    /// Number of lines; an empty script still has one.
    pub fn lines(&self) -> usize {
        self.starts.len()
    }
}

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Severity {
    /// Hard error; the script read is aborted.
    Error,
    /// Warning; reported but not fatal.
    Warn,
    /// Informational note.
    Info,
}

/// Which stage of interpretation a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorClass {
    /// Tokenizer and argument tree failures (bad quoting, parentheses, numbers).
    Lexical,
    /// Dispatch failures: unknown command, no matching overload, wrong mode.
    Structural,
    /// Failures raised by command callbacks and typed accessors.
    Semantic,
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorClass::Lexical => write!(f, "lexical"),
            ErrorClass::Structural => write!(f, "structural"),
            ErrorClass::Semantic => write!(f, "semantic"),
        }
    }
}

/// Half-open byte range `[start, end)` into a script.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Span {
    /// First byte.
    pub start: usize,
    /// One past the last byte.
    pub end: usize,
}

impl Span {
    /// Span from `start` to `end`. Panics when the range is reversed.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "reversed span {start}..{end}");
        Self { start, end }
    }

    /// Zero-width span, used to anchor filled-in defaults and missing arguments.
    pub fn empty(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn join(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Move the span right by `offset` bytes.
    pub fn shifted(self, offset: usize) -> Span {
        Span {
            start: self.start + offset,
            end: self.end + offset,
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span is zero-width.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A diagnostic produced while interpreting a script line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Code from [`codes`] (`"CMD2002"`), or a reader-defined id.
    pub id: Cow<'static, str>,
    /// Severity level.
    pub severity: Severity,
    /// Message for the script author.
    pub message: String,
    /// Absolute byte range in the script, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// Structured details (command, expected kind, current mode), sorted by key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl Diagnostic {
    /// Diagnostic without context.
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        severity: Severity,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            message: message.into(),
            span,
            context: None,
        }
    }

    /// An [`Severity::Error`] diagnostic.
    pub fn error(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Error, message, span)
    }

    /// A [`Severity::Warn`] diagnostic.
    pub fn warn(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Warn, message, span)
    }

    /// Replace the context map.
    pub fn with_context(mut self, ctx: BTreeMap<String, String>) -> Self {
        self.context = Some(ctx);
        self
    }

    /// Add a single context entry, creating the map if needed.
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Attach a span if the diagnostic has none yet.
    pub fn or_span(mut self, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }

    /// The error class of this diagnostic's code.
    ///
    /// Unknown codes are treated as semantic, since only callbacks invent them.
    pub fn class(&self) -> ErrorClass {
        codes::class_of(&self.id).unwrap_or(ErrorClass::Semantic)
    }

    /// Long-form explanation of this diagnostic's code.
    pub fn explain(&self) -> Option<&'static str> {
        explain(&self.id)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.id, self.message)
    }
}

impl std::error::Error for Diagnostic {}

/// Long-form explanation of `id`, for `cmds explain` and help notes.
pub fn explain(id: &str) -> Option<&'static str> {
    codes::explanation(id)
}
