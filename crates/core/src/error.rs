//! Typed error types for registration, resources, and script reads.

use std::io;
use std::path::PathBuf;

use crate::grammar::diag::{Diagnostic, ErrorClass, LineIndex, codes};
use crate::source::BOM;

/// Failures raised while building an interpreter.
///
/// These are programmer errors: a malformed signature or manifest is caught
/// at construction time, never while a script is being read.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    // -- Signatures --
    /// A signature or type-shape string could not be parsed.
    #[error("malformed signature `{signature}` at offset {offset}: {reason}")]
    MalformedSignature {
        /// The offending signature text.
        signature: String,
        /// Byte offset of the problem within `signature`.
        offset: usize,
        /// What went wrong.
        reason: String,
    },

    /// A signature referenced a type that is neither primitive nor registered.
    #[error("unknown type `{name}` in signature `{signature}`")]
    UnknownType {
        /// The signature text.
        signature: String,
        /// The unresolved type name.
        name: String,
    },

    /// A default literal does not fit its parameter's declared type.
    #[error("default for `{param}` in `{signature}` does not fit: {reason}")]
    InvalidDefault {
        /// The signature text.
        signature: String,
        /// Parameter name (or type, when unnamed).
        param: String,
        /// What went wrong.
        reason: String,
    },

    // -- Types --
    /// A composite type name was registered twice, or shadows a primitive.
    #[error("type `{0}` is already defined")]
    DuplicateType(String),

    /// A composite type was registered without any shapes.
    #[error("type `{0}` needs at least one shape")]
    EmptyType(String),

    // -- Modes --
    /// All mode bits are in use.
    #[error("too many modes (at most {max} named modes)")]
    TooManyModes {
        /// Number of definable modes.
        max: usize,
    },

    /// A mode name was defined twice.
    #[error("mode `{0}` is already defined")]
    DuplicateMode(String),

    /// A mode name was used before being defined.
    #[error("unknown mode `{0}`")]
    UnknownMode(String),

    // -- Commands --
    /// A command was registered with no signatures.
    #[error("command `{0}` needs at least one signature")]
    NoSignatures(String),

    /// A command or prefix name is not a valid identifier.
    #[error("invalid name `{0}`")]
    InvalidName(String),

    // -- Manifests --
    /// The manifest could not be read.
    #[error("failed to read manifest {path}: {source}")]
    ManifestIo {
        /// Manifest path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The manifest is not valid JSON for the expected schema.
    #[error("invalid manifest JSON: {0}")]
    ManifestJson(#[from] serde_json::Error),

    /// The manifest is well-formed JSON but inconsistent.
    #[error("invalid manifest: {0}")]
    Manifest(String),
}

/// Resource table failures.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    /// No resource with that name exists.
    #[error("resource `{name}` is not defined")]
    Missing {
        /// Requested name.
        name: String,
    },

    /// The name is already bound to a different value.
    #[error("resource `{name}` is already defined")]
    Duplicate {
        /// Conflicting name.
        name: String,
    },

    /// The resource exists but holds another type.
    #[error("resource `{name}` is a {found}, not a {expected}")]
    TypeMismatch {
        /// Requested name.
        name: String,
        /// Requested type.
        expected: &'static str,
        /// Stored type.
        found: &'static str,
    },
}

impl From<ResourceError> for Diagnostic {
    fn from(err: ResourceError) -> Self {
        let (code, name) = match &err {
            ResourceError::Missing { name } => (codes::RESOURCE_MISSING, name.clone()),
            ResourceError::Duplicate { name } => (codes::RESOURCE_DUPLICATE, name.clone()),
            ResourceError::TypeMismatch { name, .. } => {
                (codes::RESOURCE_TYPE_MISMATCH, name.clone())
            }
        };
        Diagnostic::error(code, err.to_string(), None).with_entry("resource", name)
    }
}

/// A script read aborted.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// The script file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Script path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A line failed to tokenize, parse, dispatch, or run.
    #[error("{path}:{line}:{column}: {diagnostic}")]
    Located {
        /// Script path (or a label such as `<stdin>`).
        path: String,
        /// 1-based line number.
        line: usize,
        /// 1-based column (in bytes).
        column: usize,
        /// The full source line containing the fault.
        snippet: String,
        /// The underlying diagnostic; its span is absolute within the script.
        diagnostic: Box<Diagnostic>,
    },
}

impl ScriptError {
    /// Attach file position and snippet to a diagnostic raised while reading `src`.
    pub fn locate(path: impl Into<String>, src: &str, diagnostic: Diagnostic) -> Self {
        let index = LineIndex::new(src);
        let (line, column) = index.position(diagnostic.span.map_or(0, |s| s.start));
        let text = index
            .line_span(line)
            .and_then(|s| src.get(s.start..s.end))
            .unwrap_or_default()
            .trim_end_matches('\r');
        // Columns on the first line do not count a byte order mark.
        let (snippet, column) = match text.strip_prefix(BOM) {
            Some(rest) if line == 1 => (rest, column.saturating_sub(BOM.len_utf8()).max(1)),
            _ => (text, column),
        };
        let snippet = snippet.to_string();
        ScriptError::Located {
            path: path.into(),
            line,
            column,
            snippet,
            diagnostic: Box::new(diagnostic),
        }
    }

    /// The diagnostic behind a located error.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            ScriptError::Located { diagnostic, .. } => Some(diagnostic),
            ScriptError::Io { .. } => None,
        }
    }

    /// Error class of a located error.
    pub fn class(&self) -> Option<ErrorClass> {
        self.diagnostic().map(Diagnostic::class)
    }

    /// Render as a compiler-style message with a caret under the fault.
    ///
    /// ```text
    /// error[CMD2002]: no overload of `BASIC` accepts (int)
    ///   --> sprites.txt:3:7
    ///    |
    ///  3 | BASIC 5
    ///    |       ^
    /// ```
    pub fn render(&self) -> String {
        let ScriptError::Located {
            path,
            line,
            column,
            snippet,
            diagnostic,
        } = self
        else {
            return format!("error: {self}");
        };
        let gutter = line.to_string().len();
        let pad = " ".repeat(gutter);
        // Columns are bytes; the caret line is drawn in characters.
        let before = snippet.get(..column - 1).unwrap_or(snippet);
        let fault = &snippet[before.len()..];
        let bytes = diagnostic.span.map_or(1, |s| s.len()).max(1);
        let width = fault
            .char_indices()
            .take_while(|&(i, _)| i < bytes)
            .count()
            .max(1);
        format!(
            "{diagnostic}\n{pad}--> {path}:{line}:{column}\n{pad} |\n{line} | {snippet}\n{pad} | {indent}{carets}\n",
            indent = " ".repeat(before.chars().count()),
            carets = "^".repeat(width),
        )
    }
}
