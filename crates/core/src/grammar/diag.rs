pub use cmdscript_diagnostics::{Diagnostic, ErrorClass, LineIndex, Severity, Span, codes, ctx};
