//! Reader configuration.

use serde::{Deserialize, Serialize};

use crate::grammar::parser::DEFAULT_MAX_DEPTH;

/// Options that control how scripts are split and interpreted.
///
/// Deserializable so command manifests can carry a `config` block; missing
/// fields fall back to [`ReaderConfig::default`].
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Maximum parenthesis nesting inside one argument list.
    pub max_depth: usize,
    /// Markers that start a comment running to end of line.
    pub line_comments: Vec<String>,
    /// Fail at end of script when scopes remain open.
    pub require_closed_scopes: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            line_comments: vec!["//".to_string(), "#".to_string()],
            require_closed_scopes: false,
        }
    }
}

impl ReaderConfig {
    /// Set the nesting limit (builder style).
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Replace the comment markers (builder style).
    pub fn with_line_comments<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.line_comments = markers.into_iter().map(Into::into).collect();
        self
    }

    /// Require every opened scope to be closed by end of script (builder style).
    pub fn with_require_closed_scopes(mut self, require: bool) -> Self {
        self.require_closed_scopes = require;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: ReaderConfig = serde_json::from_str(r#"{"max_depth": 4}"#).unwrap();
        assert_eq!(cfg.max_depth, 4);
        assert_eq!(cfg.line_comments, ["//", "#"]);
        assert!(!cfg.require_closed_scopes);
    }
}
