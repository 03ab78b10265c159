//! Reading whole scripts.

use std::path::Path;

use serde::Serialize;

use crate::error::ScriptError;
use crate::interpreter::{Interpreter, Session};
use crate::source::split_lines;

/// Outcome of a successful script read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadSummary {
    /// Physical lines in the script.
    pub lines: usize,
    /// Commands executed.
    pub commands: usize,
    /// Scopes still open at end of script.
    pub open_scopes: usize,
}

impl<C> Interpreter<C> {
    /// Run every code line of `text` in order.
    ///
    /// The session's scope stack starts at `Root`; its resources persist, so
    /// several scripts can publish into one table. The first failure aborts
    /// the read with a located error.
    pub fn read_str(
        &self,
        path: &str,
        text: &str,
        session: &mut Session<C>,
    ) -> Result<ReadSummary, ScriptError> {
        session.scopes_mut().clear();
        let mut commands = 0usize;
        for line in split_lines(text, &self.config().line_comments) {
            self.execute_line(line.code, line.offset, session)
                .map_err(|diag| ScriptError::locate(path, text, diag))?;
            commands += 1;
        }
        if self.config().require_closed_scopes
            && let Some(diag) = session.scopes().unclosed(self.modes())
        {
            return Err(ScriptError::locate(path, text, diag));
        }
        let summary = ReadSummary {
            lines: text.lines().count(),
            commands,
            open_scopes: session.scopes().depth(),
        };
        tracing::debug!(
            path,
            lines = summary.lines,
            commands = summary.commands,
            open_scopes = summary.open_scopes,
            "script read"
        );
        Ok(summary)
    }

    /// Read and run a script file.
    pub fn read_file(
        &self,
        path: impl AsRef<Path>,
        session: &mut Session<C>,
    ) -> Result<ReadSummary, ScriptError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.read_str(&path.display().to_string(), &text, session)
    }
}
