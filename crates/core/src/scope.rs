//! Modes and the scope stack that gates command dispatch.
//!
//! A [`ModeSet`] is a set of up to 64 mode bits. The reader keeps an explicit
//! stack of scope frames; the current mode is the union of the frames' bits,
//! or [`ModeSet::ROOT`] when no scope is open. Callbacks never touch the stack
//! directly: they return a [`Transition`] which the interpreter applies after
//! the callback succeeds.

use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::grammar::diag::{Diagnostic, Span, codes};

/// A set of mode bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModeSet(u64);

impl ModeSet {
    /// No modes.
    pub const EMPTY: ModeSet = ModeSet(0);
    /// Top level of a script, outside any scope.
    pub const ROOT: ModeSet = ModeSet(1);
    /// Every mode; commands registered with it are valid anywhere.
    pub const ANY: ModeSet = ModeSet(u64::MAX);

    /// Build from raw bits.
    pub const fn from_bits(bits: u64) -> Self {
        ModeSet(bits)
    }

    /// Raw bits.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Whether the two sets share any bit.
    pub const fn intersects(self, other: ModeSet) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether every bit of `other` is in `self`.
    pub const fn contains(self, other: ModeSet) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no bit is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ModeSet {
    type Output = ModeSet;
    fn bitor(self, rhs: ModeSet) -> ModeSet {
        ModeSet(self.0 | rhs.0)
    }
}

impl BitOrAssign for ModeSet {
    fn bitor_assign(&mut self, rhs: ModeSet) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ModeSet {
    type Output = ModeSet;
    fn bitand(self, rhs: ModeSet) -> ModeSet {
        ModeSet(self.0 & rhs.0)
    }
}

impl Not for ModeSet {
    type Output = ModeSet;
    fn not(self) -> ModeSet {
        ModeSet(!self.0)
    }
}

/// State change requested by a command callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    /// Leave the scope stack alone.
    #[default]
    Stay,
    /// Open a new scope holding these modes.
    Enter(ModeSet),
    /// Clear these modes. Scopes above the innermost one holding any of
    /// them are closed; that scope is closed too unless it still holds
    /// other modes (for example its own after a `Flag`).
    Exit(ModeSet),
    /// Discard every open scope and make these the only active modes.
    Replace(ModeSet),
    /// Add modes to the innermost scope without opening a new one.
    Flag(ModeSet),
}

/// Mode names and legal nesting.
#[derive(Debug, Clone)]
pub struct ModeTable {
    names: Vec<String>,
    parents: Vec<(ModeSet, ModeSet)>,
}

impl Default for ModeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeTable {
    /// Most named modes a table can hold, `Root` included.
    pub const CAPACITY: usize = 64;

    /// A table with only `Root` defined.
    pub fn new() -> Self {
        Self {
            names: vec!["Root".to_string()],
            parents: Vec::new(),
        }
    }

    /// Define a named mode and return its bit.
    pub fn define(&mut self, name: &str) -> Result<ModeSet, RegistryError> {
        if self.lookup(name).is_some() {
            return Err(RegistryError::DuplicateMode(name.to_string()));
        }
        if self.names.len() >= Self::CAPACITY {
            return Err(RegistryError::TooManyModes {
                max: Self::CAPACITY - 1,
            });
        }
        let bit = ModeSet(1 << self.names.len());
        self.names.push(name.to_string());
        Ok(bit)
    }

    /// Bit for a mode name, case-insensitively.
    pub fn lookup(&self, name: &str) -> Option<ModeSet> {
        if name.eq_ignore_ascii_case("any") {
            return Some(ModeSet::ANY);
        }
        self.names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .map(|i| ModeSet(1 << i))
    }

    /// Union of several named modes.
    pub fn parse<S: AsRef<str>>(&self, names: &[S]) -> Result<ModeSet, RegistryError> {
        names.iter().try_fold(ModeSet::EMPTY, |acc, name| {
            let name = name.as_ref();
            self.lookup(name)
                .map(|m| acc | m)
                .ok_or_else(|| RegistryError::UnknownMode(name.to_string()))
        })
    }

    /// Declare that scopes of `child` may only be opened while one of `parents` is active.
    pub fn nest(&mut self, child: ModeSet, parents: ModeSet) {
        self.parents.push((child, parents));
    }

    /// Modes `child` may be opened inside, if any rule constrains it.
    pub fn allowed_parents(&self, child: ModeSet) -> Option<ModeSet> {
        self.parents
            .iter()
            .filter(|(c, _)| c.intersects(child))
            .map(|&(_, p)| p)
            .reduce(|a, b| a & b)
    }

    /// Human-readable mode list, e.g. `Sprite|SpriteSet`.
    pub fn describe(&self, set: ModeSet) -> String {
        if set == ModeSet::ANY {
            return "any".to_string();
        }
        if set.is_empty() {
            return "none".to_string();
        }
        let names: Vec<&str> = self
            .names
            .iter()
            .enumerate()
            .filter(|(i, _)| set.0 & (1 << i) != 0)
            .map(|(_, n)| n.as_str())
            .collect();
        names.join("|")
    }
}

/// One open scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// Modes this scope contributes.
    pub modes: ModeSet,
    /// Command that opened the scope.
    pub command: String,
    /// Span of the opening invocation.
    pub span: Span,
}

/// Explicit stack of open scopes.
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    /// An empty stack (mode `Root`).
    pub fn new() -> Self {
        Self::default()
    }

    /// The active modes.
    pub fn current(&self) -> ModeSet {
        if self.frames.is_empty() {
            return ModeSet::ROOT;
        }
        self.frames
            .iter()
            .fold(ModeSet::EMPTY, |acc, f| acc | f.modes)
    }

    /// Open scopes, outermost first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Close every scope.
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Apply a transition requested by `command`.
    ///
    /// `Enter` is checked against the table's nesting rules; `Exit` fails if
    /// no open scope holds any of the requested modes.
    pub fn apply(
        &mut self,
        transition: Transition,
        table: &ModeTable,
        command: &str,
        span: Span,
    ) -> Result<(), Diagnostic> {
        match transition {
            Transition::Stay => {}
            Transition::Enter(modes) => {
                let current = self.current();
                if let Some(parents) = table.allowed_parents(modes)
                    && !current.intersects(parents)
                {
                    return Err(Diagnostic::error(
                        codes::ILLEGAL_NESTING,
                        format!(
                            "`{command}` cannot open {} inside {}; allowed inside {}",
                            table.describe(modes),
                            table.describe(current),
                            table.describe(parents),
                        ),
                        Some(span),
                    ));
                }
                tracing::debug!(command, modes = %table.describe(modes), depth = self.frames.len() + 1, "scope entered");
                self.frames.push(Frame {
                    modes,
                    command: command.to_string(),
                    span,
                });
            }
            Transition::Exit(modes) => {
                let Some(at) = self.frames.iter().rposition(|f| f.modes.intersects(modes)) else {
                    return Err(Diagnostic::error(
                        codes::NO_SCOPE_TO_CLOSE,
                        format!(
                            "`{command}` closes {} but no such scope is open (current mode {})",
                            table.describe(modes),
                            table.describe(self.current()),
                        ),
                        Some(span),
                    ));
                };
                // A frame that keeps modes of its own (a scope with flags
                // added) survives with only the requested bits cleared.
                let remaining = self.frames[at].modes & !modes;
                let close = remaining.is_empty() || remaining == ModeSet::ROOT;
                let cut = if close { at } else { at + 1 };
                for frame in self.frames.drain(cut..).rev() {
                    tracing::debug!(command, opened_by = %frame.command, modes = %table.describe(frame.modes), "scope exited");
                }
                if !close {
                    let frame = &mut self.frames[at];
                    frame.modes = remaining;
                    tracing::debug!(command, opened_by = %frame.command, modes = %table.describe(remaining), "modes cleared");
                }
            }
            Transition::Replace(modes) => {
                self.frames.clear();
                if modes != ModeSet::ROOT && !modes.is_empty() {
                    self.frames.push(Frame {
                        modes,
                        command: command.to_string(),
                        span,
                    });
                }
                tracing::debug!(command, modes = %table.describe(self.current()), "mode replaced");
            }
            Transition::Flag(modes) => match self.frames.last_mut() {
                Some(top) => top.modes |= modes,
                None => self.frames.push(Frame {
                    modes: ModeSet::ROOT | modes,
                    command: command.to_string(),
                    span,
                }),
            },
        }
        Ok(())
    }

    /// Error for the innermost scope still open at end of script, if any.
    pub fn unclosed(&self, table: &ModeTable) -> Option<Diagnostic> {
        let frame = self.frames.last()?;
        Some(
            Diagnostic::error(
                codes::UNCLOSED_SCOPE,
                format!(
                    "{} scope opened by `{}` is never closed",
                    table.describe(frame.modes),
                    frame.command
                ),
                Some(frame.span),
            )
            .with_entry("command", frame.command.clone()),
        )
    }
}
