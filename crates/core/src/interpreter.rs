//! The interpreter: registration API and per-line dispatch.
//!
//! Dispatching one invocation runs these steps:
//! 1. look up the command name (case-insensitive);
//! 2. keep only definitions valid in the current mode;
//! 3. resolve the arguments against their signatures, first match wins;
//! 4. call the definition's callback with the bound arguments;
//! 5. apply the [`Transition`] the callback returned.
//!
//! Any failure aborts with a [`Diagnostic`]; nothing is retried or skipped.

use std::collections::HashSet;

use crate::config::ReaderConfig;
use crate::error::RegistryError;
use crate::grammar::ast::{CommandParam, Invocation};
use crate::grammar::diag::{Diagnostic, Span, codes};
use crate::grammar::lexer::{TokKind, tokenize};
use crate::grammar::parser::{LineOptions, parse_line_with};
use crate::registry::{CommandDef, CommandRegistry};
use crate::resolve::resolve;
use crate::resource::ResourceTable;
use crate::scope::{ModeSet, ModeTable, ScopeStack, Transition};
use crate::signature::{CommandSignature, TypeRegistry, compile_signature};

/// Mutable state threaded through a script read.
///
/// `state` is the embedding reader's own data (builders, counters). The scope
/// stack is read-only to callbacks; they change it by returning a
/// [`Transition`].
#[derive(Debug, Default)]
pub struct Session<C> {
    /// Named resources published and consumed by commands.
    pub resources: ResourceTable,
    /// Reader-specific state.
    pub state: C,
    scopes: ScopeStack,
}

impl<C> Session<C> {
    /// A session around `state` with an empty resource table.
    pub fn new(state: C) -> Self {
        Self {
            resources: ResourceTable::new(),
            state,
            scopes: ScopeStack::new(),
        }
    }

    /// Open scopes.
    pub fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }

    /// Active modes.
    pub fn mode(&self) -> ModeSet {
        self.scopes.current()
    }

    pub(crate) fn scopes_mut(&mut self) -> &mut ScopeStack {
        &mut self.scopes
    }
}

/// What a callback sees of the invocation it is handling.
#[derive(Debug, Clone, Copy)]
pub struct Call<'a> {
    invocation: &'a Invocation,
    args: &'a CommandParam,
    signature: &'a CommandSignature,
    overload: usize,
    mode: ModeSet,
}

impl<'a> Call<'a> {
    /// Command name as written.
    pub fn command(&self) -> &'a str {
        &self.invocation.command
    }

    /// Prefixes as written.
    pub fn prefixes(&self) -> &'a [String] {
        &self.invocation.prefixes
    }

    /// Whether the invocation carried `prefix` (case-insensitive).
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.invocation
            .prefixes
            .iter()
            .any(|p| p.eq_ignore_ascii_case(prefix))
    }

    /// Root array of bound arguments.
    pub fn args(&self) -> &'a CommandParam {
        self.args
    }

    /// The overload that matched.
    pub fn signature(&self) -> &'a CommandSignature {
        self.signature
    }

    /// Index of the matched overload among the definition's signatures.
    pub fn overload(&self) -> usize {
        self.overload
    }

    /// Modes active when the command was dispatched.
    pub fn mode(&self) -> ModeSet {
        self.mode
    }

    /// Span of the whole invocation.
    pub fn span(&self) -> Span {
        self.invocation.span
    }

    /// The parsed invocation.
    pub fn invocation(&self) -> &'a Invocation {
        self.invocation
    }

    /// A command-level failure spanning the whole invocation.
    pub fn error(&self, message: impl Into<String>) -> Diagnostic {
        Diagnostic::error(codes::COMMAND_FAILED, message, Some(self.invocation.span))
            .with_entry("command", self.invocation.command.clone())
    }

    /// A failure pointing at one argument.
    pub fn error_at(&self, param: &CommandParam, message: impl Into<String>) -> Diagnostic {
        Diagnostic::error(codes::COMMAND_FAILED, message, Some(param.span))
            .with_entry("command", self.invocation.command.clone())
    }
}

/// A configured command set.
///
/// Built once, then used read-only for any number of script reads.
pub struct Interpreter<C> {
    config: ReaderConfig,
    types: TypeRegistry,
    modes: ModeTable,
    prefixes: HashSet<String>,
    commands: CommandRegistry<C>,
}

impl<C> Default for Interpreter<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for Interpreter<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("config", &self.config)
            .field("commands", &self.commands.len())
            .field("prefixes", &self.prefixes)
            .finish_non_exhaustive()
    }
}

impl<C> Interpreter<C> {
    /// An interpreter with the built-in types and default configuration.
    pub fn new() -> Self {
        Self::with_config(ReaderConfig::default())
    }

    /// An interpreter with the built-in types and `config`.
    pub fn with_config(config: ReaderConfig) -> Self {
        Self {
            config,
            types: TypeRegistry::new(),
            modes: ModeTable::new(),
            prefixes: HashSet::new(),
            commands: CommandRegistry::default(),
        }
    }

    /// Reader configuration.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Replace the reader configuration.
    pub fn set_config(&mut self, config: ReaderConfig) {
        self.config = config;
    }

    /// Composite types.
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Mode names and nesting rules.
    pub fn modes(&self) -> &ModeTable {
        &self.modes
    }

    /// Registered commands.
    pub fn commands(&self) -> &CommandRegistry<C> {
        &self.commands
    }

    /// Define a named mode.
    pub fn define_mode(&mut self, name: &str) -> Result<ModeSet, RegistryError> {
        check_name(name)?;
        self.modes.define(name)
    }

    /// Restrict where scopes of `child` may be opened.
    pub fn nest(&mut self, child: ModeSet, parents: ModeSet) {
        self.modes.nest(child, parents);
    }

    /// Register a composite type usable in later signatures.
    pub fn add_type(&mut self, name: &str, shapes: &[&str]) -> Result<(), RegistryError> {
        check_name(name)?;
        self.types.add(name, shapes).map(|_| ())
    }

    /// Register a prefix word (e.g. `CONTINUE`) that may precede command names.
    pub fn add_prefix(&mut self, name: &str) -> Result<(), RegistryError> {
        check_name(name)?;
        self.prefixes.insert(name.to_ascii_uppercase());
        Ok(())
    }

    /// Whether `word` is a registered prefix.
    pub fn is_prefix(&self, word: &str) -> bool {
        self.prefixes.contains(&word.to_ascii_uppercase())
    }

    /// Register a command definition.
    ///
    /// Signatures are compiled immediately; their order is the resolution
    /// order. Defining the same name again adds a definition for other modes.
    pub fn add_command<F>(
        &mut self,
        name: &str,
        modes: ModeSet,
        signatures: &[&str],
        callback: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&Call<'_>, &mut Session<C>) -> Result<Transition, Diagnostic> + 'static,
    {
        check_name(name)?;
        if signatures.is_empty() {
            return Err(RegistryError::NoSignatures(name.to_string()));
        }
        let mut compiled = Vec::new();
        for sig in signatures {
            compiled.extend(compile_signature(sig, &self.types)?);
        }
        tracing::trace!(command = name, overloads = compiled.len(), "command registered");
        self.commands.insert(CommandDef {
            name: name.to_string(),
            modes,
            signatures: compiled,
            callback: Box::new(callback),
        });
        Ok(())
    }

    /// Parse one line using this interpreter's prefixes and depth limit.
    ///
    /// `base` is the line's byte offset in its script.
    pub fn parse_line(&self, line: &str, base: usize) -> Result<Invocation, Diagnostic> {
        let opts = LineOptions {
            base,
            max_depth: self.config.max_depth,
        };
        parse_line_with(line, opts, |word| self.is_prefix(word))
    }

    /// Dispatch a parsed invocation.
    pub fn dispatch(&self, inv: &Invocation, session: &mut Session<C>) -> Result<(), Diagnostic> {
        let Some(defs) = self.commands.get(&inv.command) else {
            return Err(Diagnostic::error(
                codes::UNKNOWN_COMMAND,
                format!("unknown command `{}`", inv.command),
                Some(inv.command_span),
            )
            .with_entry("command", inv.command.clone()));
        };

        let mode = session.mode();
        let valid: Vec<&CommandDef<C>> = defs.iter().filter(|d| d.modes.intersects(mode)).collect();
        if valid.is_empty() {
            let required = defs.iter().fold(ModeSet::EMPTY, |acc, d| acc | d.modes);
            return Err(Diagnostic::error(
                codes::MODE_MISMATCH,
                format!(
                    "`{}` is not allowed in mode {}; it requires {}",
                    inv.command,
                    self.modes.describe(mode),
                    self.modes.describe(required),
                ),
                Some(inv.command_span),
            )
            .with_entry("current", self.modes.describe(mode))
            .with_entry("required", self.modes.describe(required)));
        }

        let candidates: Vec<(&CommandDef<C>, usize, &CommandSignature)> = valid
            .iter()
            .flat_map(|&def| def.signatures.iter().enumerate().map(move |(i, s)| (def, i, s)))
            .collect();
        let sigs: Vec<&CommandSignature> = candidates.iter().map(|&(_, _, s)| s).collect();
        let bound = resolve(inv, &sigs)?;
        let (def, overload, signature) = candidates[bound.overload];

        tracing::debug!(
            command = %inv.command,
            overload,
            mode = %self.modes.describe(mode),
            "dispatch"
        );
        let call = Call {
            invocation: inv,
            args: &bound.args,
            signature,
            overload,
            mode,
        };
        let transition = (def.callback)(&call, session).map_err(|d| d.or_span(inv.span))?;
        session
            .scopes_mut()
            .apply(transition, &self.modes, &inv.command, inv.span)
    }

    /// Parse and dispatch one line at byte offset `base`.
    pub fn execute_line(
        &self,
        line: &str,
        base: usize,
        session: &mut Session<C>,
    ) -> Result<(), Diagnostic> {
        let inv = self.parse_line(line, base)?;
        self.dispatch(&inv, session)
    }
}

fn check_name(name: &str) -> Result<(), RegistryError> {
    match tokenize(name).as_deref() {
        Ok([tok]) if tok.kind == TokKind::Ident && tok.text == name => Ok(()),
        _ => Err(RegistryError::InvalidName(name.to_string())),
    }
}
