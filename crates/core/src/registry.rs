//! Command definitions, looked up by case-insensitive name.

use std::collections::HashMap;

use crate::grammar::diag::Diagnostic;
use crate::interpreter::{Call, Session};
use crate::scope::{ModeSet, Transition};
use crate::signature::CommandSignature;

/// Handler invoked with the bound arguments of a matched invocation.
///
/// The returned [`Transition`] is applied to the scope stack after the
/// handler succeeds; errors abort the script read.
pub type Callback<C> = Box<dyn Fn(&Call<'_>, &mut Session<C>) -> Result<Transition, Diagnostic>>;

/// One registered definition of a command.
///
/// A name may carry several definitions, each valid in different modes.
pub struct CommandDef<C> {
    /// Name as registered.
    pub name: String,
    /// Modes in which this definition may be dispatched.
    pub modes: ModeSet,
    /// Concrete overloads in declaration order.
    pub signatures: Vec<CommandSignature>,
    pub(crate) callback: Callback<C>,
}

impl<C> std::fmt::Debug for CommandDef<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDef")
            .field("name", &self.name)
            .field("modes", &self.modes)
            .field("signatures", &self.signatures.len())
            .finish_non_exhaustive()
    }
}

/// All command definitions of an interpreter.
pub struct CommandRegistry<C> {
    defs: HashMap<String, Vec<CommandDef<C>>>,
    order: Vec<String>,
}

impl<C> Default for CommandRegistry<C> {
    fn default() -> Self {
        Self {
            defs: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<C> CommandRegistry<C> {
    /// Add a definition; later definitions of the same name are tried after earlier ones.
    pub fn insert(&mut self, def: CommandDef<C>) {
        let key = def.name.to_ascii_uppercase();
        let slot = self.defs.entry(key.clone()).or_default();
        if slot.is_empty() {
            self.order.push(key);
        }
        slot.push(def);
    }

    /// Definitions registered under `name`.
    pub fn get(&self, name: &str) -> Option<&[CommandDef<C>]> {
        self.defs.get(&name.to_ascii_uppercase()).map(Vec::as_slice)
    }

    /// Whether any definition uses `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Every definition, grouped by name in first-registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandDef<C>> {
        self.order
            .iter()
            .filter_map(|key| self.defs.get(key))
            .flatten()
    }

    /// Number of distinct command names.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no command is registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
