//! Declarative command sets loaded from JSON.
//!
//! A manifest describes modes, nesting rules, prefixes, composite types, and
//! commands whose behavior is limited to a scope transition plus optional
//! resource bookkeeping. That is enough to check scripts for structure
//! (dispatch, overloads, scopes, dangling references) without the domain code
//! that would normally consume them.
//!
//! ```json
//! {
//!   "modes": ["SpriteSet", "Sprite"],
//!   "nesting": { "Sprite": ["Root", "SpriteSet"] },
//!   "commands": [
//!     { "name": "SPRITE", "modes": ["Root", "SpriteSet"],
//!       "signatures": ["string name"], "transition": { "enter": ["Sprite"] },
//!       "defines": { "arg": 0, "kind": "sprite" } },
//!     { "name": "END", "modes": ["SpriteSet", "Sprite"], "signatures": [""],
//!       "transition": { "exit": ["SpriteSet", "Sprite"] } }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ReaderConfig;
use crate::error::{RegistryError, ResourceError};
use crate::grammar::diag::{Diagnostic, codes};
use crate::interpreter::{Call, Interpreter, Session};
use crate::scope::{ModeSet, ModeTable, Transition};

/// Top-level manifest document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Named modes, in bit order after `Root`.
    #[serde(default)]
    pub modes: Vec<String>,
    /// Legal parents per mode.
    #[serde(default)]
    pub nesting: BTreeMap<String, Vec<String>>,
    /// Prefix words.
    #[serde(default)]
    pub prefixes: Vec<String>,
    /// Composite types, registered in order.
    #[serde(default)]
    pub types: Vec<TypeSpec>,
    /// Command definitions, registered in order.
    #[serde(default)]
    pub commands: Vec<CommandSpec>,
    /// Reader configuration.
    #[serde(default)]
    pub config: Option<ReaderConfig>,
}

/// A composite type entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeSpec {
    /// Type name.
    pub name: String,
    /// Alternative shapes.
    pub shapes: Vec<String>,
}

/// A command entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandSpec {
    /// Command name.
    pub name: String,
    /// Modes the command is valid in; `["Root"]` when omitted.
    #[serde(default)]
    pub modes: Vec<String>,
    /// Signature strings in resolution order.
    pub signatures: Vec<String>,
    /// Scope change after a successful dispatch.
    #[serde(default)]
    pub transition: TransitionSpec,
    /// Resource published by the command.
    #[serde(default)]
    pub defines: Option<ResourceRef>,
    /// Resources that must already exist.
    #[serde(default)]
    pub requires: Vec<ResourceRef>,
}

/// Declarative form of a [`Transition`], with modes given by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionSpec {
    /// No scope change.
    #[default]
    Stay,
    /// Open a scope.
    Enter(Vec<String>),
    /// Close the innermost scope holding any of these modes.
    Exit(Vec<String>),
    /// Reset to exactly these modes.
    Replace(Vec<String>),
    /// Add modes to the innermost scope.
    Flag(Vec<String>),
}

/// An argument that names a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceRef {
    /// Index of the bound argument holding the name.
    pub arg: usize,
    /// Resource kind, e.g. `sprite`.
    pub kind: String,
}

/// What a manifest command stores in the resource table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinedResource {
    /// Declared kind.
    pub kind: String,
}

impl Manifest {
    /// Parse a manifest from JSON text.
    pub fn from_json(text: &str) -> Result<Self, RegistryError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a manifest file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RegistryError::ManifestIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Build an interpreter for this command set.
    pub fn build(&self) -> Result<Interpreter<()>, RegistryError> {
        let mut interp = Interpreter::with_config(self.config.clone().unwrap_or_default());
        for mode in &self.modes {
            interp.define_mode(mode)?;
        }
        for (child, parents) in &self.nesting {
            let child = interp.modes().parse(std::slice::from_ref(child))?;
            let parents = interp.modes().parse(parents)?;
            interp.nest(child, parents);
        }
        for prefix in &self.prefixes {
            interp.add_prefix(prefix)?;
        }
        for ty in &self.types {
            let shapes: Vec<&str> = ty.shapes.iter().map(String::as_str).collect();
            interp.add_type(&ty.name, &shapes)?;
        }
        for cmd in &self.commands {
            let modes = if cmd.modes.is_empty() {
                ModeSet::ROOT
            } else {
                interp.modes().parse(&cmd.modes)?
            };
            let transition = resolve_transition(interp.modes(), &cmd.transition)?;
            let sigs: Vec<&str> = cmd.signatures.iter().map(String::as_str).collect();
            let defines = cmd.defines.clone();
            let requires = cmd.requires.clone();
            interp.add_command(&cmd.name, modes, &sigs, move |call, session| {
                run_manifest_command(call, session, defines.as_ref(), &requires)?;
                Ok(transition)
            })?;
        }
        tracing::debug!(
            commands = interp.commands().len(),
            modes = self.modes.len(),
            "manifest loaded"
        );
        Ok(interp)
    }
}

fn resolve_transition(
    table: &ModeTable,
    spec: &TransitionSpec,
) -> Result<Transition, RegistryError> {
    let t = match spec {
        TransitionSpec::Stay => Transition::Stay,
        TransitionSpec::Enter(m) => Transition::Enter(non_empty(table.parse(m)?, "enter")?),
        TransitionSpec::Exit(m) => Transition::Exit(non_empty(table.parse(m)?, "exit")?),
        TransitionSpec::Replace(m) => Transition::Replace(table.parse(m)?),
        TransitionSpec::Flag(m) => Transition::Flag(non_empty(table.parse(m)?, "flag")?),
    };
    Ok(t)
}

fn non_empty(set: ModeSet, what: &str) -> Result<ModeSet, RegistryError> {
    if set.is_empty() {
        return Err(RegistryError::Manifest(format!("`{what}` needs at least one mode")));
    }
    Ok(set)
}

fn run_manifest_command(
    call: &Call<'_>,
    session: &mut Session<()>,
    defines: Option<&ResourceRef>,
    requires: &[ResourceRef],
) -> Result<(), Diagnostic> {
    for req in requires {
        let Some(arg) = call.args().try_get(req.arg) else {
            continue;
        };
        if arg.is_none() {
            continue;
        }
        let name = arg.as_string()?;
        let found = session
            .resources
            .get::<DefinedResource>(name)
            .map_err(|e| Diagnostic::from(e).or_span(arg.span))?;
        if found.kind != req.kind {
            return Err(Diagnostic::error(
                codes::RESOURCE_TYPE_MISMATCH,
                format!("resource `{name}` is a {}, not a {}", found.kind, req.kind),
                Some(arg.span),
            )
            .with_entry("resource", name));
        }
    }
    if let Some(def) = defines
        && let Some(arg) = call.args().try_get(def.arg)
    {
        let name = arg.as_string()?;
        let value = DefinedResource {
            kind: def.kind.clone(),
        };
        session
            .resources
            .add(name, value)
            .map_err(|e: ResourceError| Diagnostic::from(e).or_span(arg.span))?;
    }
    Ok(())
}
