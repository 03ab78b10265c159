//! Name-keyed table of typed values published by command callbacks.

use std::any::{Any, type_name};
use std::collections::HashMap;

use crate::error::ResourceError;

struct Entry {
    value: Box<dyn Any>,
    type_name: &'static str,
}

/// Typed name/value store shared by the commands of one reader.
///
/// Values of any `'static` type can be stored; reads check the type and
/// report both names on a mismatch.
#[derive(Default)]
pub struct ResourceTable {
    entries: HashMap<String, Entry>,
}

impl std::fmt::Debug for ResourceTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, e)| (k, e.type_name)))
            .finish()
    }
}

impl ResourceTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`.
    ///
    /// Re-adding an equal value of the same type is accepted; anything else
    /// already bound to `name` is a duplicate.
    pub fn add<T: Any + PartialEq>(&mut self, name: &str, value: T) -> Result<(), ResourceError> {
        if let Some(existing) = self.entries.get(name) {
            return match existing.value.downcast_ref::<T>() {
                Some(current) if *current == value => Ok(()),
                _ => Err(ResourceError::Duplicate {
                    name: name.to_string(),
                }),
            };
        }
        self.set(name, value);
        Ok(())
    }

    /// Look up `name` as a `T`.
    pub fn get<T: Any>(&self, name: &str) -> Result<&T, ResourceError> {
        let entry = self.entries.get(name).ok_or_else(|| ResourceError::Missing {
            name: name.to_string(),
        })?;
        entry
            .value
            .downcast_ref::<T>()
            .ok_or_else(|| ResourceError::TypeMismatch {
                name: name.to_string(),
                expected: type_name::<T>(),
                found: entry.type_name,
            })
    }

    /// Mutable lookup of `name` as a `T`.
    pub fn get_mut<T: Any>(&mut self, name: &str) -> Result<&mut T, ResourceError> {
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| ResourceError::Missing {
                name: name.to_string(),
            })?;
        let found = entry.type_name;
        entry
            .value
            .downcast_mut::<T>()
            .ok_or_else(|| ResourceError::TypeMismatch {
                name: name.to_string(),
                expected: type_name::<T>(),
                found,
            })
    }

    /// Bind `name` to `value`, replacing whatever was there.
    pub fn set<T: Any>(&mut self, name: &str, value: T) {
        self.entries.insert(
            name.to_string(),
            Entry {
                value: Box::new(value),
                type_name: type_name::<T>(),
            },
        );
    }

    /// Whether `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Type name stored under `name`.
    pub fn type_of(&self, name: &str) -> Option<&'static str> {
        self.entries.get(name).map(|e| e.type_name)
    }

    /// Number of bound names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bound names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
