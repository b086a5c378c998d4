//! # Target Registry
//!
//! Maps target names to their constructors. Targets are registered
//! explicitly when the registry is built; nothing is discovered implicitly.

use std::collections::BTreeMap;

use pulp_common::args::ArgParser;
use pulp_common::error::BoardError;
use pulp_common::options::Options;
use tracing::debug;

use crate::targets::{TargetDescriptor, VirtualTarget, extended_pulp};

pub type Constructor = fn(&mut ArgParser, &Options) -> Result<Box<dyn VirtualTarget>, BoardError>;

struct Entry {
    label: &'static str,
    constructor: Constructor,
}

#[derive(Default)]
pub struct TargetRegistry {
    entries: BTreeMap<String, Entry>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every target shipped with this crate.
    pub fn with_builtin_targets() -> Result<Self, BoardError> {
        let mut registry = Self::new();
        registry.register::<extended_pulp::Target>()?;
        Ok(registry)
    }

    /// Registers `T` under [`TargetDescriptor::NAME`].
    ///
    /// Returns `Ok(false)` when the type does not flag itself as a target.
    pub fn register<T: TargetDescriptor>(&mut self) -> Result<bool, BoardError> {
        if !T::IS_TARGET {
            debug!(target_name = T::NAME, "skipping type not marked as target");
            return Ok(false);
        }
        self.register_fn(T::NAME, T::LABEL, construct_boxed::<T>)?;
        Ok(true)
    }

    pub fn register_fn(
        &mut self,
        name: &str,
        label: &'static str,
        constructor: Constructor,
    ) -> Result<(), BoardError> {
        let key = name.trim().to_ascii_lowercase();
        if self.entries.contains_key(&key) {
            return Err(BoardError::DuplicateTarget(key));
        }

        debug!(target_name = %key, "registered target");
        self.entries.insert(key, Entry { label, constructor });
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.trim().to_ascii_lowercase())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Registered names with their labels, without building anything.
    pub fn labels(&self) -> impl Iterator<Item = (&str, &'static str)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry.label))
    }

    pub fn label(&self, name: &str) -> Option<&'static str> {
        self.entries
            .get(&name.trim().to_ascii_lowercase())
            .map(|entry| entry.label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds the target registered as `name`.
    ///
    /// Constructor failures are returned as is.
    pub fn create(
        &self,
        name: &str,
        parser: &mut ArgParser,
        options: &Options,
    ) -> Result<Box<dyn VirtualTarget>, BoardError> {
        let key = name.trim().to_ascii_lowercase();
        let entry = self
            .entries
            .get(&key)
            .ok_or_else(|| BoardError::UnknownTarget(name.to_string()))?;

        debug!(target_name = %key, "constructing target");
        (entry.constructor)(parser, options)
    }
}

fn construct_boxed<T: TargetDescriptor>(
    parser: &mut ArgParser,
    options: &Options,
) -> Result<Box<dyn VirtualTarget>, BoardError> {
    Ok(Box::new(T::construct(parser, options)?))
}
