//! Name-indexed type registry.

use std::collections::HashMap;
use std::sync::Arc;

use super::interface::{ClassDescriptor, InterfaceDescriptor, TypeDescriptor};
use super::method::TypeName;
use crate::{HuginnError, Result};

/// Known types keyed by name.
///
/// Configuration refers to types by name; this is where those names are
/// turned back into descriptors.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    entries: HashMap<TypeName, TypeDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type, replacing any existing entry with the same name.
    pub fn register(&mut self, descriptor: impl Into<TypeDescriptor>) {
        let descriptor = descriptor.into();
        self.entries.insert(descriptor.name().clone(), descriptor);
    }

    /// Register several interfaces at once.
    pub fn with_interfaces(
        mut self,
        interfaces: impl IntoIterator<Item = Arc<InterfaceDescriptor>>,
    ) -> Self {
        for i in interfaces {
            self.register(i);
        }
        self
    }

    pub fn get(&self, name: &TypeName) -> Option<&TypeDescriptor> {
        self.entries.get(name)
    }

    /// Look up an interface by name.
    pub fn interface(&self, name: &TypeName) -> Result<Arc<InterfaceDescriptor>> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| HuginnError::UnknownType(name.clone()))?
            .into_interface()
    }

    /// Look up a class by name.
    pub fn class(&self, name: &TypeName) -> Result<Arc<ClassDescriptor>> {
        match self.entries.get(name) {
            Some(TypeDescriptor::Class(c)) => Ok(c.clone()),
            Some(TypeDescriptor::Interface(_)) => Err(HuginnError::Configuration(format!(
                "{name} is an interface, expected a class"
            ))),
            None => Err(HuginnError::UnknownType(name.clone())),
        }
    }

    pub fn contains(&self, name: &TypeName) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
