//! Registry of bound interfaces.
//!
//! Maps interface names to their [`InterfaceBindingFactory`]. Registration
//! is all-or-nothing: with eager resolution enabled, an interface whose
//! methods cannot all be resolved is never left half-registered.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use super::factory::InterfaceBindingFactory;
use super::router::BindingHandle;
use crate::traits::MethodResolver;
use crate::types::{TypeDescriptor, TypeName};
use crate::{HuginnError, Result};

/// Name-indexed collection of binding factories sharing one resolver.
pub struct BindingRegistry<C> {
    resolver: Arc<dyn MethodResolver<C>>,
    known: HashMap<TypeName, Arc<InterfaceBindingFactory<C>>>,
    eager_resolution: bool,
}

impl<C: Send + Sync + 'static> BindingRegistry<C> {
    pub fn new(resolver: Arc<dyn MethodResolver<C>>) -> Self {
        Self {
            resolver,
            known: HashMap::new(),
            eager_resolution: false,
        }
    }

    /// Resolve every method of an interface while registering it.
    ///
    /// Moves `UnboundMethod` errors from first-call time to registration
    /// time.
    pub fn set_eager_resolution(&mut self, eager: bool) {
        self.eager_resolution = eager;
    }

    pub fn eager_resolution(&self) -> bool {
        self.eager_resolution
    }

    /// Register an interface.
    ///
    /// Fails if `ty` is not an interface, if it is already registered, or
    /// (with eager resolution) if any of its abstract methods has no
    /// binding. A failed registration leaves the registry unchanged.
    pub fn add_interface(&mut self, ty: impl Into<TypeDescriptor>) -> Result<()> {
        let interface = ty.into().into_interface()?;
        let name = interface.name().clone();
        if self.known.contains_key(&name) {
            return Err(HuginnError::AlreadyBound(name));
        }

        let factory = InterfaceBindingFactory::new(interface, self.resolver.clone());
        if self.eager_resolution
            && let Err(e) = factory.preload()
        {
            warn!(interface = %name, error = %e, "interface registration rolled back");
            return Err(e);
        }

        info!(interface = %name, "interface bound");
        self.known.insert(name, Arc::new(factory));
        Ok(())
    }

    pub fn has_interface(&self, name: &TypeName) -> bool {
        self.known.contains_key(name)
    }

    /// The factory for a registered interface.
    pub fn factory(&self, name: &TypeName) -> Result<&Arc<InterfaceBindingFactory<C>>> {
        self.known
            .get(name)
            .ok_or_else(|| HuginnError::UnknownBinding(name.clone()))
    }

    /// Create a handle for a registered interface.
    pub fn handle(&self, name: &TypeName, context: C) -> Result<BindingHandle<C>> {
        Ok(self.factory(name)?.create(context))
    }

    /// Registered interface names, sorted.
    pub fn interfaces(&self) -> Vec<&TypeName> {
        let mut names: Vec<_> = self.known.keys().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}
