//! Interface and class descriptors.
//!
//! These stand in for runtime type information: an [`InterfaceDescriptor`]
//! lists the methods an interface declares (optionally with default bodies)
//! and the interfaces it extends, a [`ClassDescriptor`] names a concrete type,
//! the interfaces it implements directly, and its superclass.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::method::{DefaultBody, MethodDecl, MethodKey, TypeName, Value};
use crate::traits::Invocable;
use crate::{HuginnError, Result};

/// Descriptor of an interface type.
#[derive(Debug)]
pub struct InterfaceDescriptor {
    name: TypeName,
    methods: Vec<MethodDecl>,
    extends: Vec<Arc<InterfaceDescriptor>>,
}

impl InterfaceDescriptor {
    pub fn builder(name: impl Into<TypeName>) -> InterfaceBuilder {
        InterfaceBuilder {
            name: name.into(),
            methods: Vec::new(),
            extends: Vec::new(),
        }
    }

    pub fn name(&self) -> &TypeName {
        &self.name
    }

    /// Methods declared directly on this interface.
    pub fn methods(&self) -> &[MethodDecl] {
        &self.methods
    }

    /// Interfaces this one extends.
    pub fn extends(&self) -> &[Arc<InterfaceDescriptor>] {
        &self.extends
    }

    /// Look up a method by name and parameter types, searching this
    /// interface first and then its parents depth-first.
    pub fn find_method(&self, name: &str, params: &[TypeName]) -> Option<&MethodDecl> {
        self.methods
            .iter()
            .find(|m| m.key().matches_signature(name, params))
            .or_else(|| {
                self.extends
                    .iter()
                    .find_map(|parent| parent.find_method(name, params))
            })
    }

    /// Look up a method by its exact key anywhere in the hierarchy.
    pub fn declared_method(&self, key: &MethodKey) -> Option<&MethodDecl> {
        if key.declaring_type() == &self.name {
            return self.methods.iter().find(|m| m.key() == key);
        }
        self.extends
            .iter()
            .find_map(|parent| parent.declared_method(key))
    }

    /// Look up a method by name and arity, for untyped call sites.
    ///
    /// Returns `None` when no method or more than one method matches.
    pub fn method_by_arity(&self, name: &str, arity: usize) -> Option<&MethodDecl> {
        let mut found = self
            .all_methods()
            .into_iter()
            .filter(|m| m.key().name() == name && m.key().arity() == arity);
        let first = found.next()?;
        match found.next() {
            Some(_) => None,
            None => Some(first),
        }
    }

    /// Every method visible through this interface, own methods first.
    pub fn all_methods(&self) -> Vec<&MethodDecl> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        self.collect_methods(&mut out, &mut seen);
        out
    }

    fn collect_methods<'a>(
        &'a self,
        out: &mut Vec<&'a MethodDecl>,
        seen: &mut HashSet<&'a MethodKey>,
    ) {
        for m in &self.methods {
            if seen.insert(m.key()) {
                out.push(m);
            }
        }
        for parent in &self.extends {
            parent.collect_methods(out, seen);
        }
    }

    /// Methods that need an execution binding (no default body).
    pub fn abstract_methods(&self) -> Vec<&MethodKey> {
        self.all_methods()
            .into_iter()
            .filter(|m| !m.is_default())
            .map(MethodDecl::key)
            .collect()
    }

    /// Whether this interface is `name` or extends it.
    pub fn is_a(&self, name: &TypeName) -> bool {
        &self.name == name || self.extends.iter().any(|p| p.is_a(name))
    }
}

/// Builder for [`InterfaceDescriptor`].
pub struct InterfaceBuilder {
    name: TypeName,
    methods: Vec<MethodDecl>,
    extends: Vec<Arc<InterfaceDescriptor>>,
}

impl InterfaceBuilder {
    /// Declare an abstract method.
    pub fn method<P: Into<TypeName> + Clone>(mut self, name: &str, params: &[P]) -> Self {
        let key = MethodKey::new(self.name.clone(), name, params.iter().cloned());
        self.methods.push(MethodDecl::abstract_method(key));
        self
    }

    /// Declare a method with a default body.
    pub fn default_method<P, F>(mut self, name: &str, params: &[P], body: F) -> Self
    where
        P: Into<TypeName> + Clone,
        F: Fn(&dyn Invocable, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        let key = MethodKey::new(self.name.clone(), name, params.iter().cloned());
        let body: DefaultBody = Arc::new(body);
        self.methods.push(MethodDecl::with_default(key, body));
        self
    }

    /// Add a parent interface.
    pub fn extends(mut self, parent: Arc<InterfaceDescriptor>) -> Self {
        self.extends.push(parent);
        self
    }

    pub fn build(self) -> Result<Arc<InterfaceDescriptor>> {
        if self.name.as_str().is_empty() {
            return Err(HuginnError::Configuration(
                "interface name must not be empty".into(),
            ));
        }
        let mut seen = HashSet::new();
        for m in &self.methods {
            if !seen.insert(m.key()) {
                return Err(HuginnError::DuplicateMethod(m.key().clone()));
            }
        }
        Ok(Arc::new(InterfaceDescriptor {
            name: self.name,
            methods: self.methods,
            extends: self.extends,
        }))
    }
}

/// Descriptor of a concrete type.
#[derive(Debug)]
pub struct ClassDescriptor {
    name: TypeName,
    interfaces: Vec<Arc<InterfaceDescriptor>>,
    superclass: Option<Arc<ClassDescriptor>>,
}

impl ClassDescriptor {
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            interfaces: Vec::new(),
            superclass: None,
        }
    }

    /// Add a directly implemented interface.
    pub fn implements(mut self, interface: Arc<InterfaceDescriptor>) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn with_superclass(mut self, superclass: Arc<ClassDescriptor>) -> Self {
        self.superclass = Some(superclass);
        self
    }

    pub fn name(&self) -> &TypeName {
        &self.name
    }

    /// Interfaces implemented directly by this class (not its ancestors).
    pub fn interfaces(&self) -> &[Arc<InterfaceDescriptor>] {
        &self.interfaces
    }

    pub fn superclass(&self) -> Option<&Arc<ClassDescriptor>> {
        self.superclass.as_ref()
    }

    /// This class followed by each superclass up to the root.
    pub fn ancestry(&self) -> Ancestry<'_> {
        Ancestry { next: Some(self) }
    }

    /// Every interface implemented anywhere in the ancestry, deduplicated
    /// by name, in discovery order.
    pub fn all_interfaces(&self) -> Vec<&Arc<InterfaceDescriptor>> {
        let mut seen = HashSet::new();
        self.ancestry()
            .flat_map(|c| c.interfaces.iter())
            .filter(|i| seen.insert(i.name().clone()))
            .collect()
    }

    /// Find the declaration of `key` on any implemented interface.
    pub fn declared_method(&self, key: &MethodKey) -> Option<&MethodDecl> {
        self.ancestry()
            .flat_map(|c| c.interfaces.iter())
            .find_map(|i| i.declared_method(key))
    }
}

/// Iterator over a class and its superclasses.
pub struct Ancestry<'a> {
    next: Option<&'a ClassDescriptor>,
}

impl<'a> Iterator for Ancestry<'a> {
    type Item = &'a ClassDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.superclass.as_deref();
        Some(current)
    }
}

/// Either kind of type descriptor.
#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    Interface(Arc<InterfaceDescriptor>),
    Class(Arc<ClassDescriptor>),
}

impl TypeDescriptor {
    pub fn name(&self) -> &TypeName {
        match self {
            TypeDescriptor::Interface(i) => i.name(),
            TypeDescriptor::Class(c) => c.name(),
        }
    }

    /// The interface descriptor, or `NotAnInterface`.
    pub fn into_interface(self) -> Result<Arc<InterfaceDescriptor>> {
        match self {
            TypeDescriptor::Interface(i) => Ok(i),
            TypeDescriptor::Class(c) => Err(HuginnError::NotAnInterface(c.name().clone())),
        }
    }
}

impl From<Arc<InterfaceDescriptor>> for TypeDescriptor {
    fn from(i: Arc<InterfaceDescriptor>) -> Self {
        TypeDescriptor::Interface(i)
    }
}

impl From<Arc<ClassDescriptor>> for TypeDescriptor {
    fn from(c: Arc<ClassDescriptor>) -> Self {
        TypeDescriptor::Class(c)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Interface(i) => write!(f, "interface {}", i.name()),
            TypeDescriptor::Class(c) => write!(f, "class {}", c.name()),
        }
    }
}
