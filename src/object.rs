//! Vtable-of-closures objects.
//!
//! [`DynObject`] is the stock way to build an interceptable target: a
//! [`ClassDescriptor`] plus one closure per implemented method. Methods the
//! object leaves out fall back to their interface's default body; the
//! base-object methods fall back to identity semantics.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::traits::Invocable;
use crate::types::{ClassDescriptor, MethodKey, ObjectMethod, Value};
use crate::{HuginnError, Result};

static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(1);

/// Allocate a process-unique identity for a dynamic object or proxy.
pub(crate) fn next_identity() -> u64 {
    NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed)
}

/// Implementation closure for one method.
pub type MethodImpl = Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

/// Dynamic object backed by a table of method closures.
pub struct DynObject {
    class: Arc<ClassDescriptor>,
    methods: HashMap<MethodKey, MethodImpl>,
    identity: u64,
}

impl DynObject {
    pub fn builder(class: Arc<ClassDescriptor>) -> DynObjectBuilder {
        DynObjectBuilder {
            class,
            methods: HashMap::new(),
        }
    }

    /// Identity hash answered by `hashCode()` and compared by `equals`.
    pub fn identity(&self) -> u64 {
        self.identity
    }

    fn check_arity(method: &MethodKey, args: &[Value]) -> Result<()> {
        if method.arity() != args.len() {
            return Err(HuginnError::InvalidArguments {
                method: method.clone(),
                expected: method.arity(),
                actual: args.len(),
            });
        }
        Ok(())
    }
}

impl Invocable for DynObject {
    fn class(&self) -> &ClassDescriptor {
        &self.class
    }

    fn invoke(&self, method: &MethodKey, args: &[Value]) -> Result<Value> {
        Self::check_arity(method, args)?;
        if let Some(f) = self.methods.get(method) {
            return f(args);
        }
        if let Some(object_method) = ObjectMethod::from_key(method) {
            return Ok(object_method.answer(self.identity, self.class.name().as_str(), args));
        }
        match self
            .class
            .declared_method(method)
            .and_then(|decl| decl.default_body())
        {
            Some(body) => body(self, args),
            None => Err(HuginnError::NoSuchMethod {
                type_name: self.class.name().clone(),
                method: method.clone(),
            }),
        }
    }
}

impl fmt::Debug for DynObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynObject")
            .field("class", self.class.name())
            .field("identity", &self.identity)
            .field("methods", &self.methods.len())
            .finish()
    }
}

/// Builder for [`DynObject`].
pub struct DynObjectBuilder {
    class: Arc<ClassDescriptor>,
    methods: HashMap<MethodKey, MethodImpl>,
}

impl DynObjectBuilder {
    /// Implement `key` with `f`. A later call for the same key replaces
    /// the earlier closure.
    pub fn method<F>(mut self, key: MethodKey, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.methods.insert(key, Arc::new(f));
        self
    }

    /// Validate the table against the class and build the object.
    ///
    /// Every closure must implement a method some implemented interface
    /// declares (or a base-object method), and every abstract interface
    /// method must have a closure.
    pub fn build(self) -> Result<Arc<DynObject>> {
        for key in self.methods.keys() {
            if ObjectMethod::from_key(key).is_none() && self.class.declared_method(key).is_none() {
                return Err(HuginnError::UndeclaredImplementation {
                    class: self.class.name().clone(),
                    method: key.clone(),
                });
            }
        }

        for iface in self.class.all_interfaces() {
            if let Some(missing) = iface
                .abstract_methods()
                .into_iter()
                .find(|k| !self.methods.contains_key(*k))
            {
                return Err(HuginnError::MissingImplementation {
                    class: self.class.name().clone(),
                    method: missing.clone(),
                });
            }
        }

        Ok(Arc::new(DynObject {
            class: self.class,
            methods: self.methods,
            identity: next_identity(),
        }))
    }
}
