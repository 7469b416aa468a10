//! Core dispatch traits
//!
//! - [`Invocable`]: anything that answers method calls by [`MethodKey`].
//!   Binding handles, interceptor proxies and user targets all implement it,
//!   which is what lets interceptors wrap any of them.
//! - [`ExecutionUnit`]: the late-bound work a routed call ends up in.
//! - [`MethodResolver`]: produces the execution unit for a method.

use std::collections::HashSet;
use std::sync::Arc;

use crate::types::{ClassDescriptor, InterfaceDescriptor, MethodKey, ObjectMethod, Value};
use crate::{HuginnError, Result};

/// A dynamically dispatched object.
pub trait Invocable: Send + Sync {
    /// Runtime type of this object.
    fn class(&self) -> &ClassDescriptor;

    /// Invoke `method` with `args`.
    fn invoke(&self, method: &MethodKey, args: &[Value]) -> Result<Value>;

    /// Invoke a method found by name and argument count.
    ///
    /// Searches the base-object methods first, then every interface the
    /// runtime type implements. A name and arity matching more than one
    /// distinct method across those interfaces is reported as
    /// `NoSuchMethod`; use [`invoke`](Self::invoke) with a full key instead.
    fn invoke_named(&self, name: &str, args: &[Value]) -> Result<Value> {
        let arity = args.len();
        let object_key = ObjectMethod::ALL
            .into_iter()
            .map(ObjectMethod::key)
            .find(|k| k.name() == name && k.arity() == arity);
        let key = match object_key {
            Some(key) => Some(key),
            None => {
                let mut candidates = HashSet::new();
                for interface in self.class().all_interfaces() {
                    candidates.extend(
                        interface
                            .all_methods()
                            .into_iter()
                            .map(|m| m.key())
                            .filter(|k| k.name() == name && k.arity() == arity),
                    );
                }
                let mut candidates = candidates.into_iter();
                match (candidates.next(), candidates.next()) {
                    (Some(only), None) => Some(only.clone()),
                    _ => None,
                }
            }
        };
        let key = key.ok_or_else(|| HuginnError::NoSuchMethod {
            type_name: self.class().name().clone(),
            method: MethodKey::new(self.class().name().clone(), name, Vec::<String>::new()),
        })?;
        self.invoke(&key, args)
    }
}

/// Work bound to one interface method, run against a call context.
///
/// Construction must be pure: building the same unit twice for the same
/// method has no observable effect beyond the wasted work.
pub trait ExecutionUnit<C>: Send + Sync {
    fn execute(&self, context: &C, args: &[Value]) -> Result<Value>;
}

impl<C, F> ExecutionUnit<C> for F
where
    F: Fn(&C, &[Value]) -> Result<Value> + Send + Sync,
{
    fn execute(&self, context: &C, args: &[Value]) -> Result<Value> {
        self(context, args)
    }
}

/// Source of execution bindings.
///
/// Must be deterministic: resolving the same method twice yields
/// behaviourally equivalent units. Returning `UnboundMethod` is fatal for
/// that method; callers never retry.
pub trait MethodResolver<C>: Send + Sync {
    fn resolve(
        &self,
        interface: &InterfaceDescriptor,
        method: &MethodKey,
    ) -> Result<Arc<dyn ExecutionUnit<C>>>;
}

impl<C, F> MethodResolver<C> for F
where
    F: Fn(&InterfaceDescriptor, &MethodKey) -> Result<Arc<dyn ExecutionUnit<C>>> + Send + Sync,
{
    fn resolve(
        &self,
        interface: &InterfaceDescriptor,
        method: &MethodKey,
    ) -> Result<Arc<dyn ExecutionUnit<C>>> {
        self(interface, method)
    }
}
