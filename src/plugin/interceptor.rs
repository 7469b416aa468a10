//! Interceptor contract and the invocation handed to it.

use std::fmt;
use std::sync::Arc;

use crate::Result;
use crate::traits::Invocable;
use crate::types::{MethodKey, Signature, Value};

/// A call captured by an interceptor proxy.
///
/// Holds the object the proxy wraps, the method, and the arguments.
/// [`proceed`](Self::proceed) performs the call the interceptor displaced;
/// an interceptor that never calls it replaces the call entirely.
pub struct Invocation {
    target: Arc<dyn Invocable>,
    method: MethodKey,
    args: Vec<Value>,
}

impl Invocation {
    pub fn new(target: Arc<dyn Invocable>, method: MethodKey, args: Vec<Value>) -> Self {
        Self {
            target,
            method,
            args,
        }
    }

    pub fn target(&self) -> &Arc<dyn Invocable> {
        &self.target
    }

    pub fn method(&self) -> &MethodKey {
        &self.method
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Invoke the original method on the wrapped target.
    pub fn proceed(&self) -> Result<Value> {
        self.target.invoke(&self.method, &self.args)
    }

    /// Invoke the original method on the wrapped target with other arguments.
    pub fn proceed_with(&self, args: &[Value]) -> Result<Value> {
        self.target.invoke(&self.method, args)
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("target", self.target.class().name())
            .field("method", &self.method)
            .field("args", &self.args)
            .finish()
    }
}

/// User-supplied call interceptor.
///
/// [`signatures`](Self::signatures) declares which methods the interceptor
/// wants to see; it is read once, when the interceptor is added to a chain.
/// An empty list is a configuration error.
pub trait Interceptor: Send + Sync {
    /// Interceptor name for logging/debugging.
    fn name(&self) -> &str;

    /// Methods this interceptor handles.
    fn signatures(&self) -> Vec<Signature>;

    /// Handle a matching call. Call [`Invocation::proceed`] to continue
    /// inward.
    fn intercept(&self, invocation: Invocation) -> Result<Value>;
}

type InterceptFn = dyn Fn(Invocation) -> Result<Value> + Send + Sync;

/// Interceptor assembled from a name, a signature list and a closure.
///
/// Useful when signatures come from configuration rather than code.
pub struct FnInterceptor {
    name: String,
    signatures: Vec<Signature>,
    handler: Box<InterceptFn>,
}

impl FnInterceptor {
    pub fn new<F>(name: impl Into<String>, signatures: Vec<Signature>, handler: F) -> Self
    where
        F: Fn(Invocation) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            signatures,
            handler: Box::new(handler),
        }
    }
}

impl Interceptor for FnInterceptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn signatures(&self) -> Vec<Signature> {
        self.signatures.clone()
    }

    fn intercept(&self, invocation: Invocation) -> Result<Value> {
        (self.handler)(invocation)
    }
}

impl fmt::Debug for FnInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnInterceptor")
            .field("name", &self.name)
            .field("signatures", &self.signatures.len())
            .finish()
    }
}
