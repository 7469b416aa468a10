//! Wrapping targets in interceptor proxies.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument, trace};

use super::interceptor::{Interceptor, Invocation};
use super::signature::SignatureIndex;
use crate::telemetry;
use crate::traits::Invocable;
use crate::types::{ClassDescriptor, MethodKey, ObjectMethod, Value};
use crate::{HuginnError, Result};

/// Wrap `target` so calls matching `interceptor`'s signatures go through it.
///
/// Returns `target` itself when it implements none of the interceptor's
/// interfaces. Signature errors are reported before anything is wrapped.
pub fn wrap(
    target: Arc<dyn Invocable>,
    interceptor: Arc<dyn Interceptor>,
) -> Result<Arc<dyn Invocable>> {
    Ok(PreparedInterceptor::new(interceptor)?.wrap(target))
}

/// An interceptor whose signatures have been validated and indexed.
#[derive(Clone)]
pub struct PreparedInterceptor {
    interceptor: Arc<dyn Interceptor>,
    index: Arc<SignatureIndex>,
}

impl PreparedInterceptor {
    /// Validate and index the interceptor's signatures.
    pub fn new(interceptor: Arc<dyn Interceptor>) -> Result<Self> {
        let index = SignatureIndex::build(interceptor.name(), &interceptor.signatures())?;
        Ok(Self {
            interceptor,
            index: Arc::new(index),
        })
    }

    pub fn interceptor(&self) -> &Arc<dyn Interceptor> {
        &self.interceptor
    }

    pub fn index(&self) -> &SignatureIndex {
        &self.index
    }

    /// Wrap `target`, or hand it back unchanged when nothing applies.
    #[instrument(
        skip_all,
        fields(interceptor = self.interceptor.name(), target = %target.class().name())
    )]
    pub fn wrap(&self, target: Arc<dyn Invocable>) -> Arc<dyn Invocable> {
        let interfaces = self.index.applicable_interfaces(target.class());
        if interfaces.is_empty() {
            debug!("no intercepted interface implemented, target left unwrapped");
            self.record_wrap("unchanged");
            return target;
        }

        let class = interfaces.into_iter().fold(
            ClassDescriptor::new(format!("$Intercepted<{}>", target.class().name())),
            ClassDescriptor::implements,
        );
        debug!(interfaces = class.interfaces().len(), "target wrapped");
        self.record_wrap("wrapped");
        Arc::new(InterceptorProxy {
            target,
            interceptor: self.interceptor.clone(),
            index: self.index.clone(),
            class,
        })
    }

    fn record_wrap(&self, outcome: &'static str) {
        metrics::counter!(
            telemetry::WRAPS_TOTAL,
            "interceptor" => self.interceptor.name().to_string(),
            "outcome" => outcome
        )
        .increment(1);
    }
}

impl fmt::Debug for PreparedInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedInterceptor")
            .field("interceptor", &self.interceptor.name())
            .field("index", &self.index)
            .finish()
    }
}

/// Proxy exposing exactly the intercepted interfaces of its target.
struct InterceptorProxy {
    target: Arc<dyn Invocable>,
    interceptor: Arc<dyn Interceptor>,
    index: Arc<SignatureIndex>,
    class: ClassDescriptor,
}

impl InterceptorProxy {
    /// Whether `method` is reachable through this proxy's type set.
    fn exposes(&self, method: &MethodKey) -> bool {
        ObjectMethod::from_key(method).is_some() || self.class.declared_method(method).is_some()
    }
}

impl Invocable for InterceptorProxy {
    fn class(&self) -> &ClassDescriptor {
        &self.class
    }

    fn invoke(&self, method: &MethodKey, args: &[Value]) -> Result<Value> {
        if !self.exposes(method) {
            return Err(HuginnError::NoSuchMethod {
                type_name: self.class.name().clone(),
                method: method.clone(),
            });
        }

        if self.index.matches(method) {
            metrics::counter!(
                telemetry::INTERCEPTIONS_TOTAL,
                "interceptor" => self.interceptor.name().to_string()
            )
            .increment(1);
            trace!(interceptor = self.interceptor.name(), method = %method, "intercepting");
            let invocation = Invocation::new(self.target.clone(), method.clone(), args.to_vec());
            return self.interceptor.intercept(invocation);
        }
        self.target.invoke(method, args)
    }
}

impl fmt::Debug for InterceptorProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorProxy")
            .field("class", self.class.name())
            .field("interceptor", &self.interceptor.name())
            .finish()
    }
}
