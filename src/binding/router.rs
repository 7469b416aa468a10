//! Per-context call routing.
//!
//! A [`CallRouter`] decides, for each call on a bound interface, which of
//! three paths it takes:
//!
//! ```text
//! call(method, args)
//!        │
//!        ├── base-object method? ──► answered from the router's own identity
//!        │
//!        ├── default method? ──────► interface body, bound to the handle
//!        │
//!        └── otherwise ────────────► MethodCache ──miss──► resolver
//!                                        │
//!                                        ▼
//!                               ExecutionUnit::execute(context, args)
//! ```
//!
//! Only the last path ever reaches the resolver, and it does so at most once
//! per method per factory (modulo benign races, see [`MethodCache`]).

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, instrument, warn};

use super::cache::MethodCache;
use crate::object::next_identity;
use crate::telemetry;
use crate::traits::{ExecutionUnit, Invocable, MethodResolver};
use crate::types::{ClassDescriptor, InterfaceDescriptor, MethodKey, ObjectMethod, Value};
use crate::{HuginnError, Result};

/// Which path a routed call took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoutePath {
    Object,
    Default,
    Unit,
}

impl RoutePath {
    fn as_str(self) -> &'static str {
        match self {
            RoutePath::Object => "object",
            RoutePath::Default => "default",
            RoutePath::Unit => "unit",
        }
    }
}

/// Dispatcher for one call context.
pub struct CallRouter<C> {
    interface: Arc<InterfaceDescriptor>,
    cache: Arc<MethodCache<C>>,
    resolver: Arc<dyn MethodResolver<C>>,
    context: C,
    identity: u64,
}

impl<C: Send + Sync + 'static> CallRouter<C> {
    pub(crate) fn new(
        interface: Arc<InterfaceDescriptor>,
        cache: Arc<MethodCache<C>>,
        resolver: Arc<dyn MethodResolver<C>>,
        context: C,
    ) -> Self {
        Self {
            interface,
            cache,
            resolver,
            context,
            identity: next_identity(),
        }
    }

    pub fn interface(&self) -> &Arc<InterfaceDescriptor> {
        &self.interface
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    /// Identity hash answered by `hashCode()`.
    pub fn identity(&self) -> u64 {
        self.identity
    }

    /// Route one call. `proxy` is the object the caller invoked; default
    /// method bodies are bound to it.
    #[instrument(skip_all, fields(interface = %self.interface.name(), method = %method))]
    pub fn route(
        &self,
        proxy: &dyn Invocable,
        method: &MethodKey,
        args: &[Value],
    ) -> Result<Value> {
        let start = Instant::now();
        let (path, result) = self.dispatch(proxy, method, args);
        self.record_route(path, start, result.is_ok());
        result
    }

    fn dispatch(
        &self,
        proxy: &dyn Invocable,
        method: &MethodKey,
        args: &[Value],
    ) -> (RoutePath, Result<Value>) {
        if let Some(object_method) = ObjectMethod::from_key(method) {
            let result = check_arity(method, args).map(|()| {
                object_method.answer(self.identity, proxy.class().name().as_str(), args)
            });
            return (RoutePath::Object, result);
        }

        let decl = match self.interface.declared_method(method) {
            Some(decl) => decl,
            None => {
                return (
                    RoutePath::Unit,
                    Err(HuginnError::NoSuchMethod {
                        type_name: self.interface.name().clone(),
                        method: method.clone(),
                    }),
                );
            }
        };
        if let Err(e) = check_arity(method, args) {
            return (RoutePath::Unit, Err(e));
        }

        if let Some(body) = decl.default_body() {
            return (RoutePath::Default, body(proxy, args));
        }

        let result = self
            .cached_execution_unit(method)
            .and_then(|unit| unit.execute(&self.context, args));
        (RoutePath::Unit, result)
    }

    /// Fetch the unit for `method`, resolving and caching it on a miss.
    ///
    /// Concurrent misses for the same method may each resolve; the last
    /// insert wins. Resolution is pure, so every contender is equivalent.
    fn cached_execution_unit(&self, method: &MethodKey) -> Result<Arc<dyn ExecutionUnit<C>>> {
        if let Some(unit) = self.cache.get(method) {
            return Ok(unit);
        }

        debug!(method = %method, "method cache miss, resolving");
        let unit = self.resolver.resolve(&self.interface, method)?;
        metrics::counter!(
            telemetry::METHOD_RESOLUTIONS_TOTAL,
            "interface" => self.interface.name().to_string()
        )
        .increment(1);

        if self.cache.contains(method) {
            warn!(method = %method, "concurrent resolution, replacing cached unit");
        }
        self.cache.insert(method.clone(), Arc::clone(&unit));
        Ok(unit)
    }

    fn record_route(&self, path: RoutePath, start: Instant, success: bool) {
        let status = if success { "ok" } else { "error" };
        let interface = self.interface.name().to_string();
        metrics::counter!(
            telemetry::ROUTE_TOTAL,
            "interface" => interface.clone(),
            "path" => path.as_str(),
            "status" => status
        )
        .increment(1);
        metrics::histogram!(
            telemetry::ROUTE_DURATION_SECONDS,
            "interface" => interface,
            "path" => path.as_str()
        )
        .record(start.elapsed().as_secs_f64());
    }
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

/// Handle returned by [`InterfaceBindingFactory::create`](super::InterfaceBindingFactory::create).
///
/// Satisfies the bound interface: every declared method can be invoked on
/// it, and it answers the base-object methods. Implements [`Invocable`], so
/// a handle can itself be wrapped by interceptors.
pub struct BindingHandle<C> {
    router: CallRouter<C>,
    class: Arc<ClassDescriptor>,
}

impl<C: Send + Sync + 'static> BindingHandle<C> {
    pub(crate) fn new(router: CallRouter<C>, class: Arc<ClassDescriptor>) -> Self {
        Self { router, class }
    }

    pub fn interface(&self) -> &Arc<InterfaceDescriptor> {
        self.router.interface()
    }

    pub fn context(&self) -> &C {
        self.router.context()
    }

    pub fn identity(&self) -> u64 {
        self.router.identity()
    }

    /// Call a method by name, for interfaces without overloads.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        self.invoke_named(name, args)
    }
}

impl<C: Send + Sync + 'static> Invocable for BindingHandle<C> {
    fn class(&self) -> &ClassDescriptor {
        &self.class
    }

    fn invoke(&self, method: &MethodKey, args: &[Value]) -> Result<Value> {
        self.router.route(self, method, args)
    }
}

impl<C> fmt::Debug for BindingHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingHandle")
            .field("class", self.class.name())
            .field("identity", &self.router.identity)
            .finish()
    }
}
