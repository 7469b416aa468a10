//! Interface binding factory.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument};

use super::cache::MethodCache;
use super::router::{BindingHandle, CallRouter};
use crate::Result;
use crate::telemetry;
use crate::traits::MethodResolver;
use crate::types::{ClassDescriptor, InterfaceDescriptor, TypeDescriptor};

/// Typed facade over a [`BindingHandle`].
///
/// Implement this for a struct that exposes an interface's methods as
/// ordinary Rust methods, then obtain it with
/// [`InterfaceBindingFactory::create_as`].
///
/// ```rust
/// # use huginn::{BindingHandle, BoundInterface, Result, Value};
/// struct UserMapper(BindingHandle<()>);
///
/// impl BoundInterface<()> for UserMapper {
///     fn from_handle(handle: BindingHandle<()>) -> Self {
///         UserMapper(handle)
///     }
/// }
///
/// impl UserMapper {
///     fn find(&self, id: i64) -> Result<Value> {
///         self.0.call("find", &[Value::from(id)])
///     }
/// }
/// ```
pub trait BoundInterface<C>: Sized {
    fn from_handle(handle: BindingHandle<C>) -> Self;
}

/// Produces call-routing handles for one interface.
///
/// Every handle created by a factory shares the factory's [`MethodCache`],
/// so each method is resolved once no matter how many contexts use it.
pub struct InterfaceBindingFactory<C> {
    interface: Arc<InterfaceDescriptor>,
    proxy_class: Arc<ClassDescriptor>,
    cache: Arc<MethodCache<C>>,
    resolver: Arc<dyn MethodResolver<C>>,
}

impl<C: Send + Sync + 'static> InterfaceBindingFactory<C> {
    /// Create a factory for `interface`.
    pub fn new(interface: Arc<InterfaceDescriptor>, resolver: Arc<dyn MethodResolver<C>>) -> Self {
        let proxy_class = Arc::new(
            ClassDescriptor::new(format!("$Proxy<{}>", interface.name()))
                .implements(interface.clone()),
        );
        Self {
            interface,
            proxy_class,
            cache: Arc::new(MethodCache::new()),
            resolver,
        }
    }

    /// Create a factory from any type descriptor, rejecting classes.
    pub fn try_new(ty: TypeDescriptor, resolver: Arc<dyn MethodResolver<C>>) -> Result<Self> {
        Ok(Self::new(ty.into_interface()?, resolver))
    }

    pub fn interface(&self) -> &Arc<InterfaceDescriptor> {
        &self.interface
    }

    /// The cache shared by every handle this factory creates.
    pub fn method_cache(&self) -> &Arc<MethodCache<C>> {
        &self.cache
    }

    /// Create a new handle bound to `context`.
    pub fn create(&self, context: C) -> BindingHandle<C> {
        let router = CallRouter::new(
            self.interface.clone(),
            self.cache.clone(),
            self.resolver.clone(),
            context,
        );
        BindingHandle::new(router, self.proxy_class.clone())
    }

    /// Create a handle and wrap it in a typed facade.
    pub fn create_as<T: BoundInterface<C>>(&self, context: C) -> T {
        T::from_handle(self.create(context))
    }

    /// Resolve every abstract method now instead of on first call.
    ///
    /// Fails with the first resolution error; entries resolved before the
    /// failure stay cached.
    #[instrument(skip_all, fields(interface = %self.interface.name()))]
    pub fn preload(&self) -> Result<()> {
        for key in self.interface.abstract_methods() {
            if self.cache.contains(key) {
                continue;
            }
            let unit = self.resolver.resolve(&self.interface, key)?;
            metrics::counter!(
                telemetry::METHOD_RESOLUTIONS_TOTAL,
                "interface" => self.interface.name().to_string()
            )
            .increment(1);
            self.cache.insert(key.clone(), unit);
        }
        debug!(entries = self.cache.len(), "preloaded execution units");
        Ok(())
    }
}

impl<C> fmt::Debug for InterfaceBindingFactory<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceBindingFactory")
            .field("interface", self.interface.name())
            .finish()
    }
}
