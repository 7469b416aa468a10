//! Huginn - late-bound interface dispatch with declarative interception
//!
//! This crate routes calls on plain interfaces to execution units resolved
//! at runtime, and lets interceptors reroute selected calls on arbitrary
//! target objects.
//!
//! - [`InterfaceBindingFactory`] produces [`BindingHandle`]s for one
//!   interface. Each handle carries its own call context; all of them share
//!   one [`MethodCache`], so every method is resolved once.
//! - [`InterceptorChain`] wraps targets so calls matching an interceptor's
//!   declared [`Signature`]s go through it, and everything else passes
//!   straight through.
//!
//! # Binding Example
//!
//! ```rust
//! use std::sync::Arc;
//! use huginn::{
//!     ExecutionUnit, HuginnError, InterfaceBindingFactory, InterfaceDescriptor, MethodKey,
//!     MethodResolver, Result, Value,
//! };
//!
//! struct Session {
//!     user: String,
//! }
//!
//! # fn main() -> Result<()> {
//! let mapper = InterfaceDescriptor::builder("GreetingMapper")
//!     .method("greet", &["String"])
//!     .build()?;
//!
//! let resolver = |_: &InterfaceDescriptor, method: &MethodKey| -> Result<Arc<dyn ExecutionUnit<Session>>> {
//!     match method.name() {
//!         "greet" => Ok(Arc::new(|session: &Session, args: &[Value]| -> Result<Value> {
//!             Ok(Value::from(format!("{} greets {}", session.user, args[0].as_str().unwrap_or("?"))))
//!         })),
//!         _ => Err(HuginnError::UnboundMethod {
//!             interface: "GreetingMapper".into(),
//!             method: method.clone(),
//!         }),
//!     }
//! };
//! let factory = InterfaceBindingFactory::new(mapper, Arc::new(resolver) as Arc<dyn MethodResolver<Session>>);
//!
//! let handle = factory.create(Session { user: "ada".into() });
//! assert_eq!(handle.call("greet", &[Value::from("bob")])?, Value::from("ada greets bob"));
//! # Ok(())
//! # }
//! ```
//!
//! # Interception Example
//!
//! ```rust
//! use std::sync::Arc;
//! use huginn::{
//!     ClassDescriptor, DynObject, FnInterceptor, InterceptorChain, InterfaceDescriptor,
//!     Invocable, MethodKey, Result, Signature, Value,
//! };
//!
//! # fn main() -> Result<()> {
//! let executor = InterfaceDescriptor::builder("Executor")
//!     .method("update", &["String"])
//!     .build()?;
//! let class = Arc::new(ClassDescriptor::new("SimpleExecutor").implements(executor.clone()));
//! let target = DynObject::builder(class)
//!     .method(MethodKey::new("Executor", "update", ["String"]), |_| Ok(Value::from(1)))
//!     .build()?;
//!
//! let mut chain = InterceptorChain::new();
//! chain.add_interceptor(Arc::new(FnInterceptor::new(
//!     "double",
//!     vec![Signature::new(executor, "update", ["String"])],
//!     |invocation| {
//!         let rows = invocation.proceed()?;
//!         Ok(Value::from(rows.as_i64().unwrap_or(0) * 2))
//!     },
//! )))?;
//!
//! let wrapped = chain.plugin_all(target);
//! assert_eq!(wrapped.invoke_named("update", &[Value::from("x")])?, Value::from(2));
//! # Ok(())
//! # }
//! ```

pub mod binding;
#[cfg(feature = "config")]
pub mod config;
pub mod error;
pub mod object;
pub mod plugin;
pub mod telemetry;
pub mod traits;
pub mod types;

// Re-export main types at crate root
pub use error::{Failure, HuginnError, Result};
pub use traits::{ExecutionUnit, Invocable, MethodResolver};

pub use binding::{
    BindingHandle, BindingRegistry, BoundInterface, CallRouter, InterfaceBindingFactory,
    MethodCache,
};
pub use object::{DynObject, DynObjectBuilder};
pub use plugin::{
    FnInterceptor, Interceptor, InterceptorChain, Invocation, PreparedInterceptor, SignatureIndex,
    wrap,
};

#[cfg(feature = "config")]
pub use config::{BindingConfig, HuginnConfig, InterceptorConfig, SignatureDecl};

// Re-export all types
pub use types::{
    ClassDescriptor, DefaultBody, InterfaceBuilder, InterfaceDescriptor, MethodDecl, MethodKey,
    OBJECT_TYPE, ObjectMethod, Signature, TypeDescriptor, TypeName, TypeRegistry, Value,
};
