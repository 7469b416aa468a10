//! Interface bindings: factories, routers, and the shared method cache.
//!
//! ```text
//! BindingRegistry ──name──► InterfaceBindingFactory ──create(ctx)──► BindingHandle
//!                                  │                                     │
//!                                  └──── owns ──► MethodCache ◄── shares ┘
//! ```

pub mod cache;
pub mod factory;
pub mod registry;
pub mod router;

pub use cache::MethodCache;
pub use factory::{BoundInterface, InterfaceBindingFactory};
pub use registry::BindingRegistry;
pub use router::{BindingHandle, CallRouter};
