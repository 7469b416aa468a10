//! Call interception.
//!
//! An [`Interceptor`] declares the interface methods it cares about. Wrapping
//! a target with it yields either the target itself (nothing applies) or a
//! proxy that routes matching calls to the interceptor and everything else
//! straight to the target.
//!
//! # Chain Flow
//!
//! ```text
//! chain = [A, B]            plugin_all(target) = B(A(target))
//!
//! caller ──► B proxy ──match?──► B.intercept ──proceed──┐
//!               │ no                                    │
//!               ▼                                       ▼
//!            A proxy ──match?──► A.intercept ──proceed──► target
//!               │ no                                    ▲
//!               └───────────────────────────────────────┘
//! ```

pub mod chain;
pub mod interceptor;
pub mod signature;
pub mod wrap;

pub use chain::InterceptorChain;
pub use interceptor::{FnInterceptor, Interceptor, Invocation};
pub use signature::SignatureIndex;
pub use wrap::{PreparedInterceptor, wrap};
