//! Huginn error types

use std::fmt;
use std::sync::Arc;

use crate::types::{MethodKey, TypeName};

/// Opaque failure raised by an execution unit or an intercepted target.
///
/// Shared behind an `Arc` so it can cross interceptor layers without being
/// re-wrapped. Two `Failure`s are the same failure iff [`Failure::ptr_eq`].
#[derive(Clone)]
pub struct Failure(Arc<dyn std::error::Error + Send + Sync>);

impl Failure {
    pub fn new<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self(Arc::new(err))
    }

    /// Failure carrying only a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(MessageError(message.into()))
    }

    /// Whether both handles point at the same underlying error.
    pub fn ptr_eq(&self, other: &Failure) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// The underlying error.
    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        &*self.0
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

#[derive(Debug)]
struct MessageError(String);

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for MessageError {}

/// Huginn error types
#[derive(Debug, thiserror::Error)]
pub enum HuginnError {
    // Configuration errors (raised while wiring things up, never at call time)
    #[error("interceptor '{interceptor}' declares no signatures")]
    EmptyInterceptorSpec { interceptor: String },

    #[error("could not find method on {type_name} named {method}({})", join(.args))]
    UnknownSignature {
        type_name: TypeName,
        method: String,
        args: Vec<TypeName>,
    },

    #[error("{0} is not an interface")]
    NotAnInterface(TypeName),

    #[error("duplicate method {0}")]
    DuplicateMethod(MethodKey),

    #[error("type {0} is already known to the binding registry")]
    AlreadyBound(TypeName),

    #[error("unknown type: {0}")]
    UnknownType(TypeName),

    #[error("{class} does not implement {method}")]
    MissingImplementation { class: TypeName, method: MethodKey },

    #[error("{class} implements {method}, which none of its interfaces declare")]
    UndeclaredImplementation { class: TypeName, method: MethodKey },

    #[error("configuration error: {0}")]
    Configuration(String),

    // Resolution errors
    #[error("no execution binding for {method} on {interface}")]
    UnboundMethod {
        interface: TypeName,
        method: MethodKey,
    },

    #[error("type {0} is not known to the binding registry")]
    UnknownBinding(TypeName),

    // Call-time errors
    #[error("{type_name} has no method {method}")]
    NoSuchMethod { type_name: TypeName, method: MethodKey },

    #[error("{method} expects {expected} argument(s), got {actual}")]
    InvalidArguments {
        method: MethodKey,
        expected: usize,
        actual: usize,
    },

    /// Failure raised by an execution unit or a target method, untouched.
    #[error(transparent)]
    Execution(Failure),
}

impl HuginnError {
    /// Wrap an arbitrary error as an execution failure.
    pub fn execution<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        HuginnError::Execution(Failure::new(err))
    }

    /// Whether this error is raised while wiring bindings or interceptors.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            HuginnError::EmptyInterceptorSpec { .. }
                | HuginnError::UnknownSignature { .. }
                | HuginnError::NotAnInterface(_)
                | HuginnError::DuplicateMethod(_)
                | HuginnError::AlreadyBound(_)
                | HuginnError::UnknownType(_)
                | HuginnError::MissingImplementation { .. }
                | HuginnError::UndeclaredImplementation { .. }
                | HuginnError::Configuration(_)
        )
    }

    /// Whether this error means no execution binding could be found.
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            HuginnError::UnboundMethod { .. } | HuginnError::UnknownBinding(_)
        )
    }

    /// The execution failure carried by this error, if any.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            HuginnError::Execution(f) => Some(f),
            _ => None,
        }
    }
}

impl From<Failure> for HuginnError {
    fn from(failure: Failure) -> Self {
        HuginnError::Execution(failure)
    }
}

fn join(args: &[TypeName]) -> String {
    args.iter()
        .map(TypeName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for Huginn operations
pub type Result<T> = std::result::Result<T, HuginnError>;
