//! Interceptor signatures.

use std::fmt;
use std::sync::Arc;

use super::interface::InterfaceDescriptor;
use super::method::TypeName;

/// One declared interest of an interceptor: a method on an interface,
/// identified by name and parameter types.
#[derive(Debug, Clone)]
pub struct Signature {
    target: Arc<InterfaceDescriptor>,
    method: String,
    args: Vec<TypeName>,
}

impl Signature {
    pub fn new<I, P>(target: Arc<InterfaceDescriptor>, method: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<TypeName>,
    {
        Self {
            target,
            method: method.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn target(&self) -> &Arc<InterfaceDescriptor> {
        &self.target
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn args(&self) -> &[TypeName] {
        &self.args
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<&str> = self.args.iter().map(TypeName::as_str).collect();
        write!(f, "{}.{}({})", self.target.name(), self.method, args.join(", "))
    }
}
