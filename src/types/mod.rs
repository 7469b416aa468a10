//! Type model for dynamic dispatch: names, method keys, descriptors.

mod interface;
mod method;
mod registry;
mod signature;

pub use interface::{
    Ancestry, ClassDescriptor, InterfaceBuilder, InterfaceDescriptor, TypeDescriptor,
};
pub use method::{DefaultBody, MethodDecl, MethodKey, OBJECT_TYPE, ObjectMethod, TypeName, Value};
pub use registry::TypeRegistry;
pub use signature::Signature;
