//! Method identity: type names, method keys, and the base-object contract.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::traits::Invocable;

/// Dynamic argument and result type.
pub use serde_json::Value;

/// Name of the built-in root type every object derives from.
pub const OBJECT_TYPE: &str = "Object";

/// Identity of a type (interface or class).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for TypeName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl PartialEq<str> for TypeName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TypeName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable identity of a method: declaring type, name, parameter types.
///
/// Two keys are equal iff all three parts are equal, so a key built from
/// configuration compares equal to the key stored in a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodKey {
    declaring_type: TypeName,
    name: String,
    params: Vec<TypeName>,
}

impl MethodKey {
    pub fn new<I, P>(
        declaring_type: impl Into<TypeName>,
        name: impl Into<String>,
        params: I,
    ) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<TypeName>,
    {
        Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    pub fn declaring_type(&self) -> &TypeName {
        &self.declaring_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[TypeName] {
        &self.params
    }

    /// Number of arguments a call must supply.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Whether this key has the given name and parameter list, ignoring
    /// the declaring type.
    pub fn matches_signature(&self, name: &str, params: &[TypeName]) -> bool {
        self.name == name && self.params == params
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.declaring_type, self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{p}")?;
        }
        f.write_str(")")
    }
}

/// Body of an interface-supplied default method.
///
/// Receives the object the caller invoked (the proxy, not whatever sits
/// behind it), so calls the body makes on `this` are routed normally.
pub type DefaultBody = Arc<dyn Fn(&dyn Invocable, &[Value]) -> Result<Value> + Send + Sync>;

/// A method declared on an interface.
#[derive(Clone)]
pub struct MethodDecl {
    key: MethodKey,
    default_body: Option<DefaultBody>,
}

impl MethodDecl {
    /// Abstract method: must be resolved or implemented elsewhere.
    pub fn abstract_method(key: MethodKey) -> Self {
        Self {
            key,
            default_body: None,
        }
    }

    /// Method carrying its own body.
    pub fn with_default(key: MethodKey, body: DefaultBody) -> Self {
        Self {
            key,
            default_body: Some(body),
        }
    }

    pub fn key(&self) -> &MethodKey {
        &self.key
    }

    pub fn default_body(&self) -> Option<&DefaultBody> {
        self.default_body.as_ref()
    }

    pub fn is_default(&self) -> bool {
        self.default_body.is_some()
    }
}

impl fmt::Debug for MethodDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDecl")
            .field("key", &self.key)
            .field("default", &self.is_default())
            .finish()
    }
}

/// The universal base-object contract every object answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectMethod {
    /// `equals(Object)`: the argument is the other object's identity hash.
    Equals,
    /// `hashCode()`
    HashCode,
    /// `toString()`
    ToString,
}

impl ObjectMethod {
    pub const ALL: [ObjectMethod; 3] = [
        ObjectMethod::Equals,
        ObjectMethod::HashCode,
        ObjectMethod::ToString,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ObjectMethod::Equals => "equals",
            ObjectMethod::HashCode => "hashCode",
            ObjectMethod::ToString => "toString",
        }
    }

    pub fn key(self) -> MethodKey {
        match self {
            ObjectMethod::Equals => MethodKey::new(OBJECT_TYPE, "equals", [OBJECT_TYPE]),
            ObjectMethod::HashCode | ObjectMethod::ToString => {
                MethodKey::new(OBJECT_TYPE, self.name(), Vec::<TypeName>::new())
            }
        }
    }

    /// Recognise a key as one of the base-object methods.
    pub fn from_key(key: &MethodKey) -> Option<Self> {
        if key.declaring_type() != OBJECT_TYPE {
            return None;
        }
        Self::ALL.into_iter().find(|m| m.key() == *key)
    }

    /// Answer this method for an object known by `identity` and `label`.
    pub fn answer(self, identity: u64, label: &str, args: &[Value]) -> Value {
        match self {
            ObjectMethod::Equals => {
                Value::Bool(args.first().and_then(Value::as_u64) == Some(identity))
            }
            ObjectMethod::HashCode => Value::from(identity),
            ObjectMethod::ToString => Value::String(format!("{label}@{identity:x}")),
        }
    }
}
