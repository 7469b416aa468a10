//! Declarative configuration for bindings and interceptors.
//!
//! Interceptor signatures can be declared in TOML instead of code:
//!
//! ```toml
//! [binding]
//! eager_resolution = true
//!
//! [[interceptors]]
//! name = "audit"
//!
//! [interceptors.properties]
//! level = "debug"
//!
//! [[interceptors.signatures]]
//! type = "Executor"
//! method = "update"
//! args = ["MappedStatement", "Object"]
//! ```
//!
//! Type names are resolved against a [`TypeRegistry`]; an unknown name, a
//! class in place of an interface, or a method the interface does not
//! declare all fail while the chain is built.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::binding::BindingRegistry;
use crate::plugin::{Interceptor, InterceptorChain};
use crate::traits::MethodResolver;
use crate::types::{Signature, TypeName, TypeRegistry};
use crate::{HuginnError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HuginnConfig {
    #[serde(default)]
    pub binding: BindingConfig,
    /// Interceptors in the order they are applied.
    #[serde(default)]
    pub interceptors: Vec<InterceptorConfig>,
}

/// Binding registry settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BindingConfig {
    /// Resolve every method when an interface is registered (default: false).
    #[serde(default)]
    pub eager_resolution: bool,
}

/// One configured interceptor.
#[derive(Debug, Clone, Deserialize)]
pub struct InterceptorConfig {
    /// Name used to pick the implementation.
    pub name: String,
    /// Free-form settings passed to the implementation.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    /// Declared interest. May be empty if the implementation declares its own.
    #[serde(default)]
    pub signatures: Vec<SignatureDecl>,
}

/// A signature as written in configuration: types by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureDecl {
    #[serde(rename = "type")]
    pub type_name: TypeName,
    pub method: String,
    #[serde(default)]
    pub args: Vec<TypeName>,
}

impl SignatureDecl {
    /// Turn type names into descriptors.
    pub fn resolve(&self, types: &TypeRegistry) -> Result<Signature> {
        let target = types.interface(&self.type_name)?;
        Ok(Signature::new(target, self.method.clone(), self.args.clone()))
    }
}

impl InterceptorConfig {
    /// Resolve every declared signature.
    pub fn resolve_signatures(&self, types: &TypeRegistry) -> Result<Vec<Signature>> {
        self.signatures.iter().map(|s| s.resolve(types)).collect()
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

impl HuginnConfig {
    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| HuginnError::Configuration(format!("Failed to parse config: {e}")))
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            HuginnError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            HuginnError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Build the interceptor chain in configured order.
    ///
    /// `factory` turns each entry (with its signatures already resolved)
    /// into an interceptor. Every interceptor is validated as it is added,
    /// so a misconfigured entry fails here rather than on first call.
    pub fn build_chain<F>(&self, types: &TypeRegistry, mut factory: F) -> Result<InterceptorChain>
    where
        F: FnMut(&InterceptorConfig, Vec<Signature>) -> Result<Arc<dyn Interceptor>>,
    {
        let mut chain = InterceptorChain::new();
        for entry in &self.interceptors {
            let signatures = entry.resolve_signatures(types)?;
            let interceptor = factory(entry, signatures)?;
            chain.add_interceptor(interceptor)?;
        }
        Ok(chain)
    }

    /// Create an empty binding registry honouring the binding settings.
    pub fn binding_registry<C: Send + Sync + 'static>(
        &self,
        resolver: Arc<dyn MethodResolver<C>>,
    ) -> BindingRegistry<C> {
        let mut registry = BindingRegistry::new(resolver);
        registry.set_eager_resolution(self.binding.eager_resolution);
        registry
    }
}
