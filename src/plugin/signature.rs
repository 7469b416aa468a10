//! Signature index: which methods of which interfaces an interceptor handles.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::types::{ClassDescriptor, InterfaceDescriptor, MethodKey, Signature, TypeName};
use crate::{HuginnError, Result};

/// Per-interceptor map from interface to the method keys it intercepts.
///
/// Every key is verified against its interface when the index is built, so
/// a bad signature surfaces during setup and never at call time.
#[derive(Debug, Default)]
pub struct SignatureIndex {
    types: HashMap<TypeName, Arc<InterfaceDescriptor>>,
    methods: HashMap<TypeName, HashSet<MethodKey>>,
}

impl SignatureIndex {
    /// Build the index for `interceptor` from its declared signatures.
    pub fn build(interceptor: &str, signatures: &[Signature]) -> Result<Self> {
        if signatures.is_empty() {
            return Err(HuginnError::EmptyInterceptorSpec {
                interceptor: interceptor.to_string(),
            });
        }

        let mut index = Self::default();
        for sig in signatures {
            let target = sig.target();
            let decl = target.find_method(sig.method(), sig.args()).ok_or_else(|| {
                HuginnError::UnknownSignature {
                    type_name: target.name().clone(),
                    method: sig.method().to_string(),
                    args: sig.args().to_vec(),
                }
            })?;
            index
                .types
                .entry(target.name().clone())
                .or_insert_with(|| Arc::clone(target));
            // Calls arrive keyed by the declaring interface, which is a
            // parent of `target` for inherited methods.
            for owner in [target.name(), decl.key().declaring_type()] {
                index
                    .methods
                    .entry(owner.clone())
                    .or_default()
                    .insert(decl.key().clone());
            }
        }
        Ok(index)
    }

    /// Whether `name` is one of the indexed interfaces.
    pub fn contains_type(&self, name: &TypeName) -> bool {
        self.types.contains_key(name)
    }

    /// Whether calls to `method` should be intercepted.
    ///
    /// Looks up the set for the method's declaring type.
    pub fn matches(&self, method: &MethodKey) -> bool {
        self.methods
            .get(method.declaring_type())
            .is_some_and(|set| set.contains(method))
    }

    /// Methods indexed under `name`.
    pub fn methods_for(&self, name: &TypeName) -> Option<&HashSet<MethodKey>> {
        self.methods.get(name)
    }

    /// Indexed interface names.
    pub fn type_names(&self) -> impl Iterator<Item = &TypeName> {
        self.types.keys()
    }

    /// Interfaces implemented anywhere in `class`'s ancestry that are also
    /// indexed, deduplicated, in discovery order.
    pub fn applicable_interfaces(&self, class: &ClassDescriptor) -> Vec<Arc<InterfaceDescriptor>> {
        let mut seen = HashSet::new();
        class
            .ancestry()
            .flat_map(|c| c.interfaces().iter())
            .filter(|i| self.contains_type(i.name()) && seen.insert(i.name().clone()))
            .cloned()
            .collect()
    }
}
