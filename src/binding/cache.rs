//! Per-interface method cache.

use std::fmt;
use std::sync::Arc;

use crate::telemetry;
use crate::traits::ExecutionUnit;
use crate::types::MethodKey;

/// Thread-safe map from method to its resolved execution unit.
///
/// One cache per [`InterfaceBindingFactory`](super::InterfaceBindingFactory),
/// shared by every handle it creates. Backed by an unbounded moka cache:
/// concurrent reads and inserts never take a whole-cache lock, and entries
/// are never evicted for the life of the factory.
pub struct MethodCache<C> {
    entries: moka::sync::Cache<MethodKey, Arc<dyn ExecutionUnit<C>>>,
}

impl<C: 'static> MethodCache<C> {
    pub fn new() -> Self {
        Self {
            entries: moka::sync::Cache::builder().build(),
        }
    }

    /// Look up the unit for `method`.
    ///
    /// Returns `None` on cache miss. Emits cache hit/miss metrics.
    pub fn get(&self, method: &MethodKey) -> Option<Arc<dyn ExecutionUnit<C>>> {
        let found = self.entries.get(method);
        if found.is_some() {
            metrics::counter!(telemetry::METHOD_CACHE_HITS_TOTAL).increment(1);
        } else {
            metrics::counter!(telemetry::METHOD_CACHE_MISSES_TOTAL).increment(1);
        }
        found
    }

    /// Insert (or overwrite) the unit for `method`.
    pub fn insert(&self, method: MethodKey, unit: Arc<dyn ExecutionUnit<C>>) {
        self.entries.insert(method, unit);
    }

    pub fn contains(&self, method: &MethodKey) -> bool {
        self.entries.contains_key(method)
    }

    /// Number of cached methods.
    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<C: 'static> Default for MethodCache<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> fmt::Debug for MethodCache<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodCache")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}
