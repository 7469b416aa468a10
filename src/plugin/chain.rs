//! Ordered interceptor chain.

use std::sync::Arc;

use tracing::info;

use super::interceptor::Interceptor;
use super::wrap::PreparedInterceptor;
use crate::Result;
use crate::traits::Invocable;

/// Interceptors in configured order.
///
/// Each interceptor is validated when added, so [`plugin_all`](Self::plugin_all)
/// cannot fail. Applying the chain wraps the target once per interceptor,
/// each wrapping the previous result: the last interceptor added sees a
/// call first.
#[derive(Debug, Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<PreparedInterceptor>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an interceptor (it will become the outermost layer).
    ///
    /// Fails if the interceptor declares no signatures or a signature that
    /// does not exist on its interface.
    pub fn add_interceptor(&mut self, interceptor: Arc<dyn Interceptor>) -> Result<()> {
        let prepared = PreparedInterceptor::new(interceptor)?;
        info!(
            interceptor = prepared.interceptor().name(),
            position = self.interceptors.len(),
            "interceptor added"
        );
        self.interceptors.push(prepared);
        Ok(())
    }

    /// Wrap `target` with every interceptor in order.
    pub fn plugin_all(&self, target: Arc<dyn Invocable>) -> Arc<dyn Invocable> {
        self.interceptors
            .iter()
            .fold(target, |current, interceptor| interceptor.wrap(current))
    }

    /// Interceptors in configured order.
    pub fn interceptors(&self) -> Vec<Arc<dyn Interceptor>> {
        self.interceptors
            .iter()
            .map(|p| p.interceptor().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}
