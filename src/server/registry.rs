use futures::future::BoxFuture;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

use super::request::OperationRequest;
use super::response::OperationResponse;
use crate::error::{Error, Result};
use crate::model::Api;

/// Application code implementing one operation.
pub trait OperationHandler: Send + Sync {
    fn handle(&self, request: OperationRequest) -> BoxFuture<'static, Result<OperationResponse>>;
}

impl<F, Fut> OperationHandler for F
where
    F: Fn(OperationRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<OperationResponse>> + Send + 'static,
{
    fn handle(&self, request: OperationRequest) -> BoxFuture<'static, Result<OperationResponse>> {
        Box::pin(self(request))
    }
}

/// Operation handlers keyed by operation id.
///
/// Only operations the model declares can be registered. Registering the
/// same operation twice replaces the earlier handler.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    operations: HashSet<String>,
    handlers: HashMap<String, Arc<dyn OperationHandler>>,
}

impl HandlerRegistry {
    pub fn new(api: &Api) -> Self {
        Self {
            operations: api.operations().map(|(_, op)| op.id.clone()).collect(),
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, operation_id: &str, handler: Arc<dyn OperationHandler>) -> Result<()> {
        if !self.operations.contains(operation_id) {
            return Err(Error::OperationNotFound(operation_id.to_string()));
        }
        if self.handlers.insert(operation_id.to_string(), handler).is_some() {
            warn!(
                operation_id = %operation_id,
                total_handlers = self.handlers.len(),
                "Replaced existing handler"
            );
        } else {
            info!(
                operation_id = %operation_id,
                total_handlers = self.handlers.len(),
                "Handler registered successfully"
            );
        }
        Ok(())
    }

    pub fn get(&self, operation_id: &str) -> Option<&Arc<dyn OperationHandler>> {
        self.handlers.get(operation_id)
    }

    pub fn is_registered(&self, operation_id: &str) -> bool {
        self.handlers.contains_key(operation_id)
    }

    /// Declared operations still lacking a handler, sorted.
    pub fn unimplemented(&self) -> Vec<&str> {
        let mut missing: Vec<&str> = self
            .operations
            .iter()
            .filter(|id| !self.handlers.contains_key(id.as_str()))
            .map(String::as_str)
            .collect();
        missing.sort_unstable();
        missing
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut registered: Vec<&String> = self.handlers.keys().collect();
        registered.sort();
        f.debug_struct("HandlerRegistry")
            .field("operations", &self.operations.len())
            .field("registered", &registered)
            .finish()
    }
}
