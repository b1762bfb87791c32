//! Status Dispatcher.
//!
//! Selects the operation result claiming a status code. Status sets of one
//! operation are disjoint; the index refuses to build otherwise, so a lookup
//! never has to choose between claimants.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::content::{BodyStream, IncomingBody};
use crate::error::{Error, Result, ValidationIssue};
use crate::model::{Operation, OperationResult};
use crate::validation::Validators;

#[derive(Debug, Clone)]
pub struct StatusDispatcher {
    operation_id: String,
    results: Vec<OperationResult>,
    by_code: HashMap<u16, usize>,
}

impl StatusDispatcher {
    /// Index the results of `operation`.
    ///
    /// Fails with `InvalidModel` when two results claim the same code.
    pub fn new(operation: &Operation) -> Result<Self> {
        let mut by_code = HashMap::new();
        let mut issues = Vec::new();
        for (index, result) in operation.operation_results.iter().enumerate() {
            for code in &result.status_codes {
                if let Some(previous) = by_code.insert(*code, index) {
                    issues.push(ValidationIssue::new(
                        format!("{}.results.{}", operation.id, result.status_kind),
                        "overlapping_status_code",
                        format!(
                            "{code} is already claimed by '{}'",
                            operation.operation_results[previous].status_kind
                        ),
                    ));
                }
            }
        }
        if !issues.is_empty() {
            return Err(Error::InvalidModel(issues));
        }
        Ok(Self {
            operation_id: operation.id.clone(),
            results: operation.operation_results.clone(),
            by_code,
        })
    }

    /// The result whose status set contains `status`.
    pub fn select(&self, status: u16) -> Result<&OperationResult> {
        match self.by_code.get(&status) {
            Some(index) => {
                let result = &self.results[*index];
                debug!(
                    operation_id = %self.operation_id,
                    status = status,
                    status_kind = %result.status_kind,
                    "Operation result selected"
                );
                Ok(result)
            }
            None => {
                debug!(operation_id = %self.operation_id, status = status, "No result claims status");
                Err(Error::UnexpectedStatusCode(status))
            }
        }
    }

    /// Select the result, then negotiate the response body with its bodies.
    pub fn dispatch(
        &self,
        status: u16,
        content_type: Option<&str>,
        body: BodyStream,
        validators: Option<Arc<Validators>>,
    ) -> Result<(&OperationResult, IncomingBody)> {
        let result = self.select(status)?;
        let body = IncomingBody::negotiate(&result.bodies, content_type, body, validators)?;
        Ok((result, body))
    }

    pub fn results(&self) -> &[OperationResult] {
        &self.results
    }
}
