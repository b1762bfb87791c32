//! Validation hooks keyed by schema id.
//!
//! Validators come from the external type layer. The core only decides where
//! they run: before outgoing parameters and entities are assembled, and after
//! incoming ones are decoded.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Why a candidate value was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// JSON pointer into the candidate, empty for the root.
    pub path: String,
    /// Name of the violated rule, e.g. `minimum` or `required`.
    pub rule: String,
}

impl ValidationFailure {
    pub fn new(path: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            rule: rule.into(),
        }
    }

    pub fn at_root(rule: impl Into<String>) -> Self {
        Self::new("", rule)
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.rule)
        } else {
            write!(f, "{} at {}", self.rule, self.path)
        }
    }
}

pub trait Validator: Send + Sync {
    fn validate(&self, candidate: &Value) -> Result<(), ValidationFailure>;
}

impl<F> Validator for F
where
    F: Fn(&Value) -> Result<(), ValidationFailure> + Send + Sync,
{
    fn validate(&self, candidate: &Value) -> Result<(), ValidationFailure> {
        self(candidate)
    }
}

/// Registry of validators by schema id.
#[derive(Clone, Default)]
pub struct Validators {
    by_schema: HashMap<String, Arc<dyn Validator>>,
}

impl Validators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a validator, replacing any previous one for the schema id.
    pub fn register<V>(&mut self, schema_id: impl Into<String>, validator: V)
    where
        V: Validator + 'static,
    {
        self.by_schema.insert(schema_id.into(), Arc::new(validator));
    }

    pub fn with<V>(mut self, schema_id: impl Into<String>, validator: V) -> Self
    where
        V: Validator + 'static,
    {
        self.register(schema_id, validator);
        self
    }

    pub fn get(&self, schema_id: &str) -> Option<&Arc<dyn Validator>> {
        self.by_schema.get(schema_id)
    }

    /// Validate against the schema's validator. Schemas without one accept
    /// anything.
    pub fn validate(&self, schema_id: Option<&str>, candidate: &Value) -> Result<(), ValidationFailure> {
        match schema_id.and_then(|id| self.by_schema.get(id)) {
            Some(validator) => validator.validate(candidate),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.by_schema.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_schema.is_empty()
    }
}

impl fmt::Debug for Validators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&String> = self.by_schema.keys().collect();
        ids.sort();
        f.debug_struct("Validators").field("schemas", &ids).finish()
    }
}
