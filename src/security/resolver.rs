use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::credentials::{Credential, CredentialSource};
use crate::error::{Error, Result};
use crate::model::{Api, AuthenticationScheme, RequirementGroup};

/// Value an authentication handler returns for a satisfied scheme.
pub type Principal = Value;

/// Validates one scheme's credential.
///
/// `None` means "no match": the credential was not accepted and the
/// requirement group using this scheme is abandoned.
pub trait AuthenticationHandler: Send + Sync {
    fn authenticate(&self, credential: Credential) -> BoxFuture<'static, Option<Principal>>;
}

impl<F, Fut> AuthenticationHandler for F
where
    F: Fn(Credential) -> Fut + Send + Sync,
    Fut: Future<Output = Option<Principal>> + Send + 'static,
{
    fn authenticate(&self, credential: Credential) -> BoxFuture<'static, Option<Principal>> {
        Box::pin(self(credential))
    }
}

/// Principals of the satisfied requirement group, keyed by scheme name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Principals(BTreeMap<String, Principal>);

impl Principals {
    pub fn get(&self, scheme_name: &str) -> Option<&Principal> {
        self.0.get(scheme_name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Principal)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_inner(self) -> BTreeMap<String, Principal> {
        self.0
    }
}

/// Registered authentication handlers, checked against the declared schemes.
#[derive(Clone, Default)]
pub struct AuthenticationRegistry {
    schemes: HashMap<String, AuthenticationScheme>,
    handlers: HashMap<String, Arc<dyn AuthenticationHandler>>,
}

impl AuthenticationRegistry {
    pub fn new(api: &Api) -> Self {
        Self {
            schemes: api
                .authentication
                .iter()
                .map(|s| (s.name.clone(), s.clone()))
                .collect(),
            handlers: HashMap::new(),
        }
    }

    /// Register the handler for a declared scheme. A later registration for
    /// the same scheme replaces the earlier one.
    pub fn register<H>(&mut self, scheme_name: &str, handler: H) -> Result<()>
    where
        H: AuthenticationHandler + 'static,
    {
        self.register_arc(scheme_name, Arc::new(handler))
    }

    pub fn register_arc(&mut self, scheme_name: &str, handler: Arc<dyn AuthenticationHandler>) -> Result<()> {
        if !self.schemes.contains_key(scheme_name) {
            return Err(Error::UnknownAuthenticationScheme(scheme_name.to_string()));
        }
        if self.handlers.insert(scheme_name.to_string(), handler).is_some() {
            warn!(scheme = %scheme_name, "Authentication handler replaced");
        } else {
            info!(scheme = %scheme_name, "Authentication handler registered");
        }
        Ok(())
    }

    pub fn has_handler(&self, scheme_name: &str) -> bool {
        self.handlers.contains_key(scheme_name)
    }

    pub fn scheme(&self, scheme_name: &str) -> Option<&AuthenticationScheme> {
        self.schemes.get(scheme_name)
    }

    /// Evaluate OR-of-AND requirements.
    ///
    /// Groups are tried in order and the schemes of a group in listed order.
    /// The first scheme that yields no match abandons its group; later
    /// schemes of that group are not invoked. An empty requirement list
    /// succeeds with no principals.
    ///
    /// # Errors
    ///
    /// `AuthenticationFailed` when every group has been abandoned.
    pub async fn resolve(
        &self,
        requirements: &[RequirementGroup],
        source: &CredentialSource<'_>,
    ) -> Result<Principals> {
        if requirements.is_empty() {
            return Ok(Principals::default());
        }

        'groups: for (branch, group) in requirements.iter().enumerate() {
            let mut principals = BTreeMap::new();
            for name in group {
                let Some(scheme) = self.schemes.get(name) else {
                    debug!(branch = branch, scheme = %name, "Scheme not declared");
                    continue 'groups;
                };
                let Some(handler) = self.handlers.get(name) else {
                    debug!(branch = branch, scheme = %name, "No handler registered");
                    continue 'groups;
                };
                let Some(credential) = source.extract(scheme) else {
                    debug!(branch = branch, scheme = %name, "Credential absent");
                    continue 'groups;
                };
                match handler.authenticate(credential).await {
                    Some(principal) => {
                        principals.insert(name.clone(), principal);
                    }
                    None => {
                        debug!(branch = branch, scheme = %name, "Credential rejected");
                        continue 'groups;
                    }
                }
            }
            debug!(branch = branch, schemes = ?group, "Authentication requirement satisfied");
            return Ok(Principals(principals));
        }

        warn!(groups = requirements.len(), "Authentication failed for every requirement group");
        Err(Error::AuthenticationFailed)
    }
}

impl std::fmt::Debug for AuthenticationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut handlers: Vec<&String> = self.handlers.keys().collect();
        handlers.sort();
        f.debug_struct("AuthenticationRegistry")
            .field("schemes", &self.schemes.len())
            .field("handlers", &handlers)
            .finish()
    }
}
