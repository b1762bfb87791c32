use crate::content::IncomingBody;
use crate::ids::RequestId;
use crate::params::RequestParameters;
use crate::security::Principals;

/// Everything an operation handler receives for one request.
///
/// Parameters are already decoded (and validated when configured), the
/// caller is authenticated and the body negotiated against the operation's
/// declared bodies.
#[derive(Debug)]
pub struct OperationRequest {
    pub request_id: RequestId,
    pub operation_id: String,
    pub parameters: RequestParameters,
    pub principals: Principals,
    pub body: IncomingBody,
}

impl OperationRequest {
    /// Shorthand for a decoded path parameter.
    pub fn path_param(&self, name: &str) -> Option<&serde_json::Value> {
        self.parameters.path.get(name)
    }

    pub fn query_param(&self, name: &str) -> Option<&serde_json::Value> {
        self.parameters.query.get(name)
    }
}
