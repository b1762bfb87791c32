use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Response, StatusCode};
use serde_json::{json, Value};

use crate::content::{BodyStream, OutgoingBody};
use crate::error::Error;
use crate::params::ParameterContainer;

/// What an operation handler produces.
///
/// `status` selects the operation result, which then decides which header
/// parameters and bodies are legal.
#[derive(Debug)]
pub struct OperationResponse {
    pub status: u16,
    pub headers: ParameterContainer,
    pub body: OutgoingBody,
}

impl OperationResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: ParameterContainer::new(),
            body: OutgoingBody::None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: OutgoingBody) -> Self {
        self.body = body;
        self
    }

    /// `application/json` response.
    pub fn json(status: u16, entity: Value) -> Self {
        Self::new(status).with_body(OutgoingBody::json(entity))
    }

    /// `text/plain` response.
    pub fn text(status: u16, value: impl Into<String>) -> Self {
        Self::new(status).with_body(OutgoingBody::text(value))
    }
}

/// JSON error body `{ "error": <kind>, "message": <display> }`.
pub fn error_body(error: &Error) -> Value {
    let mut body = json!({
        "error": error.kind(),
        "message": error.to_string(),
    });
    if let Error::InvalidModel(issues) = error {
        body["issues"] = issues.iter().map(|i| Value::String(i.to_string())).collect();
    }
    body
}

pub(crate) fn write_json_error(status: StatusCode, error: &Error) -> Response<BodyStream> {
    let bytes = serde_json::to_vec(&error_body(error)).unwrap_or_default();
    let mut response = Response::new(BodyStream::from_bytes(bytes));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
