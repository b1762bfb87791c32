//! Error kinds surfaced by matching, dispatch and validation.
//!
//! Every failure is terminal for the current request and is never retried
//! internally. The server boundary turns an [`Error`] into a fixed HTTP status
//! through [`Error::status_code`]; the client boundary hands it to the caller
//! unchanged.

use crate::model::ParameterLocation;
use crate::router::RouteMode;
use http::StatusCode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Issue found while validating an API model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub location: String,
    pub kind: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(
        location: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ValidationIssue {
            location: location.into(),
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.location, self.message)
    }
}

/// Failures of body streams and the codecs layered on them.
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("body stream was cancelled")]
    Cancelled,
    #[error("body is not valid UTF-8")]
    InvalidUtf8,
    #[error("body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("entity failed validation at '{path}': {rule}")]
    EntityValidation { path: String, rule: String },
    #[error("body transport failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no route matches path '{path}'")]
    RouteNotFound { path: String },

    #[error("method {method} is not supported on '{path}'")]
    MethodNotSupported { method: http::Method, path: String },

    #[error("duplicate route: {0}")]
    DuplicateRoute(String),

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("unknown route id '{0}'")]
    UnknownRoute(String),

    #[error("route table in {mode} mode cannot {operation}")]
    DirectionNotSupported {
        mode: RouteMode,
        operation: &'static str,
    },

    #[error("value for placeholder '{name}' would not survive a round trip")]
    AmbiguousParameterValue { name: String },

    #[error("missing {location} parameter '{name}'")]
    MissingParameter {
        location: ParameterLocation,
        name: String,
    },

    #[error("{location} parameter '{name}' failed validation: {rule}")]
    ParameterValidationFailed {
        location: ParameterLocation,
        name: String,
        rule: String,
    },

    #[error("missing content type")]
    MissingContentType,

    #[error("unexpected content type '{0}'")]
    UnexpectedContentType(String),

    #[error("unexpected status code {0}")]
    UnexpectedStatusCode(u16),

    #[error("entity failed validation at '{path}': {rule}")]
    EntityValidationFailed { path: String, rule: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("operation '{0}' is not implemented")]
    OperationNotImplemented(String),

    #[error("operation '{0}' does not exist")]
    OperationNotFound(String),

    #[error("authentication scheme '{0}' is not declared")]
    UnknownAuthenticationScheme(String),

    #[error("invalid API model: {} issue(s)", .0.len())]
    InvalidModel(Vec<ValidationIssue>),

    #[error(transparent)]
    Body(BodyError),

    #[error("transport failed: {0}")]
    Transport(String),

    /// A branch the model invariants rule out. Reaching it is a bug.
    #[error("unreachable: {0}")]
    Unreachable(&'static str),
}

impl From<BodyError> for Error {
    fn from(error: BodyError) -> Self {
        match error {
            BodyError::EntityValidation { path, rule } => Error::EntityValidationFailed { path, rule },
            other => Error::Body(other),
        }
    }
}

impl Error {
    /// Fixed HTTP status used by the server boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingParameter { .. }
            | Error::ParameterValidationFailed { .. }
            | Error::EntityValidationFailed { .. }
            | Error::AmbiguousParameterValue { .. } => StatusCode::BAD_REQUEST,
            Error::Body(
                BodyError::InvalidUtf8 | BodyError::Json(_) | BodyError::EntityValidation { .. },
            ) => StatusCode::BAD_REQUEST,
            Error::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            Error::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            Error::MethodNotSupported { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Error::MissingContentType | Error::UnexpectedContentType(_) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            Error::OperationNotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable name, used in logs and error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::RouteNotFound { .. } => "route_not_found",
            Error::MethodNotSupported { .. } => "method_not_supported",
            Error::DuplicateRoute(_) => "duplicate_route",
            Error::InvalidPattern { .. } => "invalid_pattern",
            Error::UnknownRoute(_) => "unknown_route",
            Error::DirectionNotSupported { .. } => "direction_not_supported",
            Error::AmbiguousParameterValue { .. } => "ambiguous_parameter_value",
            Error::MissingParameter { .. } => "missing_parameter",
            Error::ParameterValidationFailed { .. } => "parameter_validation_failed",
            Error::MissingContentType => "missing_content_type",
            Error::UnexpectedContentType(_) => "unexpected_content_type",
            Error::UnexpectedStatusCode(_) => "unexpected_status_code",
            Error::EntityValidationFailed { .. } => "entity_validation_failed",
            Error::AuthenticationFailed => "authentication_failed",
            Error::OperationNotImplemented(_) => "operation_not_implemented",
            Error::OperationNotFound(_) => "operation_not_found",
            Error::UnknownAuthenticationScheme(_) => "unknown_authentication_scheme",
            Error::InvalidModel(_) => "invalid_model",
            Error::Body(_) => "body",
            Error::Transport(_) => "transport",
            Error::Unreachable(_) => "unreachable",
        }
    }
}
