//! # Server Binding
//!
//! Drives one request through the dispatch pipeline:
//!
//! 1. match the path against the route table, select the operation by method
//! 2. decode path, query, header and cookie parameters
//! 3. resolve the operation's authentication requirements
//! 4. negotiate the request body
//! 5. invoke the registered [`OperationHandler`]
//! 6. select the operation result by status, encode its headers and body
//!
//! Requests and responses are plain `http::Request<BodyStream>` and
//! `http::Response<BodyStream>` values, so any HTTP stack can sit in front.

mod core;
mod registry;
mod request;
mod response;

pub use core::Server;
pub use registry::{HandlerRegistry, OperationHandler};
pub use request::OperationRequest;
pub use response::{error_body, OperationResponse};
