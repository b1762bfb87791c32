//! # routebind
//!
//! **routebind** is the routing and protocol-dispatch core that generated HTTP
//! client and server bindings share. It consumes an already-resolved API
//! model and provides:
//!
//! - **[`router`]** - a bidirectional route table: concrete paths to route
//!   ids and placeholder values, and back
//! - **[`params`]** - parameter containers built from path, query, header and
//!   cookie values, with validation hooks in both directions
//! - **[`content`]** - content negotiation over declared bodies: text, JSON
//!   entities or raw byte streams
//! - **[`status`]** - selection of the operation result claiming a status code
//! - **[`security`]** - OR-of-AND authentication requirements evaluated
//!   against registered scheme handlers
//!
//! [`server::Server`] and [`client::Client`] wire these together into the
//! request cycle of each side. Every failure is an [`Error`] variant; the
//! server maps each to a fixed HTTP status.
//!
//! ## Request cycle
//!
//! ```text
//! server: match route -> select operation -> decode parameters -> authenticate
//!         -> negotiate request body -> handler -> status dispatch -> encode response
//! client: encode parameters -> apply credentials -> stringify route -> encode body
//!         -> transport -> status dispatch -> decode headers -> negotiate response body
//! ```
//!
//! ## Model
//!
//! The model ([`model::Api`]) is loaded from YAML, TOML or JSON with
//! [`model::load_api`] and validated as a whole before use. Schema ids in it
//! are opaque: they only select parse and validation hooks
//! ([`validation::Validators`]) and generated type names.

pub mod cli;
pub mod client;
pub mod config;
pub mod content;
pub mod error;
pub mod ids;
pub mod logging;
pub mod model;
pub mod params;
pub mod router;
pub mod security;
pub mod server;
pub mod status;
pub mod validation;

pub use error::{BodyError, Error, Result, ValidationIssue};
