//! # CLI Module
//!
//! The `routebind` binary inspects API models and the route tables built
//! from them.
//!
//! ## Commands
//!
//! ### `check`
//!
//! Load a model and report every validation issue:
//!
//! ```bash
//! routebind check --model api.yaml
//! ```
//!
//! ### `routes`
//!
//! Export the route table exchange document embedded by generated bindings:
//!
//! ```bash
//! routebind routes --model api.yaml --mode forward --format json --output routes.json
//! ```
//!
//! ### `match`
//!
//! Resolve a concrete path to its route id, methods and placeholder values:
//!
//! ```bash
//! routebind match --model api.yaml /pets/42
//! ```
//!
//! ### `stringify`
//!
//! Build the concrete path of a route id:
//!
//! ```bash
//! routebind stringify --model api.yaml pet id=42
//! ```
//!
//! `--log-level` (or `ROUTEBIND_LOG_LEVEL`) applies to every command; logs go
//! to stderr.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{execute, run_cli, Cli, Commands, DocumentFormat};
