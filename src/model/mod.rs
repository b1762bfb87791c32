//! Resolved API model consumed by the routing and dispatch components.
//!
//! The model is produced by an upstream generator (schema resolution and
//! naming happen there) and loaded here from JSON, YAML or TOML. It is
//! immutable once loaded.

mod load;
mod types;
mod validate;

pub use load::{load_api, parse_api};
pub use types::{
    Api, ApiKeyLocation, AuthenticationKind, AuthenticationScheme, Body, Operation,
    OperationResult, Parameter, ParameterLocation, Path, RequirementGroup,
};
pub use validate::{ensure_valid, print_issues, validate_api};
