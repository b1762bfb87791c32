//! # Security Module
//!
//! Authentication Requirement Resolver.
//!
//! An operation declares its requirements as OR-of-AND groups of scheme
//! names. For each group in order, each scheme's handler is invoked with the
//! credential that scheme kind carries:
//!
//! - **API key** - raw key from a header, query parameter or cookie
//! - **HTTP basic** - `Authorization: Basic base64(id:secret)`
//! - **HTTP bearer** - `Authorization: Bearer <token>`
//!
//! The first fully satisfied group yields its principals keyed by scheme
//! name; when every group is abandoned the request fails with
//! `AuthenticationFailed`.
//!
//! ## Example
//!
//! ```rust
//! use routebind::model::{Api, AuthenticationScheme};
//! use routebind::security::{AuthenticationRegistry, Credential};
//!
//! let api = Api::new().with_scheme(AuthenticationScheme::bearer("token"));
//! let mut registry = AuthenticationRegistry::new(&api);
//! registry
//!     .register("token", |credential: Credential| async move {
//!         match credential {
//!             Credential::Bearer(t) if t == "let-me-in" => Some(serde_json::json!({"sub": "ops"})),
//!             _ => None,
//!         }
//!     })
//!     .unwrap();
//! ```

mod credentials;
mod resolver;

pub use credentials::{apply_credential, Credential, CredentialSource};
pub use resolver::{AuthenticationHandler, AuthenticationRegistry, Principal, Principals};
