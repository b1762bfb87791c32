//! # Router Module
//!
//! Bidirectional route table: turns route ids plus placeholder values into
//! concrete paths (client side) and matches concrete paths back to route ids
//! plus values (server side).
//!
//! ## Architecture
//!
//! 1. **Compilation**: each pattern (e.g. `/pets/{id}`) is parsed into a
//!    [`PathTemplate`] of literal and placeholder tokens, and its literal
//!    prefix is inserted into a radix tree.
//! 2. **Matching**: the radix tree yields the candidate templates whose
//!    literal prefix starts the path, longest prefix first, and the first
//!    template that matches completely wins.
//!
//! The table can be exported to a [`RouteTableDocument`] and loaded back in
//! `forward`, `reverse` or `bidirectional` [`RouteMode`].
//!
//! ## Example
//!
//! ```rust
//! use routebind::router::{RouteMode, RouteTable};
//!
//! let mut table = RouteTable::new(RouteMode::Bidirectional);
//! table.register("pet", "/pets/{id}").unwrap();
//!
//! let path = table.stringify("pet", &[("id", "7")]).unwrap();
//! assert_eq!(path, "/pets/7");
//!
//! let matched = table.match_path(&path).unwrap();
//! assert_eq!(matched.route_id.as_ref(), "pet");
//! assert_eq!(matched.get("id"), Some("7"));
//! ```

mod codec;
mod core;
mod document;
mod pattern;
mod radix;

pub use codec::ParameterCodec;
pub use core::{ParamVec, PlaceholderValues, RouteMatch, RouteTable, MAX_INLINE_PARAMS};
pub use document::{RouteEntryDocument, RouteMode, RouteTableDocument};
pub use pattern::PathTemplate;
