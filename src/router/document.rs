//! Serialized route table exchanged between generator and bindings.
//!
//! ```json
//! {
//!   "mode": "bidirectional",
//!   "routes": [
//!     { "operationId": "pet", "pattern": "/pets/{id}" }
//!   ]
//! }
//! ```
//!
//! Routes are listed in registration order, which is also the tie-break
//! order for templates sharing a literal prefix. Loading a document and
//! registering its routes in order rebuilds an equivalent table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which directions a route table supports.
///
/// `Forward` tables only turn route ids into paths (client side), `Reverse`
/// tables only match paths (server side).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteMode {
    Forward,
    Reverse,
    #[default]
    Bidirectional,
}

impl RouteMode {
    pub fn can_stringify(&self) -> bool {
        matches!(self, RouteMode::Forward | RouteMode::Bidirectional)
    }

    pub fn can_match(&self) -> bool {
        matches!(self, RouteMode::Reverse | RouteMode::Bidirectional)
    }

    /// Whether a table in this mode can serve a table in `other` mode.
    pub fn covers(&self, other: RouteMode) -> bool {
        (!other.can_stringify() || self.can_stringify()) && (!other.can_match() || self.can_match())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteMode::Forward => "forward",
            RouteMode::Reverse => "reverse",
            RouteMode::Bidirectional => "bidirectional",
        }
    }
}

impl fmt::Display for RouteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RouteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "forward" => Ok(RouteMode::Forward),
            "reverse" => Ok(RouteMode::Reverse),
            "bidirectional" => Ok(RouteMode::Bidirectional),
            other => Err(format!("unknown route mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntryDocument {
    /// Route id. Generated bindings use the path id here.
    pub operation_id: String,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTableDocument {
    pub mode: RouteMode,
    pub routes: Vec<RouteEntryDocument>,
}

impl RouteTableDocument {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
