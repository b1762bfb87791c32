//! # Binding Configuration
//!
//! Server and client bindings each carry four validation toggles. "Incoming"
//! and "outgoing" are relative to the side holding the configuration, so a
//! server validates the request it receives and a client validates the
//! response it receives.
//!
//! | Toggle | Default |
//! |---|---|
//! | `validate_incoming_entity` | `true` |
//! | `validate_incoming_parameters` | `true` |
//! | `validate_outgoing_entity` | `false` |
//! | `validate_outgoing_parameters` | `false` |
//!
//! Configuration is read from a YAML, TOML or JSON file (chosen by
//! extension) and then overridden from the environment:
//!
//! - `ROUTEBIND_VALIDATE_INCOMING_ENTITY`, `ROUTEBIND_VALIDATE_INCOMING_PARAMETERS`,
//!   `ROUTEBIND_VALIDATE_OUTGOING_ENTITY`, `ROUTEBIND_VALIDATE_OUTGOING_PARAMETERS`
//! - `ROUTEBIND_ROUTE_CODEC` - `identity` or `percent`
//! - `ROUTEBIND_BASE_URL` - client only
//!
//! Unparseable override values are ignored.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::{debug, warn};
use url::Url;

use crate::router::ParameterCodec;

/// Which request/response halves are checked by the validation hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationToggles {
    pub validate_incoming_entity: bool,
    pub validate_incoming_parameters: bool,
    pub validate_outgoing_entity: bool,
    pub validate_outgoing_parameters: bool,
}

impl Default for ValidationToggles {
    fn default() -> Self {
        Self {
            validate_incoming_entity: true,
            validate_incoming_parameters: true,
            validate_outgoing_entity: false,
            validate_outgoing_parameters: false,
        }
    }
}

impl ValidationToggles {
    fn apply_env(&mut self, lookup: &dyn Fn(&str) -> Option<String>) {
        let flags = [
            ("ROUTEBIND_VALIDATE_INCOMING_ENTITY", &mut self.validate_incoming_entity),
            ("ROUTEBIND_VALIDATE_INCOMING_PARAMETERS", &mut self.validate_incoming_parameters),
            ("ROUTEBIND_VALIDATE_OUTGOING_ENTITY", &mut self.validate_outgoing_entity),
            ("ROUTEBIND_VALIDATE_OUTGOING_PARAMETERS", &mut self.validate_outgoing_parameters),
        ];
        for (key, flag) in flags {
            if let Some(raw) = lookup(key) {
                match parse_bool(&raw) {
                    Some(v) => *flag = v,
                    None => warn!(key = %key, value = %raw, "Ignoring invalid boolean override"),
                }
            }
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn default_codec() -> String {
    "identity".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfiguration {
    #[serde(flatten)]
    pub validation: ValidationToggles,
    /// Name of the route parameter codec, see [`ParameterCodec::by_name`].
    pub route_codec: String,
}

impl Default for ServerConfiguration {
    fn default() -> Self {
        Self {
            validation: ValidationToggles::default(),
            route_codec: default_codec(),
        }
    }
}

impl ServerConfiguration {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(&|k| env::var(k).ok());
        config
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut config: Self = read_config(path.as_ref())?;
        config.apply_env(&|k| env::var(k).ok());
        Ok(config)
    }

    pub(crate) fn apply_env(&mut self, lookup: &dyn Fn(&str) -> Option<String>) {
        self.validation.apply_env(lookup);
        if let Some(codec) = lookup("ROUTEBIND_ROUTE_CODEC") {
            self.route_codec = codec;
        }
    }

    /// Resolve the configured codec, `None` when the name is unknown.
    pub fn codec(&self) -> Option<ParameterCodec> {
        ParameterCodec::by_name(&self.route_codec)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfiguration {
    #[serde(flatten)]
    pub validation: ValidationToggles,
    pub route_codec: String,
    /// Scheme and authority prefixed to every stringified route. Any path on
    /// it is kept as a prefix.
    pub base_url: Option<Url>,
}

impl Default for ClientConfiguration {
    fn default() -> Self {
        Self {
            validation: ValidationToggles::default(),
            route_codec: default_codec(),
            base_url: None,
        }
    }
}

impl ClientConfiguration {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url: Some(base_url),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(&|k| env::var(k).ok());
        config
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut config: Self = read_config(path.as_ref())?;
        config.apply_env(&|k| env::var(k).ok());
        Ok(config)
    }

    pub(crate) fn apply_env(&mut self, lookup: &dyn Fn(&str) -> Option<String>) {
        self.validation.apply_env(lookup);
        if let Some(codec) = lookup("ROUTEBIND_ROUTE_CODEC") {
            self.route_codec = codec;
        }
        if let Some(raw) = lookup("ROUTEBIND_BASE_URL") {
            match Url::parse(&raw) {
                Ok(url) => self.base_url = Some(url),
                Err(e) => warn!(value = %raw, error = %e, "Ignoring invalid base URL override"),
            }
        }
    }

    pub fn codec(&self) -> Option<ParameterCodec> {
        ParameterCodec::by_name(&self.route_codec)
    }
}

fn read_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    debug!(path = %path.display(), format = ?ext, "Loading configuration");
    let parsed = match ext.as_deref() {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&text).map_err(anyhow::Error::from),
        Some("toml") => toml::from_str(&text).map_err(anyhow::Error::from),
        _ => serde_json::from_str(&text).map_err(anyhow::Error::from),
    };
    parsed.with_context(|| format!("failed to parse configuration {}", path.display()))
}
