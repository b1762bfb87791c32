use tracing::debug;

use crate::error::{Error, Result};
use crate::model::Body;

/// How a body's bytes are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    /// `text/plain`: one string value or a stream of lines.
    Text,
    /// `application/json` and `+json` types: one entity or a stream of entities.
    Json,
    /// Anything else: raw bytes.
    Stream,
}

impl BodyKind {
    pub fn of(content_type: &str) -> Self {
        let essence = essence(content_type);
        if essence == "text/plain" {
            BodyKind::Text
        } else if essence == "application/json" || essence.ends_with("+json") {
            BodyKind::Json
        } else {
            BodyKind::Stream
        }
    }
}

/// Media type without parameters, trimmed and lowercased.
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Outcome of a successful negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Negotiated<'a> {
    pub body: &'a Body,
    pub kind: BodyKind,
}

/// Select the body definition matching `content_type`.
///
/// An empty definition list bypasses negotiation entirely and yields
/// `Ok(None)` whatever the content type.
///
/// # Errors
///
/// * `MissingContentType` - definitions exist but no content type was given
/// * `UnexpectedContentType` - no definition matches
pub fn negotiate<'a>(bodies: &'a [Body], content_type: Option<&str>) -> Result<Option<Negotiated<'a>>> {
    if bodies.is_empty() {
        return Ok(None);
    }
    let Some(content_type) = content_type.filter(|c| !c.trim().is_empty()) else {
        return Err(Error::MissingContentType);
    };
    let wanted = essence(content_type);
    let Some(body) = bodies.iter().find(|b| essence(&b.content_type) == wanted) else {
        debug!(content_type = %content_type, "No body definition for content type");
        return Err(Error::UnexpectedContentType(content_type.to_string()));
    };
    let kind = BodyKind::of(&body.content_type);
    debug!(content_type = %body.content_type, kind = ?kind, "Content type negotiated");
    Ok(Some(Negotiated { body, kind }))
}
