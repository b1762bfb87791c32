use futures::stream::{BoxStream, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use super::codec;
use super::negotiate::{negotiate, BodyKind};
use super::stream::BodyStream;
use crate::error::{BodyError, Error, Result};
use crate::model::Body;
use crate::validation::Validators;

/// Negotiated `text/plain` body.
#[derive(Debug)]
pub struct TextBody {
    content_type: String,
    stream: BodyStream,
}

impl TextBody {
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub async fn value(self) -> Result<String> {
        Ok(codec::read_text(self.stream).await?)
    }

    pub fn lines(self) -> BoxStream<'static, Result<String>> {
        codec::read_lines(self.stream).map(|l| l.map_err(Error::from)).boxed()
    }

    pub fn into_stream(self) -> BodyStream {
        self.stream
    }
}

/// Negotiated JSON body. Entities are validated when validators are set.
pub struct JsonBody {
    content_type: String,
    schema_id: Option<String>,
    stream: BodyStream,
    validators: Option<Arc<Validators>>,
}

impl JsonBody {
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn schema_id(&self) -> Option<&str> {
        self.schema_id.as_deref()
    }

    pub async fn entity(self) -> Result<Value> {
        Ok(codec::read_entity(self.stream, self.validators.as_deref(), self.schema_id.as_deref()).await?)
    }

    /// Read one entity into the generated type.
    pub async fn entity_as<T: DeserializeOwned>(self) -> Result<T> {
        let entity = self.entity().await?;
        serde_json::from_value(entity).map_err(|e| Error::from(BodyError::Json(e)))
    }

    pub fn entities(self) -> BoxStream<'static, Result<Value>> {
        codec::read_entities(self.stream, self.validators, self.schema_id)
            .map(|e| e.map_err(Error::from))
            .boxed()
    }

    pub fn into_stream(self) -> BodyStream {
        self.stream
    }
}

impl fmt::Debug for JsonBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonBody")
            .field("content_type", &self.content_type)
            .field("schema_id", &self.schema_id)
            .field("validating", &self.validators.is_some())
            .finish()
    }
}

/// Negotiated body of any other content type.
#[derive(Debug)]
pub struct StreamBody {
    content_type: String,
    stream: BodyStream,
}

impl StreamBody {
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn into_stream(self) -> BodyStream {
        self.stream
    }
}

/// A received body after content negotiation.
#[derive(Debug)]
pub enum IncomingBody {
    /// No body definitions were declared, nothing was read.
    None,
    Text(TextBody),
    Json(JsonBody),
    Stream(StreamBody),
}

impl IncomingBody {
    /// Negotiate a received body against its definitions.
    ///
    /// `validators` is only consulted for JSON bodies, and only when set.
    pub fn negotiate(
        bodies: &[Body],
        content_type: Option<&str>,
        stream: BodyStream,
        validators: Option<Arc<Validators>>,
    ) -> Result<Self> {
        let Some(negotiated) = negotiate(bodies, content_type)? else {
            return Ok(IncomingBody::None);
        };
        // negotiate only succeeds with a content type
        let content_type = content_type.unwrap_or(&negotiated.body.content_type).to_string();
        Ok(match negotiated.kind {
            BodyKind::Text => IncomingBody::Text(TextBody {
                content_type,
                stream,
            }),
            BodyKind::Json => IncomingBody::Json(JsonBody {
                content_type,
                schema_id: negotiated.body.schema_id.clone(),
                stream,
                validators,
            }),
            BodyKind::Stream => IncomingBody::Stream(StreamBody {
                content_type,
                stream,
            }),
        })
    }

    pub fn kind(&self) -> Option<BodyKind> {
        match self {
            IncomingBody::None => None,
            IncomingBody::Text(_) => Some(BodyKind::Text),
            IncomingBody::Json(_) => Some(BodyKind::Json),
            IncomingBody::Stream(_) => Some(BodyKind::Stream),
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        match self {
            IncomingBody::None => None,
            IncomingBody::Text(b) => Some(b.content_type()),
            IncomingBody::Json(b) => Some(b.content_type()),
            IncomingBody::Stream(b) => Some(b.content_type()),
        }
    }

    /// Raw bytes regardless of kind, `None` when nothing was negotiated.
    pub fn into_stream(self) -> Option<BodyStream> {
        match self {
            IncomingBody::None => None,
            IncomingBody::Text(b) => Some(b.into_stream()),
            IncomingBody::Json(b) => Some(b.into_stream()),
            IncomingBody::Stream(b) => Some(b.into_stream()),
        }
    }
}

/// A body to send, in the shape its producer chose.
pub enum OutgoingBody {
    None,
    Stream {
        content_type: String,
        stream: BodyStream,
    },
    Text {
        content_type: String,
        value: String,
    },
    Lines {
        content_type: String,
        lines: BoxStream<'static, String>,
    },
    Entity {
        content_type: String,
        entity: Value,
    },
    Entities {
        content_type: String,
        entities: BoxStream<'static, Value>,
    },
}

/// Bytes ready for the wire plus the content type to announce.
#[derive(Debug)]
pub struct EncodedBody {
    pub content_type: Option<String>,
    pub stream: BodyStream,
}

impl EncodedBody {
    pub fn none() -> Self {
        Self {
            content_type: None,
            stream: BodyStream::empty(),
        }
    }
}

impl OutgoingBody {
    pub fn text(value: impl Into<String>) -> Self {
        OutgoingBody::Text {
            content_type: "text/plain".to_string(),
            value: value.into(),
        }
    }

    /// `application/json` entity.
    pub fn json(entity: Value) -> Self {
        OutgoingBody::Entity {
            content_type: "application/json".to_string(),
            entity,
        }
    }

    /// Serialize a generated type as an `application/json` entity.
    pub fn json_from<T: Serialize>(value: &T) -> Result<Self> {
        let entity = serde_json::to_value(value).map_err(BodyError::from)?;
        Ok(Self::json(entity))
    }

    pub fn stream(content_type: impl Into<String>, stream: BodyStream) -> Self {
        OutgoingBody::Stream {
            content_type: content_type.into(),
            stream,
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        match self {
            OutgoingBody::None => None,
            OutgoingBody::Stream { content_type, .. }
            | OutgoingBody::Text { content_type, .. }
            | OutgoingBody::Lines { content_type, .. }
            | OutgoingBody::Entity { content_type, .. }
            | OutgoingBody::Entities { content_type, .. } => Some(content_type),
        }
    }

    /// Negotiate against the declared definitions and serialize.
    ///
    /// Raw streams fit any definition; text shapes need a text definition and
    /// entity shapes a JSON one. Entities are validated before they are
    /// written when `validators` is set.
    pub fn encode(self, bodies: &[Body], validators: Option<Arc<Validators>>) -> Result<EncodedBody> {
        if bodies.is_empty() {
            if let Some(content_type) = self.content_type() {
                warn!(content_type = %content_type, "Dropping body, no body is declared");
            }
            return Ok(EncodedBody::none());
        }
        let content_type = self.content_type().map(str::to_string);
        let Some(negotiated) = negotiate(bodies, content_type.as_deref())? else {
            return Err(Error::Unreachable("negotiation bypassed for declared bodies"));
        };
        let schema_id = negotiated.body.schema_id.clone();
        let mismatch = || Error::UnexpectedContentType(content_type.clone().unwrap_or_default());

        let stream = match (self, negotiated.kind) {
            (OutgoingBody::None, _) => return Err(Error::MissingContentType),
            (OutgoingBody::Stream { stream, .. }, _) => stream,
            (OutgoingBody::Text { value, .. }, BodyKind::Text) => codec::write_text(value),
            (OutgoingBody::Lines { lines, .. }, BodyKind::Text) => codec::write_lines(lines),
            (OutgoingBody::Entity { entity, .. }, BodyKind::Json) => {
                codec::write_entity(&entity, validators.as_deref(), schema_id.as_deref())?
            }
            (OutgoingBody::Entities { entities, .. }, BodyKind::Json) => {
                codec::write_entities(entities, validators, schema_id)
            }
            (OutgoingBody::Text { .. } | OutgoingBody::Lines { .. }, _)
            | (OutgoingBody::Entity { .. } | OutgoingBody::Entities { .. }, _) => {
                return Err(mismatch())
            }
        };
        Ok(EncodedBody {
            content_type,
            stream,
        })
    }
}

impl Default for OutgoingBody {
    fn default() -> Self {
        OutgoingBody::None
    }
}

impl fmt::Debug for OutgoingBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutgoingBody::None => f.write_str("OutgoingBody::None"),
            OutgoingBody::Stream { content_type, .. } => write!(f, "OutgoingBody::Stream({content_type})"),
            OutgoingBody::Text { content_type, value } => {
                write!(f, "OutgoingBody::Text({content_type}, {} bytes)", value.len())
            }
            OutgoingBody::Lines { content_type, .. } => write!(f, "OutgoingBody::Lines({content_type})"),
            OutgoingBody::Entity { content_type, .. } => write!(f, "OutgoingBody::Entity({content_type})"),
            OutgoingBody::Entities { content_type, .. } => {
                write!(f, "OutgoingBody::Entities({content_type})")
            }
        }
    }
}
