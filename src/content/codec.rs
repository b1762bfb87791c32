//! Text and JSON codecs layered over [`BodyStream`].
//!
//! Entity streams are newline-delimited JSON: one entity per line, blank
//! lines skipped.

use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use serde_json::Value;
use std::sync::Arc;

use super::stream::BodyStream;
use crate::error::BodyError;
use crate::validation::Validators;

fn utf8(bytes: Bytes) -> Result<String, BodyError> {
    String::from_utf8(bytes.to_vec()).map_err(|_| BodyError::InvalidUtf8)
}

fn strip_line_ending(mut line: Vec<u8>) -> Vec<u8> {
    if line.last() == Some(&b'\n') {
        line.pop();
    }
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    line
}

/// Read the whole body as one string.
pub async fn read_text(body: BodyStream) -> Result<String, BodyError> {
    utf8(body.into_bytes().await?)
}

/// Split a body into lines, without their `\n` or `\r\n` endings.
///
/// A final line without a trailing newline is still yielded.
pub fn read_lines(body: BodyStream) -> BoxStream<'static, Result<String, BodyError>> {
    struct State {
        body: BodyStream,
        buffer: BytesMut,
        done: bool,
    }

    let state = State {
        body,
        buffer: BytesMut::new(),
        done: false,
    };
    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(pos) = state.buffer.iter().position(|b| *b == b'\n') {
                let line = state.buffer.split_to(pos + 1).to_vec();
                let text = String::from_utf8(strip_line_ending(line)).map_err(|_| BodyError::InvalidUtf8);
                return Some((text, state));
            }
            if state.done {
                if state.buffer.is_empty() {
                    return None;
                }
                let rest = state.buffer.split().to_vec();
                let text = String::from_utf8(strip_line_ending(rest)).map_err(|_| BodyError::InvalidUtf8);
                return Some((text, state));
            }
            match state.body.next().await {
                Some(Ok(chunk)) => state.buffer.extend_from_slice(&chunk),
                Some(Err(e)) => {
                    state.done = true;
                    state.buffer.clear();
                    return Some((Err(e), state));
                }
                None => state.done = true,
            }
        }
    })
    .boxed()
}

fn check(
    validators: Option<&Validators>,
    schema_id: Option<&str>,
    entity: &Value,
) -> Result<(), BodyError> {
    match validators {
        Some(v) => v
            .validate(schema_id, entity)
            .map_err(|failure| BodyError::EntityValidation {
                path: failure.path,
                rule: failure.rule,
            }),
        None => Ok(()),
    }
}

/// Read the whole body as one JSON entity, validating it when asked.
pub async fn read_entity(
    body: BodyStream,
    validators: Option<&Validators>,
    schema_id: Option<&str>,
) -> Result<Value, BodyError> {
    let bytes = body.into_bytes().await?;
    let entity: Value = serde_json::from_slice(&bytes)?;
    check(validators, schema_id, &entity)?;
    Ok(entity)
}

/// Read a newline-delimited stream of JSON entities, validating each.
pub fn read_entities(
    body: BodyStream,
    validators: Option<Arc<Validators>>,
    schema_id: Option<String>,
) -> BoxStream<'static, Result<Value, BodyError>> {
    read_lines(body)
        .filter(|line| {
            let blank = matches!(line, Ok(l) if l.trim().is_empty());
            futures::future::ready(!blank)
        })
        .map(move |line| -> Result<Value, BodyError> {
            let entity: Value = serde_json::from_str(&line?)?;
            check(validators.as_deref(), schema_id.as_deref(), &entity)?;
            Ok(entity)
        })
        .boxed()
}

pub fn write_text(value: String) -> BodyStream {
    BodyStream::from_bytes(value)
}

/// Each line is emitted followed by `\n`.
pub fn write_lines<S>(lines: S) -> BodyStream
where
    S: Stream<Item = String> + Send + 'static,
{
    BodyStream::new(lines.map(|mut line| {
        line.push('\n');
        Ok(Bytes::from(line))
    }))
}

/// Validate, then serialize one entity.
pub fn write_entity(
    entity: &Value,
    validators: Option<&Validators>,
    schema_id: Option<&str>,
) -> Result<BodyStream, BodyError> {
    check(validators, schema_id, entity)?;
    Ok(BodyStream::from_bytes(serde_json::to_vec(entity)?))
}

/// Serialize a stream of entities as NDJSON, validating each before it is
/// written. A failing entity ends the body with its error.
pub fn write_entities<S>(
    entities: S,
    validators: Option<Arc<Validators>>,
    schema_id: Option<String>,
) -> BodyStream
where
    S: Stream<Item = Value> + Send + 'static,
{
    BodyStream::new(entities.map(move |entity| -> Result<Bytes, BodyError> {
        check(validators.as_deref(), schema_id.as_deref(), &entity)?;
        let mut line = serde_json::to_vec(&entity)?;
        line.push(b'\n');
        Ok(Bytes::from(line))
    }))
}
