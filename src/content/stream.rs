use bytes::{Bytes, BytesMut};
use futures::stream::{self, AbortHandle, Abortable, BoxStream, Stream, StreamExt};
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::BodyError;

pub type Chunk = Result<Bytes, BodyError>;

/// Single-pass stream of body chunks.
///
/// The stream can be cancelled from anywhere through its [`AbortHandle`];
/// after cancellation it yields one [`BodyError::Cancelled`] and then ends.
/// Cancelling one body never affects another.
pub struct BodyStream {
    inner: Abortable<BoxStream<'static, Chunk>>,
    handle: AbortHandle,
    finished: bool,
}

impl BodyStream {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Chunk> + Send + 'static,
    {
        let (inner, handle) = stream::abortable(stream.boxed());
        Self {
            inner,
            handle,
            finished: false,
        }
    }

    pub fn empty() -> Self {
        Self::new(stream::empty())
    }

    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Self::empty();
        }
        Self::new(stream::iter([Ok(bytes)]))
    }

    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = Bytes>,
        I::IntoIter: Send + 'static,
    {
        Self::new(stream::iter(chunks.into_iter().map(Ok)))
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.handle.clone()
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.is_aborted()
    }

    /// Drain the stream into one buffer.
    pub async fn into_bytes(mut self) -> Result<Bytes, BodyError> {
        let mut buffer = BytesMut::new();
        while let Some(chunk) = self.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        Ok(buffer.freeze())
    }
}

impl Stream for BodyStream {
    type Item = Chunk;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Chunk>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(None) => {
                this.finished = true;
                if this.inner.is_aborted() {
                    Poll::Ready(Some(Err(BodyError::Cancelled)))
                } else {
                    Poll::Ready(None)
                }
            }
            other => other,
        }
    }
}

impl fmt::Debug for BodyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyStream")
            .field("cancelled", &self.is_cancelled())
            .field("finished", &self.finished)
            .finish()
    }
}

impl Default for BodyStream {
    fn default() -> Self {
        Self::empty()
    }
}
