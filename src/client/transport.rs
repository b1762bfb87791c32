use futures::future::BoxFuture;
use http::{Request, Response};
use std::future::Future;

use crate::content::BodyStream;
use crate::error::Result;

/// Sends a fully assembled request and returns the raw response.
///
/// Implementations wrap whatever HTTP stack the application uses. Failures
/// to reach the peer are reported as [`Error::Transport`](crate::Error::Transport).
pub trait Transport: Send + Sync {
    fn send(&self, request: Request<BodyStream>) -> BoxFuture<'static, Result<Response<BodyStream>>>;
}

impl<F, Fut> Transport for F
where
    F: Fn(Request<BodyStream>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response<BodyStream>>> + Send + 'static,
{
    fn send(&self, request: Request<BodyStream>) -> BoxFuture<'static, Result<Response<BodyStream>>> {
        Box::pin(self(request))
    }
}
