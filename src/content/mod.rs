//! Content Negotiation Dispatcher.
//!
//! A received body is negotiated into an [`IncomingBody`] whose variant
//! follows the semantic kind of the matched content type; a body to send is
//! an [`OutgoingBody`] encoded against the declared definitions. All body
//! bytes flow through [`BodyStream`].

mod body;
pub mod codec;
mod negotiate;
mod stream;

pub use body::{EncodedBody, IncomingBody, JsonBody, OutgoingBody, StreamBody, TextBody};
pub use negotiate::{essence, negotiate, BodyKind, Negotiated};
pub use stream::{BodyStream, Chunk};
