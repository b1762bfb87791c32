//! Client side of a binding: encodes parameters and bodies, applies
//! credentials, stringifies the route and decodes whatever comes back into
//! the operation result that claims the status.

mod core;
mod transport;

pub use core::{Client, ClientRequest, ClientResponse};
pub use transport::Transport;
