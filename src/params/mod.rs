//! Parameter Container Builder.
//!
//! Raw string sources ([`RawParameters`]) are turned into one container per
//! location and direction. Incoming values are decoded then validated;
//! outgoing values are validated then serialized.

mod builder;
mod raw;

pub use builder::{
    ParameterBuilder, ParameterContainer, ParameterParser, ParameterSources, RequestParameters,
    StringParser,
};
pub use raw::RawParameters;
