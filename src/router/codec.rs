use std::fmt;
use std::sync::Arc;

type EncodeFn = dyn Fn(&str) -> String + Send + Sync;
type DecodeFn = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Pluggable transform applied to placeholder values.
///
/// `encode` runs when stringifying a route, `decode` on every matched value.
/// A `decode` returning `None` makes the candidate route fail to match.
/// Both ends of an exchange must agree on the codec, it is not part of the
/// route table document.
#[derive(Clone)]
pub struct ParameterCodec {
    name: &'static str,
    encode: Arc<EncodeFn>,
    decode: Arc<DecodeFn>,
}

impl ParameterCodec {
    pub fn new<E, D>(name: &'static str, encode: E, decode: D) -> Self
    where
        E: Fn(&str) -> String + Send + Sync + 'static,
        D: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            name,
            encode: Arc::new(encode),
            decode: Arc::new(decode),
        }
    }

    /// Values pass through untouched.
    pub fn identity() -> Self {
        Self::new("identity", str::to_string, |s| Some(s.to_string()))
    }

    /// RFC 3986 percent-encoding of everything outside the unreserved set.
    pub fn percent() -> Self {
        Self::new(
            "percent",
            |s| urlencoding::encode(s).into_owned(),
            |s| urlencoding::decode(s).ok().map(|v| v.into_owned()),
        )
    }

    /// Look a built-in codec up by name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "identity" => Some(Self::identity()),
            "percent" => Some(Self::percent()),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn encode(&self, value: &str) -> String {
        (self.encode)(value)
    }

    pub fn decode(&self, value: &str) -> Option<String> {
        (self.decode)(value)
    }
}

impl Default for ParameterCodec {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for ParameterCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterCodec")
            .field("name", &self.name)
            .finish()
    }
}
