use crate::error::{Error, Result};
use crate::model::{Api, ParameterLocation};
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::sync::Arc;
use tracing::{debug, info};

use super::codec::ParameterCodec;
use super::document::{RouteEntryDocument, RouteMode, RouteTableDocument};
use super::pattern::{PathTemplate, Token};
use super::radix::PrefixNode;

/// Maximum number of placeholder values before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Matched placeholder values, in template order.
///
/// Names are `Arc<str>` shared with the compiled template.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Lookup of placeholder values by name, used by [`RouteTable::stringify`].
pub trait PlaceholderValues {
    fn placeholder(&self, name: &str) -> Option<&str>;
}

impl<S: BuildHasher> PlaceholderValues for HashMap<String, String, S> {
    fn placeholder(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl PlaceholderValues for BTreeMap<String, String> {
    fn placeholder(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl PlaceholderValues for ParamVec {
    fn placeholder(&self, name: &str) -> Option<&str> {
        self.iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

impl PlaceholderValues for [(&str, &str)] {
    fn placeholder(&self, name: &str) -> Option<&str> {
        self.iter().rfind(|(k, _)| *k == name).map(|(_, v)| *v)
    }
}

impl<const N: usize> PlaceholderValues for [(&str, &str); N] {
    fn placeholder(&self, name: &str) -> Option<&str> {
        self.as_slice().placeholder(name)
    }
}

/// Result of matching a concrete path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub route_id: Arc<str>,
    /// Decoded placeholder values.
    pub params: ParamVec,
}

impl RouteMatch {
    /// Look a placeholder value up by name.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.placeholder(name)
    }

    /// Note: allocates.
    #[must_use]
    pub fn params_map(&self) -> BTreeMap<String, String> {
        self.params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

#[derive(Debug, Clone)]
struct RouteEntry {
    id: Arc<str>,
    template: PathTemplate,
}

/// Bidirectional mapping between route ids and path templates.
///
/// Built once, then shared read-only (typically behind an `Arc`).
///
/// # Precedence
///
/// When several templates match a path, the one with the longer literal
/// prefix wins, and among equal prefixes the one registered first. Only the
/// text before the first placeholder counts, so `/a/b` beats `/a/{x}` for
/// the path `/a/b`, while `/a/{x}/c` and `/a/{y}` fall back to registration
/// order.
#[derive(Debug, Clone)]
pub struct RouteTable {
    mode: RouteMode,
    codec: ParameterCodec,
    entries: Vec<RouteEntry>,
    by_id: HashMap<Arc<str>, usize>,
    by_pattern: HashMap<String, usize>,
    index: PrefixNode,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(RouteMode::Bidirectional)
    }
}

impl RouteTable {
    #[must_use]
    pub fn new(mode: RouteMode) -> Self {
        Self {
            mode,
            codec: ParameterCodec::identity(),
            entries: Vec::new(),
            by_id: HashMap::new(),
            by_pattern: HashMap::new(),
            index: PrefixNode::new(),
        }
    }

    /// Replace the placeholder value codec.
    #[must_use]
    pub fn with_codec(mut self, codec: ParameterCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Build a table with one route per path of `api`, keyed by path id.
    pub fn from_api(api: &Api, mode: RouteMode, codec: ParameterCodec) -> Result<Self> {
        let mut table = Self::new(mode).with_codec(codec);
        for path in &api.paths {
            table.register(&path.id, &path.pattern)?;
        }
        info!(
            routes_count = table.len(),
            mode = %table.mode,
            codec = table.codec.name(),
            "Route table loaded"
        );
        Ok(table)
    }

    /// Rebuild a table from its exchange document, preserving route order.
    pub fn from_document(document: &RouteTableDocument, codec: ParameterCodec) -> Result<Self> {
        let mut table = Self::new(document.mode).with_codec(codec);
        for route in &document.routes {
            table.register(&route.operation_id, &route.pattern)?;
        }
        Ok(table)
    }

    /// Export the table for a consumer running in `mode`.
    pub fn to_document(&self, mode: RouteMode) -> Result<RouteTableDocument> {
        if !self.mode.covers(mode) {
            return Err(Error::DirectionNotSupported {
                mode: self.mode,
                operation: "export",
            });
        }
        Ok(RouteTableDocument {
            mode,
            routes: self
                .entries
                .iter()
                .map(|e| RouteEntryDocument {
                    operation_id: e.id.to_string(),
                    pattern: e.template.pattern().to_string(),
                })
                .collect(),
        })
    }

    /// Register a route.
    ///
    /// # Errors
    ///
    /// * `DuplicateRoute` - the id or the exact pattern is already registered
    /// * `InvalidPattern` - the pattern does not parse
    pub fn register(&mut self, id: &str, pattern: &str) -> Result<()> {
        if self.by_id.contains_key(id) {
            return Err(Error::DuplicateRoute(id.to_string()));
        }
        if let Some(existing) = self.by_pattern.get(pattern) {
            return Err(Error::DuplicateRoute(format!(
                "pattern '{pattern}' already registered as '{}'",
                self.entries[*existing].id
            )));
        }
        let template = PathTemplate::parse(pattern)?;

        let index = self.entries.len();
        let id: Arc<str> = Arc::from(id);
        if self.mode.can_match() {
            self.index.insert(template.literal_prefix(), index);
        }
        debug!(route_id = %id, pattern = %pattern, "Route registered");
        self.by_id.insert(Arc::clone(&id), index);
        self.by_pattern.insert(pattern.to_string(), index);
        self.entries.push(RouteEntry { id, template });
        Ok(())
    }

    /// Match a concrete path to a route id and its decoded values.
    ///
    /// Anything after a `?` is ignored.
    pub fn match_path(&self, path: &str) -> Result<RouteMatch> {
        if !self.mode.can_match() {
            return Err(Error::DirectionNotSupported {
                mode: self.mode,
                operation: "match",
            });
        }
        let path = path.split('?').next().unwrap_or(path);

        let mut candidates: Vec<&[usize]> = Vec::new();
        self.index.collect(path, &mut candidates);

        let decode = |raw: &str| self.codec.decode(raw);
        for index in candidates.into_iter().rev().flat_map(|c| c.iter().copied()) {
            let entry = &self.entries[index];
            if let Some(params) = entry.template.capture(path, &decode) {
                debug!(
                    path = %path,
                    route_id = %entry.id,
                    pattern = %entry.template.pattern(),
                    params = ?params,
                    "Route matched"
                );
                return Ok(RouteMatch {
                    route_id: Arc::clone(&entry.id),
                    params,
                });
            }
        }

        debug!(path = %path, "No route matched");
        Err(Error::RouteNotFound {
            path: path.to_string(),
        })
    }

    /// Produce the concrete path of `id` from placeholder values.
    ///
    /// # Errors
    ///
    /// * `UnknownRoute` - no route has this id
    /// * `MissingParameter` - a placeholder value is absent or empty
    /// * `AmbiguousParameterValue` - the encoded value contains `/`, `?`, `#`
    ///   or the literal text following its placeholder
    pub fn stringify<V>(&self, id: &str, values: &V) -> Result<String>
    where
        V: PlaceholderValues + ?Sized,
    {
        if !self.mode.can_stringify() {
            return Err(Error::DirectionNotSupported {
                mode: self.mode,
                operation: "stringify",
            });
        }
        let entry = self
            .by_id
            .get(id)
            .map(|i| &self.entries[*i])
            .ok_or_else(|| Error::UnknownRoute(id.to_string()))?;

        let tokens = entry.template.tokens();
        let mut path = String::with_capacity(entry.template.pattern().len() + 16);
        for (position, token) in tokens.iter().enumerate() {
            match token {
                Token::Literal(lit) => path.push_str(lit),
                Token::Placeholder(name) => {
                    let missing = || Error::MissingParameter {
                        location: ParameterLocation::Path,
                        name: name.to_string(),
                    };
                    let value = values.placeholder(name).ok_or_else(missing)?;
                    if value.is_empty() {
                        return Err(missing());
                    }
                    let encoded = self.codec.encode(value);
                    let next_literal = match tokens.get(position + 1) {
                        Some(Token::Literal(next)) => Some(next.as_str()),
                        _ => None,
                    };
                    let ambiguous = encoded.is_empty()
                        || encoded.contains(['/', '?', '#'])
                        || next_literal.is_some_and(|next| encoded.contains(next));
                    if ambiguous {
                        return Err(Error::AmbiguousParameterValue {
                            name: name.to_string(),
                        });
                    }
                    path.push_str(&encoded);
                }
            }
        }
        Ok(path)
    }

    pub fn mode(&self) -> RouteMode {
        self.mode
    }

    pub fn codec(&self) -> &ParameterCodec {
        &self.codec
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(id, pattern)` pairs in registration order.
    pub fn routes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.id.as_ref(), e.template.pattern()))
    }

    /// Placeholder names of a registered route, in template order.
    pub fn placeholders(&self, id: &str) -> Option<Vec<&str>> {
        self.by_id
            .get(id)
            .map(|i| self.entries[*i].template.placeholders().collect())
    }
}
