use http::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::ParameterLocation;
use crate::router::{ParamVec, PlaceholderValues};

/// Ordered, multi-valued string parameters read from one request location.
///
/// Header sources compare names ASCII case-insensitively; every other
/// source compares them exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParameters {
    entries: Vec<(String, String)>,
    case_insensitive: bool,
}

impl RawParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty source with header name semantics.
    pub fn headers() -> Self {
        Self {
            entries: Vec::new(),
            case_insensitive: true,
        }
    }

    /// Collect header values. Values that are not visible ASCII are skipped.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut raw = Self::headers();
        for (name, value) in headers {
            match value.to_str() {
                Ok(v) => raw.push(name.as_str(), v),
                Err(_) => debug!(header = %name, "Skipping non-ASCII header value"),
            }
        }
        raw
    }

    /// Parse an `application/x-www-form-urlencoded` query string.
    ///
    /// A leading `?` is tolerated.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut raw = Self::new();
        for (k, v) in url::form_urlencoded::parse(query.as_bytes()) {
            raw.push(k, v);
        }
        raw
    }

    /// Parse a `Cookie` header value (`a=b; c=d`).
    pub fn from_cookie_header(header: &str) -> Self {
        let mut raw = Self::new();
        raw.extend_cookies(header);
        raw
    }

    /// Collect cookies from every `Cookie` header.
    pub fn cookies_from_headers(headers: &HeaderMap) -> Self {
        let mut raw = Self::new();
        for value in headers.get_all(COOKIE) {
            if let Ok(v) = value.to_str() {
                raw.extend_cookies(v);
            }
        }
        raw
    }

    fn extend_cookies(&mut self, header: &str) {
        for pair in header.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let Some(name) = parts.next().map(str::trim).filter(|n| !n.is_empty()) else {
                continue;
            };
            let value = parts.next().unwrap_or("").trim();
            self.push(name, value);
        }
    }

    /// Values matched from the path template.
    pub fn from_path(params: &ParamVec) -> Self {
        let mut raw = Self::new();
        for (name, value) in params {
            raw.push(name.as_ref(), value.as_str());
        }
        raw
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    fn same_name(&self, a: &str, b: &str) -> bool {
        if self.case_insensitive {
            a.eq_ignore_ascii_case(b)
        } else {
            a == b
        }
    }

    /// Every value for `name`, in source order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(k, _)| self.same_name(k, name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| self.same_name(k, name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode as a query string, without the leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in &self.entries {
            serializer.append_pair(k, v);
        }
        serializer.finish()
    }

    /// Encode as a `Cookie` header value, `None` when empty.
    ///
    /// Fails with `ParameterValidationFailed` for a name or value the
    /// receiving side would split or trim differently.
    pub fn to_cookie_header(&self) -> Result<Option<String>> {
        if self.entries.is_empty() {
            return Ok(None);
        }
        let mut pairs = Vec::with_capacity(self.entries.len());
        for (k, v) in &self.entries {
            let name_ok = !k.is_empty() && !k.contains(|c: char| c == '=' || !is_cookie_char(c));
            let value_ok = v.trim() == v.as_str() && !v.contains(|c: char| c != ' ' && !is_cookie_char(c));
            if !name_ok || !value_ok {
                return Err(Error::ParameterValidationFailed {
                    location: ParameterLocation::Cookie,
                    name: k.clone(),
                    rule: "cookie-octet".to_string(),
                });
            }
            pairs.push(format!("{k}={v}"));
        }
        Ok(Some(pairs.join("; ")))
    }

    /// Append every entry to `headers`.
    ///
    /// Fails with `Transport` when a name or value is not a legal header.
    pub fn write_headers(&self, headers: &mut HeaderMap) -> Result<()> {
        for (k, v) in &self.entries {
            let name = HeaderName::from_bytes(k.as_bytes())
                .map_err(|e| Error::Transport(format!("invalid header name '{k}': {e}")))?;
            let value = HeaderValue::from_str(v)
                .map_err(|e| Error::Transport(format!("invalid value for header '{k}': {e}")))?;
            headers.append(name, value);
        }
        Ok(())
    }
}

/// Printable ASCII other than the `Cookie` header separators.
fn is_cookie_char(c: char) -> bool {
    c.is_ascii_graphic() && !matches!(c, ';' | ',' | '"' | '\\')
}

impl PlaceholderValues for RawParameters {
    fn placeholder(&self, name: &str) -> Option<&str> {
        self.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_is_multi_valued_and_decoded() {
        let raw = RawParameters::from_query("?tag=a&tag=b%20c&limit=10&name=x+y");
        assert_eq!(raw.get_all("tag"), vec!["a", "b c"]);
        assert_eq!(raw.get("limit"), Some("10"));
        assert_eq!(raw.get("name"), Some("x y"));
        assert_eq!(raw.get("Limit"), None);
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("secret"));
        headers.append("x-trace", HeaderValue::from_static("1"));
        headers.append("x-trace", HeaderValue::from_static("2"));
        let raw = RawParameters::from_headers(&headers);
        assert_eq!(raw.get("X-Api-Key"), Some("secret"));
        assert_eq!(raw.get_all("X-TRACE"), vec!["1", "2"]);
    }

    #[test]
    fn test_cookie_parsing() {
        let raw = RawParameters::from_cookie_header("a=b; c=d ;empty=; =skip");
        assert_eq!(raw.get("a"), Some("b"));
        assert_eq!(raw.get("c"), Some("d"));
        assert_eq!(raw.get("empty"), Some(""));
        assert_eq!(raw.len(), 3);
        assert_eq!(raw.to_cookie_header().unwrap().as_deref(), Some("a=b; c=d; empty="));
    }

    #[test]
    fn test_cookie_header_rejects_separators() {
        let spaced = RawParameters::new().with("visitor", "ada lovelace");
        assert_eq!(spaced.to_cookie_header().unwrap().as_deref(), Some("visitor=ada lovelace"));

        for (name, value) in [("session", "a; admin=1"), ("session", " padded"), ("a=b", "c"), ("k", "x,y")] {
            let raw = RawParameters::new().with(name, value);
            assert!(
                matches!(
                    raw.to_cookie_header(),
                    Err(Error::ParameterValidationFailed { location: ParameterLocation::Cookie, ref rule, .. })
                        if rule == "cookie-octet"
                ),
                "{name}={value}"
            );
        }
    }

    #[test]
    fn test_query_string_encoding() {
        let raw = RawParameters::new().with("q", "a b&c").with("n", "1");
        assert_eq!(raw.to_query_string(), "q=a+b%26c&n=1");
        assert_eq!(RawParameters::from_query(&raw.to_query_string()), raw);
    }

    #[test]
    fn test_write_headers_rejects_invalid_names() {
        let mut headers = HeaderMap::new();
        let raw = RawParameters::headers().with("bad name", "v");
        assert!(matches!(raw.write_headers(&mut headers), Err(Error::Transport(_))));
    }
}
