use http::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a parameter travels in an HTTP message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParameterLocation {
    pub const ALL: [ParameterLocation; 4] = [
        ParameterLocation::Path,
        ParameterLocation::Query,
        ParameterLocation::Header,
        ParameterLocation::Cookie,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Cookie => "cookie",
        }
    }
}

impl std::fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    /// Opaque schema identifier; selects the parse and validation hooks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_id: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            schema_id: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_schema(mut self, schema_id: impl Into<String>) -> Self {
        self.schema_id = Some(schema_id.into());
        self
    }
}

/// A request or response body definition, keyed by its content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_id: Option<String>,
}

impl Body {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            schema_id: None,
        }
    }

    pub fn with_schema(mut self, schema_id: impl Into<String>) -> Self {
        self.schema_id = Some(schema_id.into());
        self
    }
}

/// A group of status codes sharing one response shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    /// Label used for naming, e.g. `ok`, `not_found`, `client_error`.
    pub status_kind: String,
    pub status_codes: Vec<u16>,
    #[serde(default)]
    pub header_parameters: Vec<Parameter>,
    #[serde(default)]
    pub bodies: Vec<Body>,
}

impl OperationResult {
    pub fn new(status_kind: impl Into<String>, status_codes: impl Into<Vec<u16>>) -> Self {
        Self {
            status_kind: status_kind.into(),
            status_codes: status_codes.into(),
            header_parameters: Vec::new(),
            bodies: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.bodies.push(body);
        self
    }

    pub fn with_header(mut self, parameter: Parameter) -> Self {
        self.header_parameters.push(parameter);
        self
    }

    pub fn claims(&self, status: u16) -> bool {
        self.status_codes.contains(&status)
    }
}

/// One AND-group: every named scheme must authenticate.
pub type RequirementGroup = Vec<String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: String,
    #[serde(with = "method_format")]
    pub method: Method,
    #[serde(default)]
    pub path_parameters: Vec<Parameter>,
    #[serde(default)]
    pub query_parameters: Vec<Parameter>,
    #[serde(default)]
    pub header_parameters: Vec<Parameter>,
    #[serde(default)]
    pub cookie_parameters: Vec<Parameter>,
    #[serde(default)]
    pub bodies: Vec<Body>,
    #[serde(default)]
    pub operation_results: Vec<OperationResult>,
    /// OR across groups, AND within a group. Empty means anonymous.
    #[serde(default)]
    pub authentication_requirements: Vec<RequirementGroup>,
}

impl Operation {
    pub fn new(id: impl Into<String>, method: Method) -> Self {
        Self {
            id: id.into(),
            method,
            path_parameters: Vec::new(),
            query_parameters: Vec::new(),
            header_parameters: Vec::new(),
            cookie_parameters: Vec::new(),
            bodies: Vec::new(),
            operation_results: Vec::new(),
            authentication_requirements: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, location: ParameterLocation, parameter: Parameter) -> Self {
        match location {
            ParameterLocation::Path => self.path_parameters.push(parameter),
            ParameterLocation::Query => self.query_parameters.push(parameter),
            ParameterLocation::Header => self.header_parameters.push(parameter),
            ParameterLocation::Cookie => self.cookie_parameters.push(parameter),
        }
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.bodies.push(body);
        self
    }

    pub fn with_result(mut self, result: OperationResult) -> Self {
        self.operation_results.push(result);
        self
    }

    pub fn with_requirement<I, S>(mut self, group: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authentication_requirements
            .push(group.into_iter().map(Into::into).collect());
        self
    }

    pub fn parameters(&self, location: ParameterLocation) -> &[Parameter] {
        match location {
            ParameterLocation::Path => &self.path_parameters,
            ParameterLocation::Query => &self.query_parameters,
            ParameterLocation::Header => &self.header_parameters,
            ParameterLocation::Cookie => &self.cookie_parameters,
        }
    }

    /// Response content types in declaration order, deduplicated.
    ///
    /// Clients send this list as their `Accept` header.
    pub fn accept(&self) -> Vec<&str> {
        let mut accept: Vec<&str> = Vec::new();
        for body in self.operation_results.iter().flat_map(|r| r.bodies.iter()) {
            if !accept.contains(&body.content_type.as_str()) {
                accept.push(&body.content_type);
            }
        }
        accept
    }
}

/// A path template and the operations bound to it, one per method.
///
/// The path `id` is what the route table registers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Path {
    pub id: String,
    pub pattern: String,
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl Path {
    pub fn new(id: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pattern: pattern.into(),
            operations: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn operation_for(&self, method: &Method) -> Option<&Operation> {
        self.operations.iter().find(|o| &o.method == method)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Header,
    Query,
    Cookie,
}

/// The closed set of credential kinds the resolver understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum AuthenticationKind {
    ApiKey {
        #[serde(rename = "in")]
        location: ApiKeyLocation,
        /// Header, query or cookie name carrying the key.
        parameter_name: String,
    },
    HttpBasic,
    HttpBearer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationScheme {
    pub name: String,
    #[serde(flatten)]
    pub kind: AuthenticationKind,
}

impl AuthenticationScheme {
    pub fn api_key(
        name: impl Into<String>,
        location: ApiKeyLocation,
        parameter_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: AuthenticationKind::ApiKey {
                location,
                parameter_name: parameter_name.into(),
            },
        }
    }

    pub fn basic(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AuthenticationKind::HttpBasic,
        }
    }

    pub fn bearer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AuthenticationKind::HttpBearer,
        }
    }
}

/// The resolved API model consumed by every component of the crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Api {
    #[serde(default)]
    pub paths: Vec<Path>,
    #[serde(default)]
    pub authentication: Vec<AuthenticationScheme>,
    /// Schema id to entity type name, produced by the external type resolver.
    #[serde(default)]
    pub names: BTreeMap<String, String>,
}

impl Api {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, path: Path) -> Self {
        self.paths.push(path);
        self
    }

    pub fn with_scheme(mut self, scheme: AuthenticationScheme) -> Self {
        self.authentication.push(scheme);
        self
    }

    pub fn path(&self, id: &str) -> Option<&Path> {
        self.paths.iter().find(|p| p.id == id)
    }

    pub fn operations(&self) -> impl Iterator<Item = (&Path, &Operation)> {
        self.paths
            .iter()
            .flat_map(|p| p.operations.iter().map(move |o| (p, o)))
    }

    /// Find an operation and the path it is bound to.
    pub fn operation(&self, operation_id: &str) -> Option<(&Path, &Operation)> {
        self.operations().find(|(_, o)| o.id == operation_id)
    }

    pub fn scheme(&self, name: &str) -> Option<&AuthenticationScheme> {
        self.authentication.iter().find(|s| s.name == name)
    }

    pub fn type_name(&self, schema_id: &str) -> Option<&str> {
        self.names.get(schema_id).map(String::as_str)
    }
}

mod method_format {
    use http::Method;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(method: &Method, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&method.as_str().to_ascii_lowercase())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Method, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Method::from_bytes(raw.to_ascii_uppercase().as_bytes())
            .map_err(|_| serde::de::Error::custom(format!("invalid HTTP method '{raw}'")))
    }
}
