use http::header::{HeaderValue, ACCEPT, CONTENT_TYPE, COOKIE};
use http::{Request, Uri};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::transport::Transport;
use crate::config::ClientConfiguration;
use crate::content::{IncomingBody, OutgoingBody};
use crate::error::{Error, Result};
use crate::model::{ensure_valid, Api, Operation, ParameterLocation};
use crate::params::{
    ParameterBuilder, ParameterContainer, ParameterParser, ParameterSources, RawParameters,
    RequestParameters, StringParser,
};
use crate::router::{ParameterCodec, RouteMode, RouteTable};
use crate::security::{apply_credential, Credential};
use crate::status::StatusDispatcher;
use crate::validation::Validators;

/// Parameters and body of one outgoing call.
#[derive(Debug, Default)]
pub struct ClientRequest {
    pub parameters: RequestParameters,
    pub body: OutgoingBody,
}

impl ClientRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter(
        mut self,
        location: ParameterLocation,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.parameters.get_mut(location).insert(name, value);
        self
    }

    pub fn with_body(mut self, body: OutgoingBody) -> Self {
        self.body = body;
        self
    }
}

/// The decoded outcome of a call: the operation result that claimed the
/// status, its header parameters and the negotiated body.
#[derive(Debug)]
pub struct ClientResponse {
    pub status: u16,
    pub status_kind: String,
    pub headers: ParameterContainer,
    pub body: IncomingBody,
}

/// Client side of a binding.
pub struct Client {
    api: Arc<Api>,
    config: ClientConfiguration,
    routes: RouteTable,
    status: HashMap<String, StatusDispatcher>,
    credentials: HashMap<String, Credential>,
    validators: Arc<Validators>,
    parser: Arc<dyn ParameterParser>,
    transport: Arc<dyn Transport>,
}

impl Client {
    pub fn new<T>(api: Arc<Api>, config: ClientConfiguration, transport: T) -> Result<Self>
    where
        T: Transport + 'static,
    {
        let codec = config.codec().unwrap_or_else(|| {
            warn!(codec = %config.route_codec, "Unknown route codec, using identity");
            ParameterCodec::identity()
        });
        ensure_valid(&api)?;
        let routes = RouteTable::from_api(&api, RouteMode::Forward, codec)?;
        let status = api
            .operations()
            .map(|(_, op)| Ok((op.id.clone(), StatusDispatcher::new(op)?)))
            .collect::<Result<HashMap<_, _>>>()?;
        Ok(Self {
            api,
            config,
            routes,
            status,
            credentials: HashMap::new(),
            validators: Arc::new(Validators::new()),
            parser: Arc::new(StringParser),
            transport: Arc::new(transport),
        })
    }

    pub fn with_validators(mut self, validators: Validators) -> Self {
        self.validators = Arc::new(validators);
        self
    }

    pub fn with_parser<P: ParameterParser + 'static>(mut self, parser: P) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    /// Credential sent for `scheme_name` on every operation that names it.
    pub fn set_credential(&mut self, scheme_name: &str, credential: Credential) -> Result<()> {
        let scheme = self
            .api
            .scheme(scheme_name)
            .ok_or_else(|| Error::UnknownAuthenticationScheme(scheme_name.to_string()))?;
        if !credential.fits(&scheme.kind) {
            warn!(scheme = %scheme_name, "Credential kind does not fit scheme, it will not be sent");
        }
        self.credentials.insert(scheme_name.to_string(), credential);
        Ok(())
    }

    pub fn config(&self) -> &ClientConfiguration {
        &self.config
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Invoke `operation_id`.
    ///
    /// # Errors
    ///
    /// Encoding failures (`MissingParameter`, `ParameterValidationFailed`,
    /// `EntityValidationFailed`, content type errors) surface before anything
    /// is sent. After the exchange, a status no result claims fails with
    /// `UnexpectedStatusCode` and decoding failures as on the server side.
    pub async fn call(&self, operation_id: &str, request: ClientRequest) -> Result<ClientResponse> {
        let (path, operation) = self
            .api
            .operation(operation_id)
            .ok_or_else(|| Error::OperationNotFound(operation_id.to_string()))?;
        let toggles = self.config.validation;

        let mut sources = request.parameters.encode(
            operation,
            toggles.validate_outgoing_parameters.then_some(self.validators.as_ref()),
        )?;
        self.apply_credentials(operation, &mut sources);

        let uri = self.uri(&path.id, &sources)?;
        let encoded = request.body.encode(
            &operation.bodies,
            toggles
                .validate_outgoing_entity
                .then(|| Arc::clone(&self.validators)),
        )?;

        let mut http_request = Request::new(encoded.stream);
        *http_request.method_mut() = operation.method.clone();
        *http_request.uri_mut() = uri;
        let headers = http_request.headers_mut();
        sources.header.write_headers(headers)?;
        if let Some(cookie) = sources.cookie.to_cookie_header()? {
            headers.insert(COOKIE, header_value(&cookie)?);
        }
        let accept = operation.accept();
        if !accept.is_empty() {
            headers.insert(ACCEPT, header_value(&accept.join(", "))?);
        }
        if let Some(content_type) = &encoded.content_type {
            headers.insert(CONTENT_TYPE, header_value(content_type)?);
        }

        debug!(
            operation_id = %operation.id,
            method = %operation.method,
            uri = %http_request.uri(),
            "Sending request"
        );
        let response = self.transport.send(http_request).await?;
        let (parts, body) = response.into_parts();
        let status = parts.status.as_u16();

        let dispatcher = self
            .status
            .get(&operation.id)
            .ok_or(Error::Unreachable("operation without status index"))?;
        let result = dispatcher.select(status)?;
        let headers = ParameterBuilder::new(ParameterLocation::Header, &result.header_parameters)
            .with_parser(self.parser.as_ref())
            .with_validators(toggles.validate_incoming_parameters.then_some(self.validators.as_ref()))
            .build(&RawParameters::from_headers(&parts.headers))?;
        let content_type = parts.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
        let body = IncomingBody::negotiate(
            &result.bodies,
            content_type,
            body,
            toggles
                .validate_incoming_entity
                .then(|| Arc::clone(&self.validators)),
        )?;

        debug!(
            operation_id = %operation.id,
            status = status,
            status_kind = %result.status_kind,
            "Response received"
        );
        Ok(ClientResponse {
            status,
            status_kind: result.status_kind.clone(),
            headers,
            body,
        })
    }

    /// Apply the credentials of the first requirement group whose schemes
    /// all have a fitting stored credential. Nothing is sent when no group
    /// is covered.
    fn apply_credentials(&self, operation: &Operation, sources: &mut ParameterSources) {
        let held = |name: &String| {
            self.api
                .scheme(name)
                .zip(self.credentials.get(name))
                .filter(|(scheme, credential)| credential.fits(&scheme.kind))
        };
        let Some(group) = operation
            .authentication_requirements
            .iter()
            .find(|group| group.iter().all(|name| held(name).is_some()))
        else {
            if !operation.authentication_requirements.is_empty() {
                warn!(operation_id = %operation.id, "No requirement group covered by stored credentials");
            }
            return;
        };
        for (scheme, credential) in group.iter().filter_map(held) {
            if apply_credential(scheme, credential, sources) {
                debug!(operation_id = %operation.id, scheme = %scheme.name, "Credential applied");
            }
        }
    }

    /// Stringified route plus query string, prefixed by the base URL.
    fn uri(&self, route_id: &str, sources: &ParameterSources) -> Result<Uri> {
        let path = self.routes.stringify(route_id, &sources.path)?;
        let mut target = match &self.config.base_url {
            Some(base) => format!("{}{}", base.as_str().trim_end_matches('/'), path),
            None => path,
        };
        if !sources.query.is_empty() {
            target.push('?');
            target.push_str(&sources.query.to_query_string());
        }
        target
            .parse()
            .map_err(|e| Error::Transport(format!("invalid request URI '{target}': {e}")))
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| Error::Transport(format!("invalid header value '{value}': {e}")))
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut schemes: Vec<&String> = self.credentials.keys().collect();
        schemes.sort();
        f.debug_struct("Client")
            .field("routes", &self.routes.len())
            .field("credentials", &schemes)
            .field("config", &self.config)
            .finish()
    }
}
