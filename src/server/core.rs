use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Request, Response, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};

use super::registry::{HandlerRegistry, OperationHandler};
use super::request::OperationRequest;
use super::response::{write_json_error, OperationResponse};
use crate::config::ServerConfiguration;
use crate::content::{BodyStream, IncomingBody};
use crate::error::{Error, Result};
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::model::{ensure_valid, Api, Operation, ParameterLocation};
use crate::params::{ParameterBuilder, ParameterParser, ParameterSources, RawParameters, RequestParameters, StringParser};
use crate::router::{ParameterCodec, RouteMode, RouteTable};
use crate::security::{AuthenticationHandler, AuthenticationRegistry, CredentialSource};
use crate::status::StatusDispatcher;
use crate::validation::Validators;

/// Server side of a binding.
///
/// Built once from the model, then shared (usually behind an `Arc`) by every
/// request. [`Server::handle`] never fails: every error becomes a JSON error
/// response with the status [`Error::status_code`] assigns, except failures
/// while encoding the handler's own response, which are a 500.
pub struct Server {
    api: Arc<Api>,
    config: ServerConfiguration,
    routes: RouteTable,
    status: HashMap<String, StatusDispatcher>,
    handlers: HandlerRegistry,
    authentication: AuthenticationRegistry,
    validators: Arc<Validators>,
    parser: Arc<dyn ParameterParser>,
}

impl Server {
    pub fn new(api: Arc<Api>, config: ServerConfiguration) -> Result<Self> {
        let codec = config.codec().unwrap_or_else(|| {
            warn!(codec = %config.route_codec, "Unknown route codec, using identity");
            ParameterCodec::identity()
        });
        ensure_valid(&api)?;
        let routes = RouteTable::from_api(&api, RouteMode::Reverse, codec)?;
        let status = api
            .operations()
            .map(|(_, op)| Ok((op.id.clone(), StatusDispatcher::new(op)?)))
            .collect::<Result<HashMap<_, _>>>()?;
        info!(
            routes = routes.len(),
            operations = status.len(),
            "Server binding ready"
        );
        Ok(Self {
            handlers: HandlerRegistry::new(&api),
            authentication: AuthenticationRegistry::new(&api),
            api,
            config,
            routes,
            status,
            validators: Arc::new(Validators::new()),
            parser: Arc::new(StringParser),
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

    /// Bind `handler` to a declared operation. Last registration wins.
    pub fn register_handler<H>(&mut self, operation_id: &str, handler: H) -> Result<()>
    where
        H: OperationHandler + 'static,
    {
        self.handlers.register(operation_id, Arc::new(handler))
    }

    /// Bind `handler` to a declared authentication scheme. Last registration wins.
    pub fn register_authentication_handler<H>(&mut self, scheme_name: &str, handler: H) -> Result<()>
    where
        H: AuthenticationHandler + 'static,
    {
        self.authentication.register(scheme_name, handler)
    }

    pub fn api(&self) -> &Api {
        &self.api
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    pub fn config(&self) -> &ServerConfiguration {
        &self.config
    }

    /// Run one request through the full cycle.
    pub async fn handle(&self, request: Request<BodyStream>) -> Response<BodyStream> {
        let request_id = RequestId::from_headers(request.headers());
        let span = info_span!(
            "request",
            request_id = %request_id,
            method = %request.method(),
            path = %request.uri().path(),
        );
        let mut response = match self.dispatch(request_id, request).instrument(span).await {
            Ok(response) => response,
            Err(failure) => {
                let status = failure.status();
                if status.is_server_error() {
                    error!(request_id = %request_id, kind = failure.error.kind(), error = %failure.error, "Request failed");
                } else {
                    debug!(request_id = %request_id, kind = failure.error.kind(), status = status.as_u16(), "Request rejected");
                }
                write_json_error(status, &failure.error)
            }
        };
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER, request_id.header_value());
        response
    }

    async fn dispatch(
        &self,
        request_id: RequestId,
        request: Request<BodyStream>,
    ) -> std::result::Result<Response<BodyStream>, Failure> {
        let (parts, body) = request.into_parts();
        let path = parts.uri.path();

        let route = self.routes.match_path(path)?;
        let operation = self
            .api
            .path(&route.route_id)
            .ok_or(Error::Unreachable("matched route has no path"))?
            .operation_for(&parts.method)
            .ok_or_else(|| Error::MethodNotSupported {
                method: parts.method.clone(),
                path: path.to_string(),
            })?;
        debug!(operation_id = %operation.id, route_id = %route.route_id, "Operation selected");

        let sources = ParameterSources {
            path: RawParameters::from_path(&route.params),
            query: RawParameters::from_query(parts.uri.query().unwrap_or("")),
            header: RawParameters::from_headers(&parts.headers),
            cookie: RawParameters::cookies_from_headers(&parts.headers),
        };
        let toggles = self.config.validation;
        let parameters = RequestParameters::decode(
            operation,
            &sources,
            self.parser.as_ref(),
            toggles.validate_incoming_parameters.then_some(self.validators.as_ref()),
        )?;

        let principals = self
            .authentication
            .resolve(
                &operation.authentication_requirements,
                &CredentialSource::from_sources(&sources),
            )
            .await?;

        let content_type = parts.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
        let body = IncomingBody::negotiate(
            &operation.bodies,
            content_type,
            body,
            toggles
                .validate_incoming_entity
                .then(|| Arc::clone(&self.validators)),
        )?;

        let handler = self
            .handlers
            .get(&operation.id)
            .ok_or_else(|| Error::OperationNotImplemented(operation.id.clone()))?;
        let response = handler
            .handle(OperationRequest {
                request_id,
                operation_id: operation.id.clone(),
                parameters,
                principals,
                body,
            })
            .await?;

        self.respond(operation, response).map_err(Failure::response)
    }

    /// Status dispatch and encoding of the handler's response.
    fn respond(&self, operation: &Operation, response: OperationResponse) -> Result<Response<BodyStream>> {
        let dispatcher = self
            .status
            .get(&operation.id)
            .ok_or(Error::Unreachable("operation without status index"))?;
        let result = dispatcher.select(response.status)?;
        let toggles = self.config.validation;

        let headers = ParameterBuilder::new(ParameterLocation::Header, &result.header_parameters)
            .with_validators(toggles.validate_outgoing_parameters.then_some(self.validators.as_ref()))
            .to_raw(&response.headers)?;
        let encoded = response.body.encode(
            &result.bodies,
            toggles
                .validate_outgoing_entity
                .then(|| Arc::clone(&self.validators)),
        )?;

        let mut http_response = Response::new(encoded.stream);
        *http_response.status_mut() = StatusCode::from_u16(response.status)
            .map_err(|_| Error::UnexpectedStatusCode(response.status))?;
        headers.write_headers(http_response.headers_mut())?;
        if let Some(content_type) = encoded.content_type {
            let value = HeaderValue::from_str(&content_type)
                .map_err(|_| Error::UnexpectedContentType(content_type.clone()))?;
            http_response.headers_mut().insert(CONTENT_TYPE, value);
        }
        debug!(
            operation_id = %operation.id,
            status = response.status,
            status_kind = %result.status_kind,
            "Response encoded"
        );
        Ok(http_response)
    }
}

/// An error plus the phase it arose in.
struct Failure {
    error: Error,
    in_response: bool,
}

impl Failure {
    fn response(error: Error) -> Self {
        Self {
            error,
            in_response: true,
        }
    }

    fn status(&self) -> StatusCode {
        if self.in_response {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            self.error.status_code()
        }
    }
}

impl From<Error> for Failure {
    fn from(error: Error) -> Self {
        Self {
            error,
            in_response: false,
        }
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("routes", &self.routes.len())
            .field("handlers", &self.handlers)
            .field("authentication", &self.authentication)
            .field("config", &self.config)
            .finish()
    }
}
