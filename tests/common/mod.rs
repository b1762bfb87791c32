#![allow(dead_code)]

use routebind::model::{parse_api, validate_api, Api};
use std::path::Path;

/// Zoo model shared by the integration tests.
///
/// - `animals` lists and creates animals behind an API key or a bearer token
/// - `animal` reads and deletes one animal; delete needs basic auth and the
///   API key together, or a bearer token alone
/// - `toy` has two placeholders
/// - `feed` streams text lines back
pub const ZOO_MODEL: &str = r##"
paths:
  - id: root
    pattern: /
    operations:
      - id: root_handler
        method: get
        operationResults:
          - statusKind: ok
            statusCodes: [200]
            bodies:
              - contentType: text/plain
  - id: animals
    pattern: /zoo/animals
    operations:
      - id: list_animals
        method: get
        queryParameters:
          - name: limit
            schemaId: "#/Limit"
          - name: tag
        operationResults:
          - statusKind: ok
            statusCodes: [200]
            headerParameters:
              - name: x-total-count
                required: true
            bodies:
              - contentType: application/json
              - contentType: application/x-ndjson
      - id: create_animal
        method: post
        bodies:
          - contentType: application/json
            schemaId: "#/Animal"
        operationResults:
          - statusKind: created
            statusCodes: [200, 201]
            bodies:
              - contentType: application/json
                schemaId: "#/Animal"
          - statusKind: rejected
            statusCodes: [409, 422]
            bodies:
              - contentType: text/plain
        authenticationRequirements:
          - [key]
          - [token]
  - id: health
    pattern: /zoo/health
    operations:
      - id: health_check
        method: get
        operationResults:
          - statusKind: ok
            statusCodes: [200]
  - id: animal
    pattern: /zoo/animals/{id}
    operations:
      - id: get_animal
        method: get
        pathParameters:
          - name: id
            required: true
        headerParameters:
          - name: x-trace
        cookieParameters:
          - name: visitor
        operationResults:
          - statusKind: ok
            statusCodes: [200]
            bodies:
              - contentType: application/json
                schemaId: "#/Animal"
          - statusKind: not_found
            statusCodes: [404]
      - id: delete_animal
        method: delete
        pathParameters:
          - name: id
            required: true
        operationResults:
          - statusKind: deleted
            statusCodes: [204]
        authenticationRequirements:
          - [keeper, key]
          - [token]
  - id: toy
    pattern: /zoo/animals/{id}/toys/{toy_id}
    operations:
      - id: animal_toy
        method: get
        pathParameters:
          - name: toy_id
            required: true
          - name: id
            required: true
        operationResults:
          - statusKind: ok
            statusCodes: [200]
            bodies:
              - contentType: application/octet-stream
  - id: feed
    pattern: /zoo/animals/{id}/feed
    operations:
      - id: feed_animal
        method: post
        pathParameters:
          - name: id
            required: true
        bodies:
          - contentType: text/plain
        operationResults:
          - statusKind: ok
            statusCodes: [200]
            bodies:
              - contentType: text/plain
authentication:
  - name: key
    type: api-key
    in: header
    parameterName: x-api-key
  - name: keeper
    type: http-basic
  - name: token
    type: http-bearer
names:
  "#/Animal": Animal
"##;

pub fn zoo_api() -> Api {
    let api = parse_api(Path::new("zoo.yaml"), ZOO_MODEL).unwrap();
    let issues = validate_api(&api);
    assert!(issues.is_empty(), "zoo model is invalid: {issues:?}");
    api
}

pub mod temp_files {
    use std::io::Write;

    /// Temporary file with `ext`, removed when dropped.
    pub fn write_temp(content: &str, ext: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("routebind_test_")
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    pub fn write_temp_yaml(content: &str) -> tempfile::NamedTempFile {
        write_temp(content, "yaml")
    }
}

pub mod validators {
    use routebind::validation::{ValidationFailure, Validators};
    use serde_json::Value;

    /// `#/Limit` accepts 1..=100, `#/Animal` needs a string `name`.
    pub fn zoo() -> Validators {
        Validators::new()
            .with("#/Limit", |v: &Value| {
                match v.as_str().and_then(|s| s.parse::<u32>().ok()) {
                    Some(1..=100) => Ok(()),
                    _ => Err(ValidationFailure::at_root("range 1..=100")),
                }
            })
            .with("#/Animal", |v: &Value| match v.get("name") {
                Some(Value::String(_)) => Ok(()),
                _ => Err(ValidationFailure::new("/name", "required string")),
            })
    }
}

pub mod zoo_server {
    use futures::{stream, StreamExt, TryStreamExt};
    use routebind::config::ServerConfiguration;
    use routebind::content::{codec, BodyStream, IncomingBody, OutgoingBody};
    use routebind::security::Credential;
    use routebind::server::{OperationRequest, OperationResponse, Server};
    use routebind::Error;
    use serde_json::{json, Value};
    use std::sync::Arc;

    pub const KEY: &str = "zoo-key";
    pub const KEEPER_SECRET: &str = "bananas";
    pub const TOKEN: &str = "vet";

    /// Server over the zoo model with every operation but `root_handler`
    /// implemented.
    pub fn build(config: ServerConfiguration) -> Server {
        let mut server = Server::new(Arc::new(super::zoo_api()), config)
            .unwrap()
            .with_validators(super::validators::zoo());

        server
            .register_authentication_handler("key", |credential: Credential| async move {
                (credential == Credential::api_key(KEY)).then(|| json!("staff"))
            })
            .unwrap();
        server
            .register_authentication_handler("keeper", |credential: Credential| async move {
                match credential {
                    Credential::Basic { id, secret } if secret == KEEPER_SECRET => Some(json!({ "keeper": id })),
                    _ => None,
                }
            })
            .unwrap();
        server
            .register_authentication_handler("token", |credential: Credential| async move {
                (credential == Credential::bearer(TOKEN)).then(|| json!({ "role": "vet" }))
            })
            .unwrap();

        server
            .register_handler("health_check", |_: OperationRequest| async {
                Ok::<_, Error>(OperationResponse::new(200))
            })
            .unwrap();
        server
            .register_handler("list_animals", |req: OperationRequest| async move {
                let animals = vec![json!({ "name": "Leo" }), json!({ "name": "Zee" })];
                let count = animals.len().to_string();
                let response = if req.query_param("tag") == Some(&json!("stream")) {
                    OperationResponse::new(200).with_body(OutgoingBody::stream(
                        "application/x-ndjson",
                        codec::write_entities(stream::iter(animals), None, None),
                    ))
                } else {
                    OperationResponse::json(200, Value::Array(animals))
                };
                Ok::<_, Error>(response.with_header("x-total-count", count))
            })
            .unwrap();
        server
            .register_handler("create_animal", |req: OperationRequest| async move {
                let IncomingBody::Json(body) = req.body else {
                    return Err(Error::MissingContentType);
                };
                let animal = body.entity().await?;
                if animal["name"] == "Dup" {
                    return Ok(OperationResponse::text(409, "duplicate name"));
                }
                Ok::<_, Error>(OperationResponse::json(201, animal))
            })
            .unwrap();
        server
            .register_handler("get_animal", |req: OperationRequest| async move {
                let id = req.path_param("id").cloned().unwrap_or(Value::Null);
                if id == "0" {
                    return Ok::<_, Error>(OperationResponse::new(404));
                }
                Ok(OperationResponse::json(
                    200,
                    json!({
                        "name": id,
                        "trace": req.parameters.header.get("x-trace"),
                        "visitor": req.parameters.cookie.get("visitor"),
                    }),
                ))
            })
            .unwrap();
        server
            .register_handler("delete_animal", |_: OperationRequest| async {
                Ok::<_, Error>(OperationResponse::new(204))
            })
            .unwrap();
        server
            .register_handler("animal_toy", |req: OperationRequest| async move {
                let toy = req.path_param("toy_id").and_then(Value::as_str).unwrap_or_default().to_string();
                Ok::<_, Error>(OperationResponse::new(200).with_body(OutgoingBody::stream(
                    "application/octet-stream",
                    BodyStream::from_bytes(toy.into_bytes()),
                )))
            })
            .unwrap();
        server
            .register_handler("feed_animal", |req: OperationRequest| async move {
                let IncomingBody::Text(text) = req.body else {
                    return Err(Error::MissingContentType);
                };
                let eaten: Vec<String> = text.lines().map_ok(|food| format!("ate {food}")).try_collect().await?;
                Ok::<_, Error>(OperationResponse::new(200).with_body(OutgoingBody::Lines {
                    content_type: "text/plain".to_string(),
                    lines: stream::iter(eaten).boxed(),
                }))
            })
            .unwrap();
        server
    }
}
