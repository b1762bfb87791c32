mod common;

use common::zoo_api;
use routebind::model::Api;
use routebind::params::{ParameterSources, RawParameters};
use routebind::security::{apply_credential, AuthenticationRegistry, Credential, CredentialSource};
use routebind::Error;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Calls {
    keeper: AtomicUsize,
    key: AtomicUsize,
    token: AtomicUsize,
}

fn keeper_registry(api: &Api) -> (AuthenticationRegistry, Arc<Calls>) {
    let calls = Arc::new(Calls {
        keeper: AtomicUsize::new(0),
        key: AtomicUsize::new(0),
        token: AtomicUsize::new(0),
    });
    let mut registry = AuthenticationRegistry::new(api);

    let c = Arc::clone(&calls);
    registry
        .register("keeper", move |credential: Credential| {
            c.keeper.fetch_add(1, Ordering::SeqCst);
            async move {
                match credential {
                    Credential::Basic { id, secret } if secret == "bananas" => Some(json!({ "keeper": id })),
                    _ => None,
                }
            }
        })
        .unwrap();
    let c = Arc::clone(&calls);
    registry
        .register("key", move |credential: Credential| {
            c.key.fetch_add(1, Ordering::SeqCst);
            async move { (credential == Credential::api_key("zoo-key")).then(|| json!("staff")) }
        })
        .unwrap();
    let c = Arc::clone(&calls);
    registry
        .register("token", move |credential: Credential| {
            c.token.fetch_add(1, Ordering::SeqCst);
            async move { (credential == Credential::bearer("vet")).then(|| json!({ "role": "vet" })) }
        })
        .unwrap();
    (registry, calls)
}

/// Outgoing sources carrying each credential the way a client would.
fn sources_with(api: &Api, credentials: &[(&str, Credential)]) -> ParameterSources {
    let mut sources = ParameterSources {
        header: RawParameters::headers(),
        ..Default::default()
    };
    for (name, credential) in credentials {
        let scheme = api.scheme(name).unwrap();
        assert!(apply_credential(scheme, credential, &mut sources));
    }
    sources
}

#[tokio::test]
async fn test_keeper_and_key_together_satisfy_first_group() {
    let api = zoo_api();
    let (_, delete) = api.operation("delete_animal").unwrap();
    let (registry, calls) = keeper_registry(&api);

    let sources = sources_with(
        &api,
        &[
            ("keeper", Credential::basic("ada", "bananas")),
            ("key", Credential::api_key("zoo-key")),
        ],
    );
    let principals = registry
        .resolve(&delete.authentication_requirements, &CredentialSource::from_sources(&sources))
        .await
        .unwrap();

    assert_eq!(principals.len(), 2);
    assert_eq!(principals.get("keeper"), Some(&json!({ "keeper": "ada" })));
    assert_eq!(principals.get("key"), Some(&json!("staff")));
    assert_eq!(calls.token.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rejected_keeper_abandons_group_before_key() {
    let api = zoo_api();
    let (_, delete) = api.operation("delete_animal").unwrap();
    let (registry, calls) = keeper_registry(&api);

    let sources = sources_with(
        &api,
        &[
            ("keeper", Credential::basic("ada", "wrong")),
            ("key", Credential::api_key("zoo-key")),
            ("token", Credential::bearer("vet")),
        ],
    );
    let principals = registry
        .resolve(&delete.authentication_requirements, &CredentialSource::from_sources(&sources))
        .await
        .unwrap();

    assert_eq!(principals.into_inner().into_keys().collect::<Vec<_>>(), vec!["token"]);
    assert_eq!(calls.keeper.load(Ordering::SeqCst), 1);
    assert_eq!(calls.key.load(Ordering::SeqCst), 0);
    assert_eq!(calls.token.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_key_alone_is_not_enough_for_delete() {
    let api = zoo_api();
    let (_, delete) = api.operation("delete_animal").unwrap();
    let (_, create) = api.operation("create_animal").unwrap();
    let (registry, calls) = keeper_registry(&api);

    let sources = sources_with(&api, &[("key", Credential::api_key("zoo-key"))]);
    let source = CredentialSource::from_sources(&sources);

    assert!(matches!(
        registry.resolve(&delete.authentication_requirements, &source).await,
        Err(Error::AuthenticationFailed)
    ));
    // absent basic credentials never reach a handler
    assert_eq!(calls.keeper.load(Ordering::SeqCst), 0);

    let principals = registry
        .resolve(&create.authentication_requirements, &source)
        .await
        .unwrap();
    assert_eq!(principals.get("key"), Some(&json!("staff")));
}

#[tokio::test]
async fn test_anonymous_operation_needs_no_credentials() {
    let api = zoo_api();
    let (_, health) = api.operation("health_check").unwrap();
    let (registry, _) = keeper_registry(&api);
    let sources = ParameterSources::default();

    let principals = registry
        .resolve(&health.authentication_requirements, &CredentialSource::from_sources(&sources))
        .await
        .unwrap();
    assert!(principals.is_empty());
}

#[test]
fn test_credentials_only_apply_to_fitting_schemes() {
    let api = zoo_api();
    let mut sources = ParameterSources::default();
    assert!(!apply_credential(api.scheme("token").unwrap(), &Credential::api_key("k"), &mut sources));
    assert!(sources.header.is_empty());

    let mut registry = AuthenticationRegistry::new(&api);
    let err = registry
        .register("oauth", |_: Credential| async { None::<serde_json::Value> })
        .unwrap_err();
    assert!(matches!(err, Error::UnknownAuthenticationScheme(name) if name == "oauth"));
}
