mod common;

use common::temp_files::{write_temp, write_temp_yaml};
use routebind::config::{ClientConfiguration, ServerConfiguration};
use routebind::router::ParameterCodec;

#[test]
fn test_server_configuration_from_yaml() {
    let file = write_temp_yaml(
        r#"
validate_incoming_entity: false
validate_outgoing_parameters: true
route_codec: percent
"#,
    );
    let config = ServerConfiguration::load(file.path()).unwrap();
    assert!(!config.validation.validate_incoming_entity);
    assert!(config.validation.validate_incoming_parameters);
    assert!(!config.validation.validate_outgoing_entity);
    assert!(config.validation.validate_outgoing_parameters);
    assert_eq!(config.codec().map(|c| c.name()), Some(ParameterCodec::percent().name()));
}

#[test]
fn test_client_configuration_from_json_and_toml() {
    let json = write_temp(
        r#"{ "base_url": "https://zoo.example.com/api/", "validate_outgoing_entity": true }"#,
        "json",
    );
    let config = ClientConfiguration::load(json.path()).unwrap();
    assert_eq!(
        config.base_url.as_ref().map(|u| u.as_str()),
        Some("https://zoo.example.com/api/")
    );
    assert!(config.validation.validate_outgoing_entity);
    assert_eq!(config.route_codec, "identity");

    let toml = write_temp("route_codec = \"rot13\"\n", "toml");
    let config = ClientConfiguration::load(toml.path()).unwrap();
    assert!(config.codec().is_none());
    assert!(config.base_url.is_none());
}

#[test]
fn test_load_failures_name_the_file() {
    let broken = write_temp_yaml("validate_incoming_entity: [not, a, bool]\n");
    let err = ServerConfiguration::load(broken.path()).unwrap_err();
    assert!(format!("{err:#}").contains("failed to parse configuration"), "{err:#}");

    let err = ServerConfiguration::load("/nonexistent/routebind.yaml").unwrap_err();
    assert!(err.to_string().contains("failed to read configuration"));
}
