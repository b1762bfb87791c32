//! Unit tests for CLI commands

use crate::cli::{execute, Cli, Commands, DocumentFormat};
use crate::router::{RouteMode, RouteTableDocument};
use clap::Parser;
use std::io::Write;

const MODEL: &str = r#"
paths:
  - id: pets
    pattern: /pets
    operations:
      - id: list_pets
        method: GET
  - id: pet
    pattern: /pets/{id}
    operations:
      - id: get_pet
        method: GET
        pathParameters:
          - name: id
            required: true
      - id: delete_pet
        method: DELETE
        pathParameters:
          - name: id
            required: true
"#;

fn model_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn run(args: &[&str]) -> anyhow::Result<String> {
    let cli = Cli::try_parse_from(args)?;
    let mut out = Vec::new();
    execute(&cli, &mut out)?;
    Ok(String::from_utf8(out)?)
}

#[test]
fn test_routes_command_parses_options() {
    let cli = Cli::try_parse_from([
        "routebind", "routes", "--model", "api.yaml", "--mode", "forward", "--format", "yaml",
    ])
    .unwrap();
    assert_eq!(cli.log_level, "warn");
    match cli.command {
        Commands::Routes { mode, format, output, .. } => {
            assert_eq!(mode, RouteMode::Forward);
            assert_eq!(format, DocumentFormat::Yaml);
            assert!(output.is_none());
        }
        other => panic!("Expected Routes command, got {other:?}"),
    }
}

#[test]
fn test_stringify_rejects_malformed_assignment() {
    assert!(Cli::try_parse_from(["routebind", "stringify", "-m", "a.yaml", "pet", "id"]).is_err());
    assert!(Cli::try_parse_from(["routebind", "stringify", "-m", "a.yaml", "pet", "=1"]).is_err());
}

#[test]
fn test_check_reports_counts() {
    let model = model_file(MODEL);
    let out = run(&["routebind", "check", "--model", model.path().to_str().unwrap()]).unwrap();
    assert!(out.contains("2 path(s), 3 operation(s), 0 scheme(s)"), "{out}");
}

#[test]
fn test_check_fails_on_issues() {
    let model = model_file(
        r#"
paths:
  - id: pet
    pattern: /pets/{id}
    operations:
      - id: get_pet
        method: GET
"#,
    );
    let err = run(&["routebind", "check", "--model", model.path().to_str().unwrap()]).unwrap_err();
    assert!(err.to_string().contains("issue(s) found"));
}

#[test]
fn test_routes_exports_document() {
    let model = model_file(MODEL);
    let out = run(&["routebind", "routes", "-m", model.path().to_str().unwrap(), "--mode", "reverse"]).unwrap();
    let document = RouteTableDocument::from_json(&out).unwrap();
    assert_eq!(document.mode, RouteMode::Reverse);
    let patterns: Vec<&str> = document.routes.iter().map(|r| r.pattern.as_str()).collect();
    assert_eq!(patterns, vec!["/pets", "/pets/{id}"]);
}

#[test]
fn test_match_and_stringify() {
    let model = model_file(MODEL);
    let path = model.path().to_str().unwrap();

    let out = run(&["routebind", "match", "-m", path, "/pets/42"]).unwrap();
    let report: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(report["routeId"], "pet");
    assert_eq!(report["methods"], serde_json::json!(["GET", "DELETE"]));
    assert_eq!(report["params"]["id"], "42");

    let out = run(&["routebind", "stringify", "-m", path, "pet", "id=42"]).unwrap();
    assert_eq!(out.trim(), "/pets/42");

    let err = run(&["routebind", "stringify", "-m", path, "pet"]).unwrap_err();
    assert!(err.to_string().contains("missing path parameter 'id'"));
}

#[test]
fn test_unknown_codec_is_an_error() {
    let model = model_file(MODEL);
    let err = run(&["routebind", "--codec", "rot13", "match", "-m", model.path().to_str().unwrap(), "/pets"])
        .unwrap_err();
    assert!(err.to_string().contains("unknown codec"));
}
