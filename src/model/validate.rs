//! Structural checks over a loaded [`Api`].
//!
//! Every check runs and every issue is collected; callers decide whether any
//! issue is fatal. [`super::load_api`] treats any issue as fatal.

use crate::content::essence;
use crate::error::{Error, Result, ValidationIssue};
use crate::router::PathTemplate;
use std::collections::{BTreeSet, HashMap, HashSet};

use super::types::{Api, Body, ParameterLocation};

/// Run every check, returning the issues found.
pub fn validate_api(api: &Api) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    check_schemes(api, &mut issues);
    check_paths(api, &mut issues);
    issues
}

/// Fail with [`Error::InvalidModel`] when `api` has any issue.
pub fn ensure_valid(api: &Api) -> Result<()> {
    let issues = validate_api(api);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidModel(issues))
    }
}

/// Print issues to stderr, one per line.
pub fn print_issues(issues: &[ValidationIssue]) {
    eprintln!("\n❌ API model validation failed. {} issue(s) found:\n", issues.len());
    for issue in issues {
        eprintln!("{issue}");
    }
}

fn check_schemes(api: &Api, issues: &mut Vec<ValidationIssue>) {
    let mut seen = HashSet::new();
    for scheme in &api.authentication {
        if !seen.insert(scheme.name.as_str()) {
            issues.push(ValidationIssue::new(
                format!("authentication.{}", scheme.name),
                "duplicate_scheme",
                "scheme name declared more than once",
            ));
        }
    }
}

fn check_bodies(location: &str, bodies: &[Body], issues: &mut Vec<ValidationIssue>) {
    let mut seen = HashSet::new();
    for body in bodies {
        // negotiation compares essences, parameters never disambiguate
        if !seen.insert(essence(&body.content_type)) {
            issues.push(ValidationIssue::new(
                location,
                "duplicate_content_type",
                format!("content type '{}' declared more than once", body.content_type),
            ));
        }
    }
}

fn check_paths(api: &Api, issues: &mut Vec<ValidationIssue>) {
    let mut path_ids = HashSet::new();
    let mut operation_ids = HashSet::new();

    for path in &api.paths {
        let here = format!("paths.{}", path.id);
        if !path_ids.insert(path.id.as_str()) {
            issues.push(ValidationIssue::new(&here, "duplicate_path_id", "path id used more than once"));
        }

        let placeholders: Option<BTreeSet<String>> = match PathTemplate::parse(&path.pattern) {
            Ok(template) => Some(template.placeholders().map(str::to_string).collect()),
            Err(e) => {
                issues.push(ValidationIssue::new(&here, "invalid_pattern", e.to_string()));
                None
            }
        };

        let mut methods = HashSet::new();
        for op in &path.operations {
            let at = format!("{here}.{}", op.id);
            if !operation_ids.insert(op.id.as_str()) {
                issues.push(ValidationIssue::new(
                    &at,
                    "duplicate_operation_id",
                    "operation id used more than once",
                ));
            }
            if !methods.insert(op.method.clone()) {
                issues.push(ValidationIssue::new(
                    &at,
                    "duplicate_method",
                    format!("method {} bound more than once on this path", op.method),
                ));
            }

            if let Some(placeholders) = &placeholders {
                let names: BTreeSet<String> = op
                    .path_parameters
                    .iter()
                    .map(|p| p.name.clone())
                    .collect();
                if names.len() != op.path_parameters.len() || &names != placeholders {
                    issues.push(ValidationIssue::new(
                        &at,
                        "path_parameter_mismatch",
                        format!(
                            "path parameters {:?} do not match placeholders {:?} of '{}'",
                            op.path_parameters.iter().map(|p| &p.name).collect::<Vec<_>>(),
                            placeholders,
                            path.pattern
                        ),
                    ));
                }
            }
            for param in op.parameters(ParameterLocation::Path) {
                if !param.required {
                    issues.push(ValidationIssue::new(
                        format!("{at}.path.{}", param.name),
                        "optional_path_parameter",
                        "path parameters must be required",
                    ));
                }
            }

            check_bodies(&format!("{at}.bodies"), &op.bodies, issues);

            let mut claimed: HashMap<u16, &str> = HashMap::new();
            for result in &op.operation_results {
                let rat = format!("{at}.results.{}", result.status_kind);
                if result.status_codes.is_empty() {
                    issues.push(ValidationIssue::new(&rat, "empty_status_set", "no status codes"));
                }
                for code in &result.status_codes {
                    if !(100..=599).contains(code) {
                        issues.push(ValidationIssue::new(
                            &rat,
                            "invalid_status_code",
                            format!("{code} is outside 100..=599"),
                        ));
                    }
                    if let Some(other) = claimed.insert(*code, &result.status_kind) {
                        issues.push(ValidationIssue::new(
                            &rat,
                            "overlapping_status_code",
                            format!("{code} is already claimed by '{other}'"),
                        ));
                    }
                }
                check_bodies(&format!("{rat}.bodies"), &result.bodies, issues);
            }

            for (i, group) in op.authentication_requirements.iter().enumerate() {
                for name in group {
                    if api.scheme(name).is_none() {
                        issues.push(ValidationIssue::new(
                            format!("{at}.authentication[{i}]"),
                            "unknown_scheme",
                            format!("scheme '{name}' is not declared"),
                        ));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AuthenticationScheme, Operation, OperationResult, Parameter, Path,
    };
    use http::Method;

    fn kinds(api: &Api) -> Vec<String> {
        validate_api(api).into_iter().map(|i| i.kind).collect()
    }

    fn pet_op(id: &str, method: Method) -> Operation {
        Operation::new(id, method)
            .with_parameter(ParameterLocation::Path, Parameter::new("id").required())
            .with_result(OperationResult::new("ok", [200]))
    }

    #[test]
    fn test_valid_model_has_no_issues() {
        let api = Api::new()
            .with_scheme(AuthenticationScheme::bearer("token"))
            .with_path(
                Path::new("pet", "/pets/{id}")
                    .with_operation(pet_op("get_pet", Method::GET).with_requirement(["token"]))
                    .with_operation(pet_op("delete_pet", Method::DELETE)),
            );
        assert!(validate_api(&api).is_empty());
    }

    #[test]
    fn test_collects_every_issue() {
        let api = Api::new()
            .with_scheme(AuthenticationScheme::basic("basic"))
            .with_scheme(AuthenticationScheme::bearer("basic"))
            .with_path(
                Path::new("pet", "/pets/{id}")
                    .with_operation(
                        Operation::new("get_pet", Method::GET)
                            .with_parameter(ParameterLocation::Path, Parameter::new("id"))
                            .with_result(OperationResult::new("ok", [200, 201]))
                            .with_result(OperationResult::new("created", [201]))
                            .with_requirement(["nobody"]),
                    )
                    .with_operation(pet_op("get_pet", Method::GET)),
            )
            .with_path(Path::new("pet", "/pets"));

        let found = kinds(&api);
        for kind in [
            "duplicate_scheme",
            "duplicate_path_id",
            "duplicate_operation_id",
            "duplicate_method",
            "optional_path_parameter",
            "overlapping_status_code",
            "unknown_scheme",
        ] {
            assert!(found.iter().any(|k| k == kind), "missing {kind} in {found:?}");
        }
    }

    #[test]
    fn test_placeholder_mismatch() {
        let api = Api::new().with_path(
            Path::new("pet", "/pets/{id}").with_operation(
                Operation::new("get_pet", Method::GET)
                    .with_parameter(ParameterLocation::Path, Parameter::new("pet_id").required()),
            ),
        );
        assert_eq!(kinds(&api), vec!["path_parameter_mismatch"]);
        assert!(matches!(ensure_valid(&api), Err(Error::InvalidModel(issues)) if issues.len() == 1));
    }

    #[test]
    fn test_status_set_rules() {
        let api = Api::new().with_path(
            Path::new("root", "/").with_operation(
                Operation::new("root", Method::GET)
                    .with_result(OperationResult::new("none", Vec::<u16>::new()))
                    .with_result(OperationResult::new("odd", [999])),
            ),
        );
        assert_eq!(kinds(&api), vec!["empty_status_set", "invalid_status_code"]);
    }

    #[test]
    fn test_invalid_pattern_and_duplicate_content_type() {
        let api = Api::new().with_path(
            Path::new("bad", "/pets/{id").with_operation(
                Operation::new("post", Method::POST)
                    .with_body(Body::new("application/json"))
                    .with_body(Body::new("Application/JSON; charset=utf-8")),
            ),
        );
        assert_eq!(kinds(&api), vec!["invalid_pattern", "duplicate_content_type"]);
    }
}
