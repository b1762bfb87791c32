mod common;

use common::zoo_api;
use routebind::router::{ParameterCodec, RouteMode, RouteTable, RouteTableDocument};
use routebind::Error;
use std::collections::BTreeMap;

fn assert_route_match(table: &RouteTable, path: &str, expected_id: &str, expected: &[(&str, &str)]) {
    let matched = table
        .match_path(path)
        .unwrap_or_else(|e| panic!("{path} did not match: {e}"));
    assert_eq!(matched.route_id.as_ref(), expected_id, "route id for {path}");
    for (name, value) in expected {
        assert_eq!(matched.get(name), Some(*value), "placeholder {name} for {path}");
    }
    assert_eq!(matched.params.len(), expected.len(), "placeholder count for {path}");
}

#[test]
fn test_zoo_routes() {
    let table = RouteTable::from_api(&zoo_api(), RouteMode::Reverse, ParameterCodec::identity()).unwrap();
    assert_route_match(&table, "/", "root", &[]);
    assert_route_match(&table, "/zoo/animals", "animals", &[]);
    assert_route_match(&table, "/zoo/health", "health", &[]);
    assert_route_match(&table, "/zoo/animals/17", "animal", &[("id", "17")]);
    assert_route_match(&table, "/zoo/animals/17/toys/ball", "toy", &[("id", "17"), ("toy_id", "ball")]);
    assert_route_match(&table, "/zoo/animals/17/feed", "feed", &[("id", "17")]);
    assert_route_match(&table, "/zoo/animals/17?expand=toys", "animal", &[("id", "17")]);

    for missing in ["/zoo", "/zoo/animals/", "/zoo/animals/17/toys", "/zoo/animals/17/toys/ball/x"] {
        assert!(
            matches!(table.match_path(missing), Err(Error::RouteNotFound { .. })),
            "{missing} should not match"
        );
    }
}

#[test]
fn test_longer_literal_prefix_wins_regardless_of_order() {
    for order in [["/a/{x}", "/a/b"], ["/a/b", "/a/{x}"]] {
        let mut table = RouteTable::new(RouteMode::Reverse);
        for (i, pattern) in order.iter().enumerate() {
            table.register(&format!("r{i}"), pattern).unwrap();
        }
        let literal_id = if order[0] == "/a/b" { "r0" } else { "r1" };
        assert_eq!(table.match_path("/a/b").unwrap().route_id.as_ref(), literal_id);
        assert_eq!(table.match_path("/a/c").unwrap().get("x"), Some("c"));
    }
}

#[test]
fn test_round_trip_law_over_zoo() {
    let table = RouteTable::from_api(&zoo_api(), RouteMode::Bidirectional, ParameterCodec::percent()).unwrap();
    let values: BTreeMap<String, String> = [("id", "lion king"), ("toy_id", "ball+bell")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    for (id, _) in table.routes().map(|(id, p)| (id.to_string(), p.to_string())).collect::<Vec<_>>() {
        let path = table.stringify(&id, &values).unwrap();
        let matched = table.match_path(&path).unwrap();
        assert_eq!(matched.route_id.as_ref(), id, "{path}");
        for name in table.placeholders(&id).unwrap() {
            assert_eq!(matched.get(name), values.get(name).map(String::as_str));
        }
    }
}

#[test]
fn test_document_shared_by_both_sides() {
    let server_side = RouteTable::from_api(&zoo_api(), RouteMode::Bidirectional, ParameterCodec::identity()).unwrap();
    let document = server_side.to_document(RouteMode::Bidirectional).unwrap();
    let json = document.to_json().unwrap();

    let restored = RouteTableDocument::from_json(&json).unwrap();
    let forward = RouteTable::from_document(
        &RouteTableDocument {
            mode: RouteMode::Forward,
            ..restored.clone()
        },
        ParameterCodec::identity(),
    )
    .unwrap();
    let reverse = RouteTable::from_document(
        &RouteTableDocument {
            mode: RouteMode::Reverse,
            ..restored
        },
        ParameterCodec::identity(),
    )
    .unwrap();

    let path = forward.stringify("toy", &[("id", "9"), ("toy_id", "rope")]).unwrap();
    assert_eq!(path, "/zoo/animals/9/toys/rope");
    assert_eq!(reverse.match_path(&path).unwrap().route_id.as_ref(), "toy");

    assert!(matches!(
        forward.match_path(&path),
        Err(Error::DirectionNotSupported { operation: "match", .. })
    ));
    assert!(matches!(
        reverse.stringify("toy", &[("id", "9"), ("toy_id", "rope")]),
        Err(Error::DirectionNotSupported { operation: "stringify", .. })
    ));
    assert!(matches!(
        forward.to_document(RouteMode::Bidirectional),
        Err(Error::DirectionNotSupported { .. })
    ));
}

#[test]
fn test_stringify_errors() {
    let table = RouteTable::from_api(&zoo_api(), RouteMode::Forward, ParameterCodec::identity()).unwrap();
    assert!(matches!(
        table.stringify("toy", &[("id", "9")]),
        Err(Error::MissingParameter { name, .. }) if name == "toy_id"
    ));
    assert!(matches!(
        table.stringify("animal", &[("id", "")]),
        Err(Error::MissingParameter { .. })
    ));
    assert!(matches!(
        table.stringify("animal", &[("id", "a/b")]),
        Err(Error::AmbiguousParameterValue { .. })
    ));
    assert!(matches!(
        table.stringify("aquarium", &[("id", "1")]),
        Err(Error::UnknownRoute(_))
    ));
}
