//! Tests for INSERT and UPSERT execution.

mod common;
use common::*;

use docsql_core::{Error, SessionConfig, Statement, TransportError};
use serde_json::{json, Value};

fn exec(sql: &str, stub: &StubTransport, args: &[Value]) -> docsql_core::Result<docsql_core::ExecResult> {
    Statement::parse(sql)
        .unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e:?}"))
        .exec(stub, &SessionConfig::default(), args)
}

#[test]
fn insert_builds_document_spec() {
    let stub = StubTransport::new();
    exec(
        "INSERT INTO db1.coll1 (a,b) VALUES (1,:1)",
        &stub,
        &[json!("x"), json!("pk1")],
    )
    .unwrap();

    let calls = stub.calls();
    assert_eq!(calls.len(), 1);
    let Call::Create(spec) = &calls[0] else {
        panic!("expected a create call, got {:?}", calls[0]);
    };
    assert_eq!(spec.db_name, "db1");
    assert_eq!(spec.coll_name, "coll1");
    assert!(!spec.is_upsert);
    assert_eq!(spec.partition_key_values, vec![json!("pk1")]);
    assert_eq!(Value::Object(spec.document_data.clone()), json!({"a": 1, "b": "x"}));
}

#[test]
fn upsert_sets_flag() {
    let stub = StubTransport::new();
    exec(
        r#"UPSERT INTO db1.coll1 (id, tags) VALUES ("\"d1\"", "[\"a\",\"b\"]")"#,
        &stub,
        &[json!("pk1")],
    )
    .unwrap();
    let Call::Create(spec) = &stub.calls()[0] else {
        panic!("expected a create call");
    };
    assert!(spec.is_upsert);
    assert_eq!(
        Value::Object(spec.document_data.clone()),
        json!({"id": "d1", "tags": ["a", "b"]})
    );
}

#[test]
fn insert_reports_rid() {
    let stub = StubTransport::new().on_create(Ok(doc(json!({"id": "d1", "_rid": "AbC=="}))));
    let result = exec(
        r#"INSERT INTO db1.coll1 (id) VALUES ("\"d1\"")"#,
        &stub,
        &[json!("pk1")],
    )
    .unwrap();
    assert!(result.successful);
    assert_eq!(result.insert_id.as_deref(), Some("AbC=="));
    assert_eq!(result.rows_affected(), 1);
}

fn insert_failing_with(status: u16) -> Error {
    let stub = StubTransport::new().on_create(Err(TransportError::new(status, "failed")));
    exec("INSERT INTO db1.coll1 (a) VALUES (1)", &stub, &[json!("pk")]).unwrap_err()
}

#[test]
fn insert_maps_status_codes() {
    assert!(matches!(insert_failing_with(403), Error::Forbidden));
    assert!(matches!(insert_failing_with(404), Error::NotFound));
    assert!(matches!(insert_failing_with(409), Error::Conflict));
    assert!(matches!(
        insert_failing_with(503),
        Error::Transport(TransportError { status: 503, .. })
    ));
}

#[test]
fn insert_placeholder_out_of_range_makes_no_call() {
    let stub = StubTransport::new();
    let err = exec(
        "INSERT INTO db1.coll1 (a) VALUES (:2)",
        &stub,
        &[json!("x"), json!("pk")],
    )
    .unwrap_err();
    assert!(matches!(err, Error::PlaceholderIndex(2)));
    assert!(stub.calls().is_empty());
}

#[test]
fn insert_argument_count_mismatch_makes_no_call() {
    let stub = StubTransport::new();
    let err = exec("INSERT INTO db1.coll1 (a) VALUES (:1)", &stub, &[json!("pk")]).unwrap_err();
    assert!(matches!(
        err,
        Error::ArgumentCount {
            expected: 2,
            actual: 1
        }
    ));
    assert!(stub.calls().is_empty());
}

#[test]
fn insert_field_value_mismatch_is_validation_error() {
    let err = Statement::parse("INSERT INTO db1.coll1 (a, b, c) VALUES (1, 2)").unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn insert_invalid_value_is_parse_error() {
    let err = Statement::parse("INSERT INTO db1.coll1 (a) VALUES (hello)").unwrap_err();
    assert!(matches!(err, Error::Parse { .. }));
}

#[test]
fn insert_value_with_parenthesis_inside_json() {
    let stub = StubTransport::new();
    exec(
        r#"INSERT INTO db1.coll1 (note) VALUES ("\"(draft)\"")"#,
        &stub,
        &[json!("pk")],
    )
    .unwrap();
    let Call::Create(spec) = &stub.calls()[0] else {
        panic!("expected a create call");
    };
    assert_eq!(spec.document_data["note"], json!("(draft)"));
}
