//! End-to-end tests of a session over the in-memory store.

use docsql_core::{Error, MemoryStore, PreconditionPolicy, Session, SessionConfig};
use serde_json::json;

fn session() -> Session<MemoryStore> {
    let store = MemoryStore::new();
    store.create_collection("shop", "orders");
    Session::new(store)
}

#[test]
fn insert_update_select_delete() {
    let session = session();

    let inserted = session
        .exec(
            r#"INSERT INTO shop.orders (id, item, qty) VALUES ("\"o1\"", :1, 1)"#,
            &[json!("pen"), json!("o1")],
        )
        .unwrap();
    assert!(inserted.successful);
    assert!(inserted.insert_id.is_some());

    let updated = session
        .exec(
            "UPDATE shop.orders SET qty=:1 WHERE id=:2",
            &[json!(5), json!("o1"), json!("o1")],
        )
        .unwrap();
    assert_eq!(updated.rows_affected(), 1);

    let rows = session
        .query("SELECT * FROM orders o WITH db=shop", &[])
        .unwrap();
    assert_eq!(rows.len(), 1);
    let order = &rows.documents()[0];
    assert_eq!(order.get("qty"), Some(&json!(5)));
    assert_eq!(order.get("item"), Some(&json!("pen")));
    // the update keeps the resource id minted at insert time
    assert_eq!(order.rid(), inserted.insert_id.as_deref());

    let deleted = session
        .exec("DELETE FROM shop.orders WHERE id=o1", &[json!("o1")])
        .unwrap();
    assert_eq!(deleted.rows_affected(), 1);
    let again = session
        .exec("DELETE FROM shop.orders WHERE id=o1", &[json!("o1")])
        .unwrap();
    assert_eq!(again.rows_affected(), 0);
    assert_eq!(session.transport().document_count("shop", "orders"), Some(0));
}

#[test]
fn duplicate_insert_conflicts_and_upsert_replaces() {
    let session = session();
    let insert = r#"INSERT INTO shop.orders (id, qty) VALUES ("\"o1\"", :1)"#;
    session.exec(insert, &[json!(1), json!("o1")]).unwrap();

    let err = session.exec(insert, &[json!(2), json!("o1")]).unwrap_err();
    assert!(matches!(err, Error::Conflict));

    session
        .exec(
            r#"UPSERT INTO shop.orders (id, qty) VALUES ("\"o1\"", :1)"#,
            &[json!(3), json!("o1")],
        )
        .unwrap();
    let rows = session.query("SELECT * FROM orders WITH db=shop", &[]).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows.documents()[0].get("qty"), Some(&json!(3)));
}

#[test]
fn missing_collection_is_not_found() {
    let session = session();
    let err = session
        .exec("INSERT INTO shop.missing (a) VALUES (1)", &[json!("pk")])
        .unwrap_err();
    assert!(matches!(err, Error::NotFound));

    let err = session
        .exec("DELETE FROM shop.missing WHERE id=x", &[json!("pk")])
        .unwrap_err();
    assert!(matches!(err, Error::NotFound));

    let err = session
        .exec("UPDATE shop.missing SET a=1 WHERE id=x", &[json!("pk")])
        .unwrap_err();
    assert!(matches!(err, Error::NotFound));
}

#[test]
fn update_of_absent_document_changes_nothing() {
    let session = session();
    let result = session
        .exec("UPDATE shop.orders SET qty=1 WHERE id=nope", &[json!("nope")])
        .unwrap();
    assert!(!result.successful);
    assert_eq!(session.transport().document_count("shop", "orders"), Some(0));
}

#[test]
fn paginated_query_returns_every_document() {
    let store = MemoryStore::new().with_page_size(4);
    store.create_collection("shop", "orders");
    let session = Session::with_config(
        store,
        SessionConfig {
            precondition_policy: PreconditionPolicy::Surface,
        },
    );
    for n in 0..10 {
        session
            .exec(
                "INSERT INTO shop.orders (id, n) VALUES (:1, :2)",
                &[json!(format!("o{n}")), json!(n), json!("same")],
            )
            .unwrap();
    }
    let rows: Vec<_> = session
        .query("SELECT * FROM orders WITH db=shop", &[])
        .unwrap()
        .collect();
    assert_eq!(rows.len(), 10);
}

#[test]
fn query_across_partitions_needs_opt_in() {
    let session = session();
    for pk in ["a", "b"] {
        session
            .exec(
                "INSERT INTO shop.orders (id) VALUES (:1)",
                &[json!(pk), json!(pk)],
            )
            .unwrap();
    }

    let err = session
        .query("SELECT * FROM orders WITH db=shop", &[])
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)));

    let rows = session
        .query("SELECT CROSS PARTITION * FROM orders WITH db=shop", &[])
        .unwrap();
    assert_eq!(rows.len(), 2);
    let rows = session
        .query(
            "SELECT * FROM orders WITH db=shop WITH cross_partition=true",
            &[],
        )
        .unwrap();
    assert_eq!(rows.len(), 2);
}
