//! Integration tests for jotdb-core: file-backed tables end to end.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde_json::{Value, json};
use tempfile::tempdir;

use jotdb_core::api::{JotDb, OrderKey, Query, Table};
use jotdb_core::config::DatabaseOptions;
use jotdb_core::error::{Error, SchemaError};
use jotdb_core::storage::file::backup_file_name;
use jotdb_core::types::Record;

fn open_db(root: &Path) -> JotDb {
    JotDb::open(DatabaseOptions::new(root.join("database"))).unwrap()
}

fn table_file(root: &Path, table: &str) -> PathBuf {
    root.join("database").join(format!("{table}.json"))
}

fn saves(root: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(root.join("database").join("saves"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn ids(rows: &[Record]) -> Vec<i64> {
    rows.iter().map(|r| r["id"].as_i64().unwrap()).collect()
}

/// Five houses inserted in id order 1..=5.
fn seeded(db: &JotDb) -> Table<'_> {
    let t = db.table("houses").unwrap();
    t.create_with_fields("house, words").unwrap();
    for (house, words) in [
        ("Stark", "Winter Is Coming"),
        ("Arryn", "As High As Honor"),
        ("Stark", "The North Remembers"),
        ("Arryn", "As High As Honor"),
        ("Tully", "Family, Duty, Honor"),
    ] {
        t.insert(vec![("house", house), ("words", words)]).unwrap();
    }
    t
}

#[test]
fn test_open_bootstraps_directories() {
    let dir = tempdir().unwrap();
    open_db(dir.path());
    assert!(dir.path().join("database").is_dir());
    assert!(dir.path().join("database").join("saves").is_dir());
}

#[test]
fn test_create_writes_boilerplate_and_rejects_duplicate() {
    let dir = tempdir().unwrap();
    let db = open_db(dir.path());
    let t = db.table("t").unwrap();
    t.create().unwrap();

    let content = fs::read_to_string(table_file(dir.path(), "t")).unwrap();
    assert_eq!(content, r#"{"table":"t","id":1,"fields":[["id"]],"data":[]}"#);

    assert!(matches!(
        t.create(),
        Err(Error::Schema(SchemaError::TableAlreadyExists(_)))
    ));
}

#[test]
fn test_inserts_assign_monotonic_keys() {
    let dir = tempdir().unwrap();
    let db = open_db(dir.path());
    let t = db.table("t").unwrap();
    t.create_with_fields("name").unwrap();

    for expected in 1..=6u64 {
        assert_eq!(t.insert(format!("name = n{expected}")).unwrap(), expected);
    }
    assert_eq!(t.next_primary_key().unwrap(), 7);
    assert_eq!(t.last_primary_key().unwrap(), Some(json!(6)));
}

#[test]
fn test_rows_stay_aligned_through_schema_edits() {
    let dir = tempdir().unwrap();
    let db = open_db(dir.path());
    let t = seeded(&db);

    t.add_fields("seat, sigil").unwrap();
    t.remove_fields("words").unwrap();
    t.add_fields(["motto"]).unwrap();
    t.remove_fields("sigil, ghost").unwrap();
    t.insert("house = Tyrell, motto = Growing Strong").unwrap();

    let raw: Value =
        serde_json::from_str(&fs::read_to_string(table_file(dir.path(), "houses")).unwrap())
            .unwrap();
    let width = raw["fields"].as_array().unwrap().len();
    assert_eq!(raw["fields"], json!([["id"], ["house"], ["seat"], ["motto"]]));
    for row in raw["data"].as_array().unwrap() {
        assert_eq!(row.as_array().unwrap().len(), width);
    }
}

#[test]
fn test_insert_then_select_round_trip() {
    let dir = tempdir().unwrap();
    let db = open_db(dir.path());
    let t = db.table("houses").unwrap();
    t.create_with_fields("house, words").unwrap();
    t.insert(json!({"house": "Stark", "words": "Winter Is Coming"}))
        .unwrap();

    let rows = t.select(&Query::new()).unwrap();
    assert_eq!(
        Value::Object(rows[0].clone()),
        json!({"id": 1, "house": "Stark", "words": "Winter Is Coming"})
    );

    let rows = t.select(&Query::new().project(&["house"][..])).unwrap();
    assert_eq!(Value::Object(rows[0].clone()), json!({"house": "Stark"}));
}

#[test]
fn test_filter_equal_and_not_equal() {
    let dir = tempdir().unwrap();
    let db = open_db(dir.path());
    let t = seeded(&db);

    assert_eq!(ids(&t.select(&Query::new().filter("id = 1")).unwrap()), vec![1]);
    assert_eq!(
        ids(&t.select(&Query::new().filter("id != 1")).unwrap()),
        vec![2, 3, 4, 5]
    );
    assert_eq!(
        ids(&t.select(&Query::new().filter("id >= 4")).unwrap()),
        vec![4, 5]
    );
}

#[test]
fn test_unparsable_filter_selects_everything() {
    let dir = tempdir().unwrap();
    let db = open_db(dir.path());
    let t = seeded(&db);
    assert_eq!(t.select(&Query::new().filter("house Stark")).unwrap().len(), 5);
}

#[test]
fn test_multi_key_order_is_stable() {
    let dir = tempdir().unwrap();
    let db = open_db(dir.path());
    let t = seeded(&db);

    let query = Query::new()
        .order_by(OrderKey::asc("house"))
        .order_by(OrderKey::desc("words"));
    assert_eq!(ids(&t.select(&query).unwrap()), vec![2, 4, 1, 3, 5]);

    let query = Query::new().order_by_text("house asc, words desc");
    assert_eq!(ids(&t.select(&query).unwrap()), vec![2, 4, 1, 3, 5]);
}

#[test]
fn test_order_by_unknown_field_fails() {
    let dir = tempdir().unwrap();
    let db = open_db(dir.path());
    let t = seeded(&db);

    let err = t
        .select(&Query::new().order_by(OrderKey::asc("seat")))
        .unwrap_err();
    assert_eq!(err.missing_fields(), Some(&["seat".to_string()][..]));
}

#[test]
fn test_limit_offset_and_reverse() {
    let dir = tempdir().unwrap();
    let db = open_db(dir.path());
    let t = seeded(&db);

    let rows = t.select(&Query::new().limit(2).offset(1)).unwrap();
    assert_eq!(ids(&rows), vec![2, 3]);

    let rows = t.select(&Query::new().limit(2).reverse(true)).unwrap();
    assert_eq!(ids(&rows), vec![5, 4]);

    let rows = t.select(&Query::new().limit(0)).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_soft_remove_moves_table_to_saves() {
    let dir = tempdir().unwrap();
    let db = open_db(dir.path());
    let t = seeded(&db);
    let before = fs::read_to_string(table_file(dir.path(), "houses")).unwrap();

    let start = Local::now();
    t.remove(false).unwrap();
    let end = Local::now();

    assert!(!table_file(dir.path(), "houses").exists());
    let names = saves(dir.path());
    assert_eq!(names.len(), 1);
    assert!(
        names[0] == backup_file_name("houses", &start)
            || names[0] == backup_file_name("houses", &end),
        "unexpected backup name {}",
        names[0]
    );
    let saved = fs::read_to_string(dir.path().join("database/saves").join(&names[0])).unwrap();
    assert_eq!(saved, before);
}

#[test]
fn test_hard_remove_leaves_nothing() {
    let dir = tempdir().unwrap();
    let db = open_db(dir.path());
    let t = seeded(&db);

    t.remove(true).unwrap();
    assert!(!table_file(dir.path(), "houses").exists());
    assert!(saves(dir.path()).is_empty());
}

#[test]
fn test_unknown_fields_leave_file_unchanged() {
    let dir = tempdir().unwrap();
    let db = open_db(dir.path());
    let t = seeded(&db);
    let before = fs::read_to_string(table_file(dir.path(), "houses")).unwrap();

    let err = t.insert("age = 3, house = Stark, email = x").unwrap_err();
    assert_eq!(
        err.missing_fields(),
        Some(&["age".to_string(), "email".to_string()][..])
    );

    let err = t.update(json!({"seat": "Winterfell"})).unwrap_err();
    assert_eq!(err.missing_fields(), Some(&["seat".to_string()][..]));

    let after = fs::read_to_string(table_file(dir.path(), "houses")).unwrap();
    assert_eq!(after, before);
}

#[test]
fn test_delete_backs_up_then_clears() {
    let dir = tempdir().unwrap();
    let db = open_db(dir.path());
    let t = seeded(&db);
    let before = fs::read_to_string(table_file(dir.path(), "houses")).unwrap();

    assert_eq!(t.delete(false).unwrap(), 5);
    assert!(t.select_all().unwrap().is_empty());
    assert_eq!(t.next_primary_key().unwrap(), 6);

    let names = saves(dir.path());
    assert_eq!(names.len(), 1);
    let saved = fs::read_to_string(dir.path().join("database/saves").join(&names[0])).unwrap();
    assert_eq!(saved, before);
}

#[test]
fn test_reopen_sees_persisted_state() {
    let dir = tempdir().unwrap();
    {
        let db = open_db(dir.path());
        let t = seeded(&db);
        t.rename_fields([("words", "motto")]).unwrap();
        t.update("motto = Unbowed").unwrap();
    }

    let options = DatabaseOptions::new(dir.path().join("database")).table("houses");
    let db = JotDb::open(options).unwrap();
    let t = db.selected().unwrap();
    let info = t.describe().unwrap();
    assert_eq!(info.fields, vec!["id", "house", "motto"]);
    assert_eq!(info.rows, 5);
    assert_eq!(t.find_or_fail(5).unwrap()["motto"], "Unbowed");
    assert_eq!(t.first().unwrap().unwrap()["house"], "Stark");
    assert_eq!(t.last().unwrap().unwrap()["house"], "Tully");
}
