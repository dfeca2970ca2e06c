use diary_core::db::open_db_in_memory;
use diary_core::{DateKey, Entry, EntryRepository, RepoError, SqliteEntryRepository, StoreWorker};

fn key(value: &str) -> DateKey {
    value.parse().unwrap()
}

#[test]
fn upsert_then_get_returns_body() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);

    repo.upsert_entry(key("2024-03-01"), "hello").unwrap();

    let loaded = repo.get_entry(key("2024-03-01")).unwrap().unwrap();
    assert_eq!(loaded, Entry::new(key("2024-03-01"), "hello"));
}

#[test]
fn second_upsert_replaces_instead_of_appending() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);

    repo.upsert_entry(key("2024-03-01"), "hello").unwrap();
    repo.upsert_entry(key("2024-03-01"), "world").unwrap();

    let loaded = repo.get_entry(key("2024-03-01")).unwrap().unwrap();
    assert_eq!(loaded.body, "world");
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn get_missing_date_is_absent_not_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);

    assert!(repo.get_entry(key("2024-03-01")).unwrap().is_none());
}

#[test]
fn blank_upsert_is_rejected_and_nothing_is_written() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);

    let err = repo.upsert_entry(key("2024-03-01"), " \t").unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(repo.list_dates().unwrap().is_empty());
}

#[test]
fn delete_removes_entry_and_is_noop_when_absent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);
    repo.upsert_entry(key("2024-03-01"), "hello").unwrap();

    repo.delete_entry(key("2024-03-01")).unwrap();
    repo.delete_entry(key("2024-03-01")).unwrap();
    repo.delete_entry(key("1999-12-31")).unwrap();

    assert!(repo.get_entry(key("2024-03-01")).unwrap().is_none());
}

#[test]
fn list_dates_is_sorted_and_skips_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);
    repo.upsert_entry(key("2024-03-15"), "b").unwrap();
    repo.upsert_entry(key("2023-12-31"), "a").unwrap();
    conn.execute(
        "INSERT INTO entries (date, entry) VALUES ('March 3rd', 'legacy');",
        [],
    )
    .unwrap();

    assert_eq!(
        repo.list_dates().unwrap(),
        vec![key("2023-12-31"), key("2024-03-15")]
    );
}

#[test]
fn null_or_blank_rows_read_as_absent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);
    conn.execute_batch(
        "INSERT INTO entries (date, entry) VALUES ('2024-03-01', NULL);
         INSERT INTO entries (date, entry) VALUES ('2024-03-02', '   ');",
    )
    .unwrap();

    assert!(repo.get_entry(key("2024-03-01")).unwrap().is_none());
    assert!(repo.get_entry(key("2024-03-02")).unwrap().is_none());
}

#[test]
fn worker_backed_repository_persists_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("diary.db");

    {
        let worker = StoreWorker::open(&path).unwrap();
        worker.upsert_entry(key("2024-03-01"), "from worker").unwrap();
    }

    let worker = StoreWorker::open(&path).unwrap();
    assert_eq!(
        worker.get_entry(key("2024-03-01")).unwrap().unwrap().body,
        "from worker"
    );
    assert_eq!(worker.list_dates().unwrap(), vec![key("2024-03-01")]);
}

#[test]
fn entry_serializes_with_string_date() {
    let entry = Entry::new(key("2024-03-01"), "hello");

    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["date"], "2024-03-01");
    assert_eq!(json["body"], "hello");

    let bad = serde_json::from_str::<Entry>(r#"{"date":"2024-02-30","body":"x"}"#);
    assert!(bad.is_err());
}
