//! Unit tests for the database layer: opening, migrations and the health check.

use linkmark::database::migrations::{get_schema_version, run_all, CURRENT_SCHEMA_VERSION};
use linkmark::database::Database;
use tempfile::TempDir;

fn table_exists(conn: &rusqlite::Connection, name: &str) -> bool {
    conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [name],
        |row| row.get::<_, i64>(0),
    )
    .unwrap()
        == 1
}

#[test]
fn test_in_memory_database_has_schema() {
    let db = Database::open_in_memory().expect("Failed to open in-memory database");
    let conn = db.connection();

    assert!(table_exists(&conn, "categories"));
    assert!(table_exists(&conn, "bookmarks"));
    assert_eq!(get_schema_version(&conn), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_migrations_are_idempotent() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.connection();

    run_all(&conn).unwrap();
    run_all(&conn).unwrap();

    let applied: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(applied, CURRENT_SCHEMA_VERSION as i64);
}

#[test]
fn test_file_database_persists_across_reopen() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("linkmark.db");

    {
        let db = Database::open(&path).unwrap();
        db.connection()
            .execute(
                "INSERT INTO categories (id, user_id, name, color, created_at) VALUES ('c1', 'u1', 'Work', '#000000', 1)",
                [],
            )
            .unwrap();
    }

    let db = Database::open(&path).unwrap();
    let name: String = db
        .connection()
        .query_row("SELECT name FROM categories WHERE id = 'c1'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(name, "Work");
}

#[test]
fn test_ping_succeeds_on_open_database() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.ping().is_ok());
}

#[test]
fn test_category_color_defaults_in_schema() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.connection();
    conn.execute(
        "INSERT INTO categories (id, user_id, name, created_at) VALUES ('c1', 'u1', 'Plain', 1)",
        [],
    )
    .unwrap();
    let color: String = conn
        .query_row("SELECT color FROM categories WHERE id = 'c1'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(color, "#3B82F6");
}
