use haulbook_core::db::migrations::latest_version;
use haulbook_core::db::{open_db, open_db_in_memory, DbError};
use haulbook_core::{RepoError, SqliteDriverRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_eq!(latest_version(), 3);
    assert_table_exists(&conn, "drivers");
    assert_table_exists(&conn, "vehicles");
    assert_table_exists(&conn, "trips");
    assert!(column_names(&conn, "trips").contains(&"product".to_string()));
}

#[test]
fn vehicle_columns_keep_their_relational_names() {
    let conn = open_db_in_memory().unwrap();
    let columns = column_names(&conn, "vehicles");
    assert_eq!(
        columns,
        vec![
            "vehicle_id",
            "cuña_circulation_number",
            "plancha_circulation_number",
            "cuña_plate_number",
            "plancha_plate_number",
            "driver_id",
        ]
    );
}

#[test]
fn connections_enforce_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("haulbook.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO drivers (full_name, identification_number, phone_number)
             VALUES ('Ana Ruiz', 'D1', '+1');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let drivers: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM drivers;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(drivers, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repository_rejects_connection_without_migrations() {
    let conn = Connection::open_in_memory().unwrap();
    match SqliteDriverRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        }) => {
            assert_eq!(expected_version, latest_version());
            assert_eq!(actual_version, 0);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("unmigrated connection must be rejected"),
    }
}

#[test]
fn repository_rejects_connection_missing_its_table() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE trips; DROP TABLE vehicles; DROP TABLE drivers;")
        .unwrap();

    assert!(matches!(
        SqliteDriverRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("drivers"))
    ));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn column_names(conn: &Connection, table: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table});"))
        .unwrap();
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    names
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
