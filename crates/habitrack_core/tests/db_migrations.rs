use habitrack_core::db::migrations::{apply_migrations, current_version, latest_version};
use habitrack_core::db::{open_db, open_db_in_memory, DbError, MigrationReport};
use rusqlite::Connection;

const TRACKER_TABLES: [&str; 5] = ["users", "sessions", "habits", "habit_progress", "goals"];

fn table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name;")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}

fn seed_user(conn: &Connection, username: &str) {
    conn.execute(
        "INSERT INTO users (username, email, password_hash) VALUES (?1, 'x@example.com', 'x');",
        [username],
    )
    .unwrap();
}

#[test]
fn fresh_store_has_every_tracker_table() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(current_version(&conn).unwrap(), latest_version());
    let names = table_names(&conn);
    for table in TRACKER_TABLES {
        assert!(names.iter().any(|name| name == table), "missing {table}");
    }
}

#[test]
fn orphan_rows_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let enforced: bool = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert!(enforced);

    let err = conn
        .execute(
            "INSERT INTO habits (user_id, title, frequency) VALUES (42, 'Orphan', 'daily');",
            [],
        )
        .unwrap_err();
    assert!(err.to_string().contains("FOREIGN KEY"));
}

#[test]
fn deleting_a_user_with_habits_needs_an_explicit_cascade() {
    let conn = open_db_in_memory().unwrap();
    seed_user(&conn, "carol");
    conn.execute(
        "INSERT INTO habits (user_id, title, frequency) VALUES (1, 'Stretch', 'daily');",
        [],
    )
    .unwrap();

    assert!(conn.execute("DELETE FROM users WHERE id = 1;", []).is_err());
}

#[test]
fn reopening_a_file_store_keeps_rows_and_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("habitrack.sqlite3");

    seed_user(&open_db(&path).unwrap(), "alice");

    let reopened = open_db(&path).unwrap();
    assert_eq!(current_version(&reopened).unwrap(), latest_version());
    let users: i64 = reopened
        .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(users, 1);
}

#[test]
fn check_constraints_guard_frequency_and_percentage() {
    let conn = open_db_in_memory().unwrap();
    seed_user(&conn, "bob");

    assert!(conn
        .execute(
            "INSERT INTO habits (user_id, title, frequency) VALUES (1, 'Run', 'hourly');",
            [],
        )
        .is_err());
    assert!(conn
        .execute(
            "INSERT INTO goals (user_id, title, target_date, progress_percentage)
             VALUES (1, 'Marathon', '2025-01-01', 101);",
            [],
        )
        .is_err());
    assert!(conn
        .execute(
            "INSERT INTO goals (user_id, title, target_date, progress_percentage)
             VALUES (1, 'Marathon', '2025-01-01', 100);",
            [],
        )
        .is_ok());
}

#[test]
fn store_from_a_newer_build_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");
    Connection::open(&path)
        .unwrap()
        .pragma_update(None, "user_version", 999)
        .unwrap();

    match open_db(&path).unwrap_err() {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("expected SchemaTooNew, got {other}"),
    }
}

#[test]
fn open_db_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("data").join("habitrack.sqlite3");

    let conn = open_db(&path).unwrap();
    assert!(path.exists());
    let journal: String = conn
        .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(journal.to_lowercase(), "wal");
}

#[test]
fn apply_migrations_reports_steps_run() {
    let mut conn = Connection::open_in_memory().unwrap();

    let first = apply_migrations(&mut conn).unwrap();
    assert_eq!(
        first,
        MigrationReport {
            from: 0,
            to: latest_version()
        }
    );
    assert_eq!(first.applied(), latest_version());

    assert_eq!(apply_migrations(&mut conn).unwrap().applied(), 0);
}
