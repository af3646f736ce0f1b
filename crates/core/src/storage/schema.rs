//! SQLite table layout for the record store.

use rusqlite::Connection;

use super::StoreError;

/// Current table layout version.
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize or check the database layout.
pub fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    let version = get_schema_version(conn)?;

    if version == 0 {
        create_schema_v1(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if version > SCHEMA_VERSION {
        return Err(StoreError::VersionTooNew { found: version, supported: SCHEMA_VERSION });
    }

    Ok(())
}

fn get_schema_version(conn: &Connection) -> Result<i32, StoreError> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 =
        conn.query_row("SELECT version FROM schema_version", [], |row| row.get(0))?;

    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version) VALUES (1, ?1)",
        [version],
    )?;
    Ok(())
}

fn create_schema_v1(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL
        );

        -- One row per stored record; body is the record as a JSON object
        CREATE TABLE records (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            database TEXT NOT NULL,
            collection TEXT NOT NULL,
            oid TEXT NOT NULL,
            upsert_key TEXT,
            upsert_value TEXT,
            body TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (database, collection, oid)
        );

        CREATE INDEX idx_records_collection ON records(database, collection);
        CREATE INDEX idx_records_upsert ON records(database, collection, upsert_key, upsert_value);
        "#,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_newer_version_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        set_schema_version(&conn, SCHEMA_VERSION + 1).unwrap();
        assert!(matches!(init_schema(&conn), Err(StoreError::VersionTooNew { .. })));
    }
}
