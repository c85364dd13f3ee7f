use rusqlite::{Connection, Result};
use std::collections::HashMap;

/// Current database schema version
pub const CURRENT_VERSION: u32 = 2;

/// Migration system for managing database schema versions
pub struct MigrationManager;

impl MigrationManager {
    /// Initialize the database with the current schema
    /// This creates the schema_version table and applies all migrations
    pub fn initialize(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            )",
            [],
        )?;

        let current_version = Self::get_version(conn)?;

        for version in (current_version + 1)..=CURRENT_VERSION {
            Self::apply_migration(conn, version)?;
        }

        Ok(())
    }

    /// Apply a specific migration by version number
    fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
        let migrations = get_migrations();
        if let Some(migration) = migrations.get(&version) {
            let tx = conn.unchecked_transaction()?;
            migration(&tx)?;
            tx.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                [version],
            )?;
            tx.commit()?;
            log::debug!("Applied schema migration v{}", version);
            Ok(())
        } else {
            Err(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_MISUSE),
                Some(format!("No migration found for version {}", version)),
            ))
        }
    }

    /// Get the current schema version
    pub fn get_version(conn: &Connection) -> Result<u32> {
        conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
    }
}

type Migration = fn(&rusqlite::Transaction) -> Result<(), rusqlite::Error>;

/// Get all migrations indexed by version
fn get_migrations() -> HashMap<u32, Migration> {
    let mut migrations: HashMap<u32, Migration> = HashMap::new();
    migrations.insert(1, migration_v1);
    migrations.insert(2, migration_v2);
    migrations
}

/// Migration v1: append-only feedback log
fn migration_v1(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    // start_ts is NULL for events recorded without a timed start
    tx.execute(
        "CREATE TABLE feedback_events (
            id INTEGER PRIMARY KEY,
            start_ts INTEGER NULL,
            end_ts INTEGER NOT NULL,
            feeling TEXT NOT NULL CHECK(feeling IN ('happy','sad')),
            created_ts INTEGER NOT NULL
        )",
        [],
    )?;

    tx.execute(
        "CREATE INDEX idx_feedback_events_end ON feedback_events(end_ts)",
        [],
    )?;

    Ok(())
}

/// Migration v2: durable provisional start so start and feedback can
/// happen in separate invocations
fn migration_v2(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    // At most one row
    tx.execute(
        "CREATE TABLE pending_start (
            id INTEGER PRIMARY KEY CHECK(id = 1),
            start_ts INTEGER NOT NULL,
            created_ts INTEGER NOT NULL
        )",
        [],
    )?;

    Ok(())
}
