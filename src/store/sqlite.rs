use anyhow::{Context, Result};
use rusqlite::{Connection, Transaction};
use std::path::Path;

use super::schema_gen::{generate_create_table, generate_indexes};
use crate::model::SqlValue;
use crate::schema::ALL_TABLES;

/// SQLite-backed record store for geocache data
pub struct GeocacheDb {
    conn: Connection,
}

impl GeocacheDb {
    /// Open (or create) a database file and ensure the schema exists
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database {:?}", db_path))?;
        Self::init(conn)
    }

    /// Open an in-memory database, mainly for tests
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        let db = Self { conn };
        db.create_tables()?;
        Ok(db)
    }

    /// Create any missing tables and indexes
    pub fn create_tables(&self) -> Result<()> {
        for schema in ALL_TABLES {
            let sql = generate_create_table(schema);
            self.conn
                .execute(&sql, [])
                .with_context(|| format!("Failed to create table: {}", schema.name))?;

            for index_sql in generate_indexes(schema) {
                self.conn
                    .execute(&index_sql, [])
                    .with_context(|| format!("Failed to create index for: {}", schema.name))?;
            }
        }

        Ok(())
    }

    /// Run a statement produced by a model `insert()`
    pub fn execute(&self, stmt: &str, params: &[SqlValue]) -> Result<usize> {
        execute(&self.conn, stmt, params)
    }

    /// Start the transaction wrapping one document import
    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }

    /// Raw connection access for ad hoc queries
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Run an `insert()`-generated statement against any connection,
/// including a pending transaction.
pub fn execute(conn: &Connection, stmt: &str, params: &[SqlValue]) -> Result<usize> {
    let count = conn
        .execute(stmt, rusqlite::params_from_iter(params.iter()))
        .with_context(|| format!("Failed to execute: {}", stmt))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Waypoint;

    #[test]
    fn test_schema_is_created_on_open() {
        let db = GeocacheDb::open_in_memory().unwrap();
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM caches", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_execute_model_insert() {
        let db = GeocacheDb::open_in_memory().unwrap();
        let wpt = Waypoint {
            lat: 49.5,
            lon: 8.25,
            name: Some("GC1234".to_string()),
            gc_code: Some("GC1234".to_string()),
            ..Default::default()
        };
        let (stmt, params) = wpt.insert();
        assert_eq!(db.execute(&stmt, &params).unwrap(), 1);

        let name: String = db
            .conn()
            .query_row("SELECT name FROM waypoints", [], |row| row.get(0))
            .unwrap();
        assert_eq!(name, "GC1234");
    }

    #[test]
    fn test_create_tables_is_idempotent() {
        let db = GeocacheDb::open_in_memory().unwrap();
        db.create_tables().unwrap();
        db.create_tables().unwrap();
    }
}
