//! Get-or-create resolution for reference values.
//!
//! Repeated strings in a GPX document (cache types, countries, log
//! types, ...) are normalized into lookup rows. The resolver keeps one
//! in-memory uniqueness index per kind on top of the store, so a key
//! seen twice maps to the same row id without a second query.

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;

/// Maps natural keys to surrogate row ids, creating rows on first sight
#[derive(Debug, Default)]
pub struct Resolver {
    waypoint_syms: HashMap<String, i64>,
    waypoint_types: HashMap<String, i64>,
    cache_types: HashMap<String, i64>,
    cache_containers: HashMap<String, i64>,
    cache_countries: HashMap<String, i64>,
    cache_states: HashMap<String, i64>,
    log_types: HashMap<String, i64>,
    /// external id -> last seen display name
    cachers: HashMap<i64, Option<String>>,
    attributes: HashMap<(i64, bool, String), i64>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waypoint_sym(&mut self, conn: &Connection, name: &str) -> Result<i64> {
        lookup(conn, "waypoint_syms", &mut self.waypoint_syms, name)
    }

    pub fn waypoint_type(&mut self, conn: &Connection, name: &str) -> Result<i64> {
        lookup(conn, "waypoint_types", &mut self.waypoint_types, name)
    }

    pub fn cache_type(&mut self, conn: &Connection, name: &str) -> Result<i64> {
        lookup(conn, "cache_types", &mut self.cache_types, name)
    }

    pub fn cache_container(&mut self, conn: &Connection, name: &str) -> Result<i64> {
        lookup(conn, "cache_containers", &mut self.cache_containers, name)
    }

    pub fn cache_country(&mut self, conn: &Connection, name: &str) -> Result<i64> {
        lookup(conn, "cache_countries", &mut self.cache_countries, name)
    }

    pub fn cache_state(&mut self, conn: &Connection, name: &str) -> Result<i64> {
        lookup(conn, "cache_states", &mut self.cache_states, name)
    }

    pub fn log_type(&mut self, conn: &Connection, name: &str) -> Result<i64> {
        lookup(conn, "log_types", &mut self.log_types, name)
    }

    /// Resolve a cacher by external id. The display name is mutable:
    /// a re-sight under a different name updates the stored row.
    pub fn cacher(&mut self, conn: &Connection, id: i64, name: Option<&str>) -> Result<i64> {
        if let Some(seen) = self.cachers.get(&id) {
            if name.is_some() && seen.as_deref() != name {
                conn.execute("UPDATE cachers SET name = ?1 WHERE id = ?2", params![name, id])?;
                self.cachers.insert(id, name.map(str::to_string));
            }
            return Ok(id);
        }

        let stored: Option<Option<String>> = conn
            .query_row(
                "SELECT name FROM cachers WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        match stored {
            Some(stored_name) => {
                if name.is_some() && stored_name.as_deref() != name {
                    conn.execute(
                        "UPDATE cachers SET name = ?1 WHERE id = ?2",
                        params![name, id],
                    )?;
                }
            }
            None => {
                conn.execute(
                    "INSERT INTO cachers (id, name) VALUES (?1, ?2)",
                    params![id, name],
                )?;
            }
        }

        self.cachers.insert(id, name.map(str::to_string));
        Ok(id)
    }

    /// Resolve an attribute by its (external id, inclusion flag, name) triple
    pub fn attribute(
        &mut self,
        conn: &Connection,
        gc_id: i64,
        inc: bool,
        name: Option<&str>,
    ) -> Result<i64> {
        let key = (gc_id, inc, name.unwrap_or("").to_string());
        if let Some(&id) = self.attributes.get(&key) {
            return Ok(id);
        }

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM attributes WHERE gc_id = ?1 AND inc = ?2 AND name IS ?3",
                params![gc_id, inc, name],
                |row| row.get(0),
            )
            .optional()?;

        let id = match existing {
            Some(id) => id,
            None => {
                conn.execute(
                    "INSERT INTO attributes (gc_id, inc, name) VALUES (?1, ?2, ?3)",
                    params![gc_id, inc, name],
                )?;
                conn.last_insert_rowid()
            }
        };

        self.attributes.insert(key, id);
        Ok(id)
    }
}

/// Shared get-or-create path for the name-keyed lookup tables
fn lookup(
    conn: &Connection,
    table: &str,
    index: &mut HashMap<String, i64>,
    name: &str,
) -> Result<i64> {
    if let Some(&id) = index.get(name) {
        return Ok(id);
    }

    let existing: Option<i64> = conn
        .query_row(
            &format!("SELECT id FROM {} WHERE name = ?1", table),
            params![name],
            |row| row.get(0),
        )
        .optional()?;

    let id = match existing {
        Some(id) => id,
        None => {
            conn.execute(
                &format!("INSERT INTO {} (name) VALUES (?1)", table),
                params![name],
            )?;
            conn.last_insert_rowid()
        }
    };

    index.insert(name.to_string(), id);
    Ok(id)
}
