//! Persisted row types and their INSERT statement generation.
//!
//! Each entity builds its own `(statement, parameters)` pair so the
//! store only has to bind and execute.

use rusqlite::types::{Null, ToSqlOutput};
use rusqlite::ToSql;

/// A single SQL parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            SqlValue::Null => Null.to_sql(),
            SqlValue::Integer(i) => i.to_sql(),
            SqlValue::Real(f) => f.to_sql(),
            SqlValue::Text(s) => s.to_sql(),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Real(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Integer(if value { 1 } else { 0 })
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<Option<String>> for SqlValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(SqlValue::Null, SqlValue::Text)
    }
}

impl From<Option<i64>> for SqlValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(SqlValue::Null, SqlValue::Integer)
    }
}

impl From<Option<f64>> for SqlValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(SqlValue::Null, SqlValue::Real)
    }
}

/// One GPX waypoint row. The database id is a surrogate assigned on
/// insert; `gc_code` is derived from the name at import time.
#[derive(Debug, Clone, Default)]
pub struct Waypoint {
    pub lat: f64,
    pub lon: f64,
    pub time: Option<String>,
    pub name: Option<String>,
    pub cmt: Option<String>,
    pub descr: Option<String>,
    pub url: Option<String>,
    pub urlname: Option<String>,
    pub sym_id: Option<i64>,
    pub type_id: Option<i64>,
    pub gc_code: Option<String>,
    pub cache_id: Option<i64>,
}

impl Waypoint {
    pub fn insert(&self) -> (String, Vec<SqlValue>) {
        let stmt = "INSERT INTO waypoints (lat, lon, time, name, cmt, descr, url, urlname, \
                    sym_id, type_id, gc_code, cache_id) \
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";
        let params = vec![
            self.lat.into(),
            self.lon.into(),
            self.time.clone().into(),
            self.name.clone().into(),
            self.cmt.clone().into(),
            self.descr.clone().into(),
            self.url.clone().into(),
            self.urlname.clone().into(),
            self.sym_id.into(),
            self.type_id.into(),
            self.gc_code.clone().into(),
            self.cache_id.into(),
        ];
        (stmt.to_string(), params)
    }
}

/// One geocache row, keyed by the external groundspeak id.
#[derive(Debug, Clone, Default)]
pub struct Cache {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    pub gc_id: Option<String>,
    pub available: bool,
    pub archived: bool,
    pub name: Option<String>,
    pub placed_by: Option<String>,
    pub owner_id: Option<i64>,
    pub type_id: Option<i64>,
    pub container_id: Option<i64>,
    pub country_id: Option<i64>,
    pub state_id: Option<i64>,
    pub difficulty: Option<f64>,
    pub terrain: Option<f64>,
    pub short_desc: Option<String>,
    pub short_html: bool,
    pub long_desc: Option<String>,
    pub long_html: bool,
    pub encoded_hints: Option<String>,
    /// Log-type names of the 5 most recent logs, newest first,
    /// ";"-joined. Denormalized once at import.
    pub last_logs: Option<String>,
}

impl Cache {
    pub fn insert(&self) -> (String, Vec<SqlValue>) {
        let stmt = "INSERT INTO caches (id, lat, lon, gc_id, available, archived, name, \
                    placed_by, owner_id, type_id, container_id, country_id, state_id, \
                    difficulty, terrain, short_desc, short_html, long_desc, long_html, \
                    encoded_hints, last_logs) \
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, \
                    ?15, ?16, ?17, ?18, ?19, ?20, ?21)";
        let params = vec![
            self.id.into(),
            self.lat.into(),
            self.lon.into(),
            self.gc_id.clone().into(),
            self.available.into(),
            self.archived.into(),
            self.name.clone().into(),
            self.placed_by.clone().into(),
            self.owner_id.into(),
            self.type_id.into(),
            self.container_id.into(),
            self.country_id.into(),
            self.state_id.into(),
            self.difficulty.into(),
            self.terrain.into(),
            self.short_desc.clone().into(),
            self.short_html.into(),
            self.long_desc.clone().into(),
            self.long_html.into(),
            self.encoded_hints.clone().into(),
            self.last_logs.clone().into(),
        ];
        (stmt.to_string(), params)
    }
}

/// One cache log row, keyed by the external groundspeak id.
#[derive(Debug, Clone, Default)]
pub struct Log {
    pub id: i64,
    pub cache_id: i64,
    pub date: Option<String>,
    pub type_id: Option<i64>,
    pub finder_id: Option<i64>,
    pub text: Option<String>,
    pub text_encoded: bool,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl Log {
    pub fn insert(&self) -> (String, Vec<SqlValue>) {
        let stmt = "INSERT INTO logs (id, cache_id, date, type_id, finder_id, text, \
                    text_encoded, lat, lon) \
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";
        let params = vec![
            self.id.into(),
            self.cache_id.into(),
            self.date.clone().into(),
            self.type_id.into(),
            self.finder_id.into(),
            self.text.clone().into(),
            self.text_encoded.into(),
            self.lat.into(),
            self.lon.into(),
        ];
        (stmt.to_string(), params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waypoint_insert_binds_every_column() {
        let wpt = Waypoint {
            lat: 49.5,
            lon: 8.25,
            name: Some("GC1234".to_string()),
            ..Default::default()
        };
        let (stmt, params) = wpt.insert();
        assert!(stmt.starts_with("INSERT INTO waypoints"));
        assert_eq!(stmt.matches('?').count(), params.len());
        assert_eq!(params[0], SqlValue::Real(49.5));
        assert_eq!(params[3], SqlValue::Text("GC1234".to_string()));
        // unset optional fields bind as NULL
        assert_eq!(params[11], SqlValue::Null);
    }

    #[test]
    fn test_cache_insert_binds_every_column() {
        let cache = Cache {
            id: 815,
            available: true,
            ..Default::default()
        };
        let (stmt, params) = cache.insert();
        assert!(stmt.starts_with("INSERT INTO caches"));
        assert_eq!(stmt.matches('?').count(), params.len());
        assert_eq!(params[0], SqlValue::Integer(815));
        assert_eq!(params[4], SqlValue::Integer(1));
        assert_eq!(params[5], SqlValue::Integer(0));
    }

    #[test]
    fn test_log_insert_binds_every_column() {
        let log = Log {
            id: 7,
            cache_id: 815,
            date: Some("2020-03-01".to_string()),
            ..Default::default()
        };
        let (stmt, params) = log.insert();
        assert!(stmt.starts_with("INSERT INTO logs"));
        assert_eq!(stmt.matches('?').count(), params.len());
        assert_eq!(params[2], SqlValue::Text("2020-03-01".to_string()));
    }
}
