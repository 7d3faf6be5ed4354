//! Read-side queries for export. Lookup references are joined to their
//! display names here so the encoder never touches surrogate ids.

use anyhow::Result;
use rusqlite::{params, OptionalExtension, Row};

use super::sqlite::GeocacheDb;

/// A cache row with every lookup reference resolved to its name
#[derive(Debug, Clone)]
pub struct CacheView {
    pub id: i64,
    pub available: bool,
    pub archived: bool,
    pub name: Option<String>,
    pub placed_by: Option<String>,
    pub owner_id: Option<i64>,
    pub owner: Option<String>,
    pub type_name: Option<String>,
    pub container: Option<String>,
    pub difficulty: Option<f64>,
    pub terrain: Option<f64>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub short_desc: Option<String>,
    pub short_html: bool,
    pub long_desc: Option<String>,
    pub long_html: bool,
    pub encoded_hints: Option<String>,
}

/// A waypoint row with symbol and type resolved to their names
#[derive(Debug, Clone)]
pub struct WaypointView {
    pub lat: f64,
    pub lon: f64,
    pub time: Option<String>,
    pub name: Option<String>,
    pub cmt: Option<String>,
    pub descr: Option<String>,
    pub url: Option<String>,
    pub urlname: Option<String>,
    pub sym: Option<String>,
    pub type_name: Option<String>,
    pub gc_code: Option<String>,
    pub cache_id: Option<i64>,
}

/// An attribute row as linked to one cache
#[derive(Debug, Clone)]
pub struct AttributeView {
    pub gc_id: i64,
    pub inc: bool,
    pub name: Option<String>,
}

/// A log row with type and finder resolved to their names
#[derive(Debug, Clone)]
pub struct LogView {
    pub id: i64,
    pub date: Option<String>,
    pub type_name: Option<String>,
    pub finder_id: Option<i64>,
    pub finder: Option<String>,
    pub text: Option<String>,
    pub text_encoded: bool,
}

const WAYPOINT_SQL: &str = "SELECT w.lat, w.lon, w.time, w.name, w.cmt, w.descr, w.url, \
     w.urlname, s.name AS sym, t.name AS type_name, w.gc_code, w.cache_id \
     FROM waypoints w \
     LEFT JOIN waypoint_syms s ON s.id = w.sym_id \
     LEFT JOIN waypoint_types t ON t.id = w.type_id";

fn waypoint_from_row(row: &Row) -> rusqlite::Result<WaypointView> {
    Ok(WaypointView {
        lat: row.get("lat")?,
        lon: row.get("lon")?,
        time: row.get("time")?,
        name: row.get("name")?,
        cmt: row.get("cmt")?,
        descr: row.get("descr")?,
        url: row.get("url")?,
        urlname: row.get("urlname")?,
        sym: row.get("sym")?,
        type_name: row.get("type_name")?,
        gc_code: row.get("gc_code")?,
        cache_id: row.get("cache_id")?,
    })
}

impl GeocacheDb {
    /// Load one cache with all lookup names resolved
    pub fn cache_view(&self, id: i64) -> Result<Option<CacheView>> {
        let view = self
            .conn()
            .query_row(
                "SELECT c.id, c.available, c.archived, c.name, c.placed_by, c.owner_id, \
                 o.name AS owner, t.name AS type_name, ct.name AS container, \
                 c.difficulty, c.terrain, co.name AS country, s.name AS state, \
                 c.short_desc, c.short_html, c.long_desc, c.long_html, c.encoded_hints \
                 FROM caches c \
                 LEFT JOIN cachers o ON o.id = c.owner_id \
                 LEFT JOIN cache_types t ON t.id = c.type_id \
                 LEFT JOIN cache_containers ct ON ct.id = c.container_id \
                 LEFT JOIN cache_countries co ON co.id = c.country_id \
                 LEFT JOIN cache_states s ON s.id = c.state_id \
                 WHERE c.id = ?1",
                params![id],
                |row| {
                    Ok(CacheView {
                        id: row.get("id")?,
                        available: row.get("available")?,
                        archived: row.get("archived")?,
                        name: row.get("name")?,
                        placed_by: row.get("placed_by")?,
                        owner_id: row.get("owner_id")?,
                        owner: row.get("owner")?,
                        type_name: row.get("type_name")?,
                        container: row.get("container")?,
                        difficulty: row.get("difficulty")?,
                        terrain: row.get("terrain")?,
                        country: row.get("country")?,
                        state: row.get("state")?,
                        short_desc: row.get("short_desc")?,
                        short_html: row.get("short_html")?,
                        long_desc: row.get("long_desc")?,
                        long_html: row.get("long_html")?,
                        encoded_hints: row.get("encoded_hints")?,
                    })
                },
            )
            .optional()?;
        Ok(view)
    }

    /// Load the waypoint carrying the cache extension for one cache
    pub fn primary_waypoint(&self, cache_id: i64) -> Result<Option<WaypointView>> {
        let sql = format!("{} WHERE w.cache_id = ?1", WAYPOINT_SQL);
        let view = self
            .conn()
            .query_row(&sql, params![cache_id], waypoint_from_row)
            .optional()?;
        Ok(view)
    }

    /// Load every waypoint sharing a GC code, primary and satellites alike
    pub fn waypoints_by_gc_code(&self, gc_code: &str) -> Result<Vec<WaypointView>> {
        let sql = format!("{} WHERE w.gc_code = ?1 ORDER BY w.id", WAYPOINT_SQL);
        let mut stmt = self.conn().prepare(&sql)?;
        let views = stmt
            .query_map(params![gc_code], waypoint_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(views)
    }

    /// Load the attributes linked to one cache
    pub fn attributes_for_cache(&self, cache_id: i64) -> Result<Vec<AttributeView>> {
        let mut stmt = self.conn().prepare(
            "SELECT a.gc_id, a.inc, a.name \
             FROM attributes a \
             JOIN cache_to_attribute ca ON ca.attribute_id = a.id \
             WHERE ca.cache_id = ?1 \
             ORDER BY a.id",
        )?;
        let views = stmt
            .query_map(params![cache_id], |row| {
                Ok(AttributeView {
                    gc_id: row.get("gc_id")?,
                    inc: row.get("inc")?,
                    name: row.get("name")?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(views)
    }

    /// Load the logs of one cache, unordered
    pub fn logs_for_cache(&self, cache_id: i64) -> Result<Vec<LogView>> {
        let mut stmt = self.conn().prepare(
            "SELECT l.id, l.date, t.name AS type_name, l.finder_id, f.name AS finder, \
             l.text, l.text_encoded \
             FROM logs l \
             LEFT JOIN log_types t ON t.id = l.type_id \
             LEFT JOIN cachers f ON f.id = l.finder_id \
             WHERE l.cache_id = ?1",
        )?;
        let views = stmt
            .query_map(params![cache_id], |row| {
                Ok(LogView {
                    id: row.get("id")?,
                    date: row.get("date")?,
                    type_name: row.get("type_name")?,
                    finder_id: row.get("finder_id")?,
                    finder: row.get("finder")?,
                    text: row.get("text")?,
                    text_encoded: row.get("text_encoded")?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(views)
    }
}
