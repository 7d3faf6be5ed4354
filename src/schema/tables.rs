//! Table schema definitions for the geocache database

use super::types::*;

// =============================================================================
// Lookup Tables (no FK dependencies)
// =============================================================================

pub static CACHE_TYPES: TableSchema = TableSchema {
    name: "cache_types",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Text),
    ],
    foreign_keys: &[],
    indexes: &[Index::unique(&["name"])],
};

pub static CACHE_CONTAINERS: TableSchema = TableSchema {
    name: "cache_containers",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Text),
    ],
    foreign_keys: &[],
    indexes: &[Index::unique(&["name"])],
};

pub static CACHE_COUNTRIES: TableSchema = TableSchema {
    name: "cache_countries",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Text),
    ],
    foreign_keys: &[],
    indexes: &[Index::unique(&["name"])],
};

pub static CACHE_STATES: TableSchema = TableSchema {
    name: "cache_states",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Text),
    ],
    foreign_keys: &[],
    indexes: &[Index::unique(&["name"])],
};

pub static LOG_TYPES: TableSchema = TableSchema {
    name: "log_types",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Text),
    ],
    foreign_keys: &[],
    indexes: &[Index::unique(&["name"])],
};

pub static WAYPOINT_SYMS: TableSchema = TableSchema {
    name: "waypoint_syms",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Text),
    ],
    foreign_keys: &[],
    indexes: &[Index::unique(&["name"])],
};

pub static WAYPOINT_TYPES: TableSchema = TableSchema {
    name: "waypoint_types",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("name", ColumnType::Text),
    ],
    foreign_keys: &[],
    indexes: &[Index::unique(&["name"])],
};

// Cachers carry the external groundspeak id, so the id is not generated.
pub static CACHERS: TableSchema = TableSchema {
    name: "cachers",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::new("name", ColumnType::Text),
    ],
    foreign_keys: &[],
    indexes: &[],
};

// Attributes are deduplicated by (gc_id, inc, name); id is a surrogate.
pub static ATTRIBUTES: TableSchema = TableSchema {
    name: "attributes",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("gc_id", ColumnType::Integer),
        Column::required("inc", ColumnType::Boolean),
        Column::new("name", ColumnType::Text),
    ],
    foreign_keys: &[],
    indexes: &[Index::unique(&["gc_id", "inc", "name"])],
};

// =============================================================================
// Entity Tables
// =============================================================================

// lat/lon/gc_id are copied from the primary waypoint at import time so
// that export queries need no join for the position.
pub static CACHES: TableSchema = TableSchema {
    name: "caches",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::new("lat", ColumnType::Real),
        Column::new("lon", ColumnType::Real),
        Column::new("gc_id", ColumnType::Text),
        Column::new("available", ColumnType::Boolean),
        Column::new("archived", ColumnType::Boolean),
        Column::new("name", ColumnType::Text),
        Column::new("placed_by", ColumnType::Text),
        Column::new("owner_id", ColumnType::Integer),
        Column::new("type_id", ColumnType::Integer),
        Column::new("container_id", ColumnType::Integer),
        Column::new("country_id", ColumnType::Integer),
        Column::new("state_id", ColumnType::Integer),
        Column::new("difficulty", ColumnType::Real),
        Column::new("terrain", ColumnType::Real),
        Column::new("short_desc", ColumnType::Text),
        Column::new("short_html", ColumnType::Boolean),
        Column::new("long_desc", ColumnType::Text),
        Column::new("long_html", ColumnType::Boolean),
        Column::new("encoded_hints", ColumnType::Text),
        Column::new("last_logs", ColumnType::Text),
    ],
    foreign_keys: &[
        ForeignKey::new("owner_id", "cachers"),
        ForeignKey::new("type_id", "cache_types"),
        ForeignKey::new("container_id", "cache_containers"),
        ForeignKey::new("country_id", "cache_countries"),
        ForeignKey::new("state_id", "cache_states"),
    ],
    indexes: &[],
};

// cache_id is set only on the primary waypoint of a cache; satellite
// waypoints (parking, trailhead, ...) share the gc_code but keep it NULL.
pub static WAYPOINTS: TableSchema = TableSchema {
    name: "waypoints",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::required("lat", ColumnType::Real),
        Column::required("lon", ColumnType::Real),
        Column::new("time", ColumnType::Text),
        Column::new("name", ColumnType::Text),
        Column::new("cmt", ColumnType::Text),
        Column::new("descr", ColumnType::Text),
        Column::new("url", ColumnType::Text),
        Column::new("urlname", ColumnType::Text),
        Column::new("sym_id", ColumnType::Integer),
        Column::new("type_id", ColumnType::Integer),
        Column::new("gc_code", ColumnType::Text),
        Column::new("cache_id", ColumnType::Integer),
    ],
    foreign_keys: &[
        ForeignKey::new("sym_id", "waypoint_syms"),
        ForeignKey::new("type_id", "waypoint_types"),
        ForeignKey::new("cache_id", "caches"),
    ],
    indexes: &[Index::on(&["gc_code"])],
};

pub static LOGS: TableSchema = TableSchema {
    name: "logs",
    columns: &[
        Column::required("id", ColumnType::Integer),
        Column::new("cache_id", ColumnType::Integer),
        Column::new("date", ColumnType::Text),
        Column::new("type_id", ColumnType::Integer),
        Column::new("finder_id", ColumnType::Integer),
        Column::new("text", ColumnType::Text),
        Column::new("text_encoded", ColumnType::Boolean),
        Column::new("lat", ColumnType::Real),
        Column::new("lon", ColumnType::Real),
    ],
    foreign_keys: &[
        ForeignKey::new("cache_id", "caches"),
        ForeignKey::new("type_id", "log_types"),
        ForeignKey::new("finder_id", "cachers"),
    ],
    indexes: &[],
};

// =============================================================================
// Junction Tables
// =============================================================================

pub static CACHE_TO_ATTRIBUTE: TableSchema = TableSchema {
    name: "cache_to_attribute",
    columns: &[
        Column::required("cache_id", ColumnType::Integer),
        Column::required("attribute_id", ColumnType::Integer),
    ],
    foreign_keys: &[
        ForeignKey::new("cache_id", "caches"),
        ForeignKey::new("attribute_id", "attributes"),
    ],
    indexes: &[],
};

/// All table schemas in dependency order
pub static ALL_TABLES: &[&TableSchema] = &[
    // Wave 1: No dependencies
    &CACHE_TYPES,
    &CACHE_CONTAINERS,
    &CACHE_COUNTRIES,
    &CACHE_STATES,
    &LOG_TYPES,
    &WAYPOINT_SYMS,
    &WAYPOINT_TYPES,
    &CACHERS,
    &ATTRIBUTES,
    // Wave 2: Level 1 deps
    &CACHES,
    // Wave 3: Level 2 deps
    &WAYPOINTS,
    &LOGS,
    // Junction tables
    &CACHE_TO_ATTRIBUTE,
];

/// Get table schema by name
pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().find(|t| t.name == name).copied()
}

/// Get all table names
pub fn table_names() -> Vec<&'static str> {
    ALL_TABLES.iter().map(|t| t.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_table() {
        assert_eq!(get_table("caches").map(|t| t.name), Some("caches"));
        assert!(get_table("no_such_table").is_none());
    }

    #[test]
    fn test_tables_listed_after_their_dependencies() {
        let names = table_names();
        for table in ALL_TABLES {
            let pos = names.iter().position(|n| *n == table.name).unwrap();
            for fk in table.foreign_keys {
                let dep = names.iter().position(|n| *n == fk.references_table).unwrap();
                assert!(
                    dep < pos,
                    "{} must come after {}",
                    table.name,
                    fk.references_table
                );
            }
        }
    }
}
