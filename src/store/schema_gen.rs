use crate::schema::{ColumnType, TableSchema};

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (\n", schema.name);
    let mut columns = Vec::new();

    for col in schema.columns {
        let sql_type = match col.col_type {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
            ColumnType::Boolean => "INTEGER",
        };

        let null_constraint = if !col.nullable { " NOT NULL" } else { "" };
        let pk = if col.name == "id" { " PRIMARY KEY" } else { "" };

        columns.push(format!(
            "    {} {}{}{}",
            col.name, sql_type, pk, null_constraint
        ));
    }

    // Imports write child rows before their parents (logs land before the
    // owning cache), so constraint checks must wait for the commit.
    for fk in schema.foreign_keys {
        columns.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {}({}) DEFERRABLE INITIALLY DEFERRED",
            fk.column, fk.references_table, fk.references_column
        ));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements: declared indexes plus one per FK column
pub fn generate_indexes(schema: &TableSchema) -> Vec<String> {
    let mut stmts = Vec::new();

    for index in schema.indexes {
        let unique = if index.unique { "UNIQUE " } else { "" };
        stmts.push(format!(
            "CREATE {}INDEX IF NOT EXISTS idx_{}_{} ON {}({})",
            unique,
            schema.name,
            index.columns.join("_"),
            schema.name,
            index.columns.join(", ")
        ));
    }

    for fk in schema.foreign_keys {
        stmts.push(format!(
            "CREATE INDEX IF NOT EXISTS idx_{}_{} ON {}({})",
            schema.name, fk.column, schema.name, fk.column
        ));
    }

    stmts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tables::{ATTRIBUTES, CACHES, WAYPOINTS};

    #[test]
    fn test_generate_create_table() {
        let sql = generate_create_table(&CACHES);
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS caches"));
        assert!(sql.contains("id INTEGER PRIMARY KEY"));
        assert!(sql.contains("difficulty REAL"));
        assert!(sql.contains(
            "FOREIGN KEY (owner_id) REFERENCES cachers(id) DEFERRABLE INITIALLY DEFERRED"
        ));
    }

    #[test]
    fn test_generate_unique_index() {
        let indexes = generate_indexes(&ATTRIBUTES);
        assert!(indexes
            .iter()
            .any(|i| i.contains("CREATE UNIQUE INDEX IF NOT EXISTS idx_attributes_gc_id_inc_name")));
    }

    #[test]
    fn test_generate_fk_indexes() {
        let indexes = generate_indexes(&WAYPOINTS);
        assert!(indexes.iter().any(|i| i.contains("idx_waypoints_gc_code")));
        assert!(indexes.iter().any(|i| i.contains("idx_waypoints_cache_id")));
    }
}
