//! SQLite schema introspection into [`StoreSchema`].

use std::collections::BTreeMap;

use rusqlite::Connection;
use tablegraph_core::schema::{ColumnKind, ColumnMeta, ForeignKey, IndexMeta, StoreSchema, TableMeta};
use tablegraph_core::{GraphError, Result};

/// SQL queries for SQLite introspection
pub mod queries {
    /// User tables; `sqlite_` system tables are skipped.
    pub const TABLES_QUERY: &str = r#"
        SELECT name
        FROM sqlite_master
        WHERE type = 'table'
          AND name NOT LIKE 'sqlite\_%' ESCAPE '\'
        ORDER BY name
    "#;

    /// Columns of one table: name, declared type, not-null flag, default,
    /// primary-key position.
    pub const COLUMNS_QUERY: &str = r#"
        SELECT name, type, "notnull", dflt_value, pk
        FROM pragma_table_info(?)
        ORDER BY cid
    "#;

    /// Foreign key parts of one table.
    pub const FOREIGN_KEYS_QUERY: &str = r#"
        SELECT id, seq, "table", "from", "to"
        FROM pragma_foreign_key_list(?)
        ORDER BY id, seq
    "#;

    /// Indexes of one table, excluding the implicit primary-key index.
    pub const INDEXES_QUERY: &str = r#"
        SELECT name, "unique"
        FROM pragma_index_list(?)
        WHERE origin IN ('c', 'u')
        ORDER BY name
    "#;

    /// Key columns of one index.
    pub const INDEX_COLUMNS_QUERY: &str = r#"
        SELECT name
        FROM pragma_index_info(?)
        ORDER BY seqno
    "#;
}

/// Raw foreign key info from pragma_foreign_key_list
#[derive(Debug, Clone)]
struct RawForeignKey {
    id: i64,
    to_table: String,
    from_column: String,
    to_column: Option<String>,
}

/// Reads every user table of `conn`.
pub fn introspect(conn: &Connection) -> Result<StoreSchema> {
    let mut stmt = conn.prepare(queries::TABLES_QUERY)?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut schema = StoreSchema::new();
    for name in names {
        schema = schema.table(table(conn, &name)?);
    }
    Ok(schema)
}

fn table(conn: &Connection, name: &str) -> Result<TableMeta> {
    let mut table = TableMeta::new(name);

    let mut stmt = conn.prepare(queries::COLUMNS_QUERY)?;
    let mut rows = stmt.query([name])?;
    while let Some(row) = rows.next()? {
        let column: String = row.get(0)?;
        let column_type: String = row.get(1)?;
        let kind = column_kind(&column_type).ok_or_else(|| GraphError::UnsupportedColumnType {
            table: name.to_string(),
            column: column.clone(),
            column_type: column_type.clone(),
        })?;

        let mut meta = ColumnMeta::new(column, kind);
        meta.nullable = !row.get::<_, bool>(2)?;
        meta.default_value = row.get(3)?;
        if row.get::<_, i64>(4)? > 0 {
            meta = meta.primary();
        }
        table = table.column(meta);
    }

    let mut stmt = conn.prepare(queries::FOREIGN_KEYS_QUERY)?;
    let raw = stmt
        .query_map([name], |row| {
            Ok(RawForeignKey {
                id: row.get(0)?,
                to_table: row.get(2)?,
                from_column: row.get(3)?,
                to_column: row.get(4)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    table.foreign_keys = foreign_keys(conn, name, raw)?;

    let mut stmt = conn.prepare(queries::INDEXES_QUERY)?;
    let indexes = stmt
        .query_map([name], |row| Ok((row.get::<_, String>(0)?, row.get::<_, bool>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    for (index, unique) in indexes {
        let mut stmt = conn.prepare(queries::INDEX_COLUMNS_QUERY)?;
        let columns = stmt
            .query_map([&index], |row| row.get::<_, Option<String>>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        // Expression indexes have unnamed parts and never match a key.
        let Some(columns) = columns.into_iter().collect::<Option<Vec<_>>>() else {
            continue;
        };
        table.indexes.push(IndexMeta {
            name: index,
            unique,
            columns,
        });
    }

    Ok(table)
}

/// Groups key parts by id. A key without target columns references the
/// primary key of the target table.
fn foreign_keys(conn: &Connection, table: &str, raw: Vec<RawForeignKey>) -> Result<Vec<ForeignKey>> {
    let mut grouped: BTreeMap<i64, Vec<RawForeignKey>> = BTreeMap::new();
    for part in raw {
        grouped.entry(part.id).or_default().push(part);
    }

    let mut keys = Vec::with_capacity(grouped.len());
    for parts in grouped.into_values() {
        let Some(first) = parts.first() else {
            continue;
        };
        let foreign_table = first.to_table.clone();
        let columns: Vec<String> = parts.iter().map(|part| part.from_column.clone()).collect();
        let foreign_columns = match parts
            .iter()
            .map(|part| part.to_column.clone())
            .collect::<Option<Vec<_>>>()
        {
            Some(columns) => columns,
            None => primary_key(conn, &foreign_table)?,
        };
        keys.push(ForeignKey::new(table, columns, foreign_table, foreign_columns));
    }
    Ok(keys)
}

fn primary_key(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        r#"SELECT name FROM pragma_table_info(?) WHERE pk > 0 ORDER BY pk"#,
    )?;
    let columns = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

/// Maps a declared SQLite column type to its kind. Length arguments such as
/// `varchar(40)` are ignored.
pub fn column_kind(declared: &str) -> Option<ColumnKind> {
    let base = declared
        .split('(')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    Some(match base.as_str() {
        "bit" | "boolean" => ColumnKind::Boolean,
        "integer" | "int" | "bigint" => ColumnKind::Integer,
        "real" | "numeric" | "float" | "double" | "decimal" => ColumnKind::Numeric,
        "text" | "varchar" | "char" | "nvarchar" => ColumnKind::String,
        "blob" => ColumnKind::Binary,
        "date" | "datetime" => ColumnKind::Date,
        "json" => ColumnKind::Json,
        _ => return None,
    })
}
