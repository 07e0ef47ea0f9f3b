//! SQL dialect selection for rendered queries.

use std::borrow::Cow;

use serde::Deserialize;

/// SQL dialect for database-specific rendering
///
/// Each dialect has different placeholder syntax. Identifiers are
/// double-quoted in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// SQLite - uses `?` positional placeholders
    #[default]
    SQLite,

    /// PostgreSQL - uses `$1, $2, ...` numbered placeholders
    PostgreSQL,
}

impl Dialect {
    /// Returns `true` if this dialect uses numbered placeholders (`$1, $2, ...`)
    #[inline]
    #[must_use]
    pub const fn uses_numbered_placeholders(&self) -> bool {
        matches!(self, Dialect::PostgreSQL)
    }

    /// Renders a placeholder for this dialect with the given 1-based index.
    ///
    /// Returns `Cow::Borrowed("?")` for SQLite (zero allocation),
    /// `Cow::Owned` for PostgreSQL numbered placeholders.
    #[inline]
    pub fn render_placeholder(&self, index: usize) -> Cow<'static, str> {
        match self {
            Dialect::PostgreSQL => Cow::Owned(format!("${index}")),
            Dialect::SQLite => Cow::Borrowed("?"),
        }
    }
}

/// Writes `"identifier"` into the buffer, doubling embedded quotes.
pub fn write_identifier(name: &str, sql: &mut String) {
    sql.push('"');
    for ch in name.chars() {
        if ch == '"' {
            sql.push('"');
        }
        sql.push(ch);
    }
    sql.push('"');
}

/// Writes `"alias"."column"` into the buffer.
pub fn write_qualified_column(alias: &str, column: &str, sql: &mut String) {
    write_identifier(alias, sql);
    sql.push('.');
    write_identifier(column, sql);
}
