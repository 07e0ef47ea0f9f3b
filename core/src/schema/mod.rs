//! Normalized store metadata consumed by relationship inference.
//!
//! A [`StoreSchema`] is the raw table/column/foreign-key/index description of
//! a store (read by a dialect crate's introspection, or written by hand).
//! [`normalize`] derives pivot flags and reverse foreign keys from it.

mod link;
mod naming;
mod normalize;

pub use link::{Cardinality, InferredLink, table_links};
pub use naming::{DefaultNamingStrategy, NamingStrategy};
pub use normalize::{NormalizedSchema, NormalizedTable, normalize};

use indexmap::IndexMap;

/// Storage class of a column as reported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    String,
    Integer,
    Numeric,
    Date,
    Boolean,
    Binary,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMeta {
    pub name: String,
    pub kind: ColumnKind,
    pub nullable: bool,
    pub primary_key: bool,
    pub default_value: Option<String>,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: true,
            primary_key: false,
            default_value: None,
        }
    }

    /// Marks the column as (part of) the primary key. Primary-key columns are
    /// never nullable.
    pub fn primary(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// A foreign key from `table.columns` to `foreign_table.foreign_columns`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: String,
    pub columns: Vec<String>,
    pub foreign_table: String,
    pub foreign_columns: Vec<String>,
}

impl ForeignKey {
    pub fn new<C, F>(
        table: impl Into<String>,
        columns: C,
        foreign_table: impl Into<String>,
        foreign_columns: F,
    ) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Self {
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            foreign_table: foreign_table.into(),
            foreign_columns: foreign_columns.into_iter().map(Into::into).collect(),
        }
    }

    /// The same key seen from the referenced table.
    pub fn reversed(&self) -> ForeignKey {
        ForeignKey {
            table: self.foreign_table.clone(),
            columns: self.foreign_columns.clone(),
            foreign_table: self.table.clone(),
            foreign_columns: self.columns.clone(),
        }
    }

    /// Key equality ignoring column order.
    pub fn same_key(&self, other: &ForeignKey) -> bool {
        self.table == other.table
            && self.foreign_table == other.foreign_table
            && same_columns(&self.columns, &other.columns)
            && same_columns(&self.foreign_columns, &other.foreign_columns)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMeta {
    pub name: String,
    pub unique: bool,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableMeta {
    pub name: String,
    pub columns: IndexMap<String, ColumnMeta>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<IndexMeta>,
}

impl TableMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: IndexMap::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn column(mut self, column: ColumnMeta) -> Self {
        self.columns.insert(column.name.clone(), column);
        self
    }

    /// Adds a foreign key from this table's `columns` to `foreign_table`.
    pub fn foreign_key<C, F>(mut self, columns: C, foreign_table: &str, foreign_columns: F) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        let key = ForeignKey::new(self.name.clone(), columns, foreign_table, foreign_columns);
        self.foreign_keys.push(key);
        self
    }

    pub fn unique_index<C>(mut self, name: &str, columns: C) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
    {
        self.indexes.push(IndexMeta {
            name: name.to_string(),
            unique: true,
            columns: columns.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Primary-key column names in declaration order.
    pub fn primary_key(&self) -> Vec<&str> {
        self.columns
            .values()
            .filter(|column| column.primary_key)
            .map(|column| column.name.as_str())
            .collect()
    }

    /// Whether `columns` is exactly the primary key or a unique index.
    pub fn is_primary_or_unique(&self, columns: &[String]) -> bool {
        let primary: Vec<String> = self.primary_key().into_iter().map(String::from).collect();
        if same_columns(&primary, columns) {
            return true;
        }
        self.indexes
            .iter()
            .any(|index| index.unique && same_columns(&index.columns, columns))
    }
}

/// Raw store metadata keyed by table name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSchema {
    pub tables: IndexMap<String, TableMeta>,
}

impl StoreSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, table: TableMeta) -> Self {
        self.tables.insert(table.name.clone(), table);
        self
    }
}

/// Set equality over column names (order-insensitive, multiplicity-aware).
pub(crate) fn same_columns(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut left: Vec<&str> = a.iter().map(String::as_str).collect();
    let mut right: Vec<&str> = b.iter().map(String::as_str).collect();
    left.sort_unstable();
    right.sort_unstable();
    left == right
}
