use indexmap::IndexMap;

use super::{ForeignKey, StoreSchema, TableMeta};

/// A table plus the facts relationship inference needs about it.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    pub meta: TableMeta,
    /// Every column is a primary-key column and a foreign-key column.
    pub is_pivot: bool,
    /// Foreign keys of other tables that target this table, reversed so that
    /// `table` is this table.
    pub reverse_foreign_keys: Vec<ForeignKey>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedSchema {
    pub tables: IndexMap<String, NormalizedTable>,
}

impl NormalizedSchema {
    pub fn get(&self, table: &str) -> Option<&NormalizedTable> {
        self.tables.get(table)
    }
}

pub fn normalize(schema: StoreSchema) -> NormalizedSchema {
    let reverse: Vec<Vec<ForeignKey>> = schema
        .tables
        .keys()
        .map(|name| {
            schema
                .tables
                .values()
                .filter(|other| &other.name != name)
                .flat_map(|other| other.foreign_keys.iter())
                .filter(|key| &key.foreign_table == name)
                .map(ForeignKey::reversed)
                .collect()
        })
        .collect();

    let tables = schema
        .tables
        .into_iter()
        .zip(reverse)
        .map(|((name, meta), reverse_foreign_keys)| {
            let is_pivot = is_pivot_table(&meta);
            (
                name,
                NormalizedTable {
                    meta,
                    is_pivot,
                    reverse_foreign_keys,
                },
            )
        })
        .collect();

    NormalizedSchema { tables }
}

fn is_pivot_table(table: &TableMeta) -> bool {
    if table.columns.is_empty() || table.foreign_keys.is_empty() {
        return false;
    }

    let all_primary = table.columns.values().all(|column| column.primary_key);
    let all_referencing = table.columns.keys().all(|name| {
        table
            .foreign_keys
            .iter()
            .any(|key| key.columns.iter().any(|column| column == name))
    });
    let references_known = table
        .foreign_keys
        .iter()
        .flat_map(|key| key.columns.iter())
        .all(|column| table.columns.contains_key(column));

    all_primary && all_referencing && references_known
}
