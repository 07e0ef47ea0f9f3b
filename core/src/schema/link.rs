use crate::error::{GraphError, Result};

use super::{ForeignKey, NormalizedSchema, TableMeta};

/// How many rows sit on each side of a link, read `from:to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl Cardinality {
    pub const fn from_sides(from_one: bool, to_one: bool) -> Self {
        match (from_one, to_one) {
            (true, true) => Cardinality::OneToOne,
            (true, false) => Cardinality::OneToMany,
            (false, true) => Cardinality::ManyToOne,
            (false, false) => Cardinality::ManyToMany,
        }
    }

    pub const fn from_one(self) -> bool {
        matches!(self, Cardinality::OneToOne | Cardinality::OneToMany)
    }

    pub const fn to_one(self) -> bool {
        matches!(self, Cardinality::OneToOne | Cardinality::ManyToOne)
    }

    pub const fn is_to_many(self) -> bool {
        !self.to_one()
    }

    /// Cardinality of walking `self` and then `next`; a "many" on either hop
    /// wins.
    pub const fn then(self, next: Cardinality) -> Cardinality {
        Cardinality::from_sides(
            self.from_one() && next.from_one(),
            self.to_one() && next.to_one(),
        )
    }
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Cardinality::OneToOne => "1:1",
            Cardinality::OneToMany => "1:n",
            Cardinality::ManyToOne => "n:1",
            Cardinality::ManyToMany => "n:n",
        })
    }
}

/// A relationship found in store metadata, before naming.
#[derive(Debug, Clone, PartialEq)]
pub struct InferredLink {
    /// Table holding the rows the link resolves to.
    pub target: String,
    pub cardinality: Cardinality,
    /// Key from the source table. For pivot links this is the reversed key
    /// into the pivot table.
    pub key: ForeignKey,
    /// Second hop from the pivot table to `target`.
    pub pivot: Option<Box<InferredLink>>,
    /// The source table holds the foreign key.
    pub owner: bool,
}

impl InferredLink {
    /// Table reached by the first hop.
    pub fn joined_table(&self) -> &str {
        &self.key.foreign_table
    }
}

/// Infers the outgoing links of `table`.
///
/// Direct foreign keys become owning links. Reverse keys become non-owning
/// links, except that a reverse key into a pivot table yields one link per
/// outgoing link of the pivot, with the key that found the pivot excluded.
pub fn table_links(
    schema: &NormalizedSchema,
    table: &str,
    ignore: &[ForeignKey],
) -> Result<Vec<InferredLink>> {
    links(schema, table, ignore, true)
}

fn links(
    schema: &NormalizedSchema,
    table: &str,
    ignore: &[ForeignKey],
    expand_pivots: bool,
) -> Result<Vec<InferredLink>> {
    let source = schema
        .get(table)
        .ok_or_else(|| GraphError::UnknownTable(table.to_string()))?;
    let ignored = |key: &ForeignKey| ignore.iter().any(|other| other.same_key(key));

    let mut found = Vec::new();

    for key in source.meta.foreign_keys.iter().filter(|key| !ignored(key)) {
        let target = lookup(schema, &key.foreign_table)?;
        found.push(InferredLink {
            target: key.foreign_table.clone(),
            cardinality: key_cardinality(&source.meta, &target.meta, key),
            key: key.clone(),
            pivot: None,
            owner: true,
        });
    }

    for key in source.reverse_foreign_keys.iter().filter(|key| !ignored(key)) {
        let target = lookup(schema, &key.foreign_table)?;
        let first_hop = key_cardinality(&source.meta, &target.meta, key);

        let pivot_links = if expand_pivots && target.is_pivot {
            links(schema, &target.meta.name, &[key.reversed()], false)?
        } else {
            Vec::new()
        };

        if pivot_links.is_empty() {
            found.push(InferredLink {
                target: key.foreign_table.clone(),
                cardinality: first_hop,
                key: key.clone(),
                pivot: None,
                owner: false,
            });
            continue;
        }

        for pivot in pivot_links {
            found.push(InferredLink {
                target: pivot.target.clone(),
                cardinality: first_hop.then(pivot.cardinality),
                key: key.clone(),
                pivot: Some(Box::new(pivot)),
                owner: false,
            });
        }
    }

    Ok(found)
}

fn lookup<'a>(schema: &'a NormalizedSchema, table: &str) -> Result<&'a super::NormalizedTable> {
    schema
        .get(table)
        .ok_or_else(|| GraphError::UnknownTable(table.to_string()))
}

fn key_cardinality(source: &TableMeta, target: &TableMeta, key: &ForeignKey) -> Cardinality {
    Cardinality::from_sides(
        source.is_primary_or_unique(&key.columns),
        target.is_primary_or_unique(&key.foreign_columns),
    )
}
