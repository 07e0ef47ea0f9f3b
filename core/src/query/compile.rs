//! Join planning: turns a nested selection into projections and joins.
//!
//! Output column names are dotted field paths. Every joined level also
//! projects its primary key under `<path>.__key.<field>` (and the root under
//! `__key.<field>`) so that rows can be regrouped afterwards.

use indexmap::IndexMap;

use crate::config::{KEY_PREFIX, SEPARATOR};
use crate::error::{GraphError, Result};
use crate::model::{Entity, Field, FieldStore, LinkDescriptor, Model, ScalarDescriptor};

use super::selection::Selection;
use super::sql::{ColumnRef, Join, JoinType, SelectQuery};

/// Hands out join aliases that are unique within one compiled query.
#[derive(Debug, Default)]
pub struct AliasAllocator {
    next: usize,
}

impl AliasAllocator {
    pub fn next(&mut self, prefix: &str) -> String {
        self.next += 1;
        format!("{prefix}_{}", self.next)
    }
}

/// A joined level of the query.
#[derive(Debug, Clone)]
struct Level<'m> {
    path: String,
    alias: String,
    entity: &'m Entity,
    outer: bool,
}

/// A field path resolved to a scalar column.
#[derive(Debug, Clone)]
pub struct ResolvedColumn<'m> {
    pub column: ColumnRef,
    pub field: &'m Field,
    pub scalar: &'m ScalarDescriptor,
}

pub struct Compiler<'m> {
    model: &'m Model,
    root: Level<'m>,
    aliases: AliasAllocator,
    levels: IndexMap<String, Level<'m>>,
    query: SelectQuery,
}

/// Compiles `selection` on `entity` into a query without filters, order or
/// limit.
pub fn compile(model: &Model, entity: &Entity, selection: &[Selection]) -> Result<SelectQuery> {
    let mut compiler = Compiler::new(model, entity);
    compiler.select(selection)?;
    Ok(compiler.finish())
}

impl<'m> Compiler<'m> {
    pub fn new(model: &'m Model, entity: &'m Entity) -> Self {
        let root = Level {
            path: String::new(),
            alias: entity.table.clone(),
            entity,
            outer: false,
        };
        Self {
            model,
            query: SelectQuery::new(&entity.table, &entity.table),
            root,
            aliases: AliasAllocator::default(),
            levels: IndexMap::new(),
        }
    }

    pub fn entity(&self) -> &'m Entity {
        self.root.entity
    }

    /// Alias of the root table.
    pub fn root_alias(&self) -> &str {
        &self.root.alias
    }

    /// Projects the root key and every selected field. An empty selection
    /// selects every scalar field of the entity.
    pub fn select(&mut self, selection: &[Selection]) -> Result<()> {
        let root = self.root.clone();
        self.project_key(&root);

        if selection.is_empty() {
            for (field, scalar) in root.entity.scalars() {
                self.query
                    .project(ColumnRef::new(&root.alias, &scalar.column), &field.name);
            }
            return Ok(());
        }

        for item in selection {
            self.select_field(&root, item)?;
        }
        Ok(())
    }

    /// Resolves a dotted field path to its column, adding the joins it
    /// crosses. A leading `__key` segment addresses a primary-key field of
    /// the root entity.
    pub fn resolve(&mut self, path: &str) -> Result<ResolvedColumn<'m>> {
        let unknown = |entity: &Entity| GraphError::UnknownField {
            entity: entity.name.clone(),
            field: path.to_string(),
        };

        let mut segments: Vec<&str> = path.split(SEPARATOR).collect();
        let mut level = self.root.clone();

        if segments.first() == Some(&KEY_PREFIX) {
            let [_, name] = segments.as_slice() else {
                return Err(unknown(level.entity));
            };
            let field = level.entity.field(name)?;
            if !field.primary_key {
                return Err(unknown(level.entity));
            }
            segments.remove(0);
        }

        let Some((last, links)) = segments.split_last() else {
            return Err(unknown(level.entity));
        };

        for name in links {
            let field = level.entity.field(name)?;
            level = self.join(&level, field)?;
        }

        let field = level.entity.field(last)?;
        let scalar = field.scalar()?;
        Ok(ResolvedColumn {
            column: ColumnRef::new(&level.alias, &scalar.column),
            field,
            scalar,
        })
    }

    pub fn query_mut(&mut self) -> &mut SelectQuery {
        &mut self.query
    }

    pub fn has_joins(&self) -> bool {
        !self.query.joins.is_empty()
    }

    pub fn finish(self) -> SelectQuery {
        self.query
    }

    fn select_field(&mut self, level: &Level<'m>, item: &Selection) -> Result<()> {
        let field = level.entity.field(&item.name)?;
        let path = child_path(&level.path, &field.name);

        let link = match &field.store {
            FieldStore::Scalar(scalar) => {
                if !item.is_leaf() {
                    return Err(GraphError::NotLinked(field.name.clone()));
                }
                self.query
                    .project(ColumnRef::new(&level.alias, &scalar.column), path);
                return Ok(());
            }
            FieldStore::Linked(link) => link,
        };

        if item.is_leaf() {
            return Err(GraphError::NotScalar(field.name.clone()));
        }

        if let Some(columns) = self.elided_columns(link, &item.children) {
            for (name, column) in columns {
                self.query.project(
                    ColumnRef::new(&level.alias, column),
                    child_path(&path, name),
                );
            }
            return Ok(());
        }

        let joined = self.join(level, field)?;
        self.project_key(&joined);
        for child in &item.children {
            self.select_field(&joined, child)?;
        }
        Ok(())
    }

    /// When every child is a target field matched by an owned foreign key,
    /// the local key columns already hold the requested values. Returns the
    /// local column for each child, or `None` when a join is needed.
    fn elided_columns<'s>(
        &self,
        link: &'m LinkDescriptor,
        children: &'s [Selection],
    ) -> Option<Vec<(&'s str, &'m str)>> {
        if !link.owner || link.pivot.is_some() || link.cardinality.is_to_many() {
            return None;
        }
        let target = &self.model[link.target];

        children
            .iter()
            .map(|child| {
                if !child.is_leaf() {
                    return None;
                }
                let scalar = target.fields.get(&child.name)?.scalar().ok()?;
                link.key_pairs()
                    .find(|(_, foreign)| *foreign == scalar.column)
                    .map(|(local, _)| (child.name.as_str(), local))
            })
            .collect()
    }

    /// Joins the target of the link `field` below `parent`, reusing an
    /// existing join for the same path.
    fn join(&mut self, parent: &Level<'m>, field: &'m Field) -> Result<Level<'m>> {
        let link = field.link()?;
        let path = child_path(&parent.path, &field.name);
        if let Some(level) = self.levels.get(&path) {
            return Ok(level.clone());
        }

        let model = self.model;
        let target = &model[link.target];
        // Only an owned, non-null key guarantees a row on the far side.
        let outer =
            parent.outer || field.nullable || !link.owner || link.cardinality.is_to_many();
        let join_type = if outer {
            JoinType::LeftOuter
        } else {
            JoinType::Inner
        };

        let mut left = parent.alias.clone();
        let mut hop = link;
        if let Some(pivot) = link.pivot.as_deref() {
            let table = &model[pivot.source].table;
            let alias = self.aliases.next(table);
            self.query.joins.push(Join {
                join_type,
                table: table.clone(),
                alias: alias.clone(),
                on: on(&left, link),
            });
            left = alias;
            hop = pivot;
        }

        self.query.joins.push(Join {
            join_type,
            table: target.table.clone(),
            alias: path.clone(),
            on: on(&left, hop),
        });

        let level = Level {
            path: path.clone(),
            alias: path.clone(),
            entity: target,
            outer,
        };
        self.levels.insert(path, level.clone());
        Ok(level)
    }

    fn project_key(&mut self, level: &Level<'m>) {
        for (field, scalar) in level.entity.primary_key() {
            let name = child_path(&child_path(&level.path, KEY_PREFIX), &field.name);
            self.query
                .project(ColumnRef::new(&level.alias, &scalar.column), name);
        }
    }
}

fn on(left: &str, link: &LinkDescriptor) -> Vec<(ColumnRef, String)> {
    link.key_pairs()
        .map(|(local, foreign)| (ColumnRef::new(left, local), foreign.to_string()))
        .collect()
}

fn child_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}{SEPARATOR}{name}")
    }
}
