//! Request planning: compiles a find or list request into one statement.

use serde_json::Value as Json;

use crate::config::{CURSOR_PREFIX, GraphConfig, SEPARATOR};
use crate::error::{GraphError, Result};
use crate::model::{Entity, Model};

use super::compile::{Compiler, ResolvedColumn};
use super::pagination::PagePlan;
use super::params::{FilterClause, ListParams, Operator, OrderClause, is_root_path};
use super::selection::Selection;
use super::sql::{BoundedRoot, ColumnRef, Comparison, Condition, OrderTerm, SelectQuery};

/// A compiled list request and the window it was planned for.
#[derive(Debug, Clone)]
pub struct ListPlan {
    pub query: SelectQuery,
    pub page: PagePlan,
}

/// Compiles a lookup of `entity` by primary key. Only the primary-key members
/// of `key` are read.
pub fn plan_find(
    model: &Model,
    entity: &Entity,
    key: &Json,
    selection: &[Selection],
) -> Result<SelectQuery> {
    let Json::Object(key) = key else {
        return Err(GraphError::InvalidValue {
            field: entity.name.clone(),
            reason: format!("expected a key object, received {key}"),
        });
    };

    let mut compiler = Compiler::new(model, entity);
    compiler.select(selection)?;

    let root = compiler.root_alias().to_string();
    let mut conditions = Vec::new();
    for (field, scalar) in entity.primary_key() {
        let value = key.get(&field.name).ok_or_else(|| GraphError::MissingKey {
            entity: entity.name.clone(),
            field: field.name.clone(),
        })?;
        conditions.push(Condition::Compare {
            column: ColumnRef::new(&root, &scalar.column),
            op: Comparison::Eq,
            value: scalar.encode(&field.name, value)?,
        });
    }

    let mut query = compiler.finish();
    query.conditions = conditions;
    Ok(query)
}

/// Compiles a connection request on `entity`.
///
/// Root filters, the keyset bound, root order and the limit go into the
/// bounded root expression whenever the selection, a filter or an order
/// field needs a join; otherwise they apply to the statement itself.
pub fn plan_list(
    model: &Model,
    entity: &Entity,
    selection: &[Selection],
    params: &ListParams,
    config: &GraphConfig,
) -> Result<ListPlan> {
    let page = PagePlan::new(entity, params, config)?;

    let mut compiler = Compiler::new(model, entity);
    compiler.select(selection)?;

    let mut root_conditions = Vec::new();
    let mut cross_conditions = Vec::new();
    for clause in &page.filter {
        let resolved = compiler.resolve(&clause.field)?;
        let condition = filter_condition(&resolved, clause)?;
        if is_root_path(&clause.field) {
            root_conditions.push(condition);
        } else {
            cross_conditions.push(condition);
        }
    }

    let mut keyset_columns = Vec::with_capacity(page.cursor_order.len());
    let mut root_order = Vec::with_capacity(page.cursor_order.len());
    for (index, clause) in page.cursor_order.iter().enumerate() {
        let resolved = compiler.resolve(&clause.field)?;
        compiler.query_mut().project(
            resolved.column.clone(),
            format!("{CURSOR_PREFIX}{SEPARATOR}{index}"),
        );
        root_order.push(order_term(&resolved, clause));
        keyset_columns.push((resolved.column, resolved.field.nullable));
    }

    let mut cross_order = Vec::new();
    for clause in &page.order[page.cursor_order.len()..] {
        let resolved = compiler.resolve(&clause.field)?;
        cross_order.push(order_term(&resolved, clause));
    }

    root_conditions.extend(page.keyset(&keyset_columns));

    let bounded = compiler.has_joins();
    let mut query = compiler.finish();
    if bounded {
        query.bounded = Some(BoundedRoot {
            conditions: root_conditions,
            order: root_order.clone(),
            limit: Some(page.limit()),
        });
        query.conditions = cross_conditions;
    } else {
        query.conditions = root_conditions;
        query.limit = Some(page.limit());
    }
    query.order = root_order.into_iter().chain(cross_order).collect();

    Ok(ListPlan { query, page })
}

fn order_term(resolved: &ResolvedColumn<'_>, clause: &OrderClause) -> OrderTerm {
    OrderTerm {
        column: resolved.column.clone(),
        direction: clause.direction,
    }
}

fn filter_condition(resolved: &ResolvedColumn<'_>, clause: &FilterClause) -> Result<Condition> {
    let encode = |value: &Json| resolved.scalar.encode(&clause.field, value);
    let op = match clause.operator {
        Operator::Lt => Comparison::Lt,
        Operator::Lte => Comparison::Lte,
        Operator::Eq => Comparison::Eq,
        Operator::Gte => Comparison::Gte,
        Operator::Gt => Comparison::Gt,
        Operator::Ne => Comparison::Ne,
        Operator::In => {
            let Json::Array(items) = &clause.value else {
                return Err(GraphError::InvalidValue {
                    field: clause.field.clone(),
                    reason: "IN expects an array".into(),
                });
            };
            return Ok(Condition::In {
                column: resolved.column.clone(),
                values: items.iter().map(encode).collect::<Result<_>>()?,
            });
        }
    };

    Ok(Condition::Compare {
        column: resolved.column.clone(),
        op,
        value: encode(&clause.value)?,
    })
}
