//! Keyset pagination planning.
//!
//! A backward window (`last` without a smaller `first`) is planned as a
//! forward window over the reversed order; [`PagePlan::finish`] restores the
//! requested order.

use serde::Serialize;
use serde_json::{Map, Value as Json};

use crate::config::{GraphConfig, KEY_PREFIX, SEPARATOR};
use crate::error::Result;
use crate::model::Entity;
use crate::value::Value;

use super::cursor;
use super::params::{Direction, FilterClause, ListParams, OrderClause, is_root_path};
use super::reshape::Record;
use super::sql::{ColumnRef, Comparison, Condition};

#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    /// Rows kept, in the planning direction.
    pub first: u64,
    /// Rows kept from the end of the first `first` rows.
    pub last: Option<u64>,
    /// Lower bound in the planning direction.
    pub after: Option<Vec<Value>>,
    /// Upper bound in the planning direction.
    pub before: Option<Vec<Value>>,
    /// The window was requested backwards.
    pub reversed: bool,
    /// Root order fields followed by the primary-key fields they do not
    /// already name. Keyset bounds and cursors are built from these.
    pub cursor_order: Vec<OrderClause>,
    /// `cursor_order` followed by cross-relationship order fields.
    pub order: Vec<OrderClause>,
    pub filter: Vec<FilterClause>,
}

impl PagePlan {
    pub fn new(entity: &Entity, params: &ListParams, config: &GraphConfig) -> Result<PagePlan> {
        let key = entity.primary_key().map(|(field, _)| {
            OrderClause::new(
                format!("{KEY_PREFIX}{SEPARATOR}{}", field.name),
                Direction::Asc,
            )
        });

        let (root, cross): (Vec<_>, Vec<_>) = params
            .order
            .iter()
            .cloned()
            .partition(|clause| is_root_path(&clause.field));
        let mut cursor_order = root;
        for clause in key {
            if !cursor_order.iter().any(|root| root.field == clause.field) {
                cursor_order.push(clause);
            }
        }
        let order: Vec<OrderClause> = cursor_order.iter().cloned().chain(cross).collect();

        let arity = cursor_order.len();
        let after = params
            .after
            .as_deref()
            .map(|value| cursor::decode("after", value, arity))
            .transpose()?;
        let before = params
            .before
            .as_deref()
            .map(|value| cursor::decode("before", value, arity))
            .transpose()?;

        let cap = |limit: u64| limit.min(config.max_limit);
        let backward = match (params.first, params.last) {
            (_, None) => false,
            (Some(first), Some(last)) => last >= first,
            (None, Some(_)) => true,
        };

        let plan = if backward {
            PagePlan {
                first: cap(params.last.unwrap_or_default()),
                last: params.first.map(cap),
                after: before,
                before: after,
                reversed: true,
                cursor_order: cursor_order.iter().map(OrderClause::reversed).collect(),
                order: order.iter().map(OrderClause::reversed).collect(),
                filter: params.filter.clone(),
            }
        } else {
            PagePlan {
                first: params.first.map_or_else(|| config.page_size(), cap),
                last: params.last.map(cap),
                after,
                before,
                reversed: false,
                cursor_order,
                order,
                filter: params.filter.clone(),
            }
        };

        Ok(plan)
    }

    /// Rows to fetch: one more than the window to detect a following page.
    pub fn limit(&self) -> u64 {
        self.first + 1
    }

    /// Keyset bounds over `columns`, which line up with `cursor_order`. Each
    /// column carries whether it may hold NULL.
    pub fn keyset(&self, columns: &[(ColumnRef, bool)]) -> Vec<Condition> {
        let mut conditions = Vec::new();
        if let Some(after) = &self.after {
            conditions.push(bound(&self.cursor_order, columns, after, true));
        }
        if let Some(before) = &self.before {
            conditions.push(bound(&self.cursor_order, columns, before, false));
        }
        conditions
    }

    /// Trims the fetched records to the window and builds the connection.
    pub fn finish(&self, records: Vec<Record>) -> Connection {
        let fetched = records.len() as u64;
        let mut records = records;
        records.truncate(usize::try_from(self.first).unwrap_or(usize::MAX));

        let mut trimmed = false;
        if let Some(last) = self.last.and_then(|last| usize::try_from(last).ok()) {
            if records.len() > last {
                records.drain(..records.len() - last);
                trimmed = true;
            }
        }

        let ahead = fetched > self.first || self.before.is_some();
        let behind = self.after.is_some() || trimmed;

        if self.reversed {
            records.reverse();
        }
        let (has_next_page, has_previous_page) = if self.reversed {
            (behind, ahead)
        } else {
            (ahead, behind)
        };

        let edges: Vec<Edge> = records
            .into_iter()
            .map(|record| Edge {
                cursor: cursor::encode(&record.cursor),
                node: record.node,
            })
            .collect();

        Connection {
            page_info: PageInfo {
                has_next_page,
                has_previous_page,
                start_cursor: edges.first().map(|edge| edge.cursor.clone()),
                end_cursor: edges.last().map(|edge| edge.cursor.clone()),
            },
            edges,
        }
    }
}

/// `(k1 ⋗ v1) OR (k1 = v1 AND k2 ⋗ v2) OR ...`, with `⋗` flipped for
/// descending fields and for upper bounds.
///
/// NULL sorts below every value, so `k > NULL` is `k IS NOT NULL` and
/// `k < v` also admits NULL for nullable columns.
fn bound(
    order: &[OrderClause],
    columns: &[(ColumnRef, bool)],
    values: &[Value],
    lower: bool,
) -> Condition {
    let mut groups: Vec<Vec<Condition>> = Vec::new();
    for (index, clause) in order.iter().enumerate() {
        let greater = (clause.direction == Direction::Asc) == lower;
        let (column, nullable) = &columns[index];
        for arm in beyond(column, *nullable, &values[index], greater) {
            let mut group: Vec<Condition> = (0..index)
                .map(|prior| Condition::Compare {
                    column: columns[prior].0.clone(),
                    op: Comparison::Eq,
                    value: values[prior].clone(),
                })
                .collect();
            group.push(arm);
            groups.push(group);
        }
    }

    if let [group] = groups.as_slice() {
        if let [condition] = group.as_slice() {
            return condition.clone();
        }
    }
    Condition::Any(groups)
}

/// Conditions, any of which places `column` strictly past `value`.
fn beyond(column: &ColumnRef, nullable: bool, value: &Value, greater: bool) -> Vec<Condition> {
    let compare = |op: Comparison, value: Value| Condition::Compare {
        column: column.clone(),
        op,
        value,
    };

    match (value.is_null(), greater) {
        (true, true) => vec![compare(Comparison::Ne, Value::Null)],
        (true, false) => Vec::new(),
        (false, true) => vec![compare(Comparison::Gt, value.clone())],
        (false, false) if nullable => vec![
            compare(Comparison::Lt, value.clone()),
            compare(Comparison::Eq, Value::Null),
        ],
        (false, false) => vec![compare(Comparison::Lt, value.clone())],
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub edges: Vec<Edge>,
    pub page_info: PageInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub node: Map<String, Json>,
    pub cursor: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}
