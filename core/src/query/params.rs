//! Pagination, filter and order parameters of a list request.
//!
//! ```json
//! {
//!   "first": 2,
//!   "after": "WzEwXQ==",
//!   "filter": [{ "field": "supplier.country", "operator": "EQ", "value": "UK" }],
//!   "order": [{ "field": "unitPrice", "direction": "DESC" }]
//! }
//! ```

use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value as Json;

use crate::config::{KEY_PREFIX, SEPARATOR};
use crate::error::GraphError;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ListParams {
    pub first: Option<u64>,
    pub last: Option<u64>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub filter: Vec<FilterClause>,
    pub order: Vec<OrderClause>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first(mut self, first: u64) -> Self {
        self.first = Some(first);
        self
    }

    pub fn last(mut self, last: u64) -> Self {
        self.last = Some(last);
        self
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    pub fn before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    pub fn filter(mut self, field: impl Into<String>, operator: Operator, value: Json) -> Self {
        self.filter.push(FilterClause {
            field: field.into(),
            operator,
            value,
        });
        self
    }

    pub fn order(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order.push(OrderClause {
            field: field.into(),
            direction,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterClause {
    pub field: String,
    pub operator: Operator,
    pub value: Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Operator {
    Lt,
    Lte,
    Eq,
    Gte,
    Gt,
    Ne,
    In,
}

impl FromStr for Operator {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "LT" => Operator::Lt,
            "LTE" => Operator::Lte,
            "EQ" => Operator::Eq,
            "GTE" => Operator::Gte,
            "GT" => Operator::Gt,
            "NE" => Operator::Ne,
            "IN" => Operator::In,
            other => return Err(GraphError::UnknownOperator(other.to_string())),
        })
    }
}

impl TryFrom<String> for Operator {
    type Error = GraphError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderClause {
    pub field: String,
    #[serde(default)]
    pub direction: Direction,
}

impl OrderClause {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn reversed(&self) -> Self {
        Self {
            field: self.field.clone(),
            direction: self.direction.reversed(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub const fn reversed(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }

    pub const fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Whether `path` names a column of the queried entity's own table: a single
/// segment, or a key-prefixed segment.
pub fn is_root_path(path: &str) -> bool {
    let mut segments = path.split(SEPARATOR);
    match (segments.next(), segments.next(), segments.next()) {
        (Some(KEY_PREFIX), Some(_), None) => true,
        (Some(_), None, _) => true,
        _ => false,
    }
}
