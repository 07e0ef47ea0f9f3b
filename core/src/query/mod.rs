//! Graph queries over the relationship model.
//!
//! The pipeline: a [`Selection`] tree is compiled by the [`Compiler`] into a
//! [`SelectQuery`]; list requests are windowed by a [`PagePlan`] and
//! [`plan_list`] routes filters and order around the joins; the store returns
//! a flat [`RowSet`] which [`reshape`] folds back into nested nodes.

mod compile;
pub mod cursor;
mod pagination;
mod params;
mod plan;
mod reshape;
mod selection;
mod sql;

pub use compile::{AliasAllocator, Compiler, ResolvedColumn, compile};
pub use pagination::{Connection, Edge, PageInfo, PagePlan};
pub use params::{Direction, FilterClause, ListParams, Operator, OrderClause, is_root_path};
pub use plan::{ListPlan, plan_find, plan_list};
pub use reshape::{Record, Reshape, RowSet, reshape};
pub use selection::{Selection, fields};
pub use sql::{
    BoundedRoot, ColumnRef, Comparison, Condition, Join, JoinType, OrderTerm, Projection,
    ROOT_CTE, SelectQuery, SqlQuery,
};
