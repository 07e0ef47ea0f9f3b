pub mod codec;
pub mod config;
pub mod dialect;
pub mod error;
pub mod graph;
pub mod model;
pub mod query;
pub mod schema;
pub mod store;
mod trace;
pub mod value;

// Re-export key types and traits
pub use codec::{Codecs, ScalarCodec, ScalarType};
pub use config::{CURSOR_PREFIX, DEFAULT_MAX_LIMIT, GraphConfig, KEY_PREFIX, SEPARATOR};
pub use dialect::Dialect;
pub use error::{GraphError, Result};
pub use graph::{FindResult, Graph, ListResult};
pub use model::{
    Cardinality, Entity, EntityId, Field, FieldStore, LinkDescriptor, Model, ModelOptions,
    ScalarDescriptor,
};
pub use query::{
    Connection, Direction, Edge, FilterClause, ListParams, Operator, OrderClause, PageInfo,
    RowSet, Selection, SqlQuery,
};
pub use schema::{
    ColumnKind, ColumnMeta, DefaultNamingStrategy, ForeignKey, IndexMeta, NamingStrategy,
    StoreSchema, TableMeta,
};
pub use store::Store;
pub use value::Value;
