//! # tablegraph
//!
//! Nested graph queries with keyset pagination over a relational store.
//!
//! The store's tables, foreign keys and indexes are read once into a
//! relationship [`Model`]: every table becomes an entity, every column a
//! scalar field and every foreign key (direct, reverse or through a pivot
//! table) a link. Requests select nested fields over those links and are
//! answered with a single joined statement.
//!
//! ## Quick Start
//!
//! ```rust
//! use tablegraph::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> tablegraph::Result<()> {
//! let conn = rusqlite::Connection::open_in_memory()?;
//! conn.execute_batch(
//!     "CREATE TABLE Categories (CategoryID INTEGER PRIMARY KEY, CategoryName TEXT);
//!      INSERT INTO Categories VALUES (1, 'Beverages'), (2, 'Condiments');",
//! )?;
//!
//! let model = Model::build(introspect(&conn)?, ModelOptions::default())?;
//! let graph = Graph::new(model, SqliteStore::new(conn));
//!
//! let page = graph
//!     .list("Category", &fields(["categoryName"]), &ListParams::new().first(1))
//!     .await?;
//! assert_eq!(page.output.edges.len(), 1);
//! assert!(page.output.page_info.has_next_page);
//! # Ok(())
//! # }
//! ```
//!
//! ## Store Support
//!
//! | Database | Driver   | Feature Flag |
//! |----------|----------|--------------|
//! | SQLite   | rusqlite | `rusqlite`   |
//!
//! Other stores implement [`Store`]; [`Dialect::PostgreSQL`] renders `$n`
//! placeholders.

pub use tablegraph_core::*;

#[cfg(feature = "rusqlite")]
pub use tablegraph_sqlite as sqlite;

/// Common imports for building a model and running queries.
pub mod prelude {
    pub use tablegraph_core::query::{Selection, fields};
    pub use tablegraph_core::{
        Direction, FindResult, Graph, GraphConfig, GraphError, ListParams, ListResult, Model,
        ModelOptions, Operator, Store,
    };

    #[cfg(feature = "rusqlite")]
    pub use tablegraph_sqlite::{SqliteStore, introspect};
}
