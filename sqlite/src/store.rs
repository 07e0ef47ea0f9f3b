//! rusqlite-backed [`Store`].

use std::future::{Future, ready};

use rusqlite::{Connection, params_from_iter};
use tablegraph_core::query::{RowSet, SqlQuery};
use tablegraph_core::{Dialect, Result, Store, Value};

/// Runs compiled statements on a rusqlite connection.
///
/// rusqlite is synchronous: `fetch` completes the statement before returning
/// a ready future, so no connection borrow outlives the call.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub const fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Gets a reference to the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn into_inner(self) -> Connection {
        self.conn
    }

    /// Runs `query` and collects every row.
    pub fn query(&self, query: &SqlQuery) -> Result<RowSet> {
        let mut stmt = self.conn.prepare(&query.sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut set = RowSet::new(columns);
        let mut rows = stmt.query(params_from_iter(query.params.iter()))?;
        while let Some(row) = rows.next()? {
            let values = (0..width)
                .map(|index| row.get::<_, Value>(index))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            set.push(values);
        }
        Ok(set)
    }
}

impl From<Connection> for SqliteStore {
    fn from(conn: Connection) -> Self {
        Self::new(conn)
    }
}

impl Store for SqliteStore {
    fn dialect(&self) -> Dialect {
        Dialect::SQLite
    }

    fn fetch(&self, query: &SqlQuery) -> impl Future<Output = Result<RowSet>> + Send {
        ready(self.query(query))
    }
}
