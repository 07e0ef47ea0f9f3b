//! The store collaborator executing compiled statements.

use std::future::Future;

use crate::dialect::Dialect;
use crate::error::Result;
use crate::query::{RowSet, SqlQuery};

/// Executes one rendered statement and returns its rows with their column
/// names. Store failures are returned unchanged; the engine never retries.
pub trait Store {
    /// Dialect the statements are rendered in.
    fn dialect(&self) -> Dialect;

    fn fetch(&self, query: &SqlQuery) -> impl Future<Output = Result<RowSet>> + Send;
}

impl<S: Store> Store for &S {
    fn dialect(&self) -> Dialect {
        (**self).dialect()
    }

    fn fetch(&self, query: &SqlQuery) -> impl Future<Output = Result<RowSet>> + Send {
        (**self).fetch(query)
    }
}
