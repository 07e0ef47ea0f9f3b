//! The query engine: singular lookups and connection lists.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::{Map, Value as Json};

use crate::config::GraphConfig;
use crate::error::{GraphError, Result};
use crate::model::Model;
use crate::query::{
    Connection, ListParams, RowSet, Selection, SqlQuery, plan_find, plan_list, reshape,
};
use crate::store::Store;
use crate::{tablegraph_trace_query, tablegraph_trace_rows};

/// `{"output": node}` or `{"output": null}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FindResult {
    pub output: Option<Map<String, Json>>,
}

/// `{"output": {"edges": [...], "pageInfo": {...}}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListResult {
    pub output: Connection,
}

/// Answers graph queries on a [`Model`] with one statement per request.
#[derive(Debug)]
pub struct Graph<S> {
    model: Arc<Model>,
    store: S,
    config: GraphConfig,
}

impl<S: Store> Graph<S> {
    pub fn new(model: impl Into<Arc<Model>>, store: S) -> Self {
        Self::with_config(model, store, GraphConfig::default())
    }

    pub fn with_config(model: impl Into<Arc<Model>>, store: S, config: GraphConfig) -> Self {
        Self {
            model: model.into(),
            store,
            config,
        }
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Looks up one `entity` node by the primary-key members of `key`.
    pub async fn find(
        &self,
        entity: &str,
        key: &Json,
        selection: &[Selection],
    ) -> Result<FindResult> {
        let entity = self.model.entity(entity)?;
        let query = plan_find(&self.model, entity, key, selection)?.render(self.store.dialect());

        let rows = self.fetch(&query, "find").await?;
        let mut nodes = reshape(&self.model, entity, rows);
        let output = nodes.next().transpose()?.map(|record| record.node);
        if nodes.next().is_some() {
            return Err(GraphError::Cardinality(format!(
                "lookup of \"{}\" by {key} matched more than one row",
                entity.name
            )));
        }

        Ok(FindResult { output })
    }

    /// Lists one page of `entity` nodes.
    pub async fn list(
        &self,
        entity: &str,
        selection: &[Selection],
        params: &ListParams,
    ) -> Result<ListResult> {
        let entity = self.model.entity(entity)?;
        let plan = plan_list(&self.model, entity, selection, params, &self.config)?;
        let query = plan.query.render(self.store.dialect());

        let rows = self.fetch(&query, "list").await?;
        let records = reshape(&self.model, entity, rows).collect::<Result<Vec<_>>>()?;

        Ok(ListResult {
            output: plan.page.finish(records),
        })
    }

    async fn fetch(&self, query: &SqlQuery, operation: &'static str) -> Result<RowSet> {
        tablegraph_trace_query!(operation, &query.sql, query.params.len());
        let started = Instant::now();
        let rows = self.store.fetch(query).await?;
        tablegraph_trace_rows!(operation, rows.len(), started);
        Ok(rows)
    }
}
