//! Tracing utilities for query compilation and model construction.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site.

/// Emit a debug-level tracing event with the SQL text and parameter count.
///
/// ```ignore
/// tablegraph_trace_query!("list", &query.sql, query.params.len());
/// ```
#[macro_export]
macro_rules! tablegraph_trace_query {
    ($operation:expr, $sql:expr, $param_count:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            operation = $operation,
            sql = %$sql,
            params = $param_count,
            "tablegraph.query"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = &$operation;
    };
}

/// Emit a debug-level tracing event with the row count and elapsed time of a
/// store round trip.
///
/// ```ignore
/// tablegraph_trace_rows!("find", rows.len(), started);
/// ```
#[macro_export]
macro_rules! tablegraph_trace_rows {
    ($operation:expr, $rows:expr, $started:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            operation = $operation,
            rows = $rows,
            elapsed_ms = $started.elapsed().as_millis() as u64,
            "tablegraph.rows"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = &$started;
    };
}

/// Emit a debug-level tracing event while the relationship model is built.
///
/// ```ignore
/// tablegraph_trace_build!(entity = name, link = link_name; "link");
/// ```
#[macro_export]
macro_rules! tablegraph_trace_build {
    ($($field:ident = $value:expr),* ; $message:literal) => {
        #[cfg(feature = "tracing")]
        tracing::debug!($($field = %$value,)* $message);
    };
}
