//! SQLite support for tablegraph
//!
//! Provides the rusqlite [`SqliteStore`] and schema [`introspect`]ion
//! producing the store metadata the relationship model is built from.

pub mod introspect;
mod store;

pub use introspect::{column_kind, introspect};
pub use store::SqliteStore;
