//! Query execution seam.
//!
//! The relation layer compiles `(sql, params)` pairs; executing them is the
//! surrounding framework's job. Engine failures propagate unmodified — no
//! retry, no fallback compilation.

use futures::future::BoxFuture;

use crate::error::RelationResult;
use crate::model::Record;
use crate::value::Key;

/// Executes compiled queries against a database.
pub trait QueryEngine: Send + Sync {
    /// Run a query and return the resulting rows as records.
    fn query(&self, sql: &str, params: Vec<Key>) -> BoxFuture<'_, RelationResult<Vec<Record>>>;
}

impl<E: QueryEngine + ?Sized> QueryEngine for &E {
    fn query(&self, sql: &str, params: Vec<Key>) -> BoxFuture<'_, RelationResult<Vec<Record>>> {
        (**self).query(sql, params)
    }
}
