//! In-process cache of query results.

use std::collections::HashMap;
use std::sync::Arc;

use futures::TryStreamExt;
use log::{debug, info};
use sqlx::AnyConnection;
use tokio::sync::RwLock;

use crate::error_handling::QueryError;
use crate::storage::models::Record;
use crate::stream::RowStream;

/// Records of previously run queries, keyed by SQL text.
///
/// Clones share the same entries. Nothing expires on its own: callers that
/// write to the table call [`QueryCache::invalidate`] or [`QueryCache::clear`].
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    entries: Arc<RwLock<HashMap<String, Arc<Vec<Record>>>>>,
}

impl QueryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the records for `sql`, running the query only on a miss.
    ///
    /// Errors are not cached.
    pub async fn fetch(
        &self,
        conn: &mut AnyConnection,
        sql: &str,
    ) -> Result<Arc<Vec<Record>>, QueryError> {
        if let Some(records) = self.entries.read().await.get(sql) {
            info!("Using cached result for query: {sql}");
            return Ok(Arc::clone(records));
        }

        let records: Vec<Record> = RowStream::with_query(conn, sql).try_collect().await?;
        let records = Arc::new(records);
        self.entries
            .write()
            .await
            .insert(sql.to_string(), Arc::clone(&records));
        debug!("Cached {} records for query: {sql}", records.len());

        Ok(records)
    }

    /// Drops the entry for `sql`. Returns whether there was one.
    pub async fn invalidate(&self, sql: &str) -> bool {
        self.entries.write().await.remove(sql).is_some()
    }

    /// Drops every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of cached queries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// `true` when nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
