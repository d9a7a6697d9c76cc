//! Batched reads and filtering on top of them.

use std::num::NonZeroU32;

use futures::stream::{self, BoxStream};
use futures::{StreamExt, TryStreamExt};
use log::debug;
use rust_decimal::Decimal;
use sqlx::AnyConnection;

use crate::error_handling::QueryError;
use crate::storage::models::Record;
use crate::stream::pagination::fetch_page;

/// Streams `user_data` as pages of at most `batch_size` records.
///
/// Pages are read one at a time, ordered by `user_id`, only when the next one
/// is polled. The stream ends after the first short or empty page.
pub fn stream_in_batches<'c>(
    conn: &'c mut AnyConnection,
    batch_size: NonZeroU32,
) -> BoxStream<'c, Result<Vec<Record>, QueryError>> {
    let limit = u64::from(batch_size.get());

    stream::try_unfold(Some((conn, 0u64)), move |state| async move {
        let Some((conn, offset)) = state else {
            return Ok::<_, QueryError>(None);
        };

        let batch = fetch_page(conn, limit, offset).await?;
        debug!("Batch at offset {offset} has {} rows", batch.len());
        if batch.is_empty() {
            return Ok(None);
        }

        let next = if (batch.len() as u64) < limit {
            None
        } else {
            Some((conn, offset + limit))
        };
        Ok::<_, QueryError>(Some((batch, next)))
    })
    .boxed()
}

/// Streams the records with `age > min_age`, read in batches.
pub fn users_older_than<'c>(
    conn: &'c mut AnyConnection,
    batch_size: NonZeroU32,
    min_age: Decimal,
) -> BoxStream<'c, Result<Record, QueryError>> {
    stream_in_batches(conn, batch_size)
        .map_ok(|batch| stream::iter(batch.into_iter().map(Ok)))
        .try_flatten()
        .try_filter(move |record| futures::future::ready(record.age > min_age))
        .boxed()
}
