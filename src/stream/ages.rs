//! Age stream and aggregation.

use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use log::debug;
use rust_decimal::Decimal;
use sqlx::any::AnyRow;
use sqlx::AnyConnection;
use sqlx::Row;

use crate::error_handling::QueryError;
use crate::storage::models::parse_age;
use crate::storage::queries::SELECT_AGES;

/// Streams the `age` column only, one value per row.
pub fn stream_user_ages(conn: &mut AnyConnection) -> BoxStream<'_, Result<Decimal, QueryError>> {
    sqlx::query(SELECT_AGES).fetch(conn).map(decode_age).boxed()
}

fn decode_age(row: Result<AnyRow, sqlx::Error>) -> Result<Decimal, QueryError> {
    let raw: String = row?.try_get("age")?;
    parse_age(&raw).map_err(|message| QueryError::Decode {
        column: "age",
        message,
    })
}

/// Mean age over the table, or `None` when it is empty.
///
/// Keeps only a running sum and count; the ages are never collected.
pub async fn average_age(conn: &mut AnyConnection) -> Result<Option<Decimal>, QueryError> {
    let (sum, count) = stream_user_ages(conn)
        .try_fold((Decimal::ZERO, 0u64), |(sum, count), age| async move {
            Ok((sum + age, count + 1))
        })
        .await?;

    debug!("Averaging {count} ages");
    if count == 0 {
        return Ok(None);
    }
    Ok(Some(sum / Decimal::from(count)))
}
