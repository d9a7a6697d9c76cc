//! Lazy record stream over one query.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{BoxStream, FusedStream};
use futures::{ready, Stream, StreamExt};
use log::debug;
use sqlx::any::AnyRow;
use sqlx::AnyConnection;

use crate::error_handling::QueryError;
use crate::storage::models::Record;
use crate::storage::queries::SELECT_USERS;

/// Lifecycle of a [`RowStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Built; the query has not been sent yet.
    Created,
    /// The query was sent and rows may still follow.
    Active,
    /// Every row was yielded.
    Exhausted,
    /// The query or a row failed. Nothing more is yielded.
    Failed,
}

/// Forward-only stream of [`Record`]s read from one query.
///
/// The query is sent on the first poll, and each poll after that pulls one
/// row from the driver's cursor. Rows are never buffered by the stream
/// itself, so memory stays flat however large the table is.
///
/// The stream holds the connection's mutable borrow while it is alive:
/// one connection serves one stream at a time. Dropping the stream early is
/// fine; the connection stays usable and its lifecycle belongs to the caller.
///
/// Once exhausted or failed the stream returns `None` forever. Re-reading the
/// table takes a new stream.
///
/// ```no_run
/// use futures::TryStreamExt;
/// use user_stream::RowStream;
///
/// # async fn demo(conn: &mut sqlx::AnyConnection) -> Result<(), user_stream::QueryError> {
/// let mut rows = RowStream::new(conn);
/// while let Some(record) = rows.try_next().await? {
///     println!("{record}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct RowStream<'c> {
    sql: &'c str,
    rows: Option<BoxStream<'c, Result<AnyRow, sqlx::Error>>>,
    state: StreamState,
    yielded: u64,
}

impl<'c> RowStream<'c> {
    /// Streams every row of `user_data`.
    pub fn new(conn: &'c mut AnyConnection) -> Self {
        Self::with_query(conn, SELECT_USERS)
    }

    /// Streams the rows of `sql`, which must return the `user_id`, `name`,
    /// `email` and `age` columns (`age` as text).
    pub fn with_query(conn: &'c mut AnyConnection, sql: &'c str) -> Self {
        Self {
            sql,
            // Lazy: nothing reaches the server until the first poll
            rows: Some(sqlx::query(sql).fetch(conn)),
            state: StreamState::Created,
            yielded: 0,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Number of records produced so far.
    pub fn rows_yielded(&self) -> u64 {
        self.yielded
    }

    fn finish(&mut self, state: StreamState) {
        // Releases the cursor
        self.rows = None;
        self.state = state;
        debug!(
            "Row stream {:?} after {} rows: {}",
            state, self.yielded, self.sql
        );
    }
}

impl Stream for RowStream<'_> {
    type Item = Result<Record, QueryError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        let Some(rows) = this.rows.as_mut() else {
            return Poll::Ready(None);
        };

        if this.state == StreamState::Created {
            debug!("Row stream started: {}", this.sql);
            this.state = StreamState::Active;
        }

        match ready!(rows.poll_next_unpin(cx)) {
            Some(Ok(row)) => match Record::from_row(&row) {
                Ok(record) => {
                    this.yielded += 1;
                    Poll::Ready(Some(Ok(record)))
                }
                Err(e) => {
                    this.finish(StreamState::Failed);
                    Poll::Ready(Some(Err(e)))
                }
            },
            Some(Err(e)) => {
                this.finish(StreamState::Failed);
                Poll::Ready(Some(Err(QueryError::from(e))))
            }
            None => {
                this.finish(StreamState::Exhausted);
                Poll::Ready(None)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.rows {
            Some(_) => (0, None),
            None => (0, Some(0)),
        }
    }
}

impl FusedStream for RowStream<'_> {
    fn is_terminated(&self) -> bool {
        self.rows.is_none()
    }
}

impl std::fmt::Debug for RowStream<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowStream")
            .field("sql", &self.sql)
            .field("state", &self.state)
            .field("yielded", &self.yielded)
            .finish()
    }
}
