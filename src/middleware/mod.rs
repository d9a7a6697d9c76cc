//! Query decorators.
//!
//! Wrappers that add logging, connection handling, transactions, retries and
//! caching around database operations without changing their results.
//!
//! Operations that need a connection are closures of the form
//! `|conn| Box::pin(async move { ... })`, the same shape as
//! `sqlx::Connection::transaction`.

mod cache;
mod connection;
mod retry;

use std::future::Future;
use std::time::Instant;

use log::{debug, info};

pub use cache::QueryCache;
pub use connection::{transactional, with_connection};
pub use retry::{retry_on_failure, retry_with_backoff};

/// Logs `sql` before awaiting `query` and the elapsed time afterwards.
pub async fn log_query<F: Future>(sql: &str, query: F) -> F::Output {
    info!("Executing query: {}", compact(sql));
    let start = Instant::now();
    let output = query.await;
    debug!("Query finished in {:.3}s", start.elapsed().as_secs_f64());
    output
}

/// Collapses the whitespace of multi-line statements onto one log line.
fn compact(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}
