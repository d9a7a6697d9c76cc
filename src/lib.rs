//! user_stream library: lazy record streams over the `user_data` table
//!
//! This library reads a MySQL (or SQLite) `user_data` table one row at a time
//! through [`RowStream`], and provides the collaborators around it: schema
//! provisioning, idempotent CSV import, batched and paginated views, age
//! aggregation and query decorators (logging, transactions, retry, caching).
//!
//! # Example
//!
//! ```no_run
//! use futures::TryStreamExt;
//! use user_stream::{connect_to_named_database, DbConfig, RowStream};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DbConfig::default();
//! let mut conn = connect_to_named_database(&config).await?;
//!
//! let mut rows = RowStream::new(&mut conn);
//! while let Some(record) = rows.try_next().await? {
//!     println!("{record}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

mod app;
pub mod config;
mod error_handling;
pub mod initialization;
pub mod middleware;
pub mod storage;
pub mod stream;

// Re-export public API
pub use config::{Backend, Command, Config, DbConfig, LogFormat, LogLevel, OutputFormat};
pub use error_handling::{
    get_retry_strategy, ConfigValidationError, ConnectionError, ImportError,
    InitializationError, ProvisioningError, QueryError, Retriable,
};
pub use middleware::{
    log_query, retry_on_failure, retry_with_backoff, transactional, with_connection, QueryCache,
};
pub use run::{run, run_with_output, RunReport};
pub use storage::{
    connect, connect_to_named_database, count_users, create_database, create_table, import_csv,
    insert_records, load_csv, ImportReport, Record, Value,
};
pub use stream::{
    average_age, paginate_users, stream_in_batches, stream_user_ages, users_older_than,
    LazyPaginator, RowStream, StreamState,
};

// Internal run module (contains the command driver)
mod run {
    use std::io::{self, Write};
    use std::num::NonZeroU32;
    use std::time::Instant;

    use anyhow::{anyhow, Context, Result};
    use futures::TryStreamExt;
    use log::{debug, info, warn};
    use rust_decimal::Decimal;
    use sqlx::AnyConnection;
    use sqlx::Connection;

    use crate::app::{maybe_log_progress, RecordWriter};
    use crate::config::{Backend, Command, Config, USER_TABLE};
    use crate::storage::{
        connect, connect_to_named_database, count_users, create_database, create_table,
        import_csv, ImportReport,
    };
    use crate::stream::{average_age, users_older_than, LazyPaginator, RowStream};

    /// Results of one driver run.
    #[derive(Debug, Clone)]
    pub struct RunReport {
        /// Command that was run
        pub command: Command,
        /// Number of records written to the output
        pub records_emitted: u64,
        /// Import performed before the command, if any
        pub imported: Option<ImportReport>,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
    }

    /// Runs the configured command, writing its output to stdout.
    ///
    /// Connects, creates the database and table if needed, imports the CSV
    /// when the table is empty (always for [`Command::Seed`]) and then runs
    /// the command. The connection is closed before returning, also on error.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The configuration is invalid
    /// - The server cannot be reached or the schema cannot be created
    /// - The CSV is malformed (or missing, for `seed`)
    /// - A query fails while streaming
    ///
    /// # Example
    ///
    /// ```no_run
    /// use user_stream::{run, Command, Config, DbConfig};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = Config {
    ///     db: DbConfig::sqlite("./data", "ALX_prodev"),
    ///     command: Some(Command::Stream),
    ///     ..Default::default()
    /// };
    /// let report = run(config).await?;
    /// println!("Streamed {} records", report.records_emitted);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run(config: Config) -> Result<RunReport> {
        run_with_output(config, io::stdout()).await
    }

    /// [`run`] with the command output sent to `out`.
    pub async fn run_with_output<W: Write>(config: Config, out: W) -> Result<RunReport> {
        let start_time = Instant::now();
        config.validate().context("Invalid configuration")?;
        let command = config.command();
        info!("Running {:?} on {:?}", command, config.db);

        let mut server = connect(&config.db)
            .await
            .context("Failed to connect to the database server")?;
        let provisioned = create_database(&mut server, &config.db).await;
        close_connection(server, "server").await;
        provisioned.context("Failed to create the database")?;

        let mut conn = connect_to_named_database(&config.db)
            .await
            .context("Failed to connect to the database")?;
        let outcome = drive(&mut conn, &config, &command, out, start_time).await;
        close_connection(conn, &config.db.database).await;
        let (records_emitted, imported) = outcome?;

        Ok(RunReport {
            command,
            records_emitted,
            imported,
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
        })
    }

    async fn close_connection(conn: AnyConnection, name: &str) {
        match conn.close().await {
            Ok(()) => debug!("Connection to {name} closed"),
            Err(e) => warn!("Failed to close connection to {name}: {e}"),
        }
    }

    async fn drive<W: Write>(
        conn: &mut AnyConnection,
        config: &Config,
        command: &Command,
        out: W,
        start_time: Instant,
    ) -> Result<(u64, Option<ImportReport>)> {
        create_table(conn)
            .await
            .context("Failed to create the user_data table")?;

        let mut writer = RecordWriter::new(out, config.output);
        let imported = seed_if_needed(conn, config, command).await?;

        let emitted = match command {
            Command::Stream => {
                let mut emitted = 0;
                let mut rows = RowStream::new(conn);
                while let Some(record) = rows
                    .try_next()
                    .await
                    .with_context(|| format!("Failed to stream {USER_TABLE}"))?
                {
                    writer.write_record(&record).context("Failed to write output")?;
                    emitted += 1;
                    maybe_log_progress(start_time, emitted);
                    if writer.is_closed() {
                        debug!("Output closed after {emitted} records; stopping");
                        break;
                    }
                }
                emitted
            }
            Command::Batches {
                batch_size,
                min_age,
            } => {
                let batch_size = non_zero(*batch_size, "batch size")?;
                let mut emitted = 0;
                let mut rows = users_older_than(conn, batch_size, Decimal::from(*min_age));
                while let Some(record) = rows
                    .try_next()
                    .await
                    .context("Failed to stream batches")?
                {
                    writer.write_record(&record).context("Failed to write output")?;
                    emitted += 1;
                    maybe_log_progress(start_time, emitted);
                    if writer.is_closed() {
                        break;
                    }
                }
                emitted
            }
            Command::Pages { page_size } => {
                let mut paginator = LazyPaginator::new(non_zero(*page_size, "page size")?);
                let mut emitted = 0;
                let mut number = 0;
                while paginator.has_next() && !writer.is_closed() {
                    let offset = paginator.offset();
                    let Some(page) = paginator
                        .next_page(conn)
                        .await
                        .with_context(|| format!("Failed to read page at offset {offset}"))?
                    else {
                        break;
                    };
                    number += 1;
                    writer
                        .write_page_header(number, offset)
                        .context("Failed to write output")?;
                    for record in &page {
                        writer.write_record(record).context("Failed to write output")?;
                        emitted += 1;
                    }
                }
                emitted
            }
            Command::AverageAge => {
                let average = average_age(conn)
                    .await
                    .context("Failed to compute the average age")?;
                writer
                    .write_average(average)
                    .context("Failed to write output")?;
                0
            }
            Command::Seed => {
                if let Some(report) = &imported {
                    writer
                        .write_import_report(report)
                        .context("Failed to write output")?;
                }
                0
            }
        };

        writer.flush().context("Failed to flush output")?;
        Ok((emitted, imported))
    }

    /// Imports the CSV when the table is empty, or always for `seed`.
    ///
    /// A missing CSV is only an error for `seed`; other commands run against
    /// the empty table.
    async fn seed_if_needed(
        conn: &mut AnyConnection,
        config: &Config,
        command: &Command,
    ) -> Result<Option<ImportReport>> {
        let forced = *command == Command::Seed;
        if !forced {
            let existing = count_users(conn)
                .await
                .with_context(|| format!("Failed to count rows in {USER_TABLE}"))?;
            if existing > 0 {
                debug!("{USER_TABLE} has {existing} rows; skipping import");
                return Ok(None);
            }
            if !config.csv.exists() {
                warn!(
                    "{USER_TABLE} is empty and {} does not exist; nothing to import",
                    config.csv.display()
                );
                return Ok(None);
            }
        }

        let report = import_csv(conn, &config.csv)
            .await
            .with_context(|| format!("Failed to import {}", config.csv.display()))?;
        if config.db.backend == Backend::Sqlite {
            debug!("Seeded {}", config.db.sqlite_path().display());
        }
        Ok(Some(report))
    }

    fn non_zero(value: u32, what: &str) -> Result<NonZeroU32> {
        NonZeroU32::new(value).ok_or_else(|| anyhow!("{what} must be greater than 0"))
    }

}
