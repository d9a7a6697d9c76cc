//! Configuration constants.
//!
//! Defaults for connection settings, table layout, streaming sizes and the
//! retry policy used by the query decorators.

// Connection defaults
/// Default MySQL host
pub const DEFAULT_HOST: &str = "localhost";
/// Default MySQL port
pub const DEFAULT_PORT: u16 = 3306;
/// Default MySQL user
pub const DEFAULT_USER: &str = "root";
/// Default MySQL password (override with `--password` or `USER_STREAM_PASSWORD`)
pub const DEFAULT_PASSWORD: &str = "root";
/// Database that holds the `user_data` table
pub const DEFAULT_DATABASE: &str = "ALX_prodev";
/// Directory for SQLite database files when the SQLite backend is selected
pub const DEFAULT_DATA_DIR: &str = "./data";
/// CSV file used to seed an empty table
pub const DEFAULT_CSV_PATH: &str = "./user_data.csv";

// Table layout
/// Table streamed by `RowStream::new`
pub const USER_TABLE: &str = "user_data";
/// Maximum length of a `user_id` (the column is `VARCHAR(36)`, sized for a UUID)
pub const USER_ID_MAX_LEN: usize = 36;
/// Maximum length of a database name (MySQL identifier limit)
pub const DATABASE_NAME_MAX_LEN: usize = 64;

// Streaming
/// Default number of rows per batch for `batches`
pub const DEFAULT_BATCH_SIZE: u32 = 50;
/// Default number of rows per page for `pages`
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Default age threshold for `batches` (records strictly older are kept)
pub const DEFAULT_MIN_AGE: u32 = 25;
/// Log a progress line every N streamed records
pub const LOGGING_INTERVAL: u64 = 1000;

// Retry policy
/// Initial retry delay in milliseconds
pub const RETRY_INITIAL_DELAY_MS: u64 = 500;
/// Backoff factor (delay multiplier)
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between attempts in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 10;
/// Number of retries after the first attempt
pub const RETRY_MAX_ATTEMPTS: usize = 3;
