// storage/mod.rs
// Schema, CSV import and the SQL they share

pub mod import;
pub mod models;
pub mod provision;
pub(crate) mod queries;
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used items
pub use import::{import_csv, insert_records, load_csv, ImportReport};
pub use models::{parse_age, Record, Value};
pub use provision::{
    connect, connect_to_named_database, count_users, create_database, create_table,
};
pub use queries::SELECT_USERS;
