//! CSV import into `user_data`.
//!
//! Columns are located by header name, so `user_id,name,email,age` and
//! `name,email,age` files both load. Without a `user_id` column the id is a
//! UUID v5 of the lowercased email, which keeps re-imports idempotent.
//!
//! Rows whose `user_id` already exists are skipped, never overwritten.

use std::fmt;
use std::path::Path;

use log::{debug, info, warn};
use serde::Serialize;
use sqlx::AnyConnection;
use uuid::Uuid;

use crate::config::USER_ID_MAX_LEN;
use crate::error_handling::ImportError;
use crate::middleware::transactional;
use crate::storage::models::{parse_age, Record};
use crate::storage::queries::{INSERT_USER, SELECT_USER_BY_ID};

/// Outcome of one import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Rows read from the CSV
    pub parsed: usize,
    /// Rows written to the table
    pub inserted: usize,
    /// Rows whose user_id was already present
    pub skipped: usize,
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} row{} read, {} inserted, {} already present",
            self.parsed,
            if self.parsed == 1 { "" } else { "s" },
            self.inserted,
            self.skipped
        )
    }
}

/// Header positions of the known columns.
#[derive(Debug)]
struct ColumnLayout {
    user_id: Option<usize>,
    name: usize,
    email: usize,
    age: usize,
}

impl ColumnLayout {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, ImportError> {
        let find = |column: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(column))
        };
        let require = |column: &'static str| find(column).ok_or(ImportError::MissingColumn(column));

        Ok(Self {
            user_id: find("user_id"),
            name: require("name")?,
            email: require("email")?,
            age: require("age")?,
        })
    }

    fn parse(&self, row: &csv::StringRecord, line: u64) -> Result<Record, ImportError> {
        let field = |index: usize, name: &'static str| {
            row.get(index)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .ok_or(ImportError::MissingField { line, field: name })
        };

        let name = field(self.name, "name")?;
        let email = field(self.email, "email")?;
        let raw_age = field(self.age, "age")?;
        let age = parse_age(raw_age).map_err(|reason| ImportError::InvalidAge {
            line,
            value: raw_age.to_string(),
            reason,
        })?;

        let user_id = match self.user_id {
            Some(index) => {
                let user_id = field(index, "user_id")?;
                if user_id.chars().count() > USER_ID_MAX_LEN {
                    return Err(ImportError::UserIdTooLong {
                        line,
                        value: user_id.to_string(),
                        max: USER_ID_MAX_LEN,
                    });
                }
                user_id.to_string()
            }
            None => derive_user_id(email),
        };

        Ok(Record {
            user_id,
            name: name.to_string(),
            email: email.to_string(),
            age,
        })
    }
}

/// Stable id for rows that come without one.
fn derive_user_id(email: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, email.to_lowercase().as_bytes()).to_string()
}

/// Parses a CSV file into records.
///
/// The first row must be a header naming at least `name`, `email` and `age`.
/// Fails on the first malformed row; nothing is returned for a partially
/// valid file.
pub fn load_csv(path: &Path) -> Result<Vec<Record>, ImportError> {
    if !path.exists() {
        return Err(ImportError::NotFound(path.to_path_buf()));
    }
    let read_error = |source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(read_error)?;
    let layout = ColumnLayout::from_headers(reader.headers().map_err(read_error)?)?;
    debug!("CSV column layout for {}: {:?}", path.display(), layout);

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(read_error)?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        records.push(layout.parse(&row, line)?);
    }

    debug!("Parsed {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Inserts records whose `user_id` is not in the table yet.
///
/// Runs in one transaction: either every new row lands or none does.
/// A row that collides with an existing `user_id` keeps the stored values;
/// differing values are logged as a warning.
pub async fn insert_records(
    conn: &mut AnyConnection,
    records: Vec<Record>,
) -> Result<ImportReport, ImportError> {
    let parsed = records.len();

    let (inserted, skipped) = transactional(conn, move |tx| {
        Box::pin(async move {
            let mut inserted = 0usize;
            let mut skipped = 0usize;

            for record in &records {
                let existing = sqlx::query(SELECT_USER_BY_ID)
                    .bind(record.user_id.as_str())
                    .fetch_optional(&mut *tx)
                    .await?;

                if let Some(row) = existing {
                    skipped += 1;
                    match Record::from_row(&row) {
                        Ok(current) if current == *record => {}
                        Ok(current) => warn!(
                            "user_id {} already exists with different values; keeping ({}) over ({})",
                            record.user_id, current, record
                        ),
                        Err(e) => warn!("user_id {} already exists but could not be read: {e}", record.user_id),
                    }
                    continue;
                }

                sqlx::query(INSERT_USER)
                    .bind(record.user_id.as_str())
                    .bind(record.name.as_str())
                    .bind(record.email.as_str())
                    .bind(record.age.to_string())
                    .execute(&mut *tx)
                    .await?;
                inserted += 1;
            }

            Ok::<_, ImportError>((inserted, skipped))
        })
    })
    .await?;

    Ok(ImportReport {
        parsed,
        inserted,
        skipped,
    })
}

/// Loads `path` and inserts its rows. See [`load_csv`] and [`insert_records`].
pub async fn import_csv(
    conn: &mut AnyConnection,
    path: &Path,
) -> Result<ImportReport, ImportError> {
    let records = load_csv(path)?;
    let report = insert_records(conn, records).await?;
    info!("Imported {}: {}", path.display(), report);
    Ok(report)
}
