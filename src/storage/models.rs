//! Database record types.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::any::AnyRow;
use sqlx::Row;

use crate::error_handling::QueryError;

/// One row of the `user_data` table.
///
/// Fields are declared in column order, so serialization and `fields()` keep
/// the table's column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Primary key (at most 36 characters)
    pub user_id: String,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Age in years, never negative
    pub age: Decimal,
}

/// A single column value of a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'a> {
    /// String column
    Text(&'a str),
    /// Decimal column
    Decimal(Decimal),
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Decimal(d) => write!(f, "{d}"),
        }
    }
}

impl Record {
    /// Column names in table order.
    pub const COLUMNS: [&'static str; 4] = ["user_id", "name", "email", "age"];

    /// Column/value pairs in table order.
    pub fn fields(&self) -> [(&'static str, Value<'_>); 4] {
        [
            ("user_id", Value::Text(&self.user_id)),
            ("name", Value::Text(&self.name)),
            ("email", Value::Text(&self.email)),
            ("age", Value::Decimal(self.age)),
        ]
    }

    /// Decodes a row with the four user columns, `age` as text.
    pub(crate) fn from_row(row: &AnyRow) -> Result<Self, QueryError> {
        let user_id: String = row.try_get("user_id")?;
        let name: String = row.try_get("name")?;
        let email: String = row.try_get("email")?;
        let raw_age: String = row.try_get("age")?;
        let age = parse_age(&raw_age).map_err(|message| QueryError::Decode {
            column: "age",
            message,
        })?;

        Ok(Self {
            user_id,
            name,
            email,
            age,
        })
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (column, value)) in self.fields().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{column}: {value}")?;
        }
        Ok(())
    }
}

/// Parses a non-negative decimal age. The error is a human-readable reason.
pub fn parse_age(raw: &str) -> Result<Decimal, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("empty value".to_string());
    }
    let age = Decimal::from_str(trimmed).map_err(|e| format!("not a decimal: {e}"))?;
    if age < Decimal::ZERO {
        return Err("must not be negative".to_string());
    }
    Ok(age)
}
