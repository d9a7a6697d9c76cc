//! SQL shared by the stream, import and provisioning code.
//!
//! Every statement runs unchanged on MySQL and SQLite through `sqlx::Any`.
//! `age` is read as `CAST(age AS CHAR)` because `Any` has no decimal type;
//! the text is parsed back into a `Decimal` by `Record::from_row`.

/// Creates `user_data` if it does not exist.
pub(crate) const CREATE_USER_TABLE: &str = "CREATE TABLE IF NOT EXISTS user_data (
    user_id VARCHAR(36) NOT NULL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL,
    age DECIMAL NOT NULL,
    CHECK (age >= 0)
)";

/// Full-table read used by `RowStream::new`. No ORDER BY: rows come back in
/// storage order.
pub const SELECT_USERS: &str =
    "SELECT user_id, name, email, CAST(age AS CHAR) AS age FROM user_data";

/// One page of the table. Paging needs a stable order, hence ORDER BY.
pub(crate) const SELECT_USERS_PAGE: &str =
    "SELECT user_id, name, email, CAST(age AS CHAR) AS age FROM user_data
     ORDER BY user_id LIMIT ? OFFSET ?";

/// Only the age column, for aggregation.
pub(crate) const SELECT_AGES: &str = "SELECT CAST(age AS CHAR) AS age FROM user_data";

pub(crate) const SELECT_USER_BY_ID: &str =
    "SELECT user_id, name, email, CAST(age AS CHAR) AS age FROM user_data WHERE user_id = ?";

pub(crate) const INSERT_USER: &str =
    "INSERT INTO user_data (user_id, name, email, age) VALUES (?, ?, ?, ?)";

pub(crate) const COUNT_USERS: &str = "SELECT COUNT(*) FROM user_data";
