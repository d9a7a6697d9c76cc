//! Page-at-a-time reads.

use std::num::NonZeroU32;

use log::debug;
use sqlx::AnyConnection;

use crate::error_handling::QueryError;
use crate::middleware::log_query;
use crate::storage::models::Record;
use crate::storage::queries::SELECT_USERS_PAGE;

/// Reads one page of `user_data`, ordered by `user_id`.
///
/// An offset past the end of the table gives an empty page.
pub async fn paginate_users(
    conn: &mut AnyConnection,
    page_size: NonZeroU32,
    offset: u64,
) -> Result<Vec<Record>, QueryError> {
    fetch_page(conn, u64::from(page_size.get()), offset).await
}

pub(crate) async fn fetch_page(
    conn: &mut AnyConnection,
    limit: u64,
    offset: u64,
) -> Result<Vec<Record>, QueryError> {
    let rows = log_query(
        SELECT_USERS_PAGE,
        sqlx::query(SELECT_USERS_PAGE)
            .bind(to_sql_int(limit))
            .bind(to_sql_int(offset))
            .fetch_all(&mut *conn),
    )
    .await?;

    rows.iter().map(Record::from_row).collect()
}

fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Cursor over pages of `user_data` that is advanced explicitly.
///
/// The paginator holds only the page size and the next offset, not a
/// connection, so each page may be read on a different one. It is done as
/// soon as a page comes back empty or short, and never queries again after
/// that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LazyPaginator {
    page_size: NonZeroU32,
    offset: u64,
    finished: bool,
}

impl LazyPaginator {
    /// Starts at the first row.
    pub fn new(page_size: NonZeroU32) -> Self {
        Self {
            page_size,
            offset: 0,
            finished: false,
        }
    }

    /// Offset of the next page.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Rows per page.
    pub fn page_size(&self) -> NonZeroU32 {
        self.page_size
    }

    /// `false` once the last page has been read.
    ///
    /// A table whose size is an exact multiple of the page size needs one
    /// extra (empty) read before this turns `false`.
    pub fn has_next(&self) -> bool {
        !self.finished
    }

    /// Reads the next page, or returns `Ok(None)` when there is none.
    ///
    /// A failed read leaves the offset unchanged, so the same page can be
    /// requested again.
    pub async fn next_page(
        &mut self,
        conn: &mut AnyConnection,
    ) -> Result<Option<Vec<Record>>, QueryError> {
        if self.finished {
            return Ok(None);
        }

        let page = paginate_users(conn, self.page_size, self.offset).await?;
        debug!("Page at offset {} has {} rows", self.offset, page.len());

        if page.len() < self.page_size.get() as usize {
            self.finished = true;
        }
        if page.is_empty() {
            return Ok(None);
        }

        self.offset += page.len() as u64;
        Ok(Some(page))
    }
}
