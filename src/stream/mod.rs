//! Record streams over `user_data`.
//!
//! [`RowStream`] is the core: one query, one row per poll. The other views
//! are built from it or from `LIMIT/OFFSET` pages:
//! - [`stream_in_batches`] and [`users_older_than`] for page-sized chunks
//! - [`paginate_users`] and [`LazyPaginator`] for explicit paging
//! - [`stream_user_ages`] and [`average_age`] for aggregation

mod ages;
mod batches;
mod pagination;
mod row;

pub use ages::{average_age, stream_user_ages};
pub use batches::{stream_in_batches, users_older_than};
pub use pagination::{paginate_users, LazyPaginator};
pub use row::{RowStream, StreamState};
