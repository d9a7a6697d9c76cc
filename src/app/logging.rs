//! Progress logging utilities.

use log::info;
use std::time::Instant;

use crate::config::LOGGING_INTERVAL;

/// Logs how many records have been written and the rate so far.
pub fn log_progress(start_time: Instant, records: u64) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let rate = if elapsed_secs > 0.0 {
        records as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Streamed {} records in {:.2} seconds (~{:.2} records/sec)",
        records, elapsed_secs, rate
    );
}

/// Calls [`log_progress`] every `LOGGING_INTERVAL` records.
pub fn maybe_log_progress(start_time: Instant, records: u64) {
    if records > 0 && records % LOGGING_INTERVAL == 0 {
        log_progress(start_time, records);
    }
}
