//! Error types shared by the store, the loader and the update daemon.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("Failed to read weather data from '{source_name}'")]
    DataSource {
        source_name: String,
        #[source]
        source: csv::Error,
    },

    #[error("Malformed row {line} in '{source_name}'")]
    MalformedRow {
        source_name: String,
        line: u64,
        #[source]
        source: Box<SeriesError>,
    },

    #[error("Invalid date '{input}', expected YYYY-MM-DD")]
    DateParse {
        input: String,
        #[source]
        source: Option<chrono::ParseError>,
    },

    #[error("Record for {date} is not after the last stored date {last}")]
    InvalidRecord { date: NaiveDate, last: NaiveDate },

    #[error("Date {0} has no following calendar day")]
    DateOverflow(NaiveDate),
}

/// Lifecycle violations of [`crate::daemon::UpdateDaemon`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DaemonError {
    #[error("Update daemon is already running")]
    AlreadyRunning,
    #[error("Update daemon was stopped and cannot be restarted")]
    AlreadyStopped,
}
