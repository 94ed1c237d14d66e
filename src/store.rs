//! In-memory daily time series shared between the update daemon and readers.
//!
//! All access goes through a single `RwLock`: `append` takes the write lock
//! for one push, reads take the read lock for one copy. Callers only ever see
//! fully built records in date order, and no lock is held across an `.await`.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use tracing::debug;

use crate::analysis::window::{self, Summary};
use crate::error::SeriesError;
use crate::record::{Record, parse_date};

/// Ordering rule applied on append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatePolicy {
    /// Date must be strictly after the last stored date.
    #[default]
    Strict,
    /// Date may repeat the last stored date. Used for historical loads.
    AllowTies,
}

#[derive(Debug, Default)]
pub struct TimeSeriesStore {
    records: RwLock<Vec<Record>>,
}

impl TimeSeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic can't happen between validation and push, so a poisoned lock
    // still guards a consistent vector.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Record>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Record>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `record` at the end of the series.
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::InvalidRecord`] if the record is not dated
    /// strictly after the current last record. The store is left unchanged.
    pub fn append(&self, record: Record) -> Result<(), SeriesError> {
        self.append_with(record, DatePolicy::Strict)
    }

    pub fn append_with(&self, record: Record, policy: DatePolicy) -> Result<(), SeriesError> {
        let mut records = self.write();

        if let Some(last) = records.last() {
            let in_order = match policy {
                DatePolicy::Strict => record.date > last.date,
                DatePolicy::AllowTies => record.date >= last.date,
            };
            if !in_order {
                return Err(SeriesError::InvalidRecord {
                    date: record.date,
                    last: last.date,
                });
            }
        }

        debug!(date = %record.date, weather = %record.weather, "Appending record");
        records.push(record);
        Ok(())
    }

    /// Point-in-time copy of the whole series.
    pub fn snapshot(&self) -> Vec<Record> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.read().last().map(|r| r.date)
    }

    /// Records dated within `[start, end]`, inclusive. Empty when `start > end`.
    pub fn range(&self, start: NaiveDate, end: NaiveDate) -> Vec<Record> {
        if start > end {
            return Vec::new();
        }

        let records = self.read();
        let lower = records.partition_point(|r| r.date < start);
        let upper = records.partition_point(|r| r.date <= end);
        records[lower..upper].to_vec()
    }

    /// Like [`TimeSeriesStore::range`], taking `YYYY-MM-DD` strings.
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::DateParse`] if either bound is malformed.
    pub fn range_query(&self, start: &str, end: &str) -> Result<Vec<Record>, SeriesError> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        Ok(self.range(start, end))
    }

    /// Aggregate statistics over `[start, end]`, or [`Summary::NoData`].
    pub fn range_summary(&self, start: &str, end: &str) -> Result<Summary, SeriesError> {
        let records = self.range_query(start, end)?;
        Ok(window::aggregate(&records).summary())
    }

    pub fn summary(&self) -> Summary {
        window::aggregate(&self.read()).summary()
    }

    /// Records within `days` full days of the last stored date.
    pub fn trailing_window(&self, days: u32) -> Vec<Record> {
        window::trailing(&self.read(), days).to_vec()
    }

    /// Copy of the series ordered by ascending `temp_max`. Ties keep date order.
    pub fn sorted_by_max_temp(&self) -> Vec<Record> {
        let mut records = self.snapshot();
        records.sort_by(|a, b| a.temp_max.total_cmp(&b.temp_max));
        records
    }
}
