use chrono::Days;
use serde::Serialize;

use crate::record::Record;

/// Length of the trailing window used as the classification baseline.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Aggregate statistics over a set of records.
///
/// For an empty set the means are 0 and the extremes hold the `-inf`/`+inf`
/// sentinels, so check [`WindowResult::is_empty`] (or use
/// [`WindowResult::summary`]) before trusting them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowResult {
    pub count: usize,
    /// Mean of the daily `(temp_max + temp_min) / 2` midpoints.
    pub mean_temp: f64,
    pub mean_precip: f64,
    pub mean_wind: f64,
    /// Highest `temp_max` observed.
    pub max_temp: f64,
    /// Lowest `temp_min` observed.
    pub min_temp: f64,
}

impl WindowResult {
    pub fn empty() -> Self {
        Self {
            count: 0,
            mean_temp: 0.0,
            mean_precip: 0.0,
            mean_wind: 0.0,
            max_temp: f64::NEG_INFINITY,
            min_temp: f64::INFINITY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn summary(self) -> Summary {
        if self.is_empty() {
            Summary::NoData
        } else {
            Summary::Observed(self)
        }
    }
}

impl Default for WindowResult {
    fn default() -> Self {
        Self::empty()
    }
}

/// Statistics as reported to callers: either real values or an explicit
/// "no data" condition, never zeroed placeholders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Summary {
    NoData,
    Observed(WindowResult),
}

impl Summary {
    pub fn observed(&self) -> Option<&WindowResult> {
        match self {
            Summary::Observed(stats) => Some(stats),
            Summary::NoData => None,
        }
    }
}

/// Computes [`WindowResult`] over `records` in a single pass.
pub fn aggregate(records: &[Record]) -> WindowResult {
    let mut result = WindowResult::empty();
    if records.is_empty() {
        return result;
    }

    let mut temp_sum = 0.0;
    let mut precip_sum = 0.0;
    let mut wind_sum = 0.0;

    for record in records {
        temp_sum += record.mid_temp();
        precip_sum += record.precipitation;
        wind_sum += record.wind;
        result.max_temp = result.max_temp.max(record.temp_max);
        result.min_temp = result.min_temp.min(record.temp_min);
    }

    let count = records.len() as f64;
    result.count = records.len();
    result.mean_temp = temp_sum / count;
    result.mean_precip = precip_sum / count;
    result.mean_wind = wind_sum / count;
    result
}

/// Returns the suffix of `records` dated on or after `last date - days`.
///
/// `records` must be in non-decreasing date order, which the store
/// guarantees. Dates too early to subtract from keep the whole slice.
pub fn trailing(records: &[Record], days: u32) -> &[Record] {
    let Some(last) = records.last() else {
        return records;
    };

    match last.date.checked_sub_days(Days::new(u64::from(days))) {
        Some(cutoff) => {
            let start = records.partition_point(|r| r.date < cutoff);
            &records[start..]
        }
        None => records,
    }
}
