//! CSV data source for the historical series.
//!
//! Expects a header row with `date,precipitation,temp_max,temp_min,wind,weather`;
//! extra columns are ignored. Loading is all-or-nothing: a store is returned
//! only if every row was read, parsed and accepted in order.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::SeriesError;
use crate::record::{Record, parse_date};
use crate::store::{DatePolicy, TimeSeriesStore};

/// A single row as it appears in the CSV file.
#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    precipitation: f64,
    temp_max: f64,
    temp_min: f64,
    wind: f64,
    weather: String,
}

impl CsvRow {
    fn into_record(self) -> Result<Record, SeriesError> {
        Ok(Record::new(
            parse_date(&self.date)?,
            self.precipitation,
            self.temp_max,
            self.temp_min,
            self.wind,
            self.weather,
        ))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Accept consecutive rows with the same date instead of rejecting them.
    pub allow_duplicate_dates: bool,
}

impl LoadOptions {
    fn policy(&self) -> DatePolicy {
        if self.allow_duplicate_dates {
            DatePolicy::AllowTies
        } else {
            DatePolicy::Strict
        }
    }
}

/// Loads the CSV file at `path` into a new store.
///
/// # Errors
///
/// [`SeriesError::DataSource`] if the file can't be read or a field can't be
/// decoded, [`SeriesError::MalformedRow`] if a row has a bad date or is out of
/// date order.
pub fn load_csv(path: impl AsRef<Path>, options: LoadOptions) -> Result<TimeSeriesStore, SeriesError> {
    let path = path.as_ref();
    let source_name = path.display().to_string();
    debug!(path = %source_name, "Opening weather CSV");

    let reader = csv::Reader::from_path(path).map_err(|source| SeriesError::DataSource {
        source_name: source_name.clone(),
        source,
    })?;
    read_rows(reader, &source_name, options)
}

/// Same as [`load_csv`] for any reader; `source_name` is used in errors.
pub fn load_from_reader<R: Read>(
    reader: R,
    source_name: &str,
    options: LoadOptions,
) -> Result<TimeSeriesStore, SeriesError> {
    read_rows(csv::Reader::from_reader(reader), source_name, options)
}

fn read_rows<R: Read>(
    mut reader: csv::Reader<R>,
    source_name: &str,
    options: LoadOptions,
) -> Result<TimeSeriesStore, SeriesError> {
    let data_source = |source| SeriesError::DataSource {
        source_name: source_name.to_string(),
        source,
    };

    let headers = reader.headers().map_err(data_source)?.clone();
    let store = TimeSeriesStore::new();
    let policy = options.policy();

    for result in reader.records() {
        let raw = result.map_err(data_source)?;
        let line = raw.position().map_or(0, |p| p.line());
        let row: CsvRow = raw.deserialize(Some(&headers)).map_err(data_source)?;

        row.into_record()
            .and_then(|record| store.append_with(record, policy))
            .map_err(|e| SeriesError::MalformedRow {
                source_name: source_name.to_string(),
                line,
                source: Box::new(e),
            })?;
    }

    info!(source = source_name, rows = store.len(), "Weather data loaded");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::WeatherLabel;

    const HEADER: &str = "date,precipitation,temp_max,temp_min,wind,weather\n";

    fn load(body: &str, options: LoadOptions) -> Result<TimeSeriesStore, SeriesError> {
        let csv = format!("{HEADER}{body}");
        load_from_reader(csv.as_bytes(), "test.csv", options)
    }

    #[test]
    fn test_load_rows_in_file_order() {
        let store = load(
            "2012-01-01,0.0,12.8,5.0,4.7,drizzle\n2012-01-02,10.9,10.6,2.8,4.5,rain\n",
            LoadOptions::default(),
        )
        .unwrap();

        let records = store.snapshot();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].weather, WeatherLabel::Drizzle);
        assert_eq!(records[1].precipitation, 10.9);
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let csv = "date,precipitation,temp_max,temp_min,wind,weather,station\n\
                   2012-01-01,0.0,12.8,5.0,4.7,sun,SEA\n";
        let store = load_from_reader(csv.as_bytes(), "extra.csv", LoadOptions::default()).unwrap();
        assert_eq!(store.snapshot()[0].weather, WeatherLabel::Other("sun".into()));
    }

    #[test]
    fn test_empty_file_loads_empty_store() {
        let store = load("", LoadOptions::default()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_bad_date_names_row() {
        let err = load(
            "2012-01-01,0.0,12.8,5.0,4.7,rain\n2012/01/02,0.0,12.8,5.0,4.7,rain\n",
            LoadOptions::default(),
        )
        .unwrap_err();

        match err {
            SeriesError::MalformedRow { line, source, .. } => {
                assert_eq!(line, 3);
                assert!(matches!(*source, SeriesError::DateParse { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_field_is_data_source_error() {
        let err = load("2012-01-01,lots,12.8,5.0,4.7,rain\n", LoadOptions::default()).unwrap_err();
        assert!(matches!(err, SeriesError::DataSource { .. }));
    }

    #[test]
    fn test_duplicate_dates_need_opt_in() {
        let body = "2012-01-01,0.0,12.8,5.0,4.7,rain\n2012-01-01,1.0,11.0,4.0,3.0,rain\n";

        let err = load(body, LoadOptions::default()).unwrap_err();
        assert!(matches!(err, SeriesError::MalformedRow { .. }));

        let store = load(
            body,
            LoadOptions {
                allow_duplicate_dates: true,
            },
        )
        .unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_out_of_order_rejected_even_with_ties_allowed() {
        let body = "2012-01-02,0.0,12.8,5.0,4.7,rain\n2012-01-01,1.0,11.0,4.0,3.0,rain\n";
        let err = load(
            body,
            LoadOptions {
                allow_duplicate_dates: true,
            },
        )
        .unwrap_err();
        assert!(matches!(err, SeriesError::MalformedRow { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = load_csv("/nonexistent/weather.csv", LoadOptions::default()).unwrap_err();
        assert!(matches!(err, SeriesError::DataSource { .. }));
    }
}
