//! Daily weather observations and the `YYYY-MM-DD` date codec.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::SeriesError;

/// The only date format accepted at the store boundary.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` string into a calendar date.
///
/// # Errors
///
/// Returns [`SeriesError::DateParse`] unless `input` is exactly ten
/// characters of the form `YYYY-MM-DD` naming a real calendar day. Padding,
/// signs and one-digit fields are rejected so stored dates keep their
/// lexicographic ordering.
pub fn parse_date(input: &str) -> Result<NaiveDate, SeriesError> {
    if !has_date_shape(input) {
        return Err(SeriesError::DateParse {
            input: input.to_string(),
            source: None,
        });
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|source| SeriesError::DateParse {
        input: input.to_string(),
        source: Some(source),
    })
}

fn has_date_shape(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Weather label attached to a record.
///
/// Historical data may carry labels outside the classifier's set; those are
/// kept verbatim in [`WeatherLabel::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WeatherLabel {
    Snow,
    Rain,
    Sunny,
    Windy,
    Drizzle,
    Cloudy,
    Other(String),
}

impl WeatherLabel {
    pub fn as_str(&self) -> &str {
        match self {
            WeatherLabel::Snow => "snow",
            WeatherLabel::Rain => "rain",
            WeatherLabel::Sunny => "sunny",
            WeatherLabel::Windy => "windy",
            WeatherLabel::Drizzle => "drizzle",
            WeatherLabel::Cloudy => "cloudy",
            WeatherLabel::Other(label) => label,
        }
    }
}

impl From<&str> for WeatherLabel {
    fn from(value: &str) -> Self {
        match value.trim() {
            "snow" => WeatherLabel::Snow,
            "rain" => WeatherLabel::Rain,
            "sunny" => WeatherLabel::Sunny,
            "windy" => WeatherLabel::Windy,
            "drizzle" => WeatherLabel::Drizzle,
            "cloudy" => WeatherLabel::Cloudy,
            other => WeatherLabel::Other(other.to_string()),
        }
    }
}

impl From<String> for WeatherLabel {
    fn from(value: String) -> Self {
        WeatherLabel::from(value.as_str())
    }
}

impl From<WeatherLabel> for String {
    fn from(value: WeatherLabel) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for WeatherLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One daily observation. Records are never modified once stored; the store
/// only hands out copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub date: NaiveDate,
    /// Millimetres.
    pub precipitation: f64,
    /// Degrees Celsius. Not guaranteed to be >= `temp_min`.
    pub temp_max: f64,
    pub temp_min: f64,
    /// Kilometres per hour.
    pub wind: f64,
    pub weather: WeatherLabel,
}

impl Record {
    pub fn new(
        date: NaiveDate,
        precipitation: f64,
        temp_max: f64,
        temp_min: f64,
        wind: f64,
        weather: impl Into<WeatherLabel>,
    ) -> Self {
        Self {
            date,
            precipitation,
            temp_max,
            temp_min,
            wind,
            weather: weather.into(),
        }
    }

    /// Midpoint of the day's max and min temperature.
    pub fn mid_temp(&self) -> f64 {
        (self.temp_max + self.temp_min) / 2.0
    }
}
