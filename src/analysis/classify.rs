use crate::analysis::window::WindowResult;
use crate::record::WeatherLabel;

/// Measurements of a day that has not been labeled yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub precipitation: f64,
    pub temp_max: f64,
    pub temp_min: f64,
    pub wind: f64,
}

/// Reference statistics a candidate is compared against.
///
/// Built from the trailing window *before* the candidate is stored. An empty
/// window yields all zeros rather than the aggregation sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Baseline {
    pub mean_precip: f64,
    pub mean_temp: f64,
    pub max_temp: f64,
    pub mean_wind: f64,
}

impl From<&WindowResult> for Baseline {
    fn from(window: &WindowResult) -> Self {
        if window.is_empty() {
            return Self::default();
        }
        Self {
            mean_precip: window.mean_precip,
            mean_temp: window.mean_temp,
            max_temp: window.max_temp,
            mean_wind: window.mean_wind,
        }
    }
}

/// Labels a candidate day against its baseline.
///
/// Rules are checked in priority order and the first match wins:
///
/// | Label   | Condition                                                          |
/// |---------|--------------------------------------------------------------------|
/// | snow    | precip > mean precip + 5 and max < window max - 5                  |
/// | rain    | precip > mean precip + 2 and wind < mean wind + 2                  |
/// | sunny   | precip < mean precip and max, min both > mean temp + 5             |
/// | windy   | wind > mean wind + 5 and precip < mean precip                      |
/// | drizzle | precip > mean precip and max < mean temp                           |
/// | cloudy  | otherwise                                                          |
pub fn classify(candidate: &Candidate, baseline: &Baseline) -> WeatherLabel {
    let c = candidate;
    let b = baseline;

    if c.precipitation > b.mean_precip + 5.0 && c.temp_max < b.max_temp - 5.0 {
        WeatherLabel::Snow
    } else if c.precipitation > b.mean_precip + 2.0 && c.wind < b.mean_wind + 2.0 {
        WeatherLabel::Rain
    } else if c.precipitation < b.mean_precip
        && c.temp_max > b.mean_temp + 5.0
        && c.temp_min > b.mean_temp + 5.0
    {
        WeatherLabel::Sunny
    } else if c.wind > b.mean_wind + 5.0 && c.precipitation < b.mean_precip {
        WeatherLabel::Windy
    } else if c.precipitation > b.mean_precip && c.temp_max < b.mean_temp {
        WeatherLabel::Drizzle
    } else {
        WeatherLabel::Cloudy
    }
}
