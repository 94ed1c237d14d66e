use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use crate::analysis::window::DEFAULT_WINDOW_DAYS;

/// Inclusive range a simulated measurement is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Bounds {
    pub lo: f64,
    pub hi: f64,
}

impl Bounds {
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }
}

/// Settings for the simulated daily update.
///
/// Loaded from a JSON file; any omitted field keeps its default:
/// ```json
/// {
///   "tick_ms": 500,
///   "window_days": 7,
///   "precipitation": { "lo": 0.0, "hi": 50.0 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub tick_ms: u64,
    pub window_days: u32,
    pub precipitation: Bounds,
    pub temp_max: Bounds,
    /// Lower bound for the minimum temperature. The upper bound is the drawn
    /// maximum temperature of the same day.
    pub temp_min_floor: f64,
    pub wind: Bounds,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_ms: 1000,
            window_days: DEFAULT_WINDOW_DAYS,
            precipitation: Bounds::new(0.0, 50.0),
            temp_max: Bounds::new(-10.0, 40.0),
            temp_min_floor: -20.0,
            wind: Bounds::new(0.0, 30.0),
        }
    }
}

impl SimulationConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_ranges() {
        let config = SimulationConfig::default();
        assert_eq!(config.tick(), Duration::from_secs(1));
        assert_eq!(config.window_days, 7);
        assert_eq!(config.precipitation, Bounds::new(0.0, 50.0));
        assert_eq!(config.temp_max, Bounds::new(-10.0, 40.0));
        assert_eq!(config.temp_min_floor, -20.0);
        assert_eq!(config.wind, Bounds::new(0.0, 30.0));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{ "tick_ms": 250, "wind": { "lo": 1.0, "hi": 2.0 } }"#)
                .unwrap();
        assert_eq!(config.tick_ms, 250);
        assert_eq!(config.wind, Bounds::new(1.0, 2.0));
        assert_eq!(config.window_days, 7);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(SimulationConfig::load("/nonexistent/weather_series.json").is_err());
    }
}
