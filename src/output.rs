//! Text and JSON rendering of statistics, records and daemon updates.

use anyhow::Result;

use crate::analysis::window::{Summary, WindowResult};
use crate::daemon::DailyUpdate;
use crate::record::Record;

fn stats_lines(heading: &str, stats: &WindowResult) -> String {
    format!(
        "{heading}\n\
         Overall Average Temperature: {:.2}C\n\
         Overall Average Precipitation: {:.2} mm\n\
         Overall Maximum Temperature Recorded: {:.1}C\n\
         Overall Minimum Temperature Recorded: {:.1}C",
        stats.mean_temp, stats.mean_precip, stats.max_temp, stats.min_temp
    )
}

/// Report for the whole loaded series.
pub fn render_overall(source: &str, summary: &Summary) -> String {
    match summary {
        Summary::Observed(stats) => stats_lines(&format!("Statistics for entire \"{source}\""), stats),
        Summary::NoData => "No data found".to_string(),
    }
}

/// Report for a date range query.
pub fn render_range(start: &str, end: &str, summary: &Summary) -> String {
    match summary {
        Summary::Observed(stats) => stats_lines(&format!("Statistics for range {start} - {end}"), stats),
        Summary::NoData => "No data found for the specified date range".to_string(),
    }
}

pub fn render_record(record: &Record) -> String {
    format!(
        "Date: {}, Precipitation: {}, Temp Max: {}, Temp Min: {}, Wind: {}, Weather: {}",
        record.date, record.precipitation, record.temp_max, record.temp_min, record.wind, record.weather
    )
}

pub fn render_update(update: &DailyUpdate) -> String {
    let r = &update.record;
    format!(
        "Updated Weather Data for {}: Precipitation: {:.2} mm, Max Temp: {:.2} C, \
         Min Temp: {:.2} C, Wind: {:.2} km/h, Predicted Weather: {}",
        r.date, r.precipitation, r.temp_max, r.temp_min, r.wind, r.weather
    )
}

/// Serializes an update as a single JSON line.
pub fn update_json(update: &DailyUpdate) -> Result<String> {
    Ok(serde_json::to_string(update)?)
}
