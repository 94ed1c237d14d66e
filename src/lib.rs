pub mod analysis;
pub mod config;
pub mod daemon;
pub mod error;
pub mod loader;
pub mod output;
pub mod record;
pub mod store;

pub use error::{DaemonError, SeriesError};
pub use record::{Record, WeatherLabel};
pub use store::TimeSeriesStore;
