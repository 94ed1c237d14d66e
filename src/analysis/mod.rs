//! Windowed statistics and rule-based weather classification.
//!
//! [`window`] aggregates any ordered run of records and selects the trailing
//! window; [`classify`] turns a candidate day plus a window baseline into a
//! weather label.

pub mod classify;
pub mod window;

pub use classify::{Baseline, Candidate, classify};
pub use window::{DEFAULT_WINDOW_DAYS, Summary, WindowResult, aggregate, trailing};
