//! Background task that extends the series with a simulated next day.
//!
//! Each tick the daemon reads the trailing window from the store, draws a
//! candidate day from its [`RandomSource`], labels it against the window
//! baseline, appends it and publishes a [`DailyUpdate`] to its
//! [`UpdateSink`]. Cycle failures are logged and never end the task; only
//! [`UpdateDaemon::stop`] does.

pub mod random;
pub mod sink;

pub use random::{RandomSource, StdRandom};
pub use sink::{ChannelSink, LogSink, UpdateSink};

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

use crate::analysis::{Baseline, Candidate, WindowResult, aggregate, classify};
use crate::config::SimulationConfig;
use crate::error::{DaemonError, SeriesError};
use crate::record::Record;
use crate::store::TimeSeriesStore;

/// Event published once per successful cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyUpdate {
    pub cycle: u64,
    pub record: Record,
    /// Window statistics the record was classified against.
    pub baseline: WindowResult,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Appended(DailyUpdate),
    /// The store held no data to extend.
    Skipped,
}

/// Draws one candidate day within the configured bounds.
pub fn synthesize(config: &SimulationConfig, random: &mut dyn RandomSource) -> Candidate {
    let precipitation = random.uniform(config.precipitation.lo, config.precipitation.hi);
    let temp_max = random.uniform(config.temp_max.lo, config.temp_max.hi);
    let temp_min = random.uniform(config.temp_min_floor, temp_max);
    let wind = random.uniform(config.wind.lo, config.wind.hi);

    Candidate {
        precipitation,
        temp_max,
        temp_min,
        wind,
    }
}

/// Runs a single update against `store`.
///
/// The window and the last date come from one read of the store, so the
/// candidate is never part of its own baseline.
///
/// # Errors
///
/// Returns [`SeriesError::DateOverflow`] if the last date has no successor and
/// [`SeriesError::InvalidRecord`] if another writer appended in between.
pub fn run_cycle(
    store: &TimeSeriesStore,
    config: &SimulationConfig,
    random: &mut dyn RandomSource,
    cycle: u64,
) -> Result<CycleOutcome, SeriesError> {
    let window = store.trailing_window(config.window_days);
    let Some(last) = window.last().map(|r| r.date) else {
        return Ok(CycleOutcome::Skipped);
    };

    let candidate = synthesize(config, random);
    let date = last.succ_opt().ok_or(SeriesError::DateOverflow(last))?;

    let baseline = aggregate(&window);
    let weather = classify(&candidate, &Baseline::from(&baseline));

    let record = Record::new(
        date,
        candidate.precipitation,
        candidate.temp_max,
        candidate.temp_min,
        candidate.wind,
        weather,
    );
    store.append(record.clone())?;

    Ok(CycleOutcome::Appended(DailyUpdate {
        cycle,
        record,
        baseline,
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    Idle,
    Running,
    Stopped,
}

struct Worker {
    store: Arc<TimeSeriesStore>,
    config: SimulationConfig,
    random: Box<dyn RandomSource>,
    sink: Arc<dyn UpdateSink>,
    cycles: u64,
}

impl Worker {
    async fn tick(&mut self) {
        self.cycles += 1;

        match run_cycle(&self.store, &self.config, self.random.as_mut(), self.cycles) {
            Ok(CycleOutcome::Appended(update)) => {
                debug!(cycle = update.cycle, date = %update.record.date, "Cycle appended record");
                if let Err(e) = self.sink.publish(&update).await {
                    warn!(cycle = update.cycle, error = %e, "Failed to publish weather update");
                }
            }
            Ok(CycleOutcome::Skipped) => {
                warn!(cycle = self.cycles, "No historical data available to simulate weather update");
            }
            Err(e) => {
                error!(cycle = self.cycles, error = %e, "Weather update cycle failed");
            }
        }
    }
}

/// Owns the background update task.
///
/// `Idle -> Running -> Stopped`, one way. A stopped daemon cannot be
/// restarted; build a new one instead.
pub struct UpdateDaemon {
    state: DaemonState,
    worker: Option<Worker>,
    stop_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl UpdateDaemon {
    pub fn new(
        store: Arc<TimeSeriesStore>,
        config: SimulationConfig,
        random: impl RandomSource + 'static,
        sink: impl UpdateSink + 'static,
    ) -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self {
            state: DaemonState::Idle,
            worker: Some(Worker {
                store,
                config,
                random: Box::new(random),
                sink: Arc::new(sink),
                cycles: 0,
            }),
            stop_tx,
            task: None,
        }
    }

    pub fn state(&self) -> DaemonState {
        self.state
    }

    /// Spawns the update loop on the current Tokio runtime. The first cycle
    /// runs immediately.
    pub fn start(&mut self) -> Result<(), DaemonError> {
        match self.state {
            DaemonState::Running => return Err(DaemonError::AlreadyRunning),
            DaemonState::Stopped => return Err(DaemonError::AlreadyStopped),
            DaemonState::Idle => {}
        }
        let Some(worker) = self.worker.take() else {
            return Err(DaemonError::AlreadyStopped);
        };

        info!(
            tick_ms = worker.config.tick_ms,
            window_days = worker.config.window_days,
            "Starting weather update daemon"
        );
        let stop_rx = self.stop_tx.subscribe();
        self.task = Some(tokio::spawn(run(worker, stop_rx)));
        self.state = DaemonState::Running;
        Ok(())
    }

    /// Signals the loop to stop and waits for an in-flight cycle to finish.
    ///
    /// Once this returns no further cycle runs and no further update is
    /// published.
    pub async fn stop(&mut self) {
        self.stop_tx.send_replace(true);
        self.state = DaemonState::Stopped;
        self.worker = None;

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!(error = %e, "Update daemon task ended abnormally");
            }
        }
    }
}

impl Drop for UpdateDaemon {
    fn drop(&mut self) {
        self.stop_tx.send_replace(true);
    }
}

async fn run(mut worker: Worker, mut stop_rx: watch::Receiver<bool>) {
    let period = worker.config.tick().max(Duration::from_millis(1));
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = stop_rx.changed() => break,
            _ = ticker.tick() => {}
        }
        if *stop_rx.borrow() {
            break;
        }
        worker.tick().await;
    }

    info!(cycles = worker.cycles, "Weather update daemon stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{WeatherLabel, parse_date};

    /// Replays a fixed list of values, cycling when exhausted.
    struct Scripted {
        values: Vec<f64>,
        next: usize,
    }

    impl Scripted {
        fn new(values: &[f64]) -> Self {
            Self {
                values: values.to_vec(),
                next: 0,
            }
        }
    }

    impl RandomSource for Scripted {
        fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
            let v = self.values[self.next % self.values.len()];
            self.next += 1;
            v.clamp(lo, hi.max(lo))
        }
    }

    fn week_store() -> TimeSeriesStore {
        let store = TimeSeriesStore::new();
        let start = parse_date("2024-02-23").unwrap();
        for i in 0..7 {
            let date = start + chrono::Days::new(i);
            store
                .append(Record::new(date, 2.0, 15.0, 5.0, 5.0, "rain"))
                .unwrap();
        }
        store
    }

    #[test]
    fn test_synthesize_draws_in_order() {
        let mut random = Scripted::new(&[12.0, 30.0, 25.0, 8.0]);
        let c = synthesize(&SimulationConfig::default(), &mut random);
        assert_eq!(
            c,
            Candidate {
                precipitation: 12.0,
                temp_max: 30.0,
                temp_min: 25.0,
                wind: 8.0,
            }
        );
    }

    #[test]
    fn test_synthesize_caps_min_at_max() {
        let mut random = Scripted::new(&[0.0, 3.0, 35.0, 0.0]);
        let c = synthesize(&SimulationConfig::default(), &mut random);
        assert!(c.temp_min <= c.temp_max);
    }

    #[test]
    fn test_cycle_on_empty_store_skips() {
        let store = TimeSeriesStore::new();
        let mut random = Scripted::new(&[1.0]);
        let outcome = run_cycle(&store, &SimulationConfig::default(), &mut random, 1).unwrap();
        assert_eq!(outcome, CycleOutcome::Skipped);
        assert!(store.is_empty());
    }

    #[test]
    fn test_cycle_appends_next_day_classified_against_prior_window() {
        let store = week_store();
        // precip 8 > 2 + 5 and max 9 < 15 - 5
        let mut random = Scripted::new(&[8.0, 9.0, 2.0, 1.0]);

        let outcome = run_cycle(&store, &SimulationConfig::default(), &mut random, 3).unwrap();
        let CycleOutcome::Appended(update) = outcome else {
            panic!("expected an appended record");
        };

        // crosses the leap day
        assert_eq!(update.record.date, parse_date("2024-03-01").unwrap());
        assert_eq!(update.record.weather, WeatherLabel::Snow);
        assert_eq!(update.cycle, 3);
        assert_eq!(update.baseline.count, 7);
        assert_eq!(update.baseline.max_temp, 15.0);
        assert_eq!(store.len(), 8);
        assert_eq!(store.snapshot().last(), Some(&update.record));
    }

    #[test]
    fn test_consecutive_cycles_extend_by_one_day() {
        let store = week_store();
        let mut random = Scripted::new(&[3.0, 20.0, 10.0, 4.0]);
        let config = SimulationConfig::default();

        for cycle in 1..=3 {
            run_cycle(&store, &config, &mut random, cycle).unwrap();
        }
        assert_eq!(store.len(), 10);
        assert_eq!(store.last_date(), Some(parse_date("2024-03-03").unwrap()));
    }

    #[test]
    fn test_cycle_reports_date_overflow() {
        let store = TimeSeriesStore::new();
        store
            .append(Record::new(chrono::NaiveDate::MAX, 0.0, 0.0, 0.0, 0.0, "rain"))
            .unwrap();
        let mut random = Scripted::new(&[1.0]);
        let err = run_cycle(&store, &SimulationConfig::default(), &mut random, 1).unwrap_err();
        assert!(matches!(err, SeriesError::DateOverflow(_)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_lifecycle_is_one_way() {
        let store = Arc::new(TimeSeriesStore::new());
        let mut daemon = UpdateDaemon::new(
            store,
            SimulationConfig::default(),
            Scripted::new(&[1.0]),
            LogSink,
        );
        assert_eq!(daemon.state(), DaemonState::Idle);

        daemon.start().unwrap();
        assert_eq!(daemon.state(), DaemonState::Running);
        assert_eq!(daemon.start(), Err(DaemonError::AlreadyRunning));

        daemon.stop().await;
        assert_eq!(daemon.state(), DaemonState::Stopped);
        assert_eq!(daemon.start(), Err(DaemonError::AlreadyStopped));
    }

    #[tokio::test]
    async fn test_stop_before_start() {
        let mut daemon = UpdateDaemon::new(
            Arc::new(TimeSeriesStore::new()),
            SimulationConfig::default(),
            Scripted::new(&[1.0]),
            LogSink,
        );
        daemon.stop().await;
        assert_eq!(daemon.state(), DaemonState::Stopped);
        assert_eq!(daemon.start(), Err(DaemonError::AlreadyStopped));
    }
}
