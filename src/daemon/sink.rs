use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::info;

use super::DailyUpdate;

/// Receives each update the daemon appends.
///
/// Errors are reported by the daemon but never undo the append.
#[async_trait]
pub trait UpdateSink: Send + Sync {
    async fn publish(&self, update: &DailyUpdate) -> Result<()>;
}

/// Logs every update at `info`.
pub struct LogSink;

#[async_trait]
impl UpdateSink for LogSink {
    async fn publish(&self, update: &DailyUpdate) -> Result<()> {
        let r = &update.record;
        info!(
            cycle = update.cycle,
            date = %r.date,
            precipitation = r.precipitation,
            temp_max = r.temp_max,
            temp_min = r.temp_min,
            wind = r.wind,
            weather = %r.weather,
            "Weather updated"
        );
        Ok(())
    }
}

/// Forwards updates to a channel, e.g. for a presentation task.
pub struct ChannelSink(mpsc::UnboundedSender<DailyUpdate>);

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<DailyUpdate>) -> Self {
        Self(tx)
    }

    /// Creates a sink together with the receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DailyUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self(tx), rx)
    }
}

#[async_trait]
impl UpdateSink for ChannelSink {
    async fn publish(&self, update: &DailyUpdate) -> Result<()> {
        self.0
            .send(update.clone())
            .map_err(|_| anyhow::anyhow!("update receiver was dropped"))
    }
}
