//! Periodic upgrade scanner.
//!
//! Runs [`Bot::scan`] on a fixed interval until stopped.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::commands::Bot;

/// Repeating scan task, not yet started.
pub struct UpgradeScanner {
    bot: Arc<Bot>,
    period: Duration,
}

/// A running scanner.
pub struct ScannerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl UpgradeScanner {
    pub fn new(bot: Arc<Bot>, period: Duration) -> Self {
        Self { bot, period }
    }

    /// Spawn the scan loop on the current runtime.
    pub fn start(self) -> ScannerHandle {
        let (shutdown, rx) = watch::channel(false);
        let task = tokio::spawn(self.run(rx));
        ScannerHandle { shutdown, task }
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Starting upgrade scanner every {:?}", self.period);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.bot.scan(Utc::now().timestamp()).await {
                        Ok(done) if !done.is_empty() => {
                            info!("Scan completed {} upgrades", done.len());
                        }
                        Ok(_) => debug!("Scan found nothing due"),
                        Err(e) => error!("Upgrade scan failed: {}", e),
                    }
                }
                _ = shutdown.changed() => {
                    info!("Upgrade scanner stopped");
                    break;
                }
            }
        }
    }
}

impl ScannerHandle {
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Signal the loop to exit and wait for it.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            error!("Upgrade scanner task failed: {}", e);
        }
    }
}
