use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::loader::ViewDataLoader;

/// Periodic `refresh()` of a loader while enabled.
///
/// Each tick spawns its own refresh, so a tick landing on an in-flight fetch
/// supersedes it like any other refresh. Dropping the handle disables it.
pub struct AutoRefresh {
    task: Option<JoinHandle<()>>,
    interval: Duration,
}

impl AutoRefresh {
    /// Start ticking every `interval`, first tick one interval from now.
    /// A zero interval yields a disabled handle.
    pub fn enable(loader: ViewDataLoader, interval: Duration) -> Self {
        if interval.is_zero() {
            tracing::warn!("Auto-refresh: zero interval, not scheduling");
            return Self {
                task: None,
                interval,
            };
        }

        tracing::info!(
            "Auto-refresh: {} view every {:?}",
            loader.page_type(),
            interval
        );
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                tracing::info!("Auto-refresh: refreshing {} view", loader.page_type());
                let loader = loader.clone();
                tokio::spawn(async move { loader.refresh().await });
            }
        });

        Self {
            task: Some(task),
            interval,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.task.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stop scheduling. On a multi-thread runtime a tick that is already
    /// being handled may still spawn one last refresh.
    pub fn disable(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::info!("Auto-refresh: disabled");
        }
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.disable();
    }
}
