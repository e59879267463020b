//! Poll scheduler: steady polling plus a fast probe after every action.
//!
//! `schedule()` restarts the cadence from zero: it aborts whatever timer is
//! running, fires one probe after the short delay, then ticks every period.
//! Calling it repeatedly never stacks timers.

use std::time::Duration;

use playerlink_core::config::PollConfig;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// One request to reconcile with the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTick;

pub struct PollScheduler {
    period: Duration,
    probe_delay: Duration,
    tx: mpsc::UnboundedSender<PollTick>,
    task: Option<JoinHandle<()>>,
}

impl PollScheduler {
    /// Create an idle scheduler and the receiver its ticks arrive on.
    pub fn new(config: &PollConfig) -> (Self, mpsc::UnboundedReceiver<PollTick>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            period: config.period(),
            probe_delay: config.probe_delay(),
            tx,
            task: None,
        };
        (scheduler, rx)
    }

    /// (Re)arm the probe and the recurring timer. Must run inside a tokio runtime.
    pub fn schedule(&mut self) {
        self.cancel();

        let tx = self.tx.clone();
        let period = self.period;
        let probe_delay = self.probe_delay;
        self.task = Some(tokio::spawn(async move {
            let start = Instant::now();

            time::sleep(probe_delay).await;
            if tx.send(PollTick).is_err() {
                return;
            }

            let mut interval = time::interval_at(start + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(PollTick).is_err() {
                    return;
                }
            }
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
