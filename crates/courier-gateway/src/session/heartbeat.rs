//! Heartbeat timer
//!
//! A cancellable repeating task that only enqueues ticks. Deciding whether a
//! tick sends a heartbeat or forces a reconnect happens in the session.

use super::SessionEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Owned heartbeat timer; at most one tick task runs at a time
#[derive(Debug, Default)]
pub(crate) struct HeartbeatTimer {
    /// Incremented on every arm; ticks carry the epoch that produced them
    epoch: u64,
    interval: Option<Duration>,
    task: Option<JoinHandle<()>>,
}

impl HeartbeatTimer {
    /// Start ticking every `interval`, cancelling any running timer first
    ///
    /// The first tick fires one full interval after arming.
    pub(crate) fn arm(&mut self, interval: Duration, tx: mpsc::UnboundedSender<SessionEvent>) {
        self.cancel();
        self.epoch += 1;
        self.interval = Some(interval);

        let epoch = self.epoch;
        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tx.send(SessionEvent::HeartbeatTick { epoch }).is_err() {
                    break;
                }
            }
        }));

        tracing::debug!(epoch, interval_ms = interval.as_millis(), "Heartbeat timer armed");
    }

    /// Stop the running timer, if any
    pub(crate) fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!(epoch = self.epoch, "Heartbeat timer cancelled");
        }
        self.interval = None;
    }

    /// Check whether a tick came from the running timer
    pub(crate) fn is_current(&self, epoch: u64) -> bool {
        self.task.is_some() && epoch == self.epoch
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.task.is_some()
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }

    pub(crate) fn interval(&self) -> Option<Duration> {
        self.interval
    }
}

impl Drop for HeartbeatTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
