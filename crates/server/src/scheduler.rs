//! Background maintenance: periodic stats persistence and context cleanup.
//!
//! One tokio task owns both timers. Persistence runs on the blocking pool
//! because it does file I/O; a failed save is logged and retried on the next
//! tick. Ticks missed while a save is running are delayed, not bunched up.

use crate::cache::ContextCache;
use agentdeck_metrics::StatsService;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Handle to the running maintenance task.
#[derive(Debug)]
pub struct Scheduler {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Scheduler {
    /// Spawn the maintenance loop on the current runtime.
    ///
    /// Both timers first fire one full period after start. Pass `None` for
    /// `persist_every` when persistence is disabled.
    pub fn start(
        stats: Arc<StatsService>,
        contexts: Arc<ContextCache>,
        persist_every: Option<Duration>,
        cleanup_every: Duration,
    ) -> Self {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let cleanup_every = cleanup_every.max(Duration::from_millis(1));
            let mut cleanup = interval_at(Instant::now() + cleanup_every, cleanup_every);
            cleanup.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // With persistence off the timer still exists but never wins the
            // select; a very long period keeps it idle.
            let persist_period = persist_every
                .map(|d| d.max(Duration::from_millis(1)))
                .unwrap_or(Duration::from_secs(365 * 24 * 60 * 60));
            let mut persist = interval_at(Instant::now() + persist_period, persist_period);
            persist.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::debug!(
                target: "agentdeck::scheduler",
                persist = ?persist_every,
                cleanup = ?cleanup_every,
                "maintenance started"
            );

            loop {
                tokio::select! {
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    _ = persist.tick(), if persist_every.is_some() => {
                        let stats = Arc::clone(&stats);
                        match tokio::task::spawn_blocking(move || stats.scheduled_persistence()).await {
                            Ok(Ok(())) => {}
                            Ok(Err(e)) => tracing::warn!(
                                target: "agentdeck::scheduler",
                                error = %e,
                                "scheduled persistence failed; will retry"
                            ),
                            Err(e) => tracing::warn!(
                                target: "agentdeck::scheduler",
                                error = %e,
                                "persistence task panicked"
                            ),
                        }
                    }
                    _ = cleanup.tick() => {
                        let removed = contexts.cleanup();
                        if removed > 0 {
                            tracing::debug!(
                                target: "agentdeck::scheduler",
                                removed,
                                "expired contexts removed"
                            );
                        }
                    }
                }
            }

            tracing::debug!(target: "agentdeck::scheduler", "maintenance stopped");
        });

        Self { shutdown, handle }
    }

    /// Signal the loop to exit and wait for it. An in-flight save finishes
    /// first.
    pub async fn stop(self) {
        if self.shutdown.send(true).is_err() {
            tracing::debug!(target: "agentdeck::scheduler", "maintenance task already gone");
        }
        if let Err(e) = self.handle.await {
            tracing::warn!(target: "agentdeck::scheduler", error = ?e, "maintenance task panicked");
        }
    }
}
