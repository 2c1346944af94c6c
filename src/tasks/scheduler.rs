use anyhow::Result;
use tokio::sync::watch;
use tokio::time::{interval, Duration, MissedTickBehavior};
use uuid::Uuid;

use crate::core::metrics::{RUNS_TOTAL, RUN_FAILURES_TOTAL};
use crate::core::redis::RedisHandle;
use crate::tasks::suspended_groups::{RunReport, SuspendedGroupReconciler};

const LOCK_KEY: &str = "group-sweep:run-lock";

#[derive(Debug)]
pub(crate) enum SweepOutcome {
    Completed(RunReport),
    Failed(anyhow::Error),
    /// Another worker held the run lock.
    Skipped,
}

/// Serialises runs across workers. Without Redis every run proceeds.
pub(crate) struct RunLock {
    redis: Option<RedisHandle>,
    ttl_ms: u64,
}

impl RunLock {
    pub(crate) fn new(redis: Option<RedisHandle>, ttl: Duration) -> Self {
        Self { redis, ttl_ms: ttl.as_millis().min(u64::MAX as u128) as u64 }
    }

    pub(crate) fn disabled() -> Self {
        Self { redis: None, ttl_ms: 0 }
    }
}

pub(crate) async fn run(
    reconciler: SuspendedGroupReconciler,
    lock: RunLock,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let mut tick = interval(period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(period_seconds = period.as_secs(), "Group sweep scheduler started");

    loop {
        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            _ = shutdown.changed() => break,
            _ = tick.tick() => {
                if let SweepOutcome::Failed(err) = run_once(&reconciler, &lock).await {
                    tracing::error!(error = %format!("{err:#}"), "Group sweep failed");
                }
            }
        }
    }

    tracing::info!("Group sweep scheduler stopped");
    Ok(())
}

pub(crate) async fn run_once(
    reconciler: &SuspendedGroupReconciler,
    lock: &RunLock,
) -> SweepOutcome {
    let token = Uuid::new_v4().to_string();

    let held = match &lock.redis {
        Some(redis) => match redis.try_lock(LOCK_KEY, &token, lock.ttl_ms).await {
            Ok(true) => true,
            Ok(false) => {
                tracing::info!("Another worker holds the group sweep lock; skipping this run");
                return SweepOutcome::Skipped;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to take group sweep lock; running unlocked");
                false
            }
        },
        None => false,
    };

    let outcome = match reconciler.run().await {
        Ok(report) => {
            metrics::counter!(RUNS_TOTAL).increment(1);
            SweepOutcome::Completed(report)
        }
        Err(err) => {
            metrics::counter!(RUN_FAILURES_TOTAL).increment(1);
            SweepOutcome::Failed(err)
        }
    };

    if held {
        if let Some(redis) = &lock.redis {
            match redis.unlock(LOCK_KEY, &token).await {
                Ok(true) => {}
                Ok(false) => tracing::warn!("Group sweep lock expired before the run finished"),
                Err(err) => tracing::warn!(error = %err, "Failed to release group sweep lock"),
            }
        }
    }

    outcome
}
