pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod repositories;
pub(crate) mod services;
pub(crate) mod tasks;

#[cfg(test)]
mod test_support;

use std::sync::Arc;
use std::time::Duration;

use crate::core::config::{LogReaderMode, Settings};
use crate::core::{redis::RedisHandle, state::AppState, telemetry};
use crate::services::mailer::{self, MailSender};
use crate::services::notice::PlainNoticeRenderer;
use crate::services::platform::{LogReader, PgPlatform};
use crate::tasks::scheduler::{self, RunLock, SweepOutcome};
use crate::tasks::suspended_groups::{Collaborators, SuspendedGroupReconciler, SweepOptions};

/// Runs the sweep on its interval until Ctrl+C or SIGTERM.
pub async fn run_worker() -> anyhow::Result<()> {
    let state = bootstrap().await?;
    let reconciler = build_reconciler(&state)?;
    let lock = run_lock(&state);
    let period = Duration::from_secs(state.settings().sweep().interval_seconds);

    let result =
        scheduler::run(reconciler, lock, period, core::shutdown::watch_shutdown()).await;

    state.redis().disconnect().await;
    tracing::info!("Redis disconnected");

    result
}

/// Runs a single sweep. Fails when the run fails or any course could not be
/// processed, so an external scheduler sees the outcome in the exit status.
pub async fn run_once() -> anyhow::Result<()> {
    let state = bootstrap().await?;
    let reconciler = build_reconciler(&state)?;
    let lock = run_lock(&state);

    let outcome = scheduler::run_once(&reconciler, &lock).await;

    state.redis().disconnect().await;

    match outcome {
        SweepOutcome::Completed(report) if report.courses_failed > 0 => {
            anyhow::bail!("{} course(s) failed during the group sweep", report.courses_failed)
        }
        SweepOutcome::Completed(report) => {
            if report.log_reader_missing {
                tracing::warn!("SWEEP_LOG_READER is none; nothing was swept");
            }
            Ok(())
        }
        SweepOutcome::Skipped => Ok(()),
        SweepOutcome::Failed(err) => Err(err),
    }
}

async fn bootstrap() -> anyhow::Result<AppState> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let db_pool = db::init_pool(&settings).await?;
    if settings.runtime().run_migrations {
        db::run_migrations(&db_pool).await?;
    }

    let redis = RedisHandle::new(settings.redis().redis_url());
    if settings.redis().lock_enabled {
        if let Err(err) = redis.connect().await {
            tracing::error!(error = %err, "Failed to connect to Redis; running without lock");
        } else {
            tracing::info!("Redis connected successfully");
        }
    }

    tracing::info!(
        environment = %settings.runtime().environment.as_str(),
        interval_seconds = settings.sweep().interval_seconds,
        lookback_seconds = settings.sweep().lookback_seconds,
        "Suspended group sweep starting"
    );

    Ok(AppState::new(settings, db_pool, redis))
}

fn build_reconciler(state: &AppState) -> anyhow::Result<SuspendedGroupReconciler> {
    let settings = state.settings();
    let platform = Arc::new(PgPlatform::new(state.db().clone()));

    let log_reader: Option<Arc<dyn LogReader>> = match settings.sweep().log_reader {
        LogReaderMode::Database => Some(platform.clone()),
        LogReaderMode::None => None,
    };

    let collaborators = Collaborators {
        log_reader,
        contexts: platform.clone(),
        suspensions: platform.clone(),
        memberships: platform.clone(),
        roles: platform,
        notifier: mailer::notifier_from_settings(settings, state.db())?,
        renderer: Arc::new(PlainNoticeRenderer),
    };

    Ok(SuspendedGroupReconciler::new(
        collaborators,
        SweepOptions::from_settings(settings),
        MailSender::from_settings(settings),
    ))
}

fn run_lock(state: &AppState) -> RunLock {
    if !state.settings().redis().lock_enabled {
        return RunLock::disabled();
    }

    // A crashed run must not block the next tick.
    let ttl = Duration::from_secs(state.settings().sweep().interval_seconds);
    RunLock::new(Some(state.redis().clone()), ttl)
}
