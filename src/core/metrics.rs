use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::core::config::Settings;

pub(crate) const RUNS_TOTAL: &str = "group_sweep_runs_total";
pub(crate) const RUN_FAILURES_TOTAL: &str = "group_sweep_run_failures_total";
pub(crate) const COURSE_FAILURES_TOTAL: &str = "group_sweep_course_failures_total";
pub(crate) const MEMBERSHIPS_REMOVED_TOTAL: &str = "group_sweep_memberships_removed_total";
pub(crate) const NOTIFICATIONS_SENT_TOTAL: &str = "group_sweep_notifications_sent_total";

/// Installs the Prometheus recorder and its scrape listener. Must be called
/// from inside the tokio runtime.
pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled {
        return Ok(());
    }

    let addr: SocketAddr = settings.telemetry().prometheus_listen_addr.parse().map_err(|_| {
        anyhow::anyhow!(
            "invalid PROMETHEUS_LISTEN_ADDR: {}",
            settings.telemetry().prometheus_listen_addr
        )
    })?;

    PrometheusBuilder::new().with_http_listener(addr).install()?;
    describe();

    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}

fn describe() {
    metrics::describe_counter!(RUNS_TOTAL, "Completed sweep runs");
    metrics::describe_counter!(RUN_FAILURES_TOTAL, "Sweep runs that could not list courses");
    metrics::describe_counter!(COURSE_FAILURES_TOTAL, "Courses whose processing failed");
    metrics::describe_counter!(MEMBERSHIPS_REMOVED_TOTAL, "Group memberships removed");
    metrics::describe_counter!(NOTIFICATIONS_SENT_TOTAL, "Instructor notifications sent");
}
