use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use time::PrimitiveDateTime;

use crate::core::config::Settings;
use crate::core::metrics::{
    COURSE_FAILURES_TOTAL, MEMBERSHIPS_REMOVED_TOTAL, NOTIFICATIONS_SENT_TOTAL,
};
use crate::core::time::{format_primitive, lookback_cutoff, primitive_now_utc};
use crate::db::models::CourseContext;
use crate::services::mailer::{MailSender, Notifier, OutgoingMail};
use crate::services::notice::{InstructorNotification, NoticeRenderer, RemovedMember};
use crate::services::platform::{
    ContextResolver, LogReader, MembershipStore, RoleProvider, SuspensionProvider,
};

#[derive(Debug, Clone)]
pub(crate) struct SweepOptions {
    pub(crate) lookback_seconds: u64,
    pub(crate) event_name: String,
    pub(crate) instructor_role: String,
}

impl SweepOptions {
    pub(crate) fn from_settings(settings: &Settings) -> Self {
        Self {
            lookback_seconds: settings.sweep().lookback_seconds,
            event_name: settings.sweep().event_name.clone(),
            instructor_role: settings.sweep().instructor_role.clone(),
        }
    }
}

#[derive(Clone)]
pub(crate) struct Collaborators {
    /// `None` when the platform has no queryable log store.
    pub(crate) log_reader: Option<Arc<dyn LogReader>>,
    pub(crate) contexts: Arc<dyn ContextResolver>,
    pub(crate) suspensions: Arc<dyn SuspensionProvider>,
    pub(crate) memberships: Arc<dyn MembershipStore>,
    pub(crate) roles: Arc<dyn RoleProvider>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) renderer: Arc<dyn NoticeRenderer>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RunReport {
    pub(crate) log_reader_missing: bool,
    pub(crate) courses_scanned: usize,
    pub(crate) courses_skipped: usize,
    pub(crate) courses_failed: usize,
    pub(crate) memberships_removed: usize,
    pub(crate) notifications_sent: usize,
}

/// Removes suspended users from the groups of courses whose enrolments
/// changed recently and tells each course's instructors what was removed.
pub(crate) struct SuspendedGroupReconciler {
    collaborators: Collaborators,
    options: SweepOptions,
    sender: MailSender,
}

impl SuspendedGroupReconciler {
    pub(crate) fn new(
        collaborators: Collaborators,
        options: SweepOptions,
        sender: MailSender,
    ) -> Self {
        Self { collaborators, options, sender }
    }

    pub(crate) async fn run(&self) -> Result<RunReport> {
        self.run_at(primitive_now_utc()).await
    }

    /// A failure inside one course is logged and counted; only failing to
    /// list the courses aborts the run.
    pub(crate) async fn run_at(&self, now: PrimitiveDateTime) -> Result<RunReport> {
        let Some(log_reader) = self.collaborators.log_reader.as_ref() else {
            tracing::info!("No queryable log store configured; skipping group sweep");
            return Ok(RunReport { log_reader_missing: true, ..RunReport::default() });
        };

        let cutoff = lookback_cutoff(now, self.options.lookback_seconds);
        let course_ids = log_reader
            .distinct_course_ids_since(cutoff, &self.options.event_name)
            .await
            .context("Failed to list courses with recent enrolment changes")?;

        let mut report = RunReport::default();

        for course_id in &course_ids {
            report.courses_scanned += 1;
            match self.sweep_course(course_id, &mut report).await {
                Ok(true) => {}
                Ok(false) => report.courses_skipped += 1,
                Err(err) => {
                    report.courses_failed += 1;
                    tracing::error!(
                        course_id = %course_id,
                        error = %format!("{err:#}"),
                        "Failed to sweep course"
                    );
                }
            }
        }

        tracing::info!(
            since = %format_primitive(cutoff),
            courses_scanned = report.courses_scanned,
            courses_skipped = report.courses_skipped,
            courses_failed = report.courses_failed,
            memberships_removed = report.memberships_removed,
            notifications_sent = report.notifications_sent,
            "Swept suspended users from course groups"
        );
        metrics::counter!(MEMBERSHIPS_REMOVED_TOTAL).increment(report.memberships_removed as u64);
        metrics::counter!(NOTIFICATIONS_SENT_TOTAL).increment(report.notifications_sent as u64);
        metrics::counter!(COURSE_FAILURES_TOTAL).increment(report.courses_failed as u64);

        Ok(report)
    }

    /// Returns `Ok(false)` when the course had nothing to do.
    async fn sweep_course(&self, course_id: &str, report: &mut RunReport) -> Result<bool> {
        let Some(context) = self.collaborators.contexts.course_context(course_id).await? else {
            tracing::debug!(course_id, "Course no longer exists; skipping");
            return Ok(false);
        };

        let suspended = self.collaborators.suspensions.suspended_user_ids(&context).await?;
        if suspended.is_empty() {
            return Ok(false);
        }

        let user_ids = suspended.into_iter().collect::<Vec<_>>();
        let memberships =
            self.collaborators.memberships.find_memberships(course_id, &user_ids).await?;
        if memberships.is_empty() {
            return Ok(false);
        }

        let course_name = memberships[0].course_short_name.clone();
        let mut removals = Vec::with_capacity(memberships.len());
        let mut seen = BTreeSet::new();
        let mut removal_error = None;

        for membership in &memberships {
            if !seen.insert((membership.group_id.as_str(), membership.user_id.as_str())) {
                continue;
            }

            match self
                .collaborators
                .memberships
                .remove_member(&membership.group_id, &membership.user_id)
                .await
            {
                Ok(true) => {
                    report.memberships_removed += 1;
                    removals.push(RemovedMember {
                        group_name: membership.group_name.clone(),
                        user_name: membership.user_display_name.clone(),
                    });
                }
                Ok(false) => {
                    tracing::debug!(
                        course_id,
                        group_id = %membership.group_id,
                        user_id = %membership.user_id,
                        "Membership already removed"
                    );
                }
                Err(err) => {
                    removal_error = Some(err.context(format!(
                        "Failed to remove user {} from group {}",
                        membership.user_id, membership.group_id
                    )));
                    break;
                }
            }
        }

        // Members removed before a failure are gone for good; report them now
        // since the next run will no longer see them.
        let notified = if removals.is_empty() {
            Ok(())
        } else {
            self.notify_instructors(&context, &course_name, removals, report).await
        };

        match (removal_error, notified) {
            (None, Ok(())) => Ok(true),
            (Some(err), Ok(())) | (None, Err(err)) => Err(err),
            (Some(removal_err), Err(notify_err)) => Err(removal_err
                .context(format!("Instructor notification also failed: {notify_err:#}"))),
        }
    }

    async fn notify_instructors(
        &self,
        context: &CourseContext,
        course_name: &str,
        removals: Vec<RemovedMember>,
        report: &mut RunReport,
    ) -> Result<()> {
        let Some(role) =
            self.collaborators.roles.role_by_short_name(&self.options.instructor_role).await?
        else {
            tracing::warn!(
                course_id = %context.course_id,
                role = %self.options.instructor_role,
                "Instructor role not found; skipping notifications"
            );
            return Ok(());
        };

        let instructors = self.collaborators.roles.users_with_role(&role.id, context).await?;
        let mut failed = 0usize;

        for instructor in &instructors {
            let notice = InstructorNotification {
                instructor_name: instructor.display_name(),
                course_name: course_name.to_string(),
                removals: removals.clone(),
            };
            let rendered = self.collaborators.renderer.render(&notice);
            let mail = OutgoingMail {
                recipient: instructor.clone(),
                sender: self.sender.clone(),
                subject: rendered.subject,
                body_text: rendered.text,
                body_html: rendered.html,
            };

            match self.collaborators.notifier.send(&mail).await {
                Ok(()) => report.notifications_sent += 1,
                Err(err) => {
                    failed += 1;
                    tracing::error!(
                        course_id = %context.course_id,
                        instructor_id = %instructor.id,
                        error = %format!("{err:#}"),
                        "Failed to notify instructor"
                    );
                }
            }
        }

        if failed > 0 {
            anyhow::bail!("{failed} of {} instructor notifications failed", instructors.len());
        }

        Ok(())
    }
}
