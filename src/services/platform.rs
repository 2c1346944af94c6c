//! Seams between the sweep and the platform it runs against.
//!
//! The reconciler only sees these traits. [`PgPlatform`] implements all of
//! them over the platform's Postgres schema; tests use in-memory fakes.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::core::time::primitive_now_utc;
use crate::db::models::{CourseContext, GroupMembership, PlatformUser, Role};
use crate::repositories;

/// Read access to the audit log.
#[async_trait]
pub(crate) trait LogReader: Send + Sync {
    async fn distinct_course_ids_since(
        &self,
        cutoff: PrimitiveDateTime,
        event_name: &str,
    ) -> Result<BTreeSet<String>>;
}

#[async_trait]
pub(crate) trait ContextResolver: Send + Sync {
    /// `None` when the course no longer exists.
    async fn course_context(&self, course_id: &str) -> Result<Option<CourseContext>>;
}

#[async_trait]
pub(crate) trait SuspensionProvider: Send + Sync {
    async fn suspended_user_ids(&self, context: &CourseContext) -> Result<BTreeSet<String>>;
}

#[async_trait]
pub(crate) trait MembershipStore: Send + Sync {
    /// Memberships of `user_ids` in the course's groups, ordered by the
    /// member's last name, then first name.
    async fn find_memberships(
        &self,
        course_id: &str,
        user_ids: &[String],
    ) -> Result<Vec<GroupMembership>>;

    /// Returns false when there was nothing to remove.
    async fn remove_member(&self, group_id: &str, user_id: &str) -> Result<bool>;
}

#[async_trait]
pub(crate) trait RoleProvider: Send + Sync {
    async fn role_by_short_name(&self, short_name: &str) -> Result<Option<Role>>;

    async fn users_with_role(
        &self,
        role_id: &str,
        context: &CourseContext,
    ) -> Result<Vec<PlatformUser>>;
}

#[derive(Debug, Clone)]
pub(crate) struct PgPlatform {
    pool: PgPool,
}

impl PgPlatform {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LogReader for PgPlatform {
    async fn distinct_course_ids_since(
        &self,
        cutoff: PrimitiveDateTime,
        event_name: &str,
    ) -> Result<BTreeSet<String>> {
        let ids =
            repositories::log_events::distinct_course_ids_since(&self.pool, cutoff, event_name)
                .await
                .context("Failed to query enrolment events")?;
        Ok(ids.into_iter().collect())
    }
}

#[async_trait]
impl ContextResolver for PgPlatform {
    async fn course_context(&self, course_id: &str) -> Result<Option<CourseContext>> {
        repositories::courses::find_context(&self.pool, course_id)
            .await
            .context("Failed to resolve course context")
    }
}

#[async_trait]
impl SuspensionProvider for PgPlatform {
    async fn suspended_user_ids(&self, context: &CourseContext) -> Result<BTreeSet<String>> {
        let ids = repositories::enrolments::list_suspended_user_ids(
            &self.pool,
            &context.course_id,
            primitive_now_utc(),
        )
        .await
        .context("Failed to list suspended users")?;
        Ok(ids.into_iter().collect())
    }
}

#[async_trait]
impl MembershipStore for PgPlatform {
    async fn find_memberships(
        &self,
        course_id: &str,
        user_ids: &[String],
    ) -> Result<Vec<GroupMembership>> {
        repositories::group_members::list_for_users_in_course(&self.pool, course_id, user_ids)
            .await
            .context("Failed to list group memberships")
    }

    async fn remove_member(&self, group_id: &str, user_id: &str) -> Result<bool> {
        repositories::group_members::remove(&self.pool, group_id, user_id)
            .await
            .context("Failed to remove group member")
    }
}

#[async_trait]
impl RoleProvider for PgPlatform {
    async fn role_by_short_name(&self, short_name: &str) -> Result<Option<Role>> {
        repositories::roles::find_by_short_name(&self.pool, short_name)
            .await
            .context("Failed to resolve role")
    }

    async fn users_with_role(
        &self,
        role_id: &str,
        context: &CourseContext,
    ) -> Result<Vec<PlatformUser>> {
        repositories::roles::list_users_with_role(&self.pool, role_id, &context.context_id)
            .await
            .context("Failed to list users with role")
    }
}
