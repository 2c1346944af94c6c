use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::types::EnrolmentStatus;

/// Users enrolled in the course with no enrolment that is active at `now`.
/// An enrolment counts as active when its status is active and `now` lies
/// inside its optional start/end window.
pub(crate) async fn list_suspended_user_ids(
    pool: &PgPool,
    course_id: &str,
    now: PrimitiveDateTime,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT e.user_id
         FROM enrolments e
         JOIN users u ON u.id = e.user_id
         WHERE e.course_id = $1
           AND u.is_deleted = FALSE
           AND NOT EXISTS (
               SELECT 1
               FROM enrolments active
               WHERE active.course_id = e.course_id
                 AND active.user_id = e.user_id
                 AND active.status = $2
                 AND (active.time_start IS NULL OR active.time_start <= $3)
                 AND (active.time_end IS NULL OR active.time_end > $3)
           )
         ORDER BY e.user_id",
    )
    .bind(course_id)
    .bind(EnrolmentStatus::Active)
    .bind(now)
    .fetch_all(pool)
    .await
}
