use sqlx::PgPool;

use crate::db::models::CourseContext;

pub(crate) async fn find_context(
    pool: &PgPool,
    course_id: &str,
) -> Result<Option<CourseContext>, sqlx::Error> {
    sqlx::query_as::<_, CourseContext>(
        "SELECT ctx.id AS context_id, ctx.course_id
         FROM contexts ctx
         JOIN courses c ON c.id = ctx.course_id
         WHERE ctx.course_id = $1",
    )
    .bind(course_id)
    .fetch_optional(pool)
    .await
}
