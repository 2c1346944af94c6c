use sqlx::PgPool;
use time::PrimitiveDateTime;

/// Course ids touched by `event_name` strictly after `cutoff`.
pub(crate) async fn distinct_course_ids_since(
    pool: &PgPool,
    cutoff: PrimitiveDateTime,
    event_name: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT course_id
         FROM log_events
         WHERE event_name = $1
           AND time_created > $2
           AND course_id IS NOT NULL
         ORDER BY course_id",
    )
    .bind(event_name)
    .bind(cutoff)
    .fetch_all(pool)
    .await
}
