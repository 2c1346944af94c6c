use sqlx::PgPool;

use crate::db::models::GroupMembership;

pub(crate) async fn list_for_users_in_course(
    pool: &PgPool,
    course_id: &str,
    user_ids: &[String],
) -> Result<Vec<GroupMembership>, sqlx::Error> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, GroupMembership>(
        "SELECT g.id AS group_id,
                u.id AS user_id,
                g.name AS group_name,
                c.short_name AS course_short_name,
                u.first_name || ' ' || u.last_name AS user_display_name
         FROM course_groups g
         JOIN group_members gm ON gm.group_id = g.id
         JOIN users u ON u.id = gm.user_id
         JOIN courses c ON c.id = g.course_id
         WHERE g.course_id = $1
           AND gm.user_id = ANY($2)
         ORDER BY u.last_name, u.first_name, u.id, g.name, g.id",
    )
    .bind(course_id)
    .bind(user_ids)
    .fetch_all(pool)
    .await
}

/// Returns false when the membership was already gone.
pub(crate) async fn remove(
    pool: &PgPool,
    group_id: &str,
    user_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND user_id = $2")
        .bind(group_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
