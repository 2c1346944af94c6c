use sqlx::PgPool;

use crate::db::models::{PlatformUser, Role};

pub(crate) async fn find_by_short_name(
    pool: &PgPool,
    short_name: &str,
) -> Result<Option<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>("SELECT id, short_name, name FROM roles WHERE short_name = $1")
        .bind(short_name)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_users_with_role(
    pool: &PgPool,
    role_id: &str,
    context_id: &str,
) -> Result<Vec<PlatformUser>, sqlx::Error> {
    sqlx::query_as::<_, PlatformUser>(
        "SELECT DISTINCT u.id, u.first_name, u.last_name, u.email
         FROM role_assignments ra
         JOIN users u ON u.id = ra.user_id
         WHERE ra.role_id = $1
           AND ra.context_id = $2
           AND u.is_deleted = FALSE
         ORDER BY u.last_name, u.first_name, u.id",
    )
    .bind(role_id)
    .bind(context_id)
    .fetch_all(pool)
    .await
}
