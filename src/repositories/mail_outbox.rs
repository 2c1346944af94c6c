use sqlx::PgPool;
use uuid::Uuid;

pub(crate) struct NewOutboxMail<'a> {
    pub(crate) recipient_user_id: &'a str,
    pub(crate) recipient_address: &'a str,
    pub(crate) sender_address: &'a str,
    pub(crate) sender_name: &'a str,
    pub(crate) subject: &'a str,
    pub(crate) body_text: &'a str,
    pub(crate) body_html: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn enqueue(pool: &PgPool, mail: NewOutboxMail<'_>) -> Result<String, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO mail_outbox (
            id, recipient_user_id, recipient_address, sender_address, sender_name,
            subject, body_text, body_html, created_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)",
    )
    .bind(&id)
    .bind(mail.recipient_user_id)
    .bind(mail.recipient_address)
    .bind(mail.sender_address)
    .bind(mail.sender_name)
    .bind(mail.subject)
    .bind(mail.body_text)
    .bind(mail.body_html)
    .bind(mail.created_at)
    .execute(pool)
    .await?;

    Ok(id)
}
