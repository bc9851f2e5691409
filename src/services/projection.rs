use sqlx::FromRow;

use crate::database::DbPool;
use crate::models::message::{Message, MessageView, ReceivedMessageView, SentMessageView};
use crate::models::user::UserSummary;
use crate::utils::error::{AppError, AppResult};

/// Flat join row for the directional listings; the counterpart snippet is
/// assembled from it rather than denormalized into the message row.
#[derive(Debug, FromRow)]
struct MessageCounterpartRow {
    id: String,
    body: String,
    sent_at: String,
    read_at: Option<String>,
    username: String,
    first_name: String,
    last_name: String,
    phone: String,
}

impl MessageCounterpartRow {
    fn counterpart(&self) -> UserSummary {
        UserSummary {
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: self.phone.clone(),
        }
    }
}

async fn user_summary(pool: &DbPool, username: &str) -> AppResult<UserSummary> {
    let summary = sqlx::query_as::<_, UserSummary>(
        "SELECT username, first_name, last_name, phone FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool.as_ref())
    .await?;

    summary.ok_or_else(|| AppError::NotFound(format!("No such user: {}", username)))
}

pub async fn project_message(pool: &DbPool, message: Message) -> AppResult<MessageView> {
    let from_user = user_summary(pool, &message.from_username).await?;
    let to_user = user_summary(pool, &message.to_username).await?;

    Ok(MessageView {
        id: message.id,
        body: message.body,
        sent_at: message.sent_at,
        read_at: message.read_at,
        from_user,
        to_user,
    })
}

/// Messages sent by `username`, each nesting the recipient snippet.
pub async fn messages_from(pool: &DbPool, username: &str) -> AppResult<Vec<SentMessageView>> {
    let rows = sqlx::query_as::<_, MessageCounterpartRow>(
        "SELECT messages.id, messages.body, messages.sent_at, messages.read_at,
                users.username, users.first_name, users.last_name, users.phone
         FROM messages JOIN users ON messages.to_username = users.username
         WHERE messages.from_username = ?",
    )
    .bind(username)
    .fetch_all(pool.as_ref())
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| SentMessageView {
            to_user: row.counterpart(),
            id: row.id,
            body: row.body,
            sent_at: row.sent_at,
            read_at: row.read_at,
        })
        .collect())
}

/// Messages received by `username`, each nesting the sender snippet.
pub async fn messages_to(pool: &DbPool, username: &str) -> AppResult<Vec<ReceivedMessageView>> {
    let rows = sqlx::query_as::<_, MessageCounterpartRow>(
        "SELECT messages.id, messages.body, messages.sent_at, messages.read_at,
                users.username, users.first_name, users.last_name, users.phone
         FROM messages JOIN users ON messages.from_username = users.username
         WHERE messages.to_username = ?",
    )
    .bind(username)
    .fetch_all(pool.as_ref())
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| ReceivedMessageView {
            from_user: row.counterpart(),
            id: row.id,
            body: row.body,
            sent_at: row.sent_at,
            read_at: row.read_at,
        })
        .collect())
}
