use crate::database::DbPool;
use crate::models::message::{Message, MessageView};
use crate::services::message::{get_message_by_id, mark_read};
use crate::services::projection::project_message;
use crate::utils::error::{AppError, AppResult};

/// Ownership rule: the acting identity must be the sender or the recipient
/// of the message it wants to view.
pub async fn view_message(pool: &DbPool, id: &str, acting: &str) -> AppResult<MessageView> {
    let message = get_message_by_id(pool, id).await?;

    if !message.involves(acting) {
        return Err(AppError::Forbidden(
            "Only the sender or recipient may view this message".to_string(),
        ));
    }

    project_message(pool, message).await
}

/// Stricter recipient-only rule for the unread -> read transition.
pub async fn mark_message_read(pool: &DbPool, id: &str, acting: &str) -> AppResult<Message> {
    let message = get_message_by_id(pool, id).await?;

    if message.to_username != acting {
        return Err(AppError::Forbidden(
            "Only the recipient may mark this message read".to_string(),
        ));
    }

    mark_read(pool, id).await
}
