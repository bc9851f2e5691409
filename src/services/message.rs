use chrono::Utc;

use crate::database::DbPool;
use crate::models::message::Message;
use crate::services::identity::user_exists;
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::validate_message_body;

pub async fn create_message(
    pool: &DbPool,
    from_username: String,
    to_username: String,
    body: String,
) -> AppResult<Message> {
    validate_message_body(&body)?;

    if !user_exists(pool, &from_username).await? {
        return Err(AppError::NotFound(format!(
            "No such user: {}",
            from_username
        )));
    }
    if !user_exists(pool, &to_username).await? {
        return Err(AppError::NotFound(format!("No such user: {}", to_username)));
    }

    let message = Message::new(from_username, to_username, body);

    sqlx::query(
        "INSERT INTO messages (id, from_username, to_username, body, sent_at, read_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&message.id)
    .bind(&message.from_username)
    .bind(&message.to_username)
    .bind(&message.body)
    .bind(&message.sent_at)
    .bind(&message.read_at)
    .execute(pool.as_ref())
    .await?;

    Ok(message)
}

pub async fn get_message_by_id(pool: &DbPool, id: &str) -> AppResult<Message> {
    let message = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = ?")
        .bind(id)
        .fetch_optional(pool.as_ref())
        .await?;

    message.ok_or_else(|| AppError::NotFound(format!("No such message: {}", id)))
}

pub async fn list_sent_by(pool: &DbPool, username: &str) -> AppResult<Vec<Message>> {
    let messages =
        sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE from_username = ?")
            .bind(username)
            .fetch_all(pool.as_ref())
            .await?;

    Ok(messages)
}

pub async fn list_received_by(pool: &DbPool, username: &str) -> AppResult<Vec<Message>> {
    let messages = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE to_username = ?")
        .bind(username)
        .fetch_all(pool.as_ref())
        .await?;

    Ok(messages)
}

/// One-way unread -> read transition. The conditional UPDATE is the only
/// write path for read_at, so two concurrent calls cannot both set it;
/// marking an already-read message is an idempotent no-op that returns the
/// record unchanged.
pub async fn mark_read(pool: &DbPool, id: &str) -> AppResult<Message> {
    sqlx::query("UPDATE messages SET read_at = ? WHERE id = ? AND read_at IS NULL")
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(pool.as_ref())
        .await?;

    // Zero rows affected means either already read (return unchanged) or
    // unknown id (NotFound from the lookup).
    get_message_by_id(pool, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;
    use crate::services::identity::{register_user, tests::request};

    async fn seeded_pool() -> DbPool {
        let pool = test_pool().await;
        register_user(&pool, request("alice")).await.unwrap();
        register_user(&pool, request("bob")).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_create_message_stamps_sent_at_and_unread() {
        let pool = seeded_pool().await;
        let msg = create_message(&pool, "alice".into(), "bob".into(), "hi".into())
            .await
            .unwrap();

        assert_eq!(msg.from_username, "alice");
        assert_eq!(msg.to_username, "bob");
        assert!(msg.read_at.is_none());

        let fetched = get_message_by_id(&pool, &msg.id).await.unwrap();
        assert_eq!(fetched.sent_at, msg.sent_at);
        assert_eq!(fetched.body, "hi");
    }

    #[tokio::test]
    async fn test_create_message_requires_both_users() {
        let pool = seeded_pool().await;

        let err = create_message(&pool, "alice".into(), "nobody".into(), "hi".into())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = create_message(&pool, "nobody".into(), "bob".into(), "hi".into())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_self_message_is_permitted() {
        let pool = seeded_pool().await;
        let msg = create_message(&pool, "alice".into(), "alice".into(), "note".into())
            .await
            .unwrap();
        assert_eq!(msg.from_username, msg.to_username);
    }

    #[tokio::test]
    async fn test_directional_listings() {
        let pool = seeded_pool().await;
        create_message(&pool, "alice".into(), "bob".into(), "one".into())
            .await
            .unwrap();
        create_message(&pool, "alice".into(), "bob".into(), "two".into())
            .await
            .unwrap();
        create_message(&pool, "bob".into(), "alice".into(), "reply".into())
            .await
            .unwrap();

        assert_eq!(list_sent_by(&pool, "alice").await.unwrap().len(), 2);
        assert_eq!(list_received_by(&pool, "bob").await.unwrap().len(), 2);
        assert_eq!(list_sent_by(&pool, "bob").await.unwrap().len(), 1);
        assert_eq!(list_received_by(&pool, "alice").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mark_read_is_one_way_and_idempotent() {
        let pool = seeded_pool().await;
        let msg = create_message(&pool, "alice".into(), "bob".into(), "hi".into())
            .await
            .unwrap();

        let first = mark_read(&pool, &msg.id).await.unwrap();
        let read_at = first.read_at.clone().expect("read_at should be set");

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = mark_read(&pool, &msg.id).await.unwrap();
        assert_eq!(second.read_at.as_deref(), Some(read_at.as_str()));
    }

    #[tokio::test]
    async fn test_mark_read_unknown_message() {
        let pool = seeded_pool().await;
        let err = mark_read(&pool, "no-such-id").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_mark_read_single_transition() {
        let pool = seeded_pool().await;
        let msg = create_message(&pool, "alice".into(), "bob".into(), "hi".into())
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let pool = pool.clone();
            let id = msg.id.clone();
            handles.push(tokio::spawn(
                async move { mark_read(&pool, &id).await },
            ));
        }

        let mut seen = Vec::new();
        for handle in handles {
            let result = handle.await.unwrap().unwrap();
            seen.push(result.read_at.expect("read_at should be set"));
        }

        // Every caller observes the same single transition.
        let stable = get_message_by_id(&pool, &msg.id).await.unwrap();
        let final_read_at = stable.read_at.unwrap();
        assert!(seen.iter().all(|ts| *ts == final_read_at));
    }
}
