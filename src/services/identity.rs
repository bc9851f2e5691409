use chrono::Utc;
use sqlx::Row;

use crate::database::DbPool;
use crate::models::user::{RegisterRequest, User, UserDetail, UserSummary};
use crate::utils::crypto::{hash_password, verify_password};
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::{
    validate_name, validate_password, validate_phone, validate_username,
};

pub async fn register_user(pool: &DbPool, request: RegisterRequest) -> AppResult<User> {
    validate_username(&request.username)?;
    validate_password(&request.password)?;
    validate_name("First name", &request.first_name)?;
    validate_name("Last name", &request.last_name)?;
    validate_phone(&request.phone)?;

    // Fast path; the primary-key constraint on the INSERT is what actually
    // guarantees uniqueness under concurrent registrations.
    let username_exists = sqlx::query("SELECT COUNT(*) as count FROM users WHERE username = ?")
        .bind(&request.username)
        .fetch_one(pool.as_ref())
        .await?
        .get::<i64, _>("count");

    if username_exists > 0 {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    let password_hash = hash_password(&request.password)?;

    let user = User::new(
        request.username,
        password_hash,
        request.first_name,
        request.last_name,
        request.phone,
    );

    insert_user(pool, &user).await?;

    Ok(user)
}

async fn insert_user(pool: &DbPool, user: &User) -> AppResult<()> {
    let result = sqlx::query(
        "INSERT INTO users (username, password_hash, first_name, last_name, phone, joined_at, last_seen_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.phone)
    .bind(&user.joined_at)
    .bind(&user.last_seen_at)
    .execute(pool.as_ref())
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) if e
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation()) =>
        {
            Err(AppError::Conflict("Username already exists".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Returns false for an unknown username rather than an error, so callers
/// cannot tell unknown-user apart from wrong-password.
pub async fn authenticate(pool: &DbPool, username: &str, password: &str) -> AppResult<bool> {
    let row = sqlx::query("SELECT password_hash FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool.as_ref())
        .await?;

    match row {
        Some(row) => verify_password(password, &row.get::<String, _>("password_hash")),
        None => Ok(false),
    }
}

pub async fn touch_last_seen(pool: &DbPool, username: &str) -> AppResult<()> {
    let result = sqlx::query("UPDATE users SET last_seen_at = ? WHERE username = ?")
        .bind(Utc::now().to_rfc3339())
        .bind(username)
        .execute(pool.as_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("No such user: {}", username)));
    }

    Ok(())
}

pub async fn get_user(pool: &DbPool, username: &str) -> AppResult<UserDetail> {
    let user = sqlx::query_as::<_, UserDetail>(
        "SELECT username, first_name, last_name, phone, joined_at, last_seen_at
         FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool.as_ref())
    .await?;

    user.ok_or_else(|| AppError::NotFound(format!("No such user: {}", username)))
}

pub async fn list_users(pool: &DbPool) -> AppResult<Vec<UserSummary>> {
    let users = sqlx::query_as::<_, UserSummary>(
        "SELECT username, first_name, last_name, phone FROM users",
    )
    .fetch_all(pool.as_ref())
    .await?;

    Ok(users)
}

pub async fn user_exists(pool: &DbPool, username: &str) -> AppResult<bool> {
    let count = sqlx::query("SELECT COUNT(*) as count FROM users WHERE username = ?")
        .bind(username)
        .fetch_one(pool.as_ref())
        .await?
        .get::<i64, _>("count");

    Ok(count > 0)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::database::test_pool;

    pub(crate) fn request(username: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            password: "password123".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            phone: "+1 555 0100".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_and_authenticate() {
        let pool = test_pool().await;
        register_user(&pool, request("alice")).await.unwrap();

        assert!(authenticate(&pool, "alice", "password123").await.unwrap());
        assert!(!authenticate(&pool, "alice", "wrong").await.unwrap());
    }

    #[tokio::test]
    async fn test_authenticate_unknown_user_is_false_not_error() {
        let pool = test_pool().await;
        assert!(!authenticate(&pool, "nobody", "anything").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts_and_preserves_original() {
        let pool = test_pool().await;
        register_user(&pool, request("alice")).await.unwrap();

        let mut second = request("alice");
        second.first_name = "Impostor".to_string();
        second.password = "otherpassword".to_string();

        let err = register_user(&pool, second).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let stored = get_user(&pool, "alice").await.unwrap();
        assert_eq!(stored.first_name, "Test");
        assert!(authenticate(&pool, "alice", "password123").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_insert_maps_constraint_to_conflict() {
        // Drives the INSERT directly, past the fast-path existence check,
        // the way a concurrent registration would.
        let pool = test_pool().await;
        register_user(&pool, request("alice")).await.unwrap();

        let duplicate = User::new(
            "alice".to_string(),
            "unused-hash".to_string(),
            "Race".to_string(),
            "Loser".to_string(),
            "+1 555 0199".to_string(),
        );

        let err = insert_user(&pool, &duplicate).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let stored = get_user(&pool, "alice").await.unwrap();
        assert_eq!(stored.first_name, "Test");
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_fields() {
        let pool = test_pool().await;

        let mut bad = request("alice");
        bad.phone = "call me;maybe".to_string();
        assert!(matches!(
            register_user(&pool, bad).await.unwrap_err(),
            AppError::Validation(_)
        ));

        let empty = RegisterRequest {
            username: String::new(),
            password: "pw".to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            phone: "555".to_string(),
        };
        assert!(matches!(
            register_user(&pool, empty).await.unwrap_err(),
            AppError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_touch_last_seen() {
        let pool = test_pool().await;
        register_user(&pool, request("alice")).await.unwrap();

        let before = get_user(&pool, "alice").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        touch_last_seen(&pool, "alice").await.unwrap();
        let after = get_user(&pool, "alice").await.unwrap();

        assert!(after.last_seen_at >= before.last_seen_at);
        assert_eq!(after.joined_at, before.joined_at);

        assert!(matches!(
            touch_last_seen(&pool, "nobody").await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_get_user_and_list_users() {
        let pool = test_pool().await;
        register_user(&pool, request("alice")).await.unwrap();
        register_user(&pool, request("bob")).await.unwrap();

        let detail = get_user(&pool, "alice").await.unwrap();
        assert_eq!(detail.username, "alice");

        assert!(matches!(
            get_user(&pool, "nobody").await.unwrap_err(),
            AppError::NotFound(_)
        ));

        let users = list_users(&pool).await.unwrap();
        let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"alice") && names.contains(&"bob"));
    }
}
