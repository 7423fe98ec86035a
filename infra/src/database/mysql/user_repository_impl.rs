//! MySQL implementation of the UserRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use dfm_core::domain::entities::user::User;
use dfm_core::errors::{AuthError, DomainError};
use dfm_core::repositories::UserRepository;

use super::row::{column, is_unique_violation, query_error, uuid_column};

const SELECT_COLUMNS: &str =
    "SELECT id, email, username, nick_name, password_hash, is_verified, created_at FROM users";

/// MySQL implementation of UserRepository
#[derive(Clone)]
pub struct MySqlUserRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlUserRepository {
    /// Create a new MySQL user repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to User entity
    fn row_to_user(row: &MySqlRow) -> Result<User, DomainError> {
        Ok(User {
            id: uuid_column(row, "id")?,
            email: column(row, "email")?,
            username: column(row, "username")?,
            nick_name: column(row, "nick_name")?,
            password_hash: column(row, "password_hash")?,
            is_verified: column(row, "is_verified")?,
            created_at: column::<DateTime<Utc>>(row, "created_at")?,
        })
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let query = format!("{} WHERE email = ? LIMIT 1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("Failed to find user by email"))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let query = format!("{} WHERE id = ? LIMIT 1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("Failed to find user by id"))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let query = r#"
            INSERT INTO users (
                id, email, username, nick_name, password_hash, is_verified, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(user.id.to_string())
            .bind(&user.email)
            .bind(&user.username)
            .bind(&user.nick_name)
            .bind(&user.password_hash)
            .bind(user.is_verified)
            .bind(user.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::Auth(AuthError::UserAlreadyExists)
                } else {
                    query_error("Failed to create user")(e)
                }
            })?;

        Ok(user)
    }

    async fn mark_verified(&self, id: Uuid) -> Result<bool, DomainError> {
        let result =
            sqlx::query("UPDATE users SET is_verified = TRUE WHERE id = ? AND is_verified = FALSE")
                .bind(id.to_string())
                .execute(&self.pool)
                .await
                .map_err(query_error("Failed to verify user"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(query_error("Failed to delete user"))?;

        Ok(result.rows_affected() > 0)
    }
}
