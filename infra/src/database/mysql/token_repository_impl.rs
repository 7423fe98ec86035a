//! MySQL implementation of the TokenRepository trait.
//!
//! Records are never deleted. Consuming a record is a conditional `UPDATE`
//! guarded by `used_at IS NULL`, so with any number of server replicas only
//! one request can observe an affected row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use dfm_core::domain::entities::token::RefreshToken;
use dfm_core::errors::DomainError;
use dfm_core::repositories::TokenRepository;

use super::row::{column, is_unique_violation, query_error, uuid_column};

const SELECT_COLUMNS: &str = "SELECT id, user_id, token_hash, previous_token_hash, family_id, \
     issued_at, expires_at, used_at, revoked FROM refresh_tokens";

/// MySQL implementation of TokenRepository
#[derive(Clone)]
pub struct MySqlTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTokenRepository {
    /// Create a new MySQL token repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to RefreshToken entity
    fn row_to_token(row: &MySqlRow) -> Result<RefreshToken, DomainError> {
        Ok(RefreshToken {
            id: uuid_column(row, "id")?,
            user_id: uuid_column(row, "user_id")?,
            token_hash: column(row, "token_hash")?,
            previous_token_hash: column(row, "previous_token_hash")?,
            family_id: uuid_column(row, "family_id")?,
            issued_at: column::<DateTime<Utc>>(row, "issued_at")?,
            expires_at: column::<DateTime<Utc>>(row, "expires_at")?,
            used_at: column::<Option<DateTime<Utc>>>(row, "used_at")?,
            revoked: column(row, "revoked")?,
        })
    }
}

#[async_trait]
impl TokenRepository for MySqlTokenRepository {
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let query = r#"
            INSERT INTO refresh_tokens (
                id, user_id, token_hash, previous_token_hash, family_id,
                issued_at, expires_at, used_at, revoked
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(token.id.to_string())
            .bind(token.user_id.to_string())
            .bind(&token.token_hash)
            .bind(&token.previous_token_hash)
            .bind(token.family_id.to_string())
            .bind(token.issued_at)
            .bind(token.expires_at)
            .bind(token.used_at)
            .bind(token.revoked)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::Validation {
                        message: "Token already exists".to_string(),
                    }
                } else {
                    query_error("Failed to save refresh token")(e)
                }
            })?;

        Ok(token)
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        let query = format!("{} WHERE token_hash = ? LIMIT 1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("Failed to find refresh token"))?;

        row.as_ref().map(Self::row_to_token).transpose()
    }

    async fn mark_used(
        &self,
        token_hash: &str,
        used_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET used_at = ? WHERE token_hash = ? AND used_at IS NULL",
        )
        .bind(used_at)
        .bind(token_hash)
        .execute(&self.pool)
        .await
        .map_err(query_error("Failed to mark refresh token used"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn revoke_family(&self, family_id: Uuid) -> Result<usize, DomainError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE WHERE family_id = ? AND revoked = FALSE",
        )
        .bind(family_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(query_error("Failed to revoke token family"))?;

        Ok(result.rows_affected() as usize)
    }

    async fn revoke_user_tokens(
        &self,
        user_id: Uuid,
        family_id: Option<Uuid>,
    ) -> Result<usize, DomainError> {
        let result = match family_id {
            Some(family_id) => {
                sqlx::query(
                    "UPDATE refresh_tokens SET revoked = TRUE \
                     WHERE user_id = ? AND family_id = ? AND revoked = FALSE",
                )
                .bind(user_id.to_string())
                .bind(family_id.to_string())
                .execute(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    "UPDATE refresh_tokens SET revoked = TRUE WHERE user_id = ? AND revoked = FALSE",
                )
                .bind(user_id.to_string())
                .execute(&self.pool)
                .await
            }
        }
        .map_err(query_error("Failed to revoke user tokens"))?;

        Ok(result.rows_affected() as usize)
    }

    async fn find_family(&self, family_id: Uuid) -> Result<Vec<RefreshToken>, DomainError> {
        let query = format!("{} WHERE family_id = ? ORDER BY issued_at ASC", SELECT_COLUMNS);

        let rows = sqlx::query(&query)
            .bind(family_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(query_error("Failed to load token family"))?;

        rows.iter().map(Self::row_to_token).collect()
    }
}
