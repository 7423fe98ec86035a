//! Table definitions applied by `DatabasePool::run_migrations`

/// Users known to the authentication flows
pub const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id CHAR(36) NOT NULL PRIMARY KEY,
    email VARCHAR(255) NOT NULL,
    username VARCHAR(64) NOT NULL,
    nick_name VARCHAR(64) NOT NULL,
    password_hash VARCHAR(255) NOT NULL,
    is_verified BOOLEAN NOT NULL DEFAULT FALSE,
    created_at DATETIME(6) NOT NULL,
    UNIQUE KEY uq_users_email (email),
    UNIQUE KEY uq_users_username (username)
)
"#;

/// Refresh token records; rows are only ever updated, never deleted
pub const CREATE_REFRESH_TOKENS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS refresh_tokens (
    id CHAR(36) NOT NULL PRIMARY KEY,
    user_id CHAR(36) NOT NULL,
    token_hash CHAR(64) NOT NULL,
    previous_token_hash CHAR(64) NULL,
    family_id CHAR(36) NOT NULL,
    issued_at DATETIME(6) NOT NULL,
    expires_at DATETIME(6) NOT NULL,
    used_at DATETIME(6) NULL,
    revoked BOOLEAN NOT NULL DEFAULT FALSE,
    UNIQUE KEY uq_refresh_tokens_hash (token_hash),
    KEY idx_refresh_tokens_family (family_id),
    KEY idx_refresh_tokens_user (user_id)
)
"#;

/// Statements in application order
pub const MIGRATIONS: &[&str] = &[CREATE_USERS_TABLE, CREATE_REFRESH_TOKENS_TABLE];
