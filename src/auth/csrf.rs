use sqlx::SqlitePool;

use super::{generate_token, session::hash_token};
use crate::error::{AppError, Result};

/// Per-session form tokens. Only the hash is stored; issuing a new token
/// replaces the previous one.
pub struct CsrfService {
    pool: SqlitePool,
}

impl CsrfService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn generate_token(&self, session_id: &str) -> Result<String> {
        let token = generate_token();

        sqlx::query(
            r#"
            INSERT INTO csrf_tokens (session_id, token_hash, created_at)
            VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(session_id) DO UPDATE SET
                token_hash = excluded.token_hash,
                created_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(session_id)
        .bind(hash_token(&token))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(token)
    }

    pub async fn validate_token(&self, session_id: &str, token: &str) -> Result<bool> {
        if token.is_empty() {
            return Ok(false);
        }

        let matches = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM csrf_tokens WHERE session_id = ? AND token_hash = ?",
        )
        .bind(session_id)
        .bind(hash_token(token))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(matches > 0)
    }

    /// Rejects the request unless `token` is the session's current one.
    pub async fn require(&self, session_id: &str, token: &str) -> Result<()> {
        if self.validate_token(session_id, token).await? {
            Ok(())
        } else {
            tracing::warn!("Rejected form post with a bad CSRF token");
            Err(AppError::Forbidden)
        }
    }
}
