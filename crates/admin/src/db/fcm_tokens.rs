//! Push messaging device token repository.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::FcmToken;

/// Repository for device tokens.
pub struct FcmTokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FcmTokenRepository<'a> {
    /// Create a new token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Register a token. Re-registering refreshes `last_used_at` and keeps
    /// `created_at`. A supplied `uid` replaces the owner; `None` keeps it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if `uid` names no user.
    pub async fn upsert(&self, token: &str, uid: Option<&str>) -> Result<FcmToken, RepositoryError> {
        sqlx::query_as::<_, FcmToken>(
            "INSERT INTO loyalty.fcm_token (token, uid)
             VALUES ($1, $2)
             ON CONFLICT (token) DO UPDATE
             SET uid = COALESCE(EXCLUDED.uid, loyalty.fcm_token.uid),
                 last_used_at = NOW()
             RETURNING token, uid, created_at, last_used_at",
        )
        .bind(token)
        .bind(uid)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "token already registered"))
    }

    /// Remove a token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the token is not registered.
    pub async fn delete(&self, token: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM loyalty.fcm_token WHERE token = $1")
            .bind(token)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
