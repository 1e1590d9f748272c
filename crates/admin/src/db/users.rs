//! User account repository.
//!
//! Backs both the profile view and the sign-in view of platform users.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use loyalty_core::UserRole;

use super::RepositoryError;
use crate::models::{User, UserUpdate};

const USER_COLUMNS: &str = "uid, email, display_name, role, disabled, custom_claims, \
                            created_at, updated_at, last_sign_in_at";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    uid: String,
    email: Option<String>,
    display_name: Option<String>,
    role: String,
    disabled: bool,
    custom_claims: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_sign_in_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row.role.parse::<UserRole>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid role for user {}: {e}", row.uid))
        })?;

        Ok(Self {
            uid: row.uid,
            email: row.email,
            display_name: row.display_name,
            role,
            disabled: row.disabled,
            custom_claims: row.custom_claims,
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_sign_in_at: row.last_sign_in_at,
        })
    }
}

/// Parameters for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: UserRole,
}

/// One page of users ordered by uid.
#[derive(Debug, Clone)]
pub struct UserPage {
    pub users: Vec<User>,
    /// Uid to pass as `after` for the next page; `None` on the last page.
    pub next_page_token: Option<String>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user account operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a user. The role is mirrored into the `role` custom claim.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the uid is taken.
    pub async fn create(&self, new: &NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO loyalty.user_account (uid, email, display_name, role, custom_claims)
             VALUES ($1, $2, $3, $4, jsonb_build_object('role', $4::text))
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&new.uid)
        .bind(new.email.as_deref())
        .bind(new.display_name.as_deref())
        .bind(new.role.to_string())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            RepositoryError::from_write(e, &format!("user {} already exists", new.uid))
        })?;

        row.try_into()
    }

    /// Get a user by uid.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, uid: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM loyalty.user_account WHERE uid = $1"
        ))
        .bind(uid)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List users ordered by uid, starting after `after` when given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_page(
        &self,
        page_size: u32,
        after: Option<&str>,
    ) -> Result<UserPage, RepositoryError> {
        let page_size = usize::try_from(page_size).unwrap_or(usize::MAX);
        // One extra row tells us whether another page exists.
        let limit = i64::try_from(page_size).unwrap_or(i64::MAX).saturating_add(1);

        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM loyalty.user_account
             WHERE $1::text IS NULL OR uid > $1
             ORDER BY uid
             LIMIT $2"
        ))
        .bind(after)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        let has_more = rows.len() > page_size;
        let users = rows
            .into_iter()
            .take(page_size)
            .map(TryInto::try_into)
            .collect::<Result<Vec<User>, _>>()?;

        let next_page_token = if has_more {
            users.last().map(|u| u.uid.clone())
        } else {
            None
        };

        Ok(UserPage {
            users,
            next_page_token,
        })
    }

    /// All user uids, ordered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_uids(&self) -> Result<Vec<String>, RepositoryError> {
        let uids = sqlx::query_scalar::<_, String>(
            "SELECT uid FROM loyalty.user_account ORDER BY uid",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(uids)
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this uid.
    pub async fn delete(&self, uid: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM loyalty.user_account WHERE uid = $1")
            .bind(uid)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete several users in one statement, returning the uids that existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn delete_many(&self, uids: &[String]) -> Result<Vec<String>, RepositoryError> {
        let deleted = sqlx::query_scalar::<_, String>(
            "DELETE FROM loyalty.user_account WHERE uid = ANY($1) RETURNING uid",
        )
        .bind(uids)
        .fetch_all(self.pool)
        .await?;

        Ok(deleted)
    }

    /// Apply a partial update and return the updated user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this uid.
    pub async fn update(&self, uid: &str, update: &UserUpdate) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE loyalty.user_account
             SET disabled = COALESCE($2, disabled),
                 display_name = COALESCE($3, display_name),
                 custom_claims = COALESCE($4, custom_claims),
                 role = COALESCE($5, role),
                 updated_at = NOW()
             WHERE uid = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(uid)
        .bind(update.disabled)
        .bind(update.display_name.as_deref())
        .bind(update.custom_claims.as_ref())
        .bind(update.role.map(|r| r.to_string()))
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Set a user's role and mirror it into the `role` custom claim.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this uid.
    pub async fn set_role(&self, uid: &str, role: UserRole) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE loyalty.user_account
             SET role = $2,
                 custom_claims = jsonb_set(custom_claims, '{{role}}', to_jsonb($2::text)),
                 updated_at = NOW()
             WHERE uid = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(uid)
        .bind(role.to_string())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }
}
