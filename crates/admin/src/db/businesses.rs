//! Business repository.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use loyalty_core::{BusinessId, PointsLabel, PointsLabelShort};

use super::RepositoryError;
use crate::models::Business;

const BUSINESS_COLUMNS: &str =
    "business_id, name, owner_uid, points_label, points_label_short, created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct BusinessRow {
    business_id: String,
    name: String,
    owner_uid: Option<String>,
    points_label: String,
    points_label_short: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BusinessRow> for Business {
    type Error = RepositoryError;

    fn try_from(row: BusinessRow) -> Result<Self, Self::Error> {
        let business_id = BusinessId::parse(&row.business_id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid business id in database: {e}"))
        })?;
        let points_label = PointsLabel::parse(&row.points_label).map_err(|e| {
            RepositoryError::DataCorruption(format!(
                "invalid points label for {business_id}: {e}"
            ))
        })?;
        let points_label_short = row
            .points_label_short
            .as_deref()
            .map(PointsLabelShort::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!(
                    "invalid short points label for {business_id}: {e}"
                ))
            })?
            .flatten();

        Ok(Self {
            business_id,
            name: row.name,
            owner_uid: row.owner_uid,
            points_label,
            points_label_short,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Parameters for creating a business.
#[derive(Debug, Clone)]
pub struct NewBusiness {
    pub business_id: BusinessId,
    pub name: String,
    pub owner_uid: Option<String>,
    pub points_label: PointsLabel,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for business operations.
pub struct BusinessRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BusinessRepository<'a> {
    /// Create a new business repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all businesses sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list_all(&self) -> Result<Vec<Business>, RepositoryError> {
        let rows = sqlx::query_as::<_, BusinessRow>(&format!(
            "SELECT {BUSINESS_COLUMNS} FROM loyalty.business ORDER BY name, business_id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a business by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, business_id: &BusinessId) -> Result<Option<Business>, RepositoryError> {
        let row = sqlx::query_as::<_, BusinessRow>(&format!(
            "SELECT {BUSINESS_COLUMNS} FROM loyalty.business WHERE business_id = $1"
        ))
        .bind(business_id.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Every business id currently stored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_ids(&self) -> Result<HashSet<String>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, String>("SELECT business_id FROM loyalty.business")
            .fetch_all(self.pool)
            .await?;

        Ok(ids.into_iter().collect())
    }

    /// Insert a business.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the id is taken.
    /// Returns `RepositoryError::NotFound` if `owner_uid` names no user.
    pub async fn create(&self, new: &NewBusiness) -> Result<Business, RepositoryError> {
        let row = sqlx::query_as::<_, BusinessRow>(&format!(
            "INSERT INTO loyalty.business (business_id, name, owner_uid, points_label)
             VALUES ($1, $2, $3, $4)
             RETURNING {BUSINESS_COLUMNS}"
        ))
        .bind(new.business_id.as_str())
        .bind(&new.name)
        .bind(new.owner_uid.as_deref())
        .bind(new.points_label.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            RepositoryError::from_write(e, &format!("business {} already exists", new.business_id))
        })?;

        row.try_into()
    }

    /// Set a business's points label and, when `short` is given, its short label.
    ///
    /// `short` is `None` to keep the stored short label, `Some(None)` to clear it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the business does not exist.
    pub async fn update_points_labels(
        &self,
        business_id: &BusinessId,
        label: &PointsLabel,
        short: Option<Option<&PointsLabelShort>>,
    ) -> Result<Business, RepositoryError> {
        let row = sqlx::query_as::<_, BusinessRow>(&format!(
            "UPDATE loyalty.business
             SET points_label = $2,
                 points_label_short = CASE WHEN $3 THEN $4 ELSE points_label_short END,
                 updated_at = NOW()
             WHERE business_id = $1
             RETURNING {BUSINESS_COLUMNS}"
        ))
        .bind(business_id.as_str())
        .bind(label.as_str())
        .bind(short.is_some())
        .bind(short.flatten().map(PointsLabelShort::as_str))
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }
}
