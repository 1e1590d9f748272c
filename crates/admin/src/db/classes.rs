//! Customer class repository.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use loyalty_core::{BusinessId, ClassId};

use super::RepositoryError;
use crate::models::CustomerClass;

#[derive(Debug, sqlx::FromRow)]
struct ClassRow {
    business_id: BusinessId,
    class_id: ClassId,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<ClassRow> for CustomerClass {
    fn from(row: ClassRow) -> Self {
        Self {
            business_id: row.business_id,
            class_id: row.class_id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

/// Repository for customer classes.
pub struct ClassRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ClassRepository<'a> {
    /// Create a new class repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Class ids already used within one business.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_ids_for_business(
        &self,
        business_id: &BusinessId,
    ) -> Result<HashSet<String>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT class_id FROM loyalty.customer_class WHERE business_id = $1",
        )
        .bind(business_id)
        .fetch_all(self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    /// Create a class under a business.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the id is taken within the business.
    /// Returns `RepositoryError::NotFound` if the business does not exist.
    pub async fn create(
        &self,
        business_id: &BusinessId,
        class_id: &ClassId,
        name: &str,
    ) -> Result<CustomerClass, RepositoryError> {
        let row = sqlx::query_as::<_, ClassRow>(
            "INSERT INTO loyalty.customer_class (business_id, class_id, name)
             VALUES ($1, $2, $3)
             RETURNING business_id, class_id, name, created_at",
        )
        .bind(business_id)
        .bind(class_id)
        .bind(name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            RepositoryError::from_write(
                e,
                &format!("class {class_id} already exists in {business_id}"),
            )
        })?;

        Ok(row.into())
    }
}
