//! Customer enrollment repository.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use loyalty_core::CustomerId;

use super::RepositoryError;
use crate::models::Customer;

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    uid: String,
    customer_id: CustomerId,
    public: bool,
    created_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Self {
            uid: row.uid,
            customer_id: row.customer_id,
            public: row.public,
            created_at: row.created_at,
        }
    }
}

/// Repository for customer enrollment.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every customer id currently assigned.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_ids(&self) -> Result<HashSet<String>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, String>("SELECT customer_id FROM loyalty.customer")
            .fetch_all(self.pool)
            .await?;

        Ok(ids.into_iter().collect())
    }

    /// Enroll a user as a customer under `customer_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user is already enrolled or the id is taken.
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn enroll(
        &self,
        uid: &str,
        customer_id: &CustomerId,
        public: bool,
    ) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            "INSERT INTO loyalty.customer (uid, customer_id, public)
             VALUES ($1, $2, $3)
             RETURNING uid, customer_id, public, created_at",
        )
        .bind(uid)
        .bind(customer_id)
        .bind(public)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            RepositoryError::from_write(
                e,
                &format!("customer {customer_id} or user {uid} already enrolled"),
            )
        })?;

        Ok(row.into())
    }
}
