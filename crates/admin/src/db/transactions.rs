//! Points transaction repository (read side).

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::RepositoryError;
use crate::models::Transaction;

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    customer_uid: String,
    business_id: Option<String>,
    kind: String,
    points: i32,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<TransactionRow> for Transaction {
    fn from(row: TransactionRow) -> Self {
        Self {
            id: row.id,
            customer_uid: row.customer_uid,
            business_id: row.business_id,
            kind: row.kind,
            points: row.points,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

/// Repository for points transactions.
pub struct TransactionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TransactionRepository<'a> {
    /// Create a new transaction repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All transactions of one customer, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(&self, uid: &str) -> Result<Vec<Transaction>, RepositoryError> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            "SELECT id, customer_uid, business_id, kind, points, description, created_at
             FROM loyalty.transaction
             WHERE customer_uid = $1
             ORDER BY created_at DESC",
        )
        .bind(uid)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
