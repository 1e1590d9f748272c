//! Cross-customer transaction listing for the admin dashboard.
//!
//! Transactions are stored per customer. Listing across customers reads each
//! customer's batch in turn, then [`aggregate`] filters, merges, sorts, and
//! truncates them in memory.

use std::cmp::Reverse;

use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, instrument};

use crate::db::{RepositoryError, TransactionRepository, UserRepository};
use crate::models::Transaction;

/// Default number of transactions returned.
pub const DEFAULT_LIMIT: usize = 50;

/// Upper bound on `limit`.
pub const MAX_LIMIT: usize = 500;

/// In-memory filters applied to every batch.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Only this customer's transactions.
    pub customer_uid: Option<String>,
    /// Only transactions at this business.
    pub business_id: Option<String>,
    /// Only transactions of this kind.
    pub kind: Option<String>,
}

impl TransactionFilter {
    fn matches(&self, tx: &Transaction) -> bool {
        self.business_id
            .as_deref()
            .is_none_or(|b| tx.business_id.as_deref() == Some(b))
            && self.kind.as_deref().is_none_or(|k| tx.kind == k)
    }
}

/// Aggregated listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    pub transactions: Vec<Transaction>,
    /// Matches before truncation.
    pub total: usize,
    /// Length of `transactions`.
    pub returned: usize,
}

/// Filter, merge, and truncate per-customer batches.
///
/// Output is newest first; equal timestamps fall back to descending id.
#[must_use]
pub fn aggregate<I>(batches: I, filter: &TransactionFilter, limit: usize) -> TransactionSummary
where
    I: IntoIterator<Item = Vec<Transaction>>,
{
    let mut transactions: Vec<Transaction> = batches
        .into_iter()
        .flatten()
        .filter(|tx| filter.matches(tx))
        .collect();

    transactions.sort_by_key(|tx| Reverse((tx.created_at, tx.id)));

    let total = transactions.len();
    transactions.truncate(limit);
    let returned = transactions.len();

    TransactionSummary {
        transactions,
        total,
        returned,
    }
}

/// Read every matching customer's transactions and aggregate them.
///
/// Customers are read one at a time.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if any read fails. Partial results are discarded.
#[instrument(skip(pool))]
pub async fn list_transactions(
    pool: &PgPool,
    filter: &TransactionFilter,
    limit: usize,
) -> Result<TransactionSummary, RepositoryError> {
    let uids = match &filter.customer_uid {
        Some(uid) => vec![uid.clone()],
        None => UserRepository::new(pool).list_uids().await?,
    };

    let repo = TransactionRepository::new(pool);
    let mut batches = Vec::with_capacity(uids.len());
    for uid in &uids {
        batches.push(repo.list_for_customer(uid).await?);
    }

    let summary = aggregate(batches, filter, limit);
    debug!(
        customers = uids.len(),
        total = summary.total,
        returned = summary.returned,
        "Aggregated transactions"
    );
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    use super::*;

    fn tx(customer: &str, minutes: i64, business: &str, kind: &str) -> Transaction {
        let base = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        Transaction {
            id: Uuid::new_v4(),
            customer_uid: customer.to_string(),
            business_id: Some(business.to_string()),
            kind: kind.to_string(),
            points: 10,
            description: None,
            created_at: base + Duration::minutes(minutes),
        }
    }

    #[test]
    fn test_merge_truncates_to_most_recent() {
        let batches = vec![
            vec![tx("a", 1, "BIZ0001", "earn"), tx("a", 5, "BIZ0001", "earn")],
            vec![],
            vec![
                tx("c", 2, "BIZ0001", "earn"),
                tx("c", 3, "BIZ0002", "redeem"),
                tx("c", 4, "BIZ0001", "earn"),
                tx("c", 6, "BIZ0002", "earn"),
                tx("c", 7, "BIZ0001", "adjust"),
            ],
        ];

        let summary = aggregate(batches, &TransactionFilter::default(), 4);

        assert_eq!(summary.total, 7);
        assert_eq!(summary.returned, 4);
        let minutes: Vec<i64> = summary
            .transactions
            .iter()
            .map(|t| t.created_at.timestamp() / 60 % 60)
            .collect();
        assert_eq!(minutes, vec![7, 6, 5, 4]);
    }

    #[test]
    fn test_filters_apply_before_total() {
        let batches = vec![
            vec![tx("a", 1, "BIZ0001", "earn"), tx("a", 2, "BIZ0002", "earn")],
            vec![tx("b", 3, "BIZ0001", "redeem"), tx("b", 4, "BIZ0001", "earn")],
        ];
        let filter = TransactionFilter {
            business_id: Some("BIZ0001".to_string()),
            kind: Some("earn".to_string()),
            ..TransactionFilter::default()
        };

        let summary = aggregate(batches, &filter, DEFAULT_LIMIT);

        assert_eq!(summary.total, 2);
        assert_eq!(summary.returned, 2);
        assert!(
            summary
                .transactions
                .iter()
                .all(|t| t.kind == "earn" && t.business_id.as_deref() == Some("BIZ0001"))
        );
    }

    #[test]
    fn test_equal_timestamps_order_by_id() {
        let mut first = tx("a", 1, "BIZ0001", "earn");
        let mut second = tx("b", 1, "BIZ0001", "earn");
        first.id = Uuid::from_u128(1);
        second.id = Uuid::from_u128(2);

        let summary = aggregate(vec![vec![first], vec![second]], &TransactionFilter::default(), 10);

        assert_eq!(summary.transactions[0].id, Uuid::from_u128(2));
        assert_eq!(summary.transactions[1].id, Uuid::from_u128(1));
    }

    #[test]
    fn test_empty_input() {
        let summary = aggregate(Vec::<Vec<Transaction>>::new(), &TransactionFilter::default(), 10);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.returned, 0);
        assert!(summary.transactions.is_empty());
    }
}
