//! Admin transaction listing.

use axum::{Json, Router, extract::State, routing::get};
use serde::Deserialize;
use tracing::instrument;

use loyalty_core::Validator;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminToken;
use crate::routes::extract::ApiQuery;
use crate::routes::users::MAX_UID_LEN;
use crate::services::transactions::{DEFAULT_LIMIT, MAX_LIMIT};
use crate::services::{TransactionFilter, TransactionSummary, list_transactions};
use crate::state::AppState;

/// Build the transactions router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/admin/transactions", get(list))
}

/// Listing filters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQuery {
    pub customer_id: Option<String>,
    pub business_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub limit: Option<i64>,
}

impl TransactionQuery {
    fn validate(self) -> Result<(TransactionFilter, usize)> {
        let mut v = Validator::new();
        let limit = self
            .limit
            .unwrap_or(i64::try_from(DEFAULT_LIMIT).unwrap_or(i64::MAX));
        v.check_range(
            "limit",
            limit,
            1,
            i64::try_from(MAX_LIMIT).unwrap_or(i64::MAX),
        );
        if let Some(uid) = &self.customer_id {
            v.check_length("customerId", uid, 1, MAX_UID_LEN);
        }
        v.finish().map_err(AppError::Validation)?;

        let filter = TransactionFilter {
            customer_uid: self.customer_id,
            business_id: self.business_id.filter(|b| !b.is_empty()),
            kind: self.kind.filter(|k| !k.is_empty()),
        };
        Ok((filter, usize::try_from(limit).unwrap_or(DEFAULT_LIMIT)))
    }
}

/// Newest transactions across customers.
///
/// # Errors
///
/// Returns 400 for an out-of-range limit, 500 if any read fails.
#[instrument(skip(state, _auth))]
pub async fn list(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TransactionQuery>,
) -> Result<Json<TransactionSummary>> {
    let (filter, limit) = query.validate()?;
    let summary = list_transactions(state.pool(), &filter, limit).await?;
    Ok(Json(summary))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn query(limit: Option<i64>) -> TransactionQuery {
        TransactionQuery {
            customer_id: None,
            business_id: Some(String::new()),
            kind: Some("earn".to_string()),
            limit,
        }
    }

    #[test]
    fn test_limit_bounds() {
        assert_eq!(query(None).validate().unwrap().1, DEFAULT_LIMIT);
        assert_eq!(query(Some(500)).validate().unwrap().1, 500);
        assert!(query(Some(0)).validate().is_err());
        assert!(query(Some(501)).validate().is_err());
    }

    #[test]
    fn test_blank_filters_are_dropped() {
        let (filter, _) = query(Some(10)).validate().unwrap();
        assert_eq!(filter.business_id, None);
        assert_eq!(filter.kind.as_deref(), Some("earn"));
    }
}
