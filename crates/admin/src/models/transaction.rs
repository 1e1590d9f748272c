//! Points transaction type.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A single points movement on a customer's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub customer_uid: String,
    pub business_id: Option<String>,
    /// Free-form kind such as `earn`, `redeem`, or `adjust`.
    #[serde(rename = "type")]
    pub kind: String,
    pub points: i32,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}
