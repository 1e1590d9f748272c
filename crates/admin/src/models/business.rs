//! Business, class, and customer enrollment types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use loyalty_core::{BusinessId, ClassId, CustomerId, PointsLabel, PointsLabelShort};

/// A business running a loyalty program.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub business_id: BusinessId,
    pub name: String,
    pub owner_uid: Option<String>,
    /// What the program calls its points ("Stars", "Beans").
    pub points_label: PointsLabel,
    /// Compact form for tight layouts.
    pub points_label_short: Option<PointsLabelShort>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A customer class (tier or signup cohort) within a business.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerClass {
    pub business_id: BusinessId,
    pub class_id: ClassId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A user enrolled as a loyalty customer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub uid: String,
    pub customer_id: CustomerId,
    /// Whether the customer appears in public leaderboards.
    pub public: bool,
    pub created_at: DateTime<Utc>,
}
