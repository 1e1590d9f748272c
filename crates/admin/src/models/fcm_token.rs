//! Push messaging device token.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A registered push token, optionally tied to a user.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FcmToken {
    pub token: String,
    pub uid: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every re-registration.
    pub last_used_at: DateTime<Utc>,
}
