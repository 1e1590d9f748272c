//! Platform user domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use loyalty_core::UserRole;

/// A platform user account.
///
/// The same record backs both the profile view (`/api/users`) and the
/// sign-in view (`/api/auth-users`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Opaque user id issued by the identity provider.
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: UserRole,
    pub disabled: bool,
    /// Free-form claims object. The `role` key mirrors [`User::role`].
    pub custom_claims: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

/// Partial update of a user. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub disabled: Option<bool>,
    pub display_name: Option<String>,
    pub custom_claims: Option<serde_json::Value>,
    /// Derived from `custom_claims` when it carries a valid `role`.
    pub role: Option<UserRole>,
}

impl UserUpdate {
    /// Set the claims object and pick up the role it carries, if any.
    #[must_use]
    pub fn with_claims(mut self, claims: serde_json::Value) -> Self {
        self.role = UserRole::from_claims(&claims);
        self.custom_claims = Some(claims);
        self
    }
}
