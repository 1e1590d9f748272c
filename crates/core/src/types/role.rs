//! User roles.

use serde::{Deserialize, Serialize};

/// Role of a platform user.
///
/// Stored as text on the user record and mirrored into the `role` custom claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Collects points at businesses.
    #[default]
    Customer,
    /// Runs a loyalty program.
    Business,
    /// Platform operator with access to the admin API.
    Admin,
}

impl UserRole {
    /// Name of the custom claim that carries the role.
    pub const CLAIM: &'static str = "role";

    /// Read the role from a custom claims object, if present and valid.
    #[must_use]
    pub fn from_claims(claims: &serde_json::Value) -> Option<Self> {
        claims.get(Self::CLAIM)?.as_str()?.parse().ok()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Business => write!(f, "business"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "business" => Ok(Self::Business),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        for role in [UserRole::Customer, UserRole::Business, UserRole::Admin] {
            assert_eq!(role.to_string().parse::<UserRole>(), Ok(role));
        }
        assert!("owner".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_from_claims() {
        let claims = serde_json::json!({ "role": "business", "tier": 2 });
        assert_eq!(UserRole::from_claims(&claims), Some(UserRole::Business));

        assert_eq!(UserRole::from_claims(&serde_json::json!({ "role": 3 })), None);
        assert_eq!(UserRole::from_claims(&serde_json::json!({})), None);
    }
}
