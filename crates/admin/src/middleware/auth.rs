//! Bearer-token authentication for admin routes.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};

use crate::error::AppError;
use crate::state::AppState;

/// Extractor that requires `Authorization: Bearer <LOYALTY_ADMIN_TOKEN>`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(_auth: RequireAdminToken) -> impl IntoResponse {
///     "only admins see this"
/// }
/// ```
pub struct RequireAdminToken;

impl FromRequestParts<AppState> for RequireAdminToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;

        if !tokens_match(presented, state.config().admin_token.expose_secret()) {
            tracing::warn!(path = %parts.uri.path(), "Rejected admin token");
            return Err(AppError::Unauthorized("invalid bearer token".to_string()));
        }

        Ok(Self)
    }
}

/// Compare SHA-256 digests of both tokens in constant time.
fn tokens_match(presented: &str, expected: &str) -> bool {
    let a = Sha256::digest(presented.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_match() {
        assert!(tokens_match("tK9#vQ2$mX7!pL4@", "tK9#vQ2$mX7!pL4@"));
        assert!(!tokens_match("tK9#vQ2$mX7!pL4@", "tK9#vQ2$mX7!pL4#"));
        assert!(!tokens_match("short", "tK9#vQ2$mX7!pL4@"));
        assert!(!tokens_match("", "tK9#vQ2$mX7!pL4@"));
    }
}
