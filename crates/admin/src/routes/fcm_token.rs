//! Device token registration for push messaging.
//!
//! Called by end-user devices, so no admin token is required.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use loyalty_core::Validator;

use crate::db::{FcmTokenRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::models::FcmToken;
use crate::routes::extract::ApiJson;
use crate::routes::users::MAX_UID_LEN;
use crate::state::AppState;

/// Maximum token length.
pub const MAX_TOKEN_LEN: usize = 4096;

/// Build the token router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/fcm-token", post(register).delete(unregister))
}

fn validate_token(v: &mut Validator, token: &str) {
    v.check_length("token", token, 1, MAX_TOKEN_LEN);
}

/// Registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterTokenRequest {
    pub token: String,
    pub uid: Option<String>,
}

/// Register or refresh a device token.
///
/// # Errors
///
/// Returns 400 for an invalid token or uid, 404 if the uid names no user.
#[instrument(skip(state, body), fields(uid = ?body.uid))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterTokenRequest>,
) -> Result<Json<FcmToken>> {
    let mut v = Validator::new();
    validate_token(&mut v, &body.token);
    if let Some(uid) = &body.uid {
        v.check_length("uid", uid, 1, MAX_UID_LEN);
    }
    v.finish().map_err(AppError::Validation)?;

    let token = FcmTokenRepository::new(state.pool())
        .upsert(&body.token, body.uid.as_deref())
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("user for token".to_string()),
            other => other.into(),
        })?;

    info!(has_uid = token.uid.is_some(), "Registered device token");
    Ok(Json(token))
}

/// Removal request.
#[derive(Debug, Deserialize)]
pub struct UnregisterTokenRequest {
    pub token: String,
}

/// Removal acknowledgement.
#[derive(Debug, Serialize)]
pub struct UnregisterTokenResponse {
    pub success: bool,
}

/// Remove a device token.
///
/// # Errors
///
/// Returns 400 for an invalid token, 404 if it is not registered.
#[instrument(skip(state, body))]
pub async fn unregister(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UnregisterTokenRequest>,
) -> Result<Json<UnregisterTokenResponse>> {
    let mut v = Validator::new();
    validate_token(&mut v, &body.token);
    v.finish().map_err(AppError::Validation)?;

    FcmTokenRepository::new(state.pool())
        .delete(&body.token)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("token".to_string()),
            other => other.into(),
        })?;

    info!("Removed device token");
    Ok(Json(UnregisterTokenResponse { success: true }))
}
