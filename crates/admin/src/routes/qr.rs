//! QR code link API.

use axum::{Json, Router, extract::State, routing::get};
use serde::Deserialize;
use tracing::instrument;

use loyalty_core::{BusinessId, ClassId, Validator};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminToken;
use crate::routes::extract::{ApiPath, ApiQuery};
use crate::services::{QrCode, is_valid_referral_code};
use crate::state::AppState;

/// Build the QR router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/qr/class", get(class_signup))
        .route("/api/qr/referral/{code}", get(referral))
}

/// Class signup link target.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassQrQuery {
    #[serde(default)]
    pub business_id: String,
    #[serde(default)]
    pub class_id: String,
}

/// Signup link that enrolls the new user into a class, plus its QR image.
///
/// # Errors
///
/// Returns 400 if either id is malformed.
#[instrument(skip(state, _auth))]
pub async fn class_signup(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ClassQrQuery>,
) -> Result<Json<QrCode>> {
    let mut v = Validator::new();
    let business_id = BusinessId::parse(&query.business_id)
        .map_err(|e| v.push("businessId", e.to_string()))
        .ok();
    let class_id = ClassId::parse(&query.class_id)
        .map_err(|e| v.push("classId", e.to_string()))
        .ok();
    v.finish().map_err(AppError::Validation)?;

    match (business_id, class_id) {
        (Some(business_id), Some(class_id)) => {
            Ok(Json(state.qr().class_signup(&business_id, &class_id)))
        }
        _ => Err(AppError::invalid("query", "businessId and classId are required")),
    }
}

/// Referral signup link plus its QR image.
///
/// # Errors
///
/// Returns 400 if the code is not 4-32 characters of `[A-Za-z0-9_-]`.
#[instrument(skip(state, _auth))]
pub async fn referral(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
) -> Result<Json<QrCode>> {
    if !is_valid_referral_code(&code) {
        return Err(AppError::invalid(
            "code",
            "must be 4-32 characters of letters, digits, '-' or '_'",
        ));
    }
    Ok(Json(state.qr().referral(&code)))
}
