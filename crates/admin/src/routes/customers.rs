//! Customer enrollment API.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::db::{CustomerRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminToken;
use crate::models::Customer;
use crate::routes::extract::ApiJson;
use crate::routes::users::validate_uid;
use crate::services::IdAllocator;
use crate::state::AppState;

/// Build the customers router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/admin/customers", post(enroll_customer))
}

/// Enrollment request.
#[derive(Debug, Deserialize)]
pub struct EnrollCustomerRequest {
    pub uid: String,
    /// Whether the customer appears in public leaderboards.
    #[serde(default)]
    pub public: bool,
}

/// Enroll an existing user as a customer with a fresh `BC####` id.
///
/// # Errors
///
/// Returns 400 for an invalid uid, 404 if the user does not exist,
/// 409 if the user is already enrolled.
#[instrument(skip(state, _auth))]
pub async fn enroll_customer(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<EnrollCustomerRequest>,
) -> Result<(StatusCode, Json<Customer>)> {
    validate_uid(&body.uid)?;

    let customer_id = IdAllocator::new(state.pool()).customer_id(None).await?;
    let customer = CustomerRepository::new(state.pool())
        .enroll(&body.uid, &customer_id, body.public)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound(format!("user {}", body.uid)),
            other => other.into(),
        })?;

    info!(uid = %customer.uid, customer_id = %customer.customer_id, "Enrolled customer");
    Ok((StatusCode::CREATED, Json(customer)))
}
