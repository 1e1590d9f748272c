//! Push notification preview.
//!
//! Shows what a device renders for a payload and where a tap leads, without
//! sending anything.

use axum::{Json, Router, routing::post};
use tracing::instrument;

use loyalty_core::notification::{NotificationDisplay, NotificationPayload};

use crate::middleware::RequireAdminToken;
use crate::routes::extract::ApiJson;
use crate::state::AppState;

/// Build the notifications router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/admin/notifications/preview", post(preview))
}

/// Resolve a payload into its displayed form.
#[instrument(skip(_auth))]
pub async fn preview(
    _auth: RequireAdminToken,
    ApiJson(payload): ApiJson<NotificationPayload>,
) -> Json<NotificationDisplay> {
    Json(payload.display())
}
