//! Business settings API: listing, creation, points labels, and classes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, instrument};

use loyalty_core::{BusinessId, PointsLabel, PointsLabelShort, ValidationIssue, Validator};

use crate::db::RepositoryError;
use crate::db::businesses::{BusinessRepository, NewBusiness};
use crate::db::classes::ClassRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminToken;
use crate::models::{Business, CustomerClass};
use crate::routes::extract::{ApiJson, ApiPath};
use crate::routes::users::MAX_UID_LEN;
use crate::services::IdAllocator;
use crate::state::AppState;

/// Label given to new businesses that do not name their points.
pub const DEFAULT_POINTS_LABEL: &str = "Points";
/// Maximum business or class name length.
pub const MAX_NAME_LEN: usize = 100;

/// Build the businesses router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/admin/businesses",
            get(list_businesses).post(create_business),
        )
        .route("/api/admin/businesses/{business_id}", put(update_points_labels))
        .route(
            "/api/admin/businesses/{business_id}/classes",
            post(create_class),
        )
}

fn business_error(err: RepositoryError, business_id: &BusinessId) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound(format!("business {business_id}")),
        other => other.into(),
    }
}

/// All businesses.
#[derive(Debug, Serialize)]
pub struct ListBusinessesResponse {
    pub businesses: Vec<Business>,
}

/// List businesses sorted by name.
///
/// # Errors
///
/// Returns 500 if the query fails.
#[instrument(skip(state, _auth))]
pub async fn list_businesses(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
) -> Result<Json<ListBusinessesResponse>> {
    let businesses = BusinessRepository::new(state.pool()).list_all().await?;
    Ok(Json(ListBusinessesResponse { businesses }))
}

/// Points label update.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePointsLabelsRequest {
    pub points_label: Option<String>,
    /// Absent keeps the stored value; `null` or blank clears it.
    #[serde(default, deserialize_with = "present")]
    pub points_label_short: Option<Option<String>>,
}

/// Wraps any present value, `null` included, in `Some`.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Validated label change. `short` is `None` when the short label is untouched.
type LabelUpdate = (PointsLabel, Option<Option<PointsLabelShort>>);

impl UpdatePointsLabelsRequest {
    /// Validate both labels, collecting every issue.
    ///
    /// # Errors
    ///
    /// Returns the issues when either label is missing or out of bounds.
    pub fn validate(&self) -> std::result::Result<LabelUpdate, Vec<ValidationIssue>> {
        let mut v = Validator::new();

        let label = match self.points_label.as_deref() {
            None => {
                v.push("pointsLabel", "is required");
                None
            }
            Some(raw) => PointsLabel::parse(raw)
                .map_err(|e| v.push("pointsLabel", e.to_string()))
                .ok(),
        };

        let short = self.points_label_short.as_ref().and_then(|raw| {
            PointsLabelShort::parse(raw.as_deref().unwrap_or(""))
                .map_err(|e| v.push("pointsLabelShort", e.to_string()))
                .ok()
        });

        v.finish()?;
        label.map(|label| (label, short)).ok_or_else(Vec::new)
    }
}

/// Update a business's points labels, keeping an omitted short label.
///
/// # Errors
///
/// Returns 400 with the issue list on invalid labels, 404 if the business does not exist.
#[instrument(skip(state, _auth, body))]
pub async fn update_points_labels(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    ApiPath(business_id): ApiPath<String>,
    ApiJson(body): ApiJson<UpdatePointsLabelsRequest>,
) -> Result<Json<Business>> {
    let business_id = BusinessId::parse(&business_id)?;
    let (label, short) = body.validate().map_err(AppError::Validation)?;

    let business = BusinessRepository::new(state.pool())
        .update_points_labels(&business_id, &label, short.as_ref().map(Option::as_ref))
        .await
        .map_err(|e| business_error(e, &business_id))?;

    info!(
        business_id = %business_id,
        points_label = %label,
        points_label_short = ?short
            .as_ref()
            .map(|s| s.as_ref().map(PointsLabelShort::as_str)),
        "Updated points labels"
    );
    Ok(Json(business))
}

/// New business.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBusinessRequest {
    pub name: String,
    pub points_label: Option<String>,
    pub owner_uid: Option<String>,
}

impl CreateBusinessRequest {
    fn validate(&self) -> Result<PointsLabel> {
        let mut v = Validator::new();
        v.check_length("name", self.name.trim(), 1, MAX_NAME_LEN);
        if let Some(owner) = &self.owner_uid {
            v.check_length("ownerUid", owner, 1, MAX_UID_LEN);
        }
        let raw_label = self.points_label.as_deref().unwrap_or(DEFAULT_POINTS_LABEL);
        let label = PointsLabel::parse(raw_label)
            .map_err(|e| v.push("pointsLabel", e.to_string()))
            .ok();
        v.finish().map_err(AppError::Validation)?;
        label.ok_or_else(|| AppError::invalid("pointsLabel", "is invalid"))
    }
}

/// Create a business with a freshly allocated id.
///
/// # Errors
///
/// Returns 400 on invalid input, 404 if the owner does not exist,
/// 409 if the id was taken concurrently.
#[instrument(skip(state, _auth, body))]
pub async fn create_business(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateBusinessRequest>,
) -> Result<(StatusCode, Json<Business>)> {
    let points_label = body.validate()?;

    let business_id = IdAllocator::new(state.pool()).business_id(None).await?;
    let business = BusinessRepository::new(state.pool())
        .create(&NewBusiness {
            business_id,
            name: body.name.trim().to_string(),
            owner_uid: body.owner_uid,
            points_label,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("owner user".to_string()),
            other => other.into(),
        })?;

    info!(business_id = %business.business_id, "Created business");
    Ok((StatusCode::CREATED, Json(business)))
}

/// New customer class.
#[derive(Debug, Deserialize)]
pub struct CreateClassRequest {
    pub name: String,
}

/// Create a customer class under a business.
///
/// # Errors
///
/// Returns 400 on invalid input, 404 if the business does not exist,
/// 409 if the id was taken concurrently.
#[instrument(skip(state, _auth, body))]
pub async fn create_class(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    ApiPath(business_id): ApiPath<String>,
    ApiJson(body): ApiJson<CreateClassRequest>,
) -> Result<(StatusCode, Json<CustomerClass>)> {
    let business_id = BusinessId::parse(&business_id)?;
    let name = body.name.trim();
    let mut v = Validator::new();
    v.check_length("name", name, 1, MAX_NAME_LEN);
    v.finish().map_err(AppError::Validation)?;

    BusinessRepository::new(state.pool())
        .get(&business_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("business {business_id}")))?;

    let class_id = IdAllocator::new(state.pool())
        .class_id(&business_id, None)
        .await?;
    let class = ClassRepository::new(state.pool())
        .create(&business_id, &class_id, name)
        .await
        .map_err(|e| business_error(e, &business_id))?;

    info!(business_id = %business_id, class_id = %class.class_id, "Created customer class");
    Ok((StatusCode::CREATED, Json(class)))
}
