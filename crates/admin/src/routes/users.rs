//! User management API.
//!
//! Every payload is validated before storage is touched, so a rejected bulk
//! delete never removes anything.

use std::collections::HashSet;

use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use loyalty_core::Validator;

use crate::db::{RepositoryError, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminToken;
use crate::models::{User, UserUpdate};
use crate::routes::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

/// Maximum uid length.
pub const MAX_UID_LEN: usize = 128;
/// Default page size for listings.
pub const DEFAULT_PAGE_SIZE: u32 = 100;
/// Maximum page size for listings.
pub const MAX_PAGE_SIZE: u32 = 1000;
/// Maximum number of uids in one bulk delete.
pub const MAX_BULK_DELETE: usize = 100;
/// Maximum serialized size of a custom claims object, in bytes.
pub const MAX_CLAIMS_BYTES: usize = 1000;
/// Maximum display name length.
pub const MAX_DISPLAY_NAME_LEN: usize = 100;

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(bulk_delete))
        .route(
            "/api/users/{uid}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

// =============================================================================
// Shared validation
// =============================================================================

/// Pagination parameters shared by user listings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page_size: Option<i64>,
    pub page_token: Option<String>,
}

impl PageQuery {
    /// Validate and return `(page_size, page_token)`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the page size or token is out of bounds.
    pub fn validate(&self) -> Result<(u32, Option<&str>)> {
        let mut v = Validator::new();
        let page_size = self.page_size.unwrap_or(i64::from(DEFAULT_PAGE_SIZE));
        v.check_range("pageSize", page_size, 1, i64::from(MAX_PAGE_SIZE));
        if let Some(token) = &self.page_token {
            v.check_length("pageToken", token, 1, MAX_UID_LEN);
        }
        v.finish().map_err(AppError::Validation)?;

        let page_size = u32::try_from(page_size).unwrap_or(DEFAULT_PAGE_SIZE);
        Ok((page_size, self.page_token.as_deref()))
    }
}

/// Validate a single uid.
///
/// # Errors
///
/// Returns `AppError::Validation` if the uid is empty or too long.
pub fn validate_uid(uid: &str) -> Result<()> {
    let mut v = Validator::new();
    v.check_length("uid", uid, 1, MAX_UID_LEN);
    v.finish().map_err(AppError::Validation)
}

/// Map a missing user to a 404 that names the uid.
pub(crate) fn user_error(err: RepositoryError, uid: &str) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound(format!("user {uid}")),
        other => other.into(),
    }
}

/// Acknowledgement for single deletes.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub uid: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// One page of users.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersResponse {
    pub users: Vec<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

/// List users, `pageSize` at a time.
///
/// # Errors
///
/// Returns 400 for an out-of-range page size, 500 if the query fails.
#[instrument(skip(state, _auth))]
pub async fn list_users(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<ListUsersResponse>> {
    let (page_size, after) = query.validate()?;
    let page = UserRepository::new(state.pool())
        .list_page(page_size, after)
        .await?;

    Ok(Json(ListUsersResponse {
        users: page.users,
        page_token: page.next_page_token,
    }))
}

/// Get one user.
///
/// # Errors
///
/// Returns 400 for an invalid uid, 404 if the user does not exist.
#[instrument(skip(state, _auth))]
pub async fn get_user(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    ApiPath(uid): ApiPath<String>,
) -> Result<Json<User>> {
    validate_uid(&uid)?;
    let user = UserRepository::new(state.pool())
        .get(&uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {uid}")))?;

    Ok(Json(user))
}

/// Partial user update.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub disabled: Option<bool>,
    pub custom_claims: Option<serde_json::Value>,
    pub display_name: Option<String>,
}

impl UpdateUserRequest {
    fn validate(self) -> Result<UserUpdate> {
        let mut v = Validator::new();

        v.check(
            self.disabled.is_some() || self.custom_claims.is_some() || self.display_name.is_some(),
            "body",
            "must set at least one of disabled, customClaims, displayName",
        );

        if let Some(name) = &self.display_name {
            v.check_length("displayName", name, 1, MAX_DISPLAY_NAME_LEN);
        }

        if let Some(claims) = &self.custom_claims {
            if v.check(claims.is_object(), "customClaims", "must be a JSON object") {
                let size = serde_json::to_vec(claims).map_or(usize::MAX, |bytes| bytes.len());
                v.check(
                    size <= MAX_CLAIMS_BYTES,
                    "customClaims",
                    format!("must serialize to at most {MAX_CLAIMS_BYTES} bytes"),
                );
            }
        }

        v.finish().map_err(AppError::Validation)?;

        let update = UserUpdate {
            disabled: self.disabled,
            display_name: self.display_name,
            ..UserUpdate::default()
        };
        Ok(match self.custom_claims {
            Some(claims) => update.with_claims(claims),
            None => update,
        })
    }
}

/// Disable or enable a user, set custom claims, or rename.
///
/// # Errors
///
/// Returns 400 for an invalid body, 404 if the user does not exist.
#[instrument(skip(state, _auth, body))]
pub async fn update_user(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    ApiPath(uid): ApiPath<String>,
    ApiJson(body): ApiJson<UpdateUserRequest>,
) -> Result<Json<User>> {
    validate_uid(&uid)?;
    let update = body.validate()?;

    let user = UserRepository::new(state.pool())
        .update(&uid, &update)
        .await
        .map_err(|e| user_error(e, &uid))?;

    info!(
        uid = %uid,
        disabled = ?update.disabled,
        role = ?update.role,
        claims_changed = update.custom_claims.is_some(),
        "Updated user"
    );
    Ok(Json(user))
}

/// Delete one user.
///
/// # Errors
///
/// Returns 400 for an invalid uid, 404 if the user does not exist.
#[instrument(skip(state, _auth))]
pub async fn delete_user(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    ApiPath(uid): ApiPath<String>,
) -> Result<Json<DeleteResponse>> {
    validate_uid(&uid)?;
    UserRepository::new(state.pool())
        .delete(&uid)
        .await
        .map_err(|e| user_error(e, &uid))?;

    info!(uid = %uid, "Deleted user");
    Ok(Json(DeleteResponse { success: true, uid }))
}

/// Bulk delete request.
#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub uids: Vec<String>,
}

impl BulkDeleteRequest {
    fn validate(&self) -> Result<()> {
        let mut v = Validator::new();
        v.check_count("uids", self.uids.len(), 1, MAX_BULK_DELETE);
        let mut seen = HashSet::with_capacity(self.uids.len());
        for (index, uid) in self.uids.iter().enumerate() {
            let field = format!("uids[{index}]");
            if v.check_length(&field, uid, 1, MAX_UID_LEN) && !seen.insert(uid.as_str()) {
                v.push(&field, "duplicate uid");
            }
        }
        v.finish().map_err(AppError::Validation)
    }
}

/// Per-uid failure in a bulk delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkDeleteFailure {
    pub index: usize,
    pub uid: String,
    pub message: String,
}

/// Outcome of a bulk delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteResponse {
    pub success_count: usize,
    pub failure_count: usize,
    pub errors: Vec<BulkDeleteFailure>,
}

impl BulkDeleteResponse {
    /// Compare requested uids against the ones actually deleted.
    ///
    /// Each deleted row counts once; a repeated uid after the first is a failure.
    #[must_use]
    pub fn from_deleted(requested: &[String], deleted: &[String]) -> Self {
        let mut remaining: HashSet<&str> = deleted.iter().map(String::as_str).collect();
        let mut seen = HashSet::with_capacity(requested.len());
        let mut errors = Vec::new();
        for (index, uid) in requested.iter().enumerate() {
            let message = if seen.insert(uid.as_str()) {
                if remaining.remove(uid.as_str()) {
                    continue;
                }
                "user not found"
            } else {
                "duplicate uid"
            };
            errors.push(BulkDeleteFailure {
                index,
                uid: uid.clone(),
                message: message.to_string(),
            });
        }

        Self {
            success_count: requested.len() - errors.len(),
            failure_count: errors.len(),
            errors,
        }
    }
}

/// Delete up to 100 users at once.
///
/// # Errors
///
/// Returns 400 if the uid list is empty, longer than 100, or has an invalid uid.
#[instrument(skip(state, _auth, body), fields(count = body.uids.len()))]
pub async fn bulk_delete(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<BulkDeleteRequest>,
) -> Result<Json<BulkDeleteResponse>> {
    body.validate()?;

    let deleted = UserRepository::new(state.pool())
        .delete_many(&body.uids)
        .await?;
    let response = BulkDeleteResponse::from_deleted(&body.uids, &deleted);

    info!(
        success_count = response.success_count,
        failure_count = response.failure_count,
        "Bulk deleted users"
    );
    Ok(Json(response))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn uids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("user-{i}")).collect()
    }

    #[test]
    fn test_bulk_delete_bounds() {
        assert!(BulkDeleteRequest { uids: uids(0) }.validate().is_err());
        assert!(BulkDeleteRequest { uids: uids(1) }.validate().is_ok());
        assert!(BulkDeleteRequest { uids: uids(100) }.validate().is_ok());
        assert!(BulkDeleteRequest { uids: uids(101) }.validate().is_err());

        let mut bad = uids(3);
        bad[1] = String::new();
        let Err(AppError::Validation(issues)) = (BulkDeleteRequest { uids: bad }).validate() else {
            panic!("expected validation error");
        };
        assert_eq!(issues[0].field, "uids[1]");
    }

    #[test]
    fn test_bulk_delete_rejects_duplicate_uids() {
        let request = BulkDeleteRequest {
            uids: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        let Err(AppError::Validation(issues)) = request.validate() else {
            panic!("expected validation error");
        };
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "uids[2]");
        assert_eq!(issues[0].message, "duplicate uid");
    }

    #[test]
    fn test_bulk_delete_outcome_counts_each_row_once() {
        let requested = vec!["a".to_string(), "a".to_string()];
        let deleted = vec!["a".to_string()];

        let outcome = BulkDeleteResponse::from_deleted(&requested, &deleted);

        assert_eq!(outcome.success_count, 1);
        assert_eq!(outcome.failure_count, 1);
        assert_eq!(outcome.errors[0].index, 1);
        assert_eq!(outcome.errors[0].message, "duplicate uid");
    }

    #[test]
    fn test_bulk_delete_outcome() {
        let requested = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let deleted = vec!["c".to_string(), "a".to_string()];

        let outcome = BulkDeleteResponse::from_deleted(&requested, &deleted);

        assert_eq!(outcome.success_count, 2);
        assert_eq!(outcome.failure_count, 1);
        assert_eq!(
            outcome.errors,
            vec![BulkDeleteFailure {
                index: 1,
                uid: "b".to_string(),
                message: "user not found".to_string(),
            }]
        );
    }

    #[test]
    fn test_page_query_bounds() {
        let query = |size: Option<i64>| PageQuery {
            page_size: size,
            page_token: None,
        };
        assert_eq!(query(None).validate().unwrap().0, DEFAULT_PAGE_SIZE);
        assert_eq!(query(Some(1000)).validate().unwrap().0, 1000);
        assert!(query(Some(0)).validate().is_err());
        assert!(query(Some(1001)).validate().is_err());
    }

    #[test]
    fn test_update_requires_a_field() {
        let empty = UpdateUserRequest {
            disabled: None,
            custom_claims: None,
            display_name: None,
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_update_claims_rules() {
        let request = |claims: serde_json::Value| UpdateUserRequest {
            disabled: None,
            custom_claims: Some(claims),
            display_name: None,
        };

        assert!(request(serde_json::json!(["admin"])).validate().is_err());
        assert!(
            request(serde_json::json!({ "note": "x".repeat(MAX_CLAIMS_BYTES) }))
                .validate()
                .is_err()
        );

        let update = request(serde_json::json!({ "role": "business" }))
            .validate()
            .unwrap();
        assert_eq!(update.role, Some(loyalty_core::UserRole::Business));
    }

    #[test]
    fn test_update_display_name_bounds() {
        let request = |name: String| UpdateUserRequest {
            disabled: None,
            custom_claims: None,
            display_name: Some(name),
        };
        assert!(request(String::new()).validate().is_err());
        assert!(request("a".repeat(100)).validate().is_ok());
        assert!(request("a".repeat(101)).validate().is_err());
    }
}
