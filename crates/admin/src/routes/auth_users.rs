//! Sign-in account view of users.
//!
//! Same records as `/api/users`, shaped like an identity provider's account
//! listing: uid, email, disabled flag, claims, and sign-in metadata.

use axum::{Json, Router, extract::State, routing::get};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::db::UserRepository;
use crate::error::Result;
use crate::middleware::RequireAdminToken;
use crate::models::User;
use crate::routes::extract::ApiQuery;
use crate::routes::users::{DeleteResponse, PageQuery, user_error, validate_uid};
use crate::state::AppState;

/// Build the auth-users router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/auth-users", get(list_auth_users).delete(delete_auth_user))
}

/// Account timestamps.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUserMetadata {
    pub creation_time: DateTime<Utc>,
    pub last_sign_in_time: Option<DateTime<Utc>>,
}

/// A sign-in account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub disabled: bool,
    pub custom_claims: serde_json::Value,
    pub metadata: AuthUserMetadata,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            uid: user.uid,
            email: user.email,
            disabled: user.disabled,
            custom_claims: user.custom_claims,
            metadata: AuthUserMetadata {
                creation_time: user.created_at,
                last_sign_in_time: user.last_sign_in_at,
            },
        }
    }
}

/// One page of accounts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAuthUsersResponse {
    pub users: Vec<AuthUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

/// List sign-in accounts.
///
/// # Errors
///
/// Returns 400 for an out-of-range page size, 500 if the query fails.
#[instrument(skip(state, _auth))]
pub async fn list_auth_users(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<ListAuthUsersResponse>> {
    let (page_size, after) = query.validate()?;
    let page = UserRepository::new(state.pool())
        .list_page(page_size, after)
        .await?;

    Ok(Json(ListAuthUsersResponse {
        users: page.users.into_iter().map(AuthUser::from).collect(),
        page_token: page.next_page_token,
    }))
}

/// `?uid=` for deletes.
#[derive(Debug, Deserialize)]
pub struct UidQuery {
    #[serde(default)]
    pub uid: String,
}

/// Delete a sign-in account.
///
/// # Errors
///
/// Returns 400 for a missing or invalid uid, 404 if the account does not exist.
#[instrument(skip(state, _auth))]
pub async fn delete_auth_user(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UidQuery>,
) -> Result<Json<DeleteResponse>> {
    let uid = query.uid;
    validate_uid(&uid)?;
    UserRepository::new(state.pool())
        .delete(&uid)
        .await
        .map_err(|e| user_error(e, &uid))?;

    info!(uid = %uid, "Deleted auth user");
    Ok(Json(DeleteResponse { success: true, uid }))
}
