//! HTTP route handlers for the admin API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                                       - Liveness
//! GET    /health/ready                                 - Readiness (database)
//!
//! # Businesses (admin token)
//! GET    /api/admin/businesses                         - List, sorted by name
//! POST   /api/admin/businesses                         - Create
//! PUT    /api/admin/businesses/{business_id}           - Update points labels
//! POST   /api/admin/businesses/{business_id}/classes   - Create customer class
//!
//! # Customers and transactions (admin token)
//! POST   /api/admin/customers                          - Enroll a user
//! GET    /api/admin/transactions                       - Aggregate across customers
//! POST   /api/admin/notifications/preview             - Render a push payload
//!
//! # Users (admin token)
//! GET    /api/users                                    - Paginated list
//! POST   /api/users                                    - Bulk delete
//! GET    /api/users/{uid}                              - Get
//! PUT    /api/users/{uid}                              - Disable, claims, rename
//! DELETE /api/users/{uid}                              - Delete
//! GET    /api/auth-users                               - Sign-in account list
//! DELETE /api/auth-users?uid=                          - Delete sign-in account
//!
//! # QR links (admin token)
//! GET    /api/qr/class?businessId=&classId=            - Class signup link
//! GET    /api/qr/referral/{code}                       - Referral link
//!
//! # Devices (no admin token)
//! POST   /api/fcm-token                                - Register token
//! DELETE /api/fcm-token                                - Remove token
//! ```

use axum::Router;

use crate::state::AppState;

pub mod auth_users;
pub mod businesses;
pub mod customers;
pub mod extract;
pub mod fcm_token;
pub mod health;
pub mod notifications;
pub mod qr;
pub mod transactions;
pub mod users;

/// Build the full application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(businesses::router())
        .merge(customers::router())
        .merge(transactions::router())
        .merge(notifications::router())
        .merge(users::router())
        .merge(auth_users::router())
        .merge(qr::router())
        .merge(fcm_token::router())
}
