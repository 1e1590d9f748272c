//! HTTP middleware and extractors for the admin API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span with method, uri, status, latency)
//! 3. Request ID (record on span and Sentry scope, echo in response)
//! 4. Security headers (JSON-only API, nothing cacheable)
//!
//! Authentication is an extractor ([`RequireAdminToken`]) added to each
//! protected handler rather than a layer.

pub mod auth;
pub mod request_id;
pub mod security_headers;

pub use auth::RequireAdminToken;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use security_headers::security_headers_middleware;
