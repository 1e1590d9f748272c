//! Business logic services for the admin API.
//!
//! # Services
//!
//! - `ids` - Collision-checked allocation of business, customer, and class ids
//! - `qr` - Signup and referral links with delegated QR image URLs
//! - `transactions` - Cross-customer transaction aggregation

pub mod ids;
pub mod qr;
pub mod transactions;

pub use ids::IdAllocator;
pub use qr::{QrCode, QrLinkService, is_valid_referral_code};
pub use transactions::{TransactionFilter, TransactionSummary, aggregate, list_transactions};
