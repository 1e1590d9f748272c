//! Domain models for the loyalty admin API.
//!
//! Repositories in [`crate::db`] read internal row types and convert them into
//! these validated types. Handlers serialize them straight to JSON.

pub mod business;
pub mod fcm_token;
pub mod transaction;
pub mod user;

pub use business::{Business, Customer, CustomerClass};
pub use fcm_token::FcmToken;
pub use transaction::Transaction;
pub use user::{User, UserUpdate};
