//! Loyalty Core - Shared types library.
//!
//! This crate provides common types used across all loyalty platform components:
//! - `admin` - JSON admin API (businesses, users, transactions, device tokens)
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Randomness is injected by the caller so ID
//! generation stays deterministic under a seeded generator.
//!
//! # Modules
//!
//! - [`types`] - Human-readable IDs, roles, points labels
//! - [`validation`] - Structured validation issues for request payloads
//! - [`notification`] - Push notification display and deep-link routing

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod notification;
pub mod types;
pub mod validation;

pub use types::*;

#[doc(hidden)]
pub use rand;
pub use validation::{ValidationIssue, Validator};
