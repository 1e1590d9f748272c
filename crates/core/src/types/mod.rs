//! Core types for the loyalty platform.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod points_label;
pub mod role;

pub use id::{BusinessId, ClassId, CustomerId, IdError, IdFormat, MAX_ATTEMPTS};
pub use points_label::{PointsLabel, PointsLabelError, PointsLabelShort};
pub use role::UserRole;
