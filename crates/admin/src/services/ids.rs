//! Id allocation against the live database.
//!
//! The caller may pass the set of ids it already knows about; otherwise the
//! set is read fresh from the repository. Either way the core generator does
//! the collision-checked retry loop, and the table's unique constraint catches
//! a lost race at insert time.

use std::collections::HashSet;

use sqlx::PgPool;
use tracing::{debug, instrument};

use loyalty_core::{BusinessId, ClassId, CustomerId, IdError};

use crate::db::{BusinessRepository, ClassRepository, CustomerRepository};
use crate::error::AppError;

/// Allocates ids that do not collide with stored ones.
pub struct IdAllocator<'a> {
    pool: &'a PgPool,
}

impl<'a> IdAllocator<'a> {
    /// Create a new allocator.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Allocate a `BIZ####` id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the existing ids cannot be read.
    /// Returns `AppError::Id` if every attempt collided.
    #[instrument(skip(self, existing))]
    pub async fn business_id(
        &self,
        existing: Option<HashSet<String>>,
    ) -> Result<BusinessId, AppError> {
        let existing = match existing {
            Some(ids) => ids,
            None => BusinessRepository::new(self.pool).list_ids().await?,
        };
        allocate(&existing, BusinessId::generate_unique)
    }

    /// Allocate a `BC####` id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the existing ids cannot be read.
    /// Returns `AppError::Id` if every attempt collided.
    #[instrument(skip(self, existing))]
    pub async fn customer_id(
        &self,
        existing: Option<HashSet<String>>,
    ) -> Result<CustomerId, AppError> {
        let existing = match existing {
            Some(ids) => ids,
            None => CustomerRepository::new(self.pool).list_ids().await?,
        };
        allocate(&existing, CustomerId::generate_unique)
    }

    /// Allocate a `CLASS######` id unique within `business_id`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the existing ids cannot be read.
    /// Returns `AppError::Id` if every attempt collided.
    #[instrument(skip(self, existing), fields(business_id = %business_id))]
    pub async fn class_id(
        &self,
        business_id: &BusinessId,
        existing: Option<HashSet<String>>,
    ) -> Result<ClassId, AppError> {
        let existing = match existing {
            Some(ids) => ids,
            None => {
                ClassRepository::new(self.pool)
                    .list_ids_for_business(business_id)
                    .await?
            }
        };
        allocate(&existing, ClassId::generate_unique)
    }
}

/// Run a generator with the thread-local RNG. Kept synchronous so the RNG never
/// lives across an await point.
fn allocate<T: std::fmt::Display>(
    existing: &HashSet<String>,
    generate: impl FnOnce(&HashSet<String>, &mut rand::rngs::ThreadRng) -> Result<T, IdError>,
) -> Result<T, AppError> {
    let mut rng = rand::rng();
    let id = generate(existing, &mut rng)?;
    debug!(id = %id, existing = existing.len(), "Allocated id");
    Ok(id)
}
