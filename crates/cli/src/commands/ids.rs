//! Id generation command.
//!
//! # Usage
//!
//! ```bash
//! # Three unused business ids
//! loyalty-cli ids business --count 3
//!
//! # A class id unused within one business
//! loyalty-cli ids class --business BIZ0420
//!
//! # Format-valid ids without checking the database
//! loyalty-cli ids customer --count 5 --offline
//! ```

use std::collections::HashSet;

use loyalty_core::{BusinessId, ClassId, CustomerId, IdError};

use loyalty_admin::db::{BusinessRepository, ClassRepository, CustomerRepository};

use super::{CliError, connect};

/// Which id space to draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum IdKind {
    /// `BIZ####`
    Business,
    /// `BC####`
    Customer,
    /// `CLASS######`, scoped to one business
    Class,
}

/// Draw `count` ids that collide neither with `existing` nor with each other.
///
/// # Errors
///
/// Returns `IdError::Exhausted` if a draw runs out of attempts.
pub fn draw<R: rand::Rng + ?Sized>(
    kind: IdKind,
    mut existing: HashSet<String>,
    count: usize,
    rng: &mut R,
) -> Result<Vec<String>, IdError> {
    let mut drawn = Vec::with_capacity(count);
    for _ in 0..count {
        let id = match kind {
            IdKind::Business => BusinessId::generate_unique(&existing, rng)?.into_inner(),
            IdKind::Customer => CustomerId::generate_unique(&existing, rng)?.into_inner(),
            IdKind::Class => ClassId::generate_unique(&existing, rng)?.into_inner(),
        };
        existing.insert(id.clone());
        drawn.push(id);
    }
    Ok(drawn)
}

/// Print fresh ids of the given kind.
///
/// # Errors
///
/// Returns an error if `--business` is missing or malformed for class ids,
/// the database cannot be read, or the id space is exhausted.
pub async fn generate(
    kind: IdKind,
    business: Option<&str>,
    count: usize,
    offline: bool,
) -> Result<(), CliError> {
    let business = match (kind, business) {
        (IdKind::Class, None) if !offline => {
            return Err(CliError::InvalidArgument(
                "--business is required for class ids".to_string(),
            ));
        }
        (_, Some(raw)) => Some(
            BusinessId::parse(raw).map_err(|e| CliError::InvalidArgument(e.to_string()))?,
        ),
        (_, None) => None,
    };

    let existing = if offline {
        HashSet::new()
    } else {
        let pool = connect().await?;
        match kind {
            IdKind::Business => BusinessRepository::new(&pool).list_ids().await?,
            IdKind::Customer => CustomerRepository::new(&pool).list_ids().await?,
            IdKind::Class => match &business {
                Some(business_id) => {
                    ClassRepository::new(&pool)
                        .list_ids_for_business(business_id)
                        .await?
                }
                None => HashSet::new(),
            },
        }
    };

    tracing::info!(kind = ?kind, existing = existing.len(), count, "Generating ids");
    let ids = draw(kind, existing, count, &mut rand::rng())
        .map_err(|e| CliError::App(e.into()))?;

    #[allow(clippy::print_stdout)]
    {
        for id in ids {
            println!("{id}");
        }
    }
    Ok(())
}
