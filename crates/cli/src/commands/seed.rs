//! Seed the database with users and businesses from a YAML file.
//!
//! ```yaml
//! users:
//!   - uid: alice
//!     email: alice@example.com
//!     role: admin
//!   - uid: bob
//!     display_name: Bob
//! businesses:
//!   - name: Cafe Uno
//!     points_label: Beans
//!     owner_uid: alice
//! ```
//!
//! Existing users are skipped. Businesses always receive a fresh id.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use loyalty_core::{PointsLabel, UserRole};

use loyalty_admin::db::RepositoryError;
use loyalty_admin::db::businesses::{BusinessRepository, NewBusiness};
use loyalty_admin::db::users::{NewUser, UserRepository};
use loyalty_admin::routes::businesses::DEFAULT_POINTS_LABEL;
use loyalty_admin::services::IdAllocator;

use super::{CliError, connect};

/// Seed file contents.
#[derive(Debug, Default, Deserialize)]
pub struct SeedConfig {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub businesses: Vec<SeedBusiness>,
}

#[derive(Debug, Deserialize)]
pub struct SeedUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
pub struct SeedBusiness {
    pub name: String,
    pub points_label: Option<String>,
    pub owner_uid: Option<String>,
}

impl SeedConfig {
    /// Parse and check a seed file before touching the database.
    ///
    /// # Errors
    ///
    /// Returns `CliError::SeedFile` on malformed YAML or an invalid entry.
    pub fn parse(content: &str) -> Result<Self, CliError> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| CliError::SeedFile(e.to_string()))?;

        for (i, user) in config.users.iter().enumerate() {
            if user.uid.is_empty() || user.uid.len() > 128 {
                return Err(CliError::SeedFile(format!(
                    "users[{i}]: uid must be 1-128 characters"
                )));
            }
        }
        for (i, business) in config.businesses.iter().enumerate() {
            if business.name.trim().is_empty() {
                return Err(CliError::SeedFile(format!(
                    "businesses[{i}]: name is required"
                )));
            }
            if let Some(label) = &business.points_label {
                PointsLabel::parse(label).map_err(|e| {
                    CliError::SeedFile(format!("businesses[{i}]: points_label {e}"))
                })?;
            }
        }
        Ok(config)
    }
}

/// Seed users and businesses from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or a database
/// operation fails for a reason other than an existing user.
pub async fn run(file_path: &str) -> Result<(), CliError> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(CliError::SeedFile(format!("File not found: {file_path}")));
    }

    info!(path = %file_path, "Loading seed data from file");
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CliError::SeedFile(e.to_string()))?;
    let config = SeedConfig::parse(&content)?;
    info!(
        users = config.users.len(),
        businesses = config.businesses.len(),
        "Parsed seed file"
    );

    let pool = connect().await?;

    let users = UserRepository::new(&pool);
    let mut users_inserted = 0usize;
    let mut users_skipped = 0usize;
    for user in config.users {
        let new = NewUser {
            uid: user.uid,
            email: user.email,
            display_name: user.display_name,
            role: user.role,
        };
        match users.create(&new).await {
            Ok(_) => users_inserted += 1,
            Err(RepositoryError::Conflict(msg)) => {
                warn!("Skipping: {msg}");
                users_skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    let businesses = BusinessRepository::new(&pool);
    let mut existing = businesses.list_ids().await?;
    let mut businesses_inserted = 0usize;
    for business in config.businesses {
        let raw_label = business
            .points_label
            .as_deref()
            .unwrap_or(DEFAULT_POINTS_LABEL);
        let points_label = PointsLabel::parse(raw_label)
            .map_err(|e| CliError::SeedFile(format!("points_label {e}")))?;
        let business_id = IdAllocator::new(&pool)
            .business_id(Some(existing.clone()))
            .await?;
        existing.insert(business_id.as_str().to_string());

        let created = businesses
            .create(&NewBusiness {
                business_id,
                name: business.name.trim().to_string(),
                owner_uid: business.owner_uid,
                points_label,
            })
            .await?;
        info!(business_id = %created.business_id, name = %created.name, "Seeded business");
        businesses_inserted += 1;
    }

    info!("Seeding complete!");
    info!("  Users inserted: {users_inserted}");
    info!("  Users skipped (already exist): {users_skipped}");
    info!("  Businesses inserted: {businesses_inserted}");
    Ok(())
}
