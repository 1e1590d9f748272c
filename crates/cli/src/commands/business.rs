//! Business management command.
//!
//! # Usage
//!
//! ```bash
//! loyalty-cli business create -n "Cafe Uno" -l Beans -o alice
//! ```

use loyalty_core::PointsLabel;

use loyalty_admin::db::businesses::{BusinessRepository, NewBusiness};
use loyalty_admin::routes::businesses::MAX_NAME_LEN;
use loyalty_admin::services::IdAllocator;

use super::{CliError, connect};

/// Create a business with a freshly allocated id.
///
/// # Errors
///
/// Returns an error if the label is invalid, the owner does not exist, or the
/// database operation fails.
pub async fn create(
    name: &str,
    points_label: &str,
    owner_uid: Option<&str>,
) -> Result<(), CliError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(CliError::InvalidArgument(format!(
            "name must be 1-{MAX_NAME_LEN} characters"
        )));
    }
    let points_label = PointsLabel::parse(points_label)
        .map_err(|e| CliError::InvalidArgument(format!("points label {e}")))?;

    let pool = connect().await?;
    let business_id = IdAllocator::new(&pool).business_id(None).await?;
    let business = BusinessRepository::new(&pool)
        .create(&NewBusiness {
            business_id,
            name: name.to_string(),
            owner_uid: owner_uid.map(String::from),
            points_label,
        })
        .await?;

    tracing::info!(
        "Business created successfully! ID: {}, Name: {}, Points: {}",
        business.business_id,
        business.name,
        business.points_label
    );
    Ok(())
}
