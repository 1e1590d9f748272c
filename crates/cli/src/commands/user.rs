//! User management command.
//!
//! # Usage
//!
//! ```bash
//! loyalty-cli user set-role -u alice -r admin
//! ```

use loyalty_core::UserRole;

use loyalty_admin::db::UserRepository;

use super::{CliError, connect};

/// Set a user's role and mirror it into the `role` claim.
///
/// # Errors
///
/// Returns an error if the role is invalid, the user does not exist, or the
/// database operation fails.
pub async fn set_role(uid: &str, role: &str) -> Result<(), CliError> {
    let role: UserRole = role.parse().map_err(CliError::InvalidArgument)?;

    let pool = connect().await?;
    let user = UserRepository::new(&pool).set_role(uid, role).await?;

    tracing::info!("Role updated! UID: {}, Role: {}", user.uid, user.role);
    Ok(())
}
