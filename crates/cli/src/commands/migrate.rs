//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! loyalty-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `LOYALTY_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! Migrations live in `crates/admin/migrations/` and are embedded in the
//! admin crate at build time.

use loyalty_admin::db;

use super::{CliError, connect};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the connection or any migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running loyalty migrations...");
    db::migrate(&pool).await?;

    tracing::info!("Loyalty migrations complete!");
    Ok(())
}
