//! Seed command - Loads development data.

use crate::cli::args::{SeedArgs, SeedTarget};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

/// Execute the seed command
pub async fn execute(args: SeedArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    match args.target {
        SeedTarget::Postcodes => {
            let inserted = db.seed_postcodes().await?;
            tracing::info!(inserted, "Service-area postcodes seeded");
        }
        SeedTarget::Catalog => {
            let inserted = db.seed_catalog().await?;
            tracing::info!(inserted, "Sample catalog seeded");
        }
    }

    Ok(())
}
