//! Migrate command - schema management outside the server.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

fn migration_failed(e: sea_orm::DbErr) -> AppError {
    AppError::internal(format!("Migration failed: {}", e))
}

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    match args.action {
        MigrateAction::Up => {
            db.run_migrations().await.map_err(migration_failed)?;
            tracing::info!("Schema is up to date");
        }
        MigrateAction::Down => {
            db.rollback_migration().await.map_err(migration_failed)?;
            tracing::info!("Rolled back the last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await.map_err(migration_failed)?;
            let pending = status.iter().filter(|(_, applied)| !applied).count();
            for (name, applied) in &status {
                println!("{:<8} {}", if *applied { "applied" } else { "pending" }, name);
            }
            println!("{} of {} migrations pending", pending, status.len());
        }
        MigrateAction::Fresh { seed } => {
            tracing::warn!("Dropping all tables, orders and invoices included");
            db.fresh_migrations().await.map_err(migration_failed)?;

            if seed {
                let postcodes = db.seed_postcodes().await?;
                let products = db.seed_catalog().await?;
                tracing::info!(postcodes, products, "Fresh schema seeded");
            } else {
                tracing::info!("Fresh schema created");
            }
        }
    }

    Ok(())
}
