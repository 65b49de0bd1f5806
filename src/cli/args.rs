//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

/// Grocery delivery backend
#[derive(Parser, Debug)]
#[command(name = "grocery-backend")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Load development data
    Seed(SeedArgs),
}

/// Arguments for the serve command. Unset values come from the configuration.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Drop all tables and re-run every migration
    Fresh {
        /// Load the service area and sample catalog afterwards
        #[arg(long)]
        seed: bool,
    },
}

/// Arguments for the seed command
#[derive(Parser, Debug)]
pub struct SeedArgs {
    #[command(subcommand)]
    pub target: SeedTarget,
}

/// Data sets that can be seeded
#[derive(Subcommand, Debug)]
pub enum SeedTarget {
    /// Copenhagen service-area postcodes
    Postcodes,
    /// Sample categories and products
    Catalog,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_overrides_are_optional() {
        let cli = Cli::parse_from(["grocery-backend", "serve", "--port", "9000"]);
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, Some(9000));
                assert_eq!(args.host, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_seed_targets() {
        let cli = Cli::parse_from(["grocery-backend", "seed", "postcodes"]);
        assert!(matches!(
            cli.command,
            Commands::Seed(SeedArgs { target: SeedTarget::Postcodes })
        ));
    }

    #[test]
    fn test_fresh_migration_seed_flag() {
        let cli = Cli::parse_from(["grocery-backend", "migrate", "fresh", "--seed"]);
        assert!(matches!(
            cli.command,
            Commands::Migrate(MigrateArgs { action: MigrateAction::Fresh { seed: true } })
        ));
    }
}
