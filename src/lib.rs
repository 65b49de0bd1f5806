//! Grocery delivery backend
//!
//! Catalog, delivery-area checks, address book, cart, cash-on-delivery
//! checkout with invoice numbering, and a back office for a single local
//! grocery shop.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and logic
//! - **services**: Application use cases and business logic
//! - **infra**: Infrastructure concerns (database, identity provider, PDF renderer)
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve --port 8000
//!
//! # Rebuild the schema and load development data
//! cargo run -- migrate fresh --seed
//!
//! # Load the service area and a sample catalog
//! cargo run -- seed postcodes
//! cargo run -- seed catalog
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{OrderStatus, User};
pub use errors::{AppError, AppResult};
