//! Database migrations.
//!
//! Each migration is a separate module following SeaORM conventions.
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_users_table;
mod m20250101_000002_create_catalog_tables;
mod m20250101_000003_create_service_area_tables;
mod m20250101_000004_create_addresses_and_carts;
mod m20250101_000005_create_orders_tables;
mod m20250101_000006_create_invoice_sequences;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_users_table::Migration),
            Box::new(m20250101_000002_create_catalog_tables::Migration),
            Box::new(m20250101_000003_create_service_area_tables::Migration),
            Box::new(m20250101_000004_create_addresses_and_carts::Migration),
            Box::new(m20250101_000005_create_orders_tables::Migration),
            Box::new(m20250101_000006_create_invoice_sequences::Migration),
        ]
    }
}
