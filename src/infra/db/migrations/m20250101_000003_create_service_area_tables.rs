//! Migration: Create service-area postcodes and street rules.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServicePostcodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServicePostcodes::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ServicePostcodes::Postcode)
                            .string_len(10)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ServicePostcodes::City).string_len(100).not_null())
                    .col(
                        ColumnDef::new(ServicePostcodes::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ServicePostcodes::DeliveryFee)
                            .decimal_len(10, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ServicePostcodes::MinOrderAmount)
                            .decimal_len(10, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ServicePostcodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ServicePostcodes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ServiceAddresses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServiceAddresses::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ServiceAddresses::StreetPattern)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServiceAddresses::Postcode)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServiceAddresses::IsBlacklisted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ServiceAddresses::Notes).text().null())
                    .col(
                        ColumnDef::new(ServiceAddresses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_service_addresses_postcode")
                    .table(ServiceAddresses::Table)
                    .col(ServiceAddresses::Postcode)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServiceAddresses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ServicePostcodes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ServicePostcodes {
    Table,
    Id,
    Postcode,
    City,
    IsActive,
    DeliveryFee,
    MinOrderAmount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ServiceAddresses {
    Table,
    Id,
    StreetPattern,
    Postcode,
    IsBlacklisted,
    Notes,
    CreatedAt,
}
