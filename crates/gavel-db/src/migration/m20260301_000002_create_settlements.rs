//! create settlements table migration

use sea_orm_migration::prelude::*;

use super::m20260301_000001_create_listings::Listings;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Settlements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Settlements::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Settlements::ListingId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Settlements::BuyerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Settlements::SellerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Settlements::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Settlements::Kind)
                            .string()
                            .not_null()
                            .default("auction"),
                    )
                    .col(
                        ColumnDef::new(Settlements::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Settlements::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Settlements::DeletedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_settlements_listing")
                            .from(Settlements::Table, Settlements::ListingId)
                            .to(Listings::Table, Listings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // index for per-listing settlement lookups (idempotence checks,
        // winner status queries)
        manager
            .create_index(
                Index::create()
                    .name("idx_settlements_listing_kind")
                    .table(Settlements::Table)
                    .col(Settlements::ListingId)
                    .col(Settlements::Kind)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_settlements_buyer_id")
                    .table(Settlements::Table)
                    .col(Settlements::BuyerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Settlements::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Settlements {
    Table,
    Id,
    ListingId,
    BuyerId,
    SellerId,
    Amount,
    Kind,
    Status,
    CreatedAt,
    DeletedAt,
}
