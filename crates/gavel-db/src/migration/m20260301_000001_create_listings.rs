//! create listings table migration

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Listings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Listings::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Listings::Title).string().not_null())
                    .col(
                        ColumnDef::new(Listings::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Listings::Price).big_integer().not_null())
                    .col(
                        ColumnDef::new(Listings::ListingType)
                            .string()
                            .not_null()
                            .default("buy-now"),
                    )
                    .col(ColumnDef::new(Listings::SellerId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Listings::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Listings::StartBid).big_integer())
                    .col(ColumnDef::new(Listings::EndTime).timestamp_with_time_zone())
                    .col(ColumnDef::new(Listings::AuctionStatus).string())
                    .col(ColumnDef::new(Listings::CurrentBid).text())
                    .col(
                        ColumnDef::new(Listings::BidHistory)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Listings::HighestBids)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(Listings::WinnerId).big_integer())
                    .col(
                        ColumnDef::new(Listings::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Listings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Listings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Listings::DeletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // index for the expiry sweep scan
        manager
            .create_index(
                Index::create()
                    .name("idx_listings_auction_due")
                    .table(Listings::Table)
                    .col(Listings::ListingType)
                    .col(Listings::AuctionStatus)
                    .col(Listings::EndTime)
                    .to_owned(),
            )
            .await?;

        // index on seller for per-seller listings
        manager
            .create_index(
                Index::create()
                    .name("idx_listings_seller_id")
                    .table(Listings::Table)
                    .col(Listings::SellerId)
                    .to_owned(),
            )
            .await?;

        // index for soft deletes
        manager
            .create_index(
                Index::create()
                    .name("idx_listings_deleted_at")
                    .table(Listings::Table)
                    .col(Listings::DeletedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Listings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Listings {
    Table,
    Id,
    Title,
    Description,
    Price,
    ListingType,
    SellerId,
    Status,
    StartBid,
    EndTime,
    AuctionStatus,
    CurrentBid,
    BidHistory,
    HighestBids,
    WinnerId,
    Version,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
