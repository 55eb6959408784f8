//! database layer for gavel.
//!
//! this crate provides persistent storage for:
//! - Listings (with the embedded auction aggregate)
//! - Settlements
//! - Notifications
//!
//! auction state is only ever written through [`Database::update_auction`],
//! a version-guarded conditional update: the single primitive that
//! serializes racing bids and the expiry sweep against one another.

#![warn(missing_docs)]

mod entity;
mod error;
mod migration;

pub use error::Error;

use std::future::Future;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, Database as SeaOrmDatabase, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder,
};
use sea_orm_migration::MigratorTrait;

use gavel_types::{
    AuctionListing, AuctionRecord, Config, ListingId, ListingStatus, Notification, NotificationId,
    Settlement, SettlementKind, UserId,
};

/// result type for database operations.
pub type Result<T> = std::result::Result<T, Error>;

/// database trait for gavel storage operations.
///
/// this trait abstracts over different database backends (sqlite,
/// postgresql). listings and settlements use soft-delete semantics - rows
/// are marked with a `deleted_at` timestamp rather than physically removed.
pub trait Database: Send + Sync {
    // ─── Health Check ─────────────────────────────────────────────────────────

    /// ping the database to verify connectivity.
    ///
    /// returns `Ok(())` if the database is reachable, `Err` otherwise.
    /// used for health checks with a recommended timeout of 1 second.
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;

    // ─── Listing Operations ──────────────────────────────────────────────────

    /// create a new listing. returns the created listing with its assigned id.
    fn create_listing(
        &self,
        listing: &AuctionListing,
    ) -> impl Future<Output = Result<AuctionListing>> + Send;

    /// get a listing by id. returns `None` if not found or soft-deleted.
    fn get_auction_listing(
        &self,
        id: ListingId,
    ) -> impl Future<Output = Result<Option<AuctionListing>>> + Send;

    /// list all non-deleted listings.
    fn list_listings(&self) -> impl Future<Output = Result<Vec<AuctionListing>>> + Send;

    /// list auction listings that are due for finalization at `now`:
    /// auction type, still active (or status unset), deadline passed.
    ///
    /// this predicate is the sweep's idempotence guard - once an auction
    /// is flipped to ended it is never selected again.
    fn list_due_auctions(
        &self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<AuctionListing>>> + Send;

    /// conditionally write the auction aggregate (and optionally the
    /// listing's visible status) if the stored version still equals
    /// `expected_version`. bumps the version by one and returns the new
    /// version on success.
    ///
    /// returns [`Error::Conflict`] when no row matched - the caller's
    /// snapshot is stale and it must reload, re-validate, and retry.
    /// this is the only write path for auction state.
    fn update_auction(
        &self,
        id: ListingId,
        expected_version: u64,
        auction: &AuctionRecord,
        listing_status: Option<ListingStatus>,
    ) -> impl Future<Output = Result<u64>> + Send;

    /// soft-delete a listing by setting the `deleted_at` timestamp.
    fn delete_listing(&self, id: ListingId) -> impl Future<Output = Result<()>> + Send;

    // ─── Settlement Operations ───────────────────────────────────────────────

    /// create a new settlement record. returns it with its assigned id.
    fn create_settlement(
        &self,
        settlement: &Settlement,
    ) -> impl Future<Output = Result<Settlement>> + Send;

    /// list all settlements for a listing, newest first.
    fn list_settlements_for_listing(
        &self,
        listing: ListingId,
    ) -> impl Future<Output = Result<Vec<Settlement>>> + Send;

    /// the most recent auction settlement for a listing/buyer pair, if any.
    fn latest_auction_settlement(
        &self,
        listing: ListingId,
        buyer: UserId,
    ) -> impl Future<Output = Result<Option<Settlement>>> + Send;

    // ─── Notification Operations ─────────────────────────────────────────────

    /// create a new notification. returns it with its assigned id.
    fn create_notification(
        &self,
        notification: &Notification,
    ) -> impl Future<Output = Result<Notification>> + Send;

    /// list all notifications for a user, newest first.
    fn list_notifications_for_user(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<Vec<Notification>>> + Send;

    /// mark a notification as read.
    fn mark_notification_read(
        &self,
        id: NotificationId,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// the main database implementation using sea-orm.
#[derive(Clone)]
pub struct GavelDb {
    conn: DatabaseConnection,
}

impl GavelDb {
    /// create a new database connection from config.
    pub async fn new(config: &Config) -> Result<Self> {
        let url = Self::build_connection_url(&config.database)?;
        let conn: DatabaseConnection = SeaOrmDatabase::connect(&url)
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let db = Self { conn };

        // enable WAL mode for file-backed sqlite
        if config.database.db_type == "sqlite" {
            db.enable_wal_mode().await?;
        }

        db.migrate().await?;
        Ok(db)
    }

    /// enable write-ahead logging mode for sqlite.
    ///
    /// WAL mode allows concurrent reads during writes. must be called
    /// before any writes.
    async fn enable_wal_mode(&self) -> Result<()> {
        use sea_orm::ConnectionTrait;
        self.conn
            .execute_unprepared("PRAGMA journal_mode=WAL")
            .await
            .map_err(|e| Error::Connection(format!("failed to enable WAL mode: {}", e)))?;
        tracing::info!("sqlite WAL mode enabled");
        Ok(())
    }

    /// build a sea-orm compatible connection url from config.
    fn build_connection_url(config: &gavel_types::DatabaseConfig) -> Result<String> {
        match config.db_type.as_str() {
            "sqlite" => {
                let path = if config.connection_string.starts_with("sqlite:") {
                    config.connection_string.clone()
                } else {
                    format!("sqlite:{}", config.connection_string)
                };
                // add ?mode=rwc to create the file if it doesn't exist
                if path.contains('?') {
                    Ok(path)
                } else {
                    Ok(format!("{}?mode=rwc", path))
                }
            }
            "postgres" | "postgresql" => Ok(config.connection_string.clone()),
            other => Err(Error::InvalidData(format!(
                "unsupported database type: {}",
                other
            ))),
        }
    }

    /// create an in-memory sqlite database for testing.
    pub async fn new_in_memory() -> Result<Self> {
        let conn: DatabaseConnection = SeaOrmDatabase::connect("sqlite::memory:")
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let db = Self { conn };
        db.migrate().await?;
        Ok(db)
    }

    /// run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        migration::Migrator::up(&self.conn, None)
            .await
            .map_err(|e| Error::Migration(e.to_string()))?;
        Ok(())
    }
}

/// json-serialize an auction aggregate into its column values.
///
/// returns (auction_status, current_bid, bid_history, highest_bids, winner_id).
fn auction_columns(
    auction: &AuctionRecord,
) -> Result<(String, Option<String>, String, String, Option<i64>)> {
    let current_bid = auction
        .current_bid
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let bid_history = serde_json::to_string(&auction.bid_history)?;
    let highest_bids = serde_json::to_string(&auction.highest_bids)?;
    Ok((
        auction.status.as_str().to_string(),
        current_bid,
        bid_history,
        highest_bids,
        auction.winner.map(|w| w.as_u64() as i64),
    ))
}

impl Database for GavelDb {
    // health check

    async fn ping(&self) -> Result<()> {
        use sea_orm::ConnectionTrait;
        self.conn
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        Ok(())
    }

    // listing operations

    async fn create_listing(&self, listing: &AuctionListing) -> Result<AuctionListing> {
        let model: entity::listing::ActiveModel = listing.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn get_auction_listing(&self, id: ListingId) -> Result<Option<AuctionListing>> {
        let result = entity::listing::Entity::find_by_id(id.as_u64() as i64)
            .filter(entity::listing::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_listings(&self) -> Result<Vec<AuctionListing>> {
        let results = entity::listing::Entity::find()
            .filter(entity::listing::Column::DeletedAt.is_null())
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn list_due_auctions(&self, now: DateTime<Utc>) -> Result<Vec<AuctionListing>> {
        let results = entity::listing::Entity::find()
            .filter(entity::listing::Column::ListingType.eq("auction"))
            .filter(entity::listing::Column::DeletedAt.is_null())
            .filter(entity::listing::Column::EndTime.lte(now))
            // status unset is treated as active
            .filter(
                Condition::any()
                    .add(entity::listing::Column::AuctionStatus.is_null())
                    .add(entity::listing::Column::AuctionStatus.eq("active")),
            )
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn update_auction(
        &self,
        id: ListingId,
        expected_version: u64,
        auction: &AuctionRecord,
        listing_status: Option<ListingStatus>,
    ) -> Result<u64> {
        use sea_orm::sea_query::Expr;

        let (status, current_bid, bid_history, highest_bids, winner_id) =
            auction_columns(auction)?;
        let new_version = expected_version + 1;

        let mut update = entity::listing::Entity::update_many()
            .col_expr(entity::listing::Column::AuctionStatus, Expr::value(status))
            .col_expr(
                entity::listing::Column::CurrentBid,
                Expr::value(current_bid),
            )
            .col_expr(
                entity::listing::Column::BidHistory,
                Expr::value(bid_history),
            )
            .col_expr(
                entity::listing::Column::HighestBids,
                Expr::value(highest_bids),
            )
            .col_expr(entity::listing::Column::WinnerId, Expr::value(winner_id))
            .col_expr(
                entity::listing::Column::Version,
                Expr::value(new_version as i64),
            )
            .col_expr(entity::listing::Column::UpdatedAt, Expr::value(Utc::now()));

        if let Some(status) = listing_status {
            update = update.col_expr(
                entity::listing::Column::Status,
                Expr::value(status.as_str()),
            );
        }

        let result = update
            .filter(entity::listing::Column::Id.eq(id.as_u64() as i64))
            .filter(entity::listing::Column::Version.eq(expected_version as i64))
            .filter(entity::listing::Column::DeletedAt.is_null())
            .exec(&self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(Error::Conflict(format!(
                "listing {} version {} is stale",
                id, expected_version
            )));
        }

        Ok(new_version)
    }

    async fn delete_listing(&self, id: ListingId) -> Result<()> {
        entity::listing::Entity::update_many()
            .col_expr(
                entity::listing::Column::DeletedAt,
                sea_orm::sea_query::Expr::value(Utc::now()),
            )
            .filter(entity::listing::Column::Id.eq(id.as_u64() as i64))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    // settlement operations

    async fn create_settlement(&self, settlement: &Settlement) -> Result<Settlement> {
        let model: entity::settlement::ActiveModel = settlement.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn list_settlements_for_listing(&self, listing: ListingId) -> Result<Vec<Settlement>> {
        let results = entity::settlement::Entity::find()
            .filter(entity::settlement::Column::ListingId.eq(listing.as_u64() as i64))
            .filter(entity::settlement::Column::DeletedAt.is_null())
            .order_by_desc(entity::settlement::Column::CreatedAt)
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn latest_auction_settlement(
        &self,
        listing: ListingId,
        buyer: UserId,
    ) -> Result<Option<Settlement>> {
        let result = entity::settlement::Entity::find()
            .filter(entity::settlement::Column::ListingId.eq(listing.as_u64() as i64))
            .filter(entity::settlement::Column::BuyerId.eq(buyer.as_u64() as i64))
            .filter(entity::settlement::Column::Kind.eq(SettlementKind::Auction.as_str()))
            .filter(entity::settlement::Column::DeletedAt.is_null())
            .order_by_desc(entity::settlement::Column::CreatedAt)
            .one(&self.conn)
            .await?;
        Ok(result.map(Into::into))
    }

    // notification operations

    async fn create_notification(&self, notification: &Notification) -> Result<Notification> {
        let model: entity::notification::ActiveModel = notification.into();
        let result = model.insert(&self.conn).await?;
        Ok(result.into())
    }

    async fn list_notifications_for_user(&self, user: UserId) -> Result<Vec<Notification>> {
        let results = entity::notification::Entity::find()
            .filter(entity::notification::Column::UserId.eq(user.as_u64() as i64))
            .order_by_desc(entity::notification::Column::CreatedAt)
            .all(&self.conn)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn mark_notification_read(&self, id: NotificationId) -> Result<()> {
        entity::notification::Entity::update_many()
            .col_expr(
                entity::notification::Column::Read,
                sea_orm::sea_query::Expr::value(true),
            )
            .filter(entity::notification::Column::Id.eq(id.as_u64() as i64))
            .exec(&self.conn)
            .await?;
        Ok(())
    }
}
