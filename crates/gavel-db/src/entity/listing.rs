//! listing entity for database storage.
//!
//! the auction aggregate is embedded in the listing row: scalar auction
//! fields get their own columns (so the expiry sweep can scan on them),
//! while the structured fields (current bid, history, per-bidder highs)
//! are json-serialized text columns.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};

use gavel_types::{
    AuctionListing, AuctionRecord, AuctionStatus, Bid, HighestBids, ListingId, ListingStatus,
    ListingType, UserId,
};

/// listing database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "listings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub price: i64,
    pub listing_type: String,
    pub seller_id: i64,
    pub status: String,
    /// auction columns; null for non-auction listings
    pub start_bid: Option<i64>,
    pub end_time: Option<DateTime<Utc>>,
    pub auction_status: Option<String>,
    /// json-serialized `Option<Bid>`
    #[sea_orm(column_type = "Text", nullable)]
    pub current_bid: Option<String>,
    /// json-serialized `Vec<Bid>`
    #[sea_orm(column_type = "Text")]
    pub bid_history: String,
    /// json-serialized `HighestBids`
    #[sea_orm(column_type = "Text")]
    pub highest_bids: String,
    pub winner_id: Option<i64>,
    /// optimistic-concurrency stamp checked by every guarded write
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::settlement::Entity")]
    Settlements,
}

impl Related<super::settlement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Settlements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for AuctionListing {
    fn from(model: Model) -> Self {
        let listing_type = ListingType::from_db(&model.listing_type);

        // rebuild the auction aggregate from its columns. json parse
        // failures on legacy rows degrade to empty rather than erroring.
        let auction = match (listing_type, model.start_bid, model.end_time) {
            (ListingType::Auction, Some(start_bid), Some(end_time)) => {
                let current_bid: Option<Bid> = model
                    .current_bid
                    .as_deref()
                    .and_then(|s| serde_json::from_str(s).ok());
                let bid_history: Vec<Bid> =
                    serde_json::from_str(&model.bid_history).unwrap_or_default();
                let highest_bids: HighestBids =
                    serde_json::from_str(&model.highest_bids).unwrap_or_default();

                Some(AuctionRecord {
                    start_bid: start_bid as u64,
                    end_time,
                    status: AuctionStatus::from_db(model.auction_status.as_deref().unwrap_or("")),
                    current_bid,
                    bid_history,
                    highest_bids,
                    winner: model.winner_id.map(|id| UserId(id as u64)),
                })
            }
            _ => None,
        };

        AuctionListing {
            id: ListingId(model.id as u64),
            seller: UserId(model.seller_id as u64),
            title: model.title,
            description: model.description,
            price: model.price as u64,
            listing_type,
            status: ListingStatus::from_db(&model.status),
            auction,
            version: model.version as u64,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&AuctionListing> for ActiveModel {
    fn from(listing: &AuctionListing) -> Self {
        let (start_bid, end_time, auction_status, current_bid, bid_history, highest_bids, winner_id) =
            match listing.auction.as_ref() {
                Some(auction) => (
                    Set(Some(auction.start_bid as i64)),
                    Set(Some(auction.end_time)),
                    Set(Some(auction.status.as_str().to_string())),
                    Set(auction
                        .current_bid
                        .as_ref()
                        .and_then(|bid| serde_json::to_string(bid).ok())),
                    Set(serde_json::to_string(&auction.bid_history)
                        .unwrap_or_else(|_| "[]".to_string())),
                    Set(serde_json::to_string(&auction.highest_bids)
                        .unwrap_or_else(|_| "[]".to_string())),
                    Set(auction.winner.map(|w| w.as_u64() as i64)),
                ),
                None => (
                    Set(None),
                    Set(None),
                    Set(None),
                    Set(None),
                    Set("[]".to_string()),
                    Set("[]".to_string()),
                    Set(None),
                ),
            };

        ActiveModel {
            id: if listing.id.as_u64() == 0 {
                NotSet
            } else {
                Set(listing.id.as_u64() as i64)
            },
            title: Set(listing.title.clone()),
            description: Set(listing.description.clone()),
            price: Set(listing.price as i64),
            listing_type: Set(listing.listing_type.as_str().to_string()),
            seller_id: Set(listing.seller.as_u64() as i64),
            status: Set(listing.status.as_str().to_string()),
            start_bid,
            end_time,
            auction_status,
            current_bid,
            bid_history,
            highest_bids,
            winner_id,
            version: Set(listing.version as i64),
            created_at: Set(listing.created_at),
            updated_at: Set(listing.updated_at),
            deleted_at: NotSet,
        }
    }
}
