//! marketplace listing aggregate.
//!
//! the auction core only ever loads listings through this aggregate view:
//! seller, type, visible status, the embedded auction record, and the
//! optimistic-concurrency version stamp every guarded write checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AuctionRecord, ListingId, UserId};

/// how a listing is sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListingType {
    /// fixed price, first come first served.
    BuyNow,
    /// buyer proposes a price.
    Offer,
    /// highest bid at the deadline wins.
    Auction,
}

impl ListingType {
    /// string form used in the database column.
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingType::BuyNow => "buy-now",
            ListingType::Offer => "offer",
            ListingType::Auction => "auction",
        }
    }

    /// parse from the database column, defaulting to buy-now like the
    /// original schema.
    pub fn from_db(s: &str) -> Self {
        match s {
            "auction" => ListingType::Auction,
            "offer" => ListingType::Offer,
            _ => ListingType::BuyNow,
        }
    }
}

/// visible status of a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    /// not yet published.
    Draft,
    /// visible and purchasable.
    #[default]
    Active,
    /// flagged by moderation.
    Flagged,
    /// sale agreed, payment pending.
    Sold,
    /// taken off the marketplace (e.g. auction ended with no bids).
    Archived,
    /// removed by an admin.
    Blocked,
}

impl ListingStatus {
    /// string form used in the database column.
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Draft => "draft",
            ListingStatus::Active => "active",
            ListingStatus::Flagged => "flagged",
            ListingStatus::Sold => "sold",
            ListingStatus::Archived => "archived",
            ListingStatus::Blocked => "blocked",
        }
    }

    /// parse from the database column.
    pub fn from_db(s: &str) -> Self {
        match s {
            "draft" => ListingStatus::Draft,
            "flagged" => ListingStatus::Flagged,
            "sold" => ListingStatus::Sold,
            "archived" => ListingStatus::Archived,
            "blocked" => ListingStatus::Blocked,
            _ => ListingStatus::Active,
        }
    }
}

/// a marketplace listing as loaded by the auction core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionListing {
    /// unique identifier.
    pub id: ListingId,

    /// owner of the listing; excluded from bidding on it.
    pub seller: UserId,

    /// listing title.
    pub title: String,

    /// listing description.
    pub description: String,

    /// fixed/asking price in whole rupees (start bid for auctions).
    pub price: u64,

    /// how the listing is sold.
    pub listing_type: ListingType,

    /// visible status.
    pub status: ListingStatus,

    /// auction state; present iff the listing was created as an auction.
    pub auction: Option<AuctionRecord>,

    /// optimistic-concurrency stamp, bumped by every guarded write.
    pub version: u64,

    /// when the listing was created.
    pub created_at: DateTime<Utc>,

    /// when the listing was last updated.
    pub updated_at: DateTime<Utc>,
}

impl AuctionListing {
    /// create a new auction-type listing.
    pub fn new_auction(
        seller: UserId,
        title: impl Into<String>,
        start_bid: u64,
        end_time: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ListingId(0),
            seller,
            title: title.into(),
            description: String::new(),
            price: start_bid,
            listing_type: ListingType::Auction,
            status: ListingStatus::Active,
            auction: Some(AuctionRecord::new(start_bid, end_time)),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
