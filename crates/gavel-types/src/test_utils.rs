//! test utilities for creating test listings and other fixtures.
//!
//! this module provides builder patterns for creating test instances
//! of gavel types without needing to specify all fields.

use chrono::{DateTime, Duration, Utc};

use crate::{AuctionListing, AuctionRecord, Bid, ListingId, ListingStatus, ListingType, UserId};

/// builder for creating test [`AuctionListing`] instances.
///
/// # example
/// ```
/// use gavel_types::test_utils::TestListingBuilder;
///
/// let listing = TestListingBuilder::new(1).build();
/// let expired = TestListingBuilder::new(2).ended_ago_secs(60).build();
/// ```
#[derive(Debug, Clone)]
pub struct TestListingBuilder {
    id: u64,
    seller: UserId,
    title: Option<String>,
    listing_type: ListingType,
    status: ListingStatus,
    start_bid: u64,
    end_time: Option<DateTime<Utc>>,
    bids: Vec<(UserId, u64)>,
    version: u64,
}

impl TestListingBuilder {
    /// create a new builder for an active auction listing with the given id.
    ///
    /// defaults: seller is `UserId(id)`, start bid 20, ends in one hour.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            seller: UserId(id),
            title: None,
            listing_type: ListingType::Auction,
            status: ListingStatus::Active,
            start_bid: 20,
            end_time: None,
            bids: Vec::new(),
            version: 0,
        }
    }

    /// set the seller.
    pub fn with_seller(mut self, seller: UserId) -> Self {
        self.seller = seller;
        self
    }

    /// set a custom title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// set the listing type (for non-auction rejection tests).
    pub fn with_type(mut self, listing_type: ListingType) -> Self {
        self.listing_type = listing_type;
        self
    }

    /// set the visible listing status.
    pub fn with_status(mut self, status: ListingStatus) -> Self {
        self.status = status;
        self
    }

    /// set the start bid.
    pub fn with_start_bid(mut self, start_bid: u64) -> Self {
        self.start_bid = start_bid;
        self
    }

    /// set an explicit end time.
    pub fn with_end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = Some(end_time);
        self
    }

    /// make the auction end the given number of seconds in the past.
    pub fn ended_ago_secs(mut self, secs: i64) -> Self {
        self.end_time = Some(Utc::now() - Duration::seconds(secs));
        self
    }

    /// append an accepted bid (applied in order at build time).
    ///
    /// amounts are taken as-is; tests are responsible for keeping them
    /// strictly increasing when that matters.
    pub fn with_bid(mut self, bidder: UserId, amount: u64) -> Self {
        self.bids.push((bidder, amount));
        self
    }

    /// set the version stamp.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// build the [`AuctionListing`].
    pub fn build(self) -> AuctionListing {
        let end_time = self.end_time.unwrap_or_else(|| Utc::now() + Duration::hours(1));
        let title = self
            .title
            .unwrap_or_else(|| format!("listing-{}", self.id));

        let mut auction = AuctionRecord::new(self.start_bid, end_time);
        for (bidder, amount) in self.bids {
            let bid = Bid {
                bidder,
                amount,
                timestamp: Utc::now(),
            };
            auction.current_bid = Some(bid.clone());
            auction.bid_history.push(bid);
            auction.highest_bids.record(bidder, amount);
        }

        let now = Utc::now();
        AuctionListing {
            id: ListingId(self.id),
            seller: self.seller,
            title,
            description: String::new(),
            price: self.start_bid,
            listing_type: self.listing_type,
            status: self.status,
            auction: match self.listing_type {
                ListingType::Auction => Some(auction),
                _ => None,
            },
            version: self.version,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_basic() {
        let listing = TestListingBuilder::new(1).build();
        assert_eq!(listing.id, ListingId(1));
        assert_eq!(listing.seller, UserId(1));
        assert_eq!(listing.title, "listing-1");
        assert!(listing.auction.is_some());
    }

    #[test]
    fn test_builder_with_bids() {
        let listing = TestListingBuilder::new(1)
            .with_bid(UserId(2), 20)
            .with_bid(UserId(3), 25)
            .build();
        let auction = listing.auction.unwrap();
        assert_eq!(auction.bid_history.len(), 2);
        assert_eq!(auction.current_bid.unwrap().amount, 25);
        assert_eq!(auction.highest_bids.get(UserId(2)), Some(20));
    }

    #[test]
    fn test_builder_non_auction_has_no_record() {
        let listing = TestListingBuilder::new(1)
            .with_type(ListingType::BuyNow)
            .build();
        assert!(listing.auction.is_none());
    }

    #[test]
    fn test_builder_expired() {
        let listing = TestListingBuilder::new(1).ended_ago_secs(30).build();
        let auction = listing.auction.unwrap();
        assert!(!auction.is_open(Utc::now()));
    }
}
