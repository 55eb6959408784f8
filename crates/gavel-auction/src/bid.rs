//! bid validation and application.
//!
//! these functions are pure transformations over a loaded
//! [`AuctionListing`]. they know nothing about persistence or broadcast:
//! callers load the aggregate, apply a bid here, and commit the result
//! through the store's version-guarded write. re-running the same
//! validation against fresh state after a write conflict is what makes
//! two racing bids serialize correctly.

use chrono::{DateTime, Utc};
use gavel_types::{AuctionListing, Bid, ListingType, UserId};

use crate::error::{BidError, Result};

/// validate a bid against the current state without mutating anything.
///
/// checks, in order: the listing is an auction with an auction record, the
/// bidder is not the seller, the auction is still open at `now`, and the
/// amount clears the minimum-increment floor.
pub fn check_bid(
    listing: &AuctionListing,
    bidder: UserId,
    amount: u64,
    now: DateTime<Utc>,
) -> Result<()> {
    if listing.listing_type != ListingType::Auction {
        return Err(BidError::InvalidState);
    }
    let auction = listing.auction.as_ref().ok_or(BidError::InvalidState)?;

    if bidder == listing.seller {
        return Err(BidError::SellerConflict);
    }

    if !auction.is_open(now) {
        return Err(BidError::Expired);
    }

    let minimum = auction.min_acceptable();
    if amount < minimum {
        return Err(BidError::BidTooLow { minimum });
    }

    Ok(())
}

/// validate and apply a bid, mutating the aggregate in place.
///
/// on success the current bid is replaced, the history gains one entry,
/// and the bidder's highest-bid entry is raised.
pub fn place_bid(
    listing: &mut AuctionListing,
    bidder: UserId,
    amount: u64,
    now: DateTime<Utc>,
) -> Result<()> {
    check_bid(listing, bidder, amount, now)?;

    // check_bid guarantees the record exists
    let auction = listing.auction.as_mut().ok_or(BidError::InvalidState)?;

    let bid = Bid {
        bidder,
        amount,
        timestamp: now,
    };
    auction.current_bid = Some(bid.clone());
    auction.bid_history.push(bid);
    auction.highest_bids.record(bidder, amount);

    Ok(())
}
