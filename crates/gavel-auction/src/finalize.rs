//! auction finalization.
//!
//! pure decision logic for the expiry sweep: whether an auction is due,
//! and the one-way transition to the ended state. the caller commits the
//! mutated aggregate through the same version-guarded write bids use, so
//! a bid racing the sweep and the finalizing write compete for a single
//! write slot per version.

use chrono::{DateTime, Utc};
use gavel_types::{AuctionListing, AuctionStatus, ListingStatus, ListingType, UserId};

/// what finalization decided for one auction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalOutcome {
    /// the auction had bids; the highest bidder wins at the final amount.
    Won {
        /// the winning bidder.
        winner: UserId,
        /// the final accepted amount.
        amount: u64,
    },
    /// the auction expired without a single bid.
    NoBids,
}

/// true if the sweep should finalize this listing at `now`.
///
/// mirrors the scan predicate: an auction-type listing, still active,
/// whose deadline has passed. already-ended auctions are never due, which
/// is what makes repeated sweeps idempotent.
pub fn is_due(listing: &AuctionListing, now: DateTime<Utc>) -> bool {
    listing.listing_type == ListingType::Auction
        && listing
            .auction
            .as_ref()
            .is_some_and(|a| a.status == AuctionStatus::Active && a.end_time <= now)
}

/// apply the terminal transition in place.
///
/// returns `None` if the listing is not an auction or is already ended
/// (nothing to do). otherwise flips the auction to ended, records the
/// winner when bids exist, and moves the listing to sold (winner found)
/// or archived (no bids).
pub fn finalize(listing: &mut AuctionListing) -> Option<FinalOutcome> {
    if listing.listing_type != ListingType::Auction {
        return None;
    }
    let auction = listing.auction.as_mut()?;
    if auction.status == AuctionStatus::Ended {
        return None;
    }

    auction.status = AuctionStatus::Ended;

    let winning = auction
        .current_bid
        .as_ref()
        .filter(|_| auction.has_bids())
        .map(|bid| (bid.bidder, bid.amount));

    match winning {
        Some((winner, amount)) => {
            auction.winner = Some(winner);
            listing.status = ListingStatus::Sold;
            Some(FinalOutcome::Won { winner, amount })
        }
        None => {
            listing.status = ListingStatus::Archived;
            Some(FinalOutcome::NoBids)
        }
    }
}
