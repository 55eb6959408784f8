//! bid rejection reasons.

use thiserror::Error;

/// why a bid was rejected.
///
/// every variant is a terminal, user-visible rejection; the display strings
/// are exactly what the client shows. none of these are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BidError {
    /// the listing exists but is not an auction.
    #[error("Listing is not an auction type")]
    InvalidState,

    /// the bidder owns the listing.
    #[error("Sellers cannot bid on their own listing")]
    SellerConflict,

    /// the auction has ended or its deadline has passed.
    #[error("Auction period has ended")]
    Expired,

    /// the amount is below the minimum-increment floor.
    #[error("Bid must be at least ₹{minimum}")]
    BidTooLow {
        /// the smallest amount that would have been accepted.
        minimum: u64,
    },
}

/// result type for bid operations.
pub type Result<T> = std::result::Result<T, BidError>;
