//! bidding endpoints: place a bid, read bidding status.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gavel_db::Database;
use gavel_types::{AuctionStatus, Bid, ListingId, ListingType, SettlementStatus};

use crate::AppState;
use super::auth::AuthedUser;
use super::error::ApiError;

/// request body for placing a bid.
#[derive(Debug, Deserialize)]
pub struct PlaceBidRequest {
    /// bid amount in whole rupees.
    pub amount: u64,
}

/// response body for a placed bid.
#[derive(Debug, Serialize)]
pub struct PlaceBidResponse {
    /// human-readable confirmation.
    pub message: &'static str,
    /// the accepted bid, now the high bid.
    pub current_bid: Bid,
}

/// POST /listings/{id}/bids - place a bid on an auction listing.
///
/// the authenticated caller is the bidder; the submission time is the
/// server clock. rejections carry the exact reason string the client
/// shows.
pub async fn place_bid(
    State(state): State<AppState>,
    Path(listing_id): Path<u64>,
    user: AuthedUser,
    Json(request): Json<PlaceBidRequest>,
) -> Result<Json<PlaceBidResponse>, ApiError> {
    if request.amount == 0 {
        return Err(ApiError::unprocessable("Bid amount must be a positive number"));
    }

    let snapshot = state
        .acceptor
        .submit(ListingId(listing_id), user.0, request.amount)
        .await?;

    Ok(Json(PlaceBidResponse {
        message: "Bid placed",
        current_bid: snapshot.current_bid,
    }))
}

/// response body for the bidding status endpoint.
#[derive(Debug, Serialize)]
pub struct BiddingStatusResponse {
    /// the auction's start bid.
    pub start_bid: u64,
    /// the auction deadline.
    pub end_time: DateTime<Utc>,
    /// the current high bid, none if nobody has bid.
    pub current_bid: Option<Bid>,
    /// the caller's own highest accepted bid (0 if none).
    pub your_highest_bid: u64,
    /// number of accepted bids so far.
    pub bidders_count: usize,
    /// auction lifecycle status.
    pub status: AuctionStatus,
    /// true if the auction ended and the caller won it.
    pub is_winner: bool,
    /// the final (or current) amount.
    pub final_bid: u64,
    /// true if the caller won and the settlement is still open.
    pub winner_open: bool,
}

/// GET /listings/{id}/bids - bidding status for the calling user.
pub async fn bidding_status(
    State(state): State<AppState>,
    Path(listing_id): Path<u64>,
    user: AuthedUser,
) -> Result<Json<BiddingStatusResponse>, ApiError> {
    let listing = state
        .db
        .get_auction_listing(ListingId(listing_id))
        .await?
        .ok_or_else(|| ApiError::not_found("Listing not found"))?;

    if listing.listing_type != ListingType::Auction {
        return Err(ApiError::bad_request("Listing is not an auction type"));
    }
    let auction = listing
        .auction
        .as_ref()
        .ok_or_else(|| ApiError::bad_request("Listing is not an auction type"))?;

    let your_highest_bid = auction.highest_bids.get(user.0).unwrap_or(0);
    let mut final_bid = auction.current_bid.as_ref().map(|b| b.amount).unwrap_or(0);
    let mut is_winner = false;
    let mut winner_open = false;

    if auction.status == AuctionStatus::Ended && auction.winner == Some(user.0) {
        is_winner = true;
        // settlement lookup failures are ignored; the winner flag stands
        // on the auction state alone
        if let Ok(Some(settlement)) = state
            .db
            .latest_auction_settlement(listing.id, user.0)
            .await
        {
            winner_open = settlement.status != SettlementStatus::Completed;
            final_bid = settlement.amount;
        }
    }

    Ok(Json(BiddingStatusResponse {
        start_bid: auction.start_bid,
        end_time: auction.end_time,
        current_bid: auction.current_bid.clone(),
        your_highest_bid,
        bidders_count: auction.bid_history.len(),
        status: auction.status,
        is_winner,
        final_bid,
        winner_open,
    }))
}
