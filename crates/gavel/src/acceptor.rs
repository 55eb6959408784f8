//! bid acceptance.
//!
//! the [`BidAcceptor`] is the single entry point for submitting a bid,
//! shared by the REST handler and the WebSocket handler. it loads the
//! listing, applies the pure validation/mutation from `gavel-auction`,
//! and commits through the store's version-guarded write. losing the
//! write race is invisible to the caller: the acceptor reloads fresh
//! state and re-validates, so the second of two racing bids is judged
//! against the first one's committed result. only after the write lands
//! is the new snapshot broadcast to the auction room - best-effort, and
//! never able to undo the committed state.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use gavel_auction::BidError;
use gavel_db::{Database, GavelDb};
use gavel_types::{Bid, HighestBids, ListingId, UserId};

use crate::rooms::{RoomEvent, RoomGateway};

/// the committed auction state returned to the bidder and broadcast to
/// the room after a successful bid.
#[derive(Debug, Clone, Serialize)]
pub struct AuctionSnapshot {
    /// the auction's listing.
    pub listing: ListingId,
    /// the accepted bid, now the high bid.
    pub current_bid: Bid,
    /// all bidders' highest accepted amounts.
    pub highest_bids: HighestBids,
}

/// why a bid submission failed.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// no such listing.
    #[error("Listing not found")]
    NotFound,

    /// the bid was validated and rejected; terminal and user-visible.
    #[error(transparent)]
    Rejected(#[from] BidError),

    /// every retry lost the per-listing write race. transient; the
    /// client may resubmit.
    #[error("Too many concurrent bids, please retry")]
    Contention,

    /// the storage layer failed.
    #[error("storage error: {0}")]
    Storage(#[from] gavel_db::Error),
}

/// validates and commits bids against one listing at a time.
#[derive(Clone)]
pub struct BidAcceptor {
    db: GavelDb,
    rooms: RoomGateway,
    retry_limit: u32,
}

impl BidAcceptor {
    /// create a new acceptor.
    pub fn new(db: GavelDb, rooms: RoomGateway, retry_limit: u32) -> Self {
        Self {
            db,
            rooms,
            retry_limit: retry_limit.max(1),
        }
    }

    /// submit a bid on behalf of `bidder`.
    ///
    /// the submission time is the server clock at each validation pass;
    /// client-supplied timestamps are never consulted. a bid near the
    /// deadline is accepted only if its guarded write commits before the
    /// sweep's finalizing write - after losing that race, re-validation
    /// sees the ended auction and rejects with `Expired`.
    pub async fn submit(
        &self,
        listing_id: ListingId,
        bidder: UserId,
        amount: u64,
    ) -> Result<AuctionSnapshot, SubmitError> {
        for attempt in 0..self.retry_limit {
            let now = chrono::Utc::now();

            let mut listing = self
                .db
                .get_auction_listing(listing_id)
                .await?
                .ok_or(SubmitError::NotFound)?;

            gavel_auction::place_bid(&mut listing, bidder, amount, now)?;

            // place_bid only succeeds with an auction record present
            let auction = listing.auction.as_ref().ok_or(SubmitError::NotFound)?;

            match self
                .db
                .update_auction(listing_id, listing.version, auction, None)
                .await
            {
                Ok(_) => {
                    let snapshot = AuctionSnapshot {
                        listing: listing_id,
                        current_bid: Bid {
                            bidder,
                            amount,
                            timestamp: now,
                        },
                        highest_bids: auction.highest_bids.clone(),
                    };

                    // broadcast strictly after the committed write;
                    // delivery is best-effort
                    self.rooms.publish(
                        listing_id,
                        RoomEvent::Update {
                            listing: listing_id,
                            current_bid: Some(snapshot.current_bid.clone()),
                            highest_bids: snapshot.highest_bids.clone(),
                        },
                    );

                    return Ok(snapshot);
                }
                Err(gavel_db::Error::Conflict(_)) => {
                    debug!(%listing_id, %bidder, attempt, "lost bid write race, revalidating");
                    continue;
                }
                Err(e) => return Err(SubmitError::Storage(e)),
            }
        }

        Err(SubmitError::Contention)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gavel_types::test_utils::TestListingBuilder;
    use gavel_types::ListingType;

    async fn setup(listing: gavel_types::AuctionListing) -> (BidAcceptor, GavelDb, ListingId) {
        let db = GavelDb::new_in_memory().await.unwrap();
        let created = db.create_listing(&listing).await.unwrap();
        let rooms = RoomGateway::new(16);
        (BidAcceptor::new(db.clone(), rooms, 8), db, created.id)
    }

    #[tokio::test]
    async fn test_accepts_valid_bid_and_persists() {
        let (acceptor, db, id) = setup(
            TestListingBuilder::new(0)
                .with_seller(UserId(1))
                .with_start_bid(20)
                .build(),
        )
        .await;

        let snapshot = acceptor.submit(id, UserId(2), 20).await.unwrap();
        assert_eq!(snapshot.current_bid.amount, 20);
        assert_eq!(snapshot.highest_bids.get(UserId(2)), Some(20));

        let stored = db.get_auction_listing(id).await.unwrap().unwrap();
        let auction = stored.auction.unwrap();
        assert_eq!(auction.current_bid.unwrap().amount, 20);
        assert_eq!(auction.bid_history.len(), 1);
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn test_unknown_listing_is_not_found() {
        let db = GavelDb::new_in_memory().await.unwrap();
        let acceptor = BidAcceptor::new(db, RoomGateway::new(16), 8);

        let err = acceptor.submit(ListingId(404), UserId(2), 20).await.unwrap_err();
        assert!(matches!(err, SubmitError::NotFound));
    }

    #[tokio::test]
    async fn test_rejections_pass_through() {
        let (acceptor, _db, id) = setup(
            TestListingBuilder::new(0)
                .with_seller(UserId(1))
                .with_start_bid(20)
                .build(),
        )
        .await;

        // too low
        let err = acceptor.submit(id, UserId(2), 15).await.unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Rejected(BidError::BidTooLow { minimum: 20 })
        ));

        // seller
        let err = acceptor.submit(id, UserId(1), 50).await.unwrap_err();
        assert!(matches!(err, SubmitError::Rejected(BidError::SellerConflict)));
    }

    #[tokio::test]
    async fn test_non_auction_rejected() {
        let (acceptor, _db, id) = setup(
            TestListingBuilder::new(0)
                .with_seller(UserId(1))
                .with_type(ListingType::BuyNow)
                .build(),
        )
        .await;

        let err = acceptor.submit(id, UserId(2), 50).await.unwrap_err();
        assert!(matches!(err, SubmitError::Rejected(BidError::InvalidState)));
    }

    #[tokio::test]
    async fn test_expired_rejected() {
        let (acceptor, _db, id) =
            setup(TestListingBuilder::new(0).with_seller(UserId(1)).ended_ago_secs(5).build())
                .await;

        let err = acceptor.submit(id, UserId(2), 50).await.unwrap_err();
        assert!(matches!(err, SubmitError::Rejected(BidError::Expired)));
    }

    #[tokio::test]
    async fn test_racing_equal_bids_exactly_one_wins() {
        let (acceptor, db, id) = setup(
            TestListingBuilder::new(0)
                .with_seller(UserId(1))
                .with_start_bid(20)
                .build(),
        )
        .await;

        // both bidders submit the same amount concurrently against the
        // same empty state
        let a = acceptor.clone();
        let b = acceptor.clone();
        let (ra, rb) = tokio::join!(a.submit(id, UserId(2), 20), b.submit(id, UserId(3), 20));

        let accepted = [ra.is_ok(), rb.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(accepted, 1, "exactly one of two equal bids must win");

        // the loser was re-validated against the winner's committed state
        let loser = if ra.is_ok() { rb } else { ra };
        assert!(matches!(
            loser.unwrap_err(),
            SubmitError::Rejected(BidError::BidTooLow { minimum: 21 })
        ));

        let stored = db.get_auction_listing(id).await.unwrap().unwrap();
        let auction = stored.auction.unwrap();
        assert_eq!(auction.bid_history.len(), 1);
        assert_eq!(auction.current_bid.unwrap().amount, 20);
    }

    #[tokio::test]
    async fn test_accepted_bid_broadcasts_to_room() {
        let db = GavelDb::new_in_memory().await.unwrap();
        let created = db
            .create_listing(
                &TestListingBuilder::new(0)
                    .with_seller(UserId(1))
                    .with_start_bid(20)
                    .build(),
            )
            .await
            .unwrap();
        let rooms = RoomGateway::new(16);
        let acceptor = BidAcceptor::new(db, rooms.clone(), 8);

        let mut rx = rooms.join_room(created.id);
        acceptor.submit(created.id, UserId(2), 20).await.unwrap();

        let event = tokio::time::timeout(std::time::Duration::from_millis(100), rx.recv())
            .await
            .expect("room should receive the update")
            .unwrap();
        match event {
            RoomEvent::Update { current_bid, .. } => {
                assert_eq!(current_bid.expect("bid should be present").amount, 20)
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
