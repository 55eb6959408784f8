//! auction expiry sweep.
//!
//! a recurring background task that scans for auctions past their
//! deadline and finalizes each exactly once: winner determination, the
//! terminal status flip, the settlement record, and notifications. the
//! scan predicate (active + deadline passed) is the idempotence guard -
//! once the guarded status flip commits, later sweeps no longer select
//! the row. finalization latency is bounded by the sweep interval, which
//! is a stated contract of the polling design, not a bug.

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use gavel_auction::FinalOutcome;
use gavel_db::{Database, GavelDb};
use gavel_types::{AuctionListing, NotificationKind, Settlement};

use crate::notify::NotificationDispatcher;
use crate::rooms::{RoomEvent, RoomGateway, UserEvent};

/// what one sweep pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// auctions finalized with a winner (settlement created).
    pub sold: usize,
    /// auctions finalized without bids (listing archived).
    pub archived: usize,
    /// due auctions left for a later sweep (write race or error).
    pub skipped: usize,
}

/// recurring task that finalizes expired auctions.
#[derive(Clone)]
pub struct ExpirySweeper {
    db: GavelDb,
    rooms: RoomGateway,
    notifications: NotificationDispatcher,
    interval: Duration,
}

impl ExpirySweeper {
    /// create a new sweeper.
    pub fn new(
        db: GavelDb,
        rooms: RoomGateway,
        notifications: NotificationDispatcher,
        interval_secs: u64,
    ) -> Self {
        Self {
            db,
            rooms,
            notifications,
            interval: Duration::from_secs(interval_secs.max(1)),
        }
    }

    /// run one sweep pass over all due auctions.
    ///
    /// a failure finalizing one auction never stops the others; errors
    /// are logged at per-auction granularity and the row stays selected
    /// for the next pass.
    pub async fn sweep(&self) -> SweepStats {
        let now = Utc::now();
        let due = match self.db.list_due_auctions(now).await {
            Ok(due) => due,
            Err(e) => {
                warn!(error = %e, "expiry sweep scan failed");
                return SweepStats::default();
            }
        };

        if !due.is_empty() {
            debug!(count = due.len(), "expiry sweep found due auctions");
        }

        let mut stats = SweepStats::default();
        for listing in due {
            let id = listing.id;
            match self.finalize_one(listing).await {
                Ok(Some(FinalOutcome::Won { .. })) => stats.sold += 1,
                Ok(Some(FinalOutcome::NoBids)) => stats.archived += 1,
                Ok(None) => stats.skipped += 1,
                Err(e) => {
                    warn!(%id, error = %e, "failed to finalize auction");
                    stats.skipped += 1;
                }
            }
        }
        stats
    }

    /// finalize a single due auction.
    ///
    /// the terminal transition goes through the same version-guarded
    /// write that bids use, so a bid racing the sweep and this write
    /// compete for one write slot: losing the race means a bid landed
    /// after our read, and the auction is simply re-selected next tick.
    /// all post-commit effects (broadcast, settlement, notifications)
    /// are downstream of the committed flip and are best-effort.
    async fn finalize_one(
        &self,
        mut listing: AuctionListing,
    ) -> Result<Option<FinalOutcome>, gavel_db::Error> {
        let id = listing.id;
        let seller = listing.seller;
        let title = listing.title.clone();
        let version = listing.version;

        let Some(outcome) = gavel_auction::finalize(&mut listing) else {
            return Ok(None);
        };
        let Some(auction) = listing.auction.as_ref() else {
            return Ok(None);
        };

        match self
            .db
            .update_auction(id, version, auction, Some(listing.status))
            .await
        {
            Ok(_) => {}
            Err(gavel_db::Error::Conflict(_)) => {
                debug!(%id, "bid raced finalization, leaving for next sweep");
                return Ok(None);
            }
            Err(e) => return Err(e),
        }

        match &outcome {
            FinalOutcome::Won { winner, amount } => {
                self.rooms.publish(
                    id,
                    RoomEvent::End {
                        listing: id,
                        winner: Some(*winner),
                        final_bid: Some(*amount),
                    },
                );
                self.rooms.publish_to_user(
                    *winner,
                    UserEvent::Won {
                        listing: id,
                        final_bid: *amount,
                    },
                );
                self.rooms.publish_to_user(
                    seller,
                    UserEvent::Winner {
                        listing: id,
                        final_bid: *amount,
                        winner: *winner,
                    },
                );

                // the committed status flip above is what guarantees this
                // runs at most once per auction
                let settlement = Settlement::for_auction(id, *winner, seller, *amount);
                if let Err(e) = self.db.create_settlement(&settlement).await {
                    warn!(%id, error = %e, "failed to create settlement for finalized auction");
                }

                self.notifications
                    .dispatch(
                        *winner,
                        NotificationKind::AuctionWon,
                        "Auction won",
                        format!("You won \"{}\" with a final bid of ₹{}", title, amount),
                        Some(id),
                    )
                    .await;
                self.notifications
                    .dispatch(
                        seller,
                        NotificationKind::AuctionSold,
                        "Auction ended",
                        format!("\"{}\" sold for ₹{}", title, amount),
                        Some(id),
                    )
                    .await;

                info!(%id, winner = %winner, amount, "auction finalized with winner");
            }
            FinalOutcome::NoBids => {
                self.rooms.publish(
                    id,
                    RoomEvent::End {
                        listing: id,
                        winner: None,
                        final_bid: None,
                    },
                );
                self.notifications
                    .dispatch(
                        seller,
                        NotificationKind::AuctionNoBids,
                        "Auction ended",
                        format!("No bids were received for \"{}\"", title),
                        Some(id),
                    )
                    .await;

                info!(%id, "auction expired without bids, listing archived");
            }
        }

        Ok(Some(outcome))
    }

    /// spawn the background sweep task.
    ///
    /// ticks every configured interval until the returned handle is
    /// dropped or aborted. an overrunning sweep delays the next tick
    /// instead of overlapping it.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                interval_secs = self.interval.as_secs(),
                "starting auction expiry sweeper"
            );

            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let stats = self.sweep().await;
                if stats != SweepStats::default() {
                    debug!(
                        sold = stats.sold,
                        archived = stats.archived,
                        skipped = stats.skipped,
                        "expiry sweep completed"
                    );
                }
            }
        })
    }
}
