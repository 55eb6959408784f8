//! auction state embedded in a listing.
//!
//! the [`AuctionRecord`] is the mutable aggregate at the heart of the
//! bidding subsystem: the current high bid, the append-only bid history,
//! per-bidder highest amounts, and the one-way active -> ended lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// lifecycle status of an auction. the transition is one-way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuctionStatus {
    /// accepting bids until the deadline passes.
    #[default]
    Active,
    /// finalized; no further bids are ever accepted.
    Ended,
}

impl AuctionStatus {
    /// string form used in the database column.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuctionStatus::Active => "active",
            AuctionStatus::Ended => "ended",
        }
    }

    /// parse from the database column. unknown or absent values are treated
    /// as active, matching the original document-store behavior.
    pub fn from_db(s: &str) -> Self {
        match s {
            "ended" => AuctionStatus::Ended,
            _ => AuctionStatus::Active,
        }
    }
}

/// one accepted bid. used both for the current high bid and for history entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    /// who placed the bid.
    pub bidder: UserId,
    /// bid amount in whole rupees.
    pub amount: u64,
    /// server-observed time the bid was accepted.
    pub timestamp: DateTime<Utc>,
}

/// one entry in [`HighestBids`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighestBidEntry {
    /// the bidder.
    pub user: UserId,
    /// that bidder's highest accepted amount so far.
    pub amount: u64,
}

/// per-bidder highest accepted amounts, ordered by user id.
///
/// this is deliberately an explicit ordered key-value structure rather than
/// a map type: the persisted form must round-trip through json, so the wire
/// representation is a sequence of `{user, amount}` entries in ascending
/// user order. serialize -> deserialize -> serialize is byte-stable.
/// per-user amounts only ever increase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HighestBids(Vec<HighestBidEntry>);

impl HighestBids {
    /// an empty mapping.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// build from arbitrary entries, sorting by user and keeping the
    /// maximum amount per user. used when loading persisted data.
    pub fn from_entries(entries: Vec<HighestBidEntry>) -> Self {
        let mut bids = Self::new();
        for entry in entries {
            bids.record(entry.user, entry.amount);
        }
        bids
    }

    /// record an accepted bid, raising the user's entry if the amount is
    /// higher than their previous best.
    pub fn record(&mut self, user: UserId, amount: u64) {
        match self.0.binary_search_by_key(&user, |e| e.user) {
            Ok(idx) => {
                let entry = &mut self.0[idx];
                entry.amount = entry.amount.max(amount);
            }
            Err(idx) => self.0.insert(idx, HighestBidEntry { user, amount }),
        }
    }

    /// the user's highest accepted amount, if they have bid.
    pub fn get(&self, user: UserId) -> Option<u64> {
        self.0
            .binary_search_by_key(&user, |e| e.user)
            .ok()
            .map(|idx| self.0[idx].amount)
    }

    /// number of distinct bidders.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// true if nobody has bid.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// iterate entries in ascending user order.
    pub fn iter(&self) -> impl Iterator<Item = &HighestBidEntry> {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for HighestBids {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // normalize on the way in so legacy/unordered data still upholds
        // the sorted-by-user invariant
        let entries = Vec::<HighestBidEntry>::deserialize(deserializer)?;
        Ok(Self::from_entries(entries))
    }
}

/// the mutable state of one listing's auction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionRecord {
    /// minimum accepted amount while no bids exist. immutable after start.
    pub start_bid: u64,

    /// deadline after which no further bids are accepted. immutable after start.
    pub end_time: DateTime<Utc>,

    /// lifecycle status.
    #[serde(default)]
    pub status: AuctionStatus,

    /// the highest accepted bid so far, none if no bids.
    pub current_bid: Option<Bid>,

    /// append-only history of accepted bids, insertion order preserved.
    #[serde(default)]
    pub bid_history: Vec<Bid>,

    /// per-bidder highest accepted amounts.
    #[serde(default)]
    pub highest_bids: HighestBids,

    /// set once at finalization, only if the history is non-empty.
    pub winner: Option<UserId>,
}

impl AuctionRecord {
    /// create a fresh auction with no bids.
    pub fn new(start_bid: u64, end_time: DateTime<Utc>) -> Self {
        Self {
            start_bid,
            end_time,
            status: AuctionStatus::Active,
            current_bid: None,
            bid_history: Vec::new(),
            highest_bids: HighestBids::new(),
            winner: None,
        }
    }

    /// the minimum amount the next bid must reach: one above the current
    /// high bid (or 0 when there is none), floored at the start bid. the
    /// +1 applies even before the first bid, so zero is never acceptable.
    pub fn min_acceptable(&self) -> u64 {
        let floor = self.current_bid.as_ref().map(|bid| bid.amount).unwrap_or(0) + 1;
        self.start_bid.max(floor)
    }

    /// true if at least one bid has been accepted.
    pub fn has_bids(&self) -> bool {
        !self.bid_history.is_empty()
    }

    /// true if the auction still accepts bids at `now`.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.status == AuctionStatus::Active && now < self.end_time
    }
}
