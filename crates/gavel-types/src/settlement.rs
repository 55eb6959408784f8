//! settlement records.
//!
//! a settlement is the downstream sale record linking listing, buyer and
//! seller at an agreed amount. the auction core creates exactly one per
//! finalized auction with bids; payment happens elsewhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ListingId, SettlementId, UserId};

/// what kind of sale produced the settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementKind {
    /// winner of an expired auction.
    Auction,
}

impl SettlementKind {
    /// string form used in the database column.
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementKind::Auction => "auction",
        }
    }
}

/// settlement lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    /// created, awaiting seller acknowledgement.
    Pending,
    /// both sides agreed, payment pending.
    Approved,
    /// payment done.
    Completed,
    /// under dispute.
    Disputed,
}

impl SettlementStatus {
    /// string form used in the database column.
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementStatus::Pending => "pending",
            SettlementStatus::Approved => "approved",
            SettlementStatus::Completed => "completed",
            SettlementStatus::Disputed => "disputed",
        }
    }

    /// parse from the database column.
    pub fn from_db(s: &str) -> Self {
        match s {
            "approved" => SettlementStatus::Approved,
            "completed" => SettlementStatus::Completed,
            "disputed" => SettlementStatus::Disputed,
            _ => SettlementStatus::Pending,
        }
    }
}

/// a sale record pending payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    /// unique identifier.
    pub id: SettlementId,
    /// the listing that was sold.
    pub listing: ListingId,
    /// the buyer (auction winner).
    pub buyer: UserId,
    /// the seller.
    pub seller: UserId,
    /// agreed amount in whole rupees.
    pub amount: u64,
    /// what kind of sale produced this record.
    pub kind: SettlementKind,
    /// lifecycle status.
    pub status: SettlementStatus,
    /// when the settlement was created.
    pub created_at: DateTime<Utc>,
}

impl Settlement {
    /// the settlement an auction finalization writes: approved, no payment yet.
    pub fn for_auction(listing: ListingId, buyer: UserId, seller: UserId, amount: u64) -> Self {
        Self {
            id: SettlementId(0),
            listing,
            buyer,
            seller,
            amount,
            kind: SettlementKind::Auction,
            status: SettlementStatus::Approved,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auction_settlement_defaults() {
        let s = Settlement::for_auction(ListingId(1), UserId(2), UserId(3), 35);
        assert_eq!(s.kind, SettlementKind::Auction);
        assert_eq!(s.status, SettlementStatus::Approved);
        assert_eq!(s.amount, 35);
    }

    #[test]
    fn test_status_db_round_trip() {
        for status in [
            SettlementStatus::Pending,
            SettlementStatus::Approved,
            SettlementStatus::Completed,
            SettlementStatus::Disputed,
        ] {
            assert_eq!(SettlementStatus::from_db(status.as_str()), status);
        }
    }
}
