//! persisted user notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ListingId, NotificationId, UserId};

/// what the notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// you won an auction.
    AuctionWon,
    /// your auction ended with a winner.
    AuctionSold,
    /// your auction ended without any bids.
    AuctionNoBids,
}

impl NotificationKind {
    /// string form used in the database column.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::AuctionWon => "auction_won",
            NotificationKind::AuctionSold => "auction_sold",
            NotificationKind::AuctionNoBids => "auction_no_bids",
        }
    }

    /// parse from the database column.
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "auction_won" => Some(NotificationKind::AuctionWon),
            "auction_sold" => Some(NotificationKind::AuctionSold),
            "auction_no_bids" => Some(NotificationKind::AuctionNoBids),
            _ => None,
        }
    }
}

/// a notification shown in a user's inbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// unique identifier.
    pub id: NotificationId,
    /// recipient.
    pub user: UserId,
    /// what this notification is about.
    pub kind: NotificationKind,
    /// short title.
    pub title: String,
    /// human-readable body.
    pub message: String,
    /// the listing this refers to, if any.
    pub listing: Option<ListingId>,
    /// whether the user has read it.
    pub read: bool,
    /// when the notification was created.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// create an unread notification.
    pub fn new(
        user: UserId,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        listing: Option<ListingId>,
    ) -> Self {
        Self {
            id: NotificationId(0),
            user,
            kind,
            title: title.into(),
            message: message.into(),
            listing,
            read: false,
            created_at: Utc::now(),
        }
    }
}
