//! notification dispatch.
//!
//! persists inbox notifications written at auction finalization.
//! dispatch is fire-and-forget: a failed write is logged and swallowed,
//! because settlement and notification are eventually-consistent
//! concerns that must never block or roll back an auction's own state
//! transition.

use tracing::warn;

use gavel_db::{Database, GavelDb};
use gavel_types::{ListingId, Notification, NotificationKind, UserId};

/// writes inbox notifications, swallowing downstream failures.
#[derive(Clone)]
pub struct NotificationDispatcher {
    db: GavelDb,
}

impl NotificationDispatcher {
    /// create a new dispatcher.
    pub fn new(db: GavelDb) -> Self {
        Self { db }
    }

    /// persist one notification. failures are logged, never returned.
    pub async fn dispatch(
        &self,
        user: UserId,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        listing: Option<ListingId>,
    ) {
        let notification = Notification::new(user, kind, title, message, listing);
        if let Err(e) = self.db.create_notification(&notification).await {
            warn!(%user, kind = kind.as_str(), error = %e, "failed to write notification");
        }
    }
}
