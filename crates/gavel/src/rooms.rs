//! real-time fan-out for auction watchers.
//!
//! the [`RoomGateway`] keeps one broadcast channel per watched auction
//! (the "room") and one per connected user (for private winner/seller
//! events). it is an explicitly constructed service handed down through
//! application state - never a process-wide singleton - so independent
//! instances can be tested in isolation. purely in-memory and scoped to
//! this process; a multi-process deployment would need an external
//! pub/sub layer behind `publish`/`publish_to_user`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::broadcast;

use gavel_types::{Bid, HighestBids, ListingId, UserId};

/// event delivered to every watcher of an auction room.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum RoomEvent {
    /// the auction's live state: pushed on every accepted bid, and as the
    /// initial snapshot when a watcher joins (no bids yet = null bid).
    #[serde(rename = "auction:update")]
    Update {
        /// the auction's listing.
        listing: ListingId,
        /// the current high bid, none if nobody has bid.
        current_bid: Option<Bid>,
        /// all bidders' highest accepted amounts.
        highest_bids: HighestBids,
    },
    /// the auction was finalized.
    #[serde(rename = "auction:end")]
    End {
        /// the auction's listing.
        listing: ListingId,
        /// the winning bidder, none if the auction had no bids.
        winner: Option<UserId>,
        /// the final accepted amount, none if the auction had no bids.
        final_bid: Option<u64>,
    },
}

/// private event delivered to one user's connections.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum UserEvent {
    /// you won this auction.
    #[serde(rename = "auction:won")]
    Won {
        /// the auction's listing.
        listing: ListingId,
        /// the winning amount.
        final_bid: u64,
    },
    /// your auction sold; here is the winner.
    #[serde(rename = "auction:winner")]
    Winner {
        /// the auction's listing.
        listing: ListingId,
        /// the winning amount.
        final_bid: u64,
        /// who won.
        winner: UserId,
    },
}

/// inner shared state for the gateway (shared across all clones).
struct GatewayInner {
    rooms: Mutex<HashMap<ListingId, broadcast::Sender<RoomEvent>>>,
    users: Mutex<HashMap<UserId, broadcast::Sender<UserEvent>>>,
    capacity: usize,
}

/// per-process fan-out of auction events to connected clients.
///
/// uses `tokio::sync::broadcast` for one-to-many delivery. all clones
/// share the same inner state, so publishing through any clone reaches
/// subscribers obtained from any other. a subscriber that falls more
/// than `capacity` events behind receives `RecvError::Lagged` and should
/// re-fetch a snapshot.
#[derive(Clone)]
pub struct RoomGateway {
    inner: Arc<GatewayInner>,
}

impl RoomGateway {
    /// create a new gateway with the given per-channel capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                rooms: Mutex::new(HashMap::new()),
                users: Mutex::new(HashMap::new()),
                capacity: capacity.max(1),
            }),
        }
    }

    /// join an auction room, creating it if this is the first watcher.
    ///
    /// the caller is responsible for sending the current snapshot to the
    /// new watcher before forwarding deltas from the returned receiver.
    pub fn join_room(&self, listing: ListingId) -> broadcast::Receiver<RoomEvent> {
        let mut rooms = self.inner.rooms.lock().expect("gateway mutex poisoned");
        rooms
            .entry(listing)
            .or_insert_with(|| broadcast::channel(self.inner.capacity).0)
            .subscribe()
    }

    /// subscribe to private events for a user.
    pub fn subscribe_user(&self, user: UserId) -> broadcast::Receiver<UserEvent> {
        let mut users = self.inner.users.lock().expect("gateway mutex poisoned");
        users
            .entry(user)
            .or_insert_with(|| broadcast::channel(self.inner.capacity).0)
            .subscribe()
    }

    /// deliver an event to every watcher of the auction's room.
    ///
    /// returns the number of watchers reached. publishing to a room with
    /// no watchers is a no-op, and empty rooms are pruned on the way.
    pub fn publish(&self, listing: ListingId, event: RoomEvent) -> usize {
        let mut rooms = self.inner.rooms.lock().expect("gateway mutex poisoned");
        match rooms.get(&listing) {
            Some(sender) => {
                if sender.receiver_count() == 0 {
                    rooms.remove(&listing);
                    return 0;
                }
                sender.send(event).unwrap_or(0)
            }
            None => 0,
        }
    }

    /// deliver a private event to all of one user's connections.
    ///
    /// returns the number of connections reached.
    pub fn publish_to_user(&self, user: UserId, event: UserEvent) -> usize {
        let mut users = self.inner.users.lock().expect("gateway mutex poisoned");
        match users.get(&user) {
            Some(sender) => {
                if sender.receiver_count() == 0 {
                    users.remove(&user);
                    return 0;
                }
                sender.send(event).unwrap_or(0)
            }
            None => 0,
        }
    }

    /// number of rooms currently tracked (for introspection and tests).
    pub fn room_count(&self) -> usize {
        self.inner.rooms.lock().expect("gateway mutex poisoned").len()
    }

    /// number of live watchers of one room.
    pub fn watcher_count(&self, listing: ListingId) -> usize {
        let rooms = self.inner.rooms.lock().expect("gateway mutex poisoned");
        rooms
            .get(&listing)
            .map(|s| s.receiver_count())
            .unwrap_or(0)
    }
}

impl Default for RoomGateway {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tokio::time::{Duration, timeout};

    fn update_event(listing: ListingId, amount: u64) -> RoomEvent {
        RoomEvent::Update {
            listing,
            current_bid: Some(Bid {
                bidder: UserId(2),
                amount,
                timestamp: Utc::now(),
            }),
            highest_bids: HighestBids::new(),
        }
    }

    #[tokio::test]
    async fn room_subscribers_all_receive() {
        let gateway = RoomGateway::new(16);
        let mut rx1 = gateway.join_room(ListingId(1));
        let mut rx2 = gateway.join_room(ListingId(1));

        let reached = gateway.publish(ListingId(1), update_event(ListingId(1), 20));
        assert_eq!(reached, 2);

        for rx in [&mut rx1, &mut rx2] {
            let event = timeout(Duration::from_millis(100), rx.recv())
                .await
                .expect("subscriber should receive")
                .unwrap();
            assert!(matches!(event, RoomEvent::Update { .. }));
        }
    }

    #[tokio::test]
    async fn rooms_are_isolated() {
        let gateway = RoomGateway::new(16);
        let mut rx_other = gateway.join_room(ListingId(2));

        gateway.publish(ListingId(1), update_event(ListingId(1), 20));

        let result = timeout(Duration::from_millis(50), rx_other.recv()).await;
        assert!(result.is_err(), "other room should not receive");
    }

    #[tokio::test]
    async fn publish_to_empty_room_is_noop() {
        let gateway = RoomGateway::new(16);
        assert_eq!(gateway.publish(ListingId(1), update_event(ListingId(1), 20)), 0);
    }

    #[tokio::test]
    async fn dropped_watchers_prune_the_room() {
        let gateway = RoomGateway::new(16);
        let rx = gateway.join_room(ListingId(1));
        assert_eq!(gateway.room_count(), 1);
        drop(rx);

        // next publish notices the empty room and prunes it
        assert_eq!(gateway.publish(ListingId(1), update_event(ListingId(1), 20)), 0);
        assert_eq!(gateway.room_count(), 0);
    }

    #[tokio::test]
    async fn user_events_reach_only_that_user() {
        let gateway = RoomGateway::new(16);
        let mut winner_rx = gateway.subscribe_user(UserId(3));
        let mut other_rx = gateway.subscribe_user(UserId(4));

        let reached = gateway.publish_to_user(
            UserId(3),
            UserEvent::Won {
                listing: ListingId(1),
                final_bid: 35,
            },
        );
        assert_eq!(reached, 1);

        let event = timeout(Duration::from_millis(100), winner_rx.recv())
            .await
            .expect("winner should receive")
            .unwrap();
        assert!(matches!(event, UserEvent::Won { final_bid: 35, .. }));

        let result = timeout(Duration::from_millis(50), other_rx.recv()).await;
        assert!(result.is_err(), "other user should not receive");
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let gateway = RoomGateway::new(16);
        let clone = gateway.clone();
        let mut rx = gateway.join_room(ListingId(1));

        clone.publish(ListingId(1), update_event(ListingId(1), 20));

        let result = timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(result.is_ok(), "clone should publish on shared channels");
    }

    #[test]
    fn test_event_wire_format() {
        let json = serde_json::to_value(update_event(ListingId(7), 20)).unwrap();
        assert_eq!(json["event"], "auction:update");
        assert_eq!(json["listing"], 7);
        assert_eq!(json["current_bid"]["amount"], 20);

        let end = RoomEvent::End {
            listing: ListingId(7),
            winner: Some(UserId(3)),
            final_bid: Some(35),
        };
        let json = serde_json::to_value(end).unwrap();
        assert_eq!(json["event"], "auction:end");
        assert_eq!(json["winner"], 3);

        let won = UserEvent::Winner {
            listing: ListingId(7),
            final_bid: 35,
            winner: UserId(3),
        };
        let json = serde_json::to_value(won).unwrap();
        assert_eq!(json["event"], "auction:winner");
    }
}
