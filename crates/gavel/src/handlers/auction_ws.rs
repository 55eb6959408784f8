//! live auction WebSocket handler.
//!
//! a client connects to `/listings/{id}/auction/ws` with a verified
//! identity, which joins it to that auction's room. the server pushes
//! the current snapshot first (late joiners see live state, not just
//! future deltas), then forwards room events and the caller's private
//! winner/seller events as they happen. the client may submit bids over
//! the same connection with `{"event":"auction:bid","amount":N}`;
//! rejections go back to that socket only as `auction:error`.

use axum::{
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use gavel_db::Database;
use gavel_types::{ListingId, ListingType, UserId};

use crate::AppState;
use crate::acceptor::SubmitError;
use crate::rooms::RoomEvent;
use super::auth::AuthedUser;
use super::error::ApiError;

/// inbound client messages.
#[derive(Debug, Deserialize)]
#[serde(tag = "event")]
enum ClientMessage {
    /// submit a bid on the watched auction.
    #[serde(rename = "auction:bid")]
    Bid {
        /// bid amount in whole rupees.
        amount: u64,
    },
}

/// error event sent back to the offending socket only.
#[derive(Debug, Serialize)]
struct ErrorEvent {
    event: &'static str,
    message: String,
}

impl ErrorEvent {
    fn new(message: impl Into<String>) -> Self {
        Self {
            event: "auction:error",
            message: message.into(),
        }
    }
}

/// GET /listings/{id}/auction/ws - watch an auction live.
pub async fn auction_ws(
    State(state): State<AppState>,
    Path(listing_id): Path<u64>,
    user: AuthedUser,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let listing_id = ListingId(listing_id);

    // validate before upgrading so a bad room join fails as plain http
    let listing = state
        .db
        .get_auction_listing(listing_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Listing not found"))?;
    if listing.listing_type != ListingType::Auction {
        return Err(ApiError::bad_request("Listing is not an auction type"));
    }

    Ok(ws.on_upgrade(move |socket| watch_auction(state, listing_id, user.0, socket)))
}

async fn watch_auction(state: AppState, listing_id: ListingId, user: UserId, socket: WebSocket) {
    let mut room_rx = state.rooms.join_room(listing_id);
    let mut user_rx = state.rooms.subscribe_user(user);
    let (mut sink, mut stream) = socket.split();

    debug!(%listing_id, %user, "watcher joined auction room");

    // snapshot first
    if let Some(snapshot) = snapshot_event(&state, listing_id).await
        && send_event(&mut sink, &snapshot).await.is_err()
    {
        return;
    }

    loop {
        tokio::select! {
            event = room_rx.recv() => match event {
                Ok(event) => {
                    if send_event(&mut sink, &event).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    // dropped deltas; resync from a fresh snapshot
                    debug!(%listing_id, skipped, "watcher lagged, resyncing");
                    if let Some(snapshot) = snapshot_event(&state, listing_id).await
                        && send_event(&mut sink, &snapshot).await.is_err()
                    {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            },
            event = user_rx.recv() => match event {
                Ok(event) => {
                    if send_event(&mut sink, &event).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            },
            message = stream.next() => {
                if !handle_inbound(&state, listing_id, user, message, &mut sink).await {
                    break;
                }
            }
        }
    }

    debug!(%listing_id, %user, "watcher left auction room");
}

/// the current auction state as an update event, for join and resync.
async fn snapshot_event(state: &AppState, listing_id: ListingId) -> Option<RoomEvent> {
    let listing = state.db.get_auction_listing(listing_id).await.ok()??;
    let auction = listing.auction?;
    Some(RoomEvent::Update {
        listing: listing_id,
        current_bid: auction.current_bid,
        highest_bids: auction.highest_bids,
    })
}

async fn send_event<E: Serialize>(
    sink: &mut SplitSink<WebSocket, Message>,
    event: &E,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(event).map_err(axum::Error::new)?;
    sink.send(Message::Text(json.into())).await
}

/// process one inbound frame. returns false when the connection is done.
async fn handle_inbound(
    state: &AppState,
    listing_id: ListingId,
    user: UserId,
    message: Option<Result<Message, axum::Error>>,
    sink: &mut SplitSink<WebSocket, Message>,
) -> bool {
    match message {
        Some(Ok(Message::Text(text))) => {
            match serde_json::from_str::<ClientMessage>(text.as_str()) {
                Ok(ClientMessage::Bid { amount }) => {
                    // an accepted bid comes back through the room channel;
                    // only rejections are answered directly
                    if let Err(err) = state.acceptor.submit(listing_id, user, amount).await {
                        let event = ErrorEvent::new(user_message(&err));
                        if send_event(sink, &event).await.is_err() {
                            return false;
                        }
                    }
                    true
                }
                Err(_) => {
                    let event = ErrorEvent::new("Unrecognized message");
                    send_event(sink, &event).await.is_ok()
                }
            }
        }
        // axum answers pings itself; binary frames are ignored
        Some(Ok(Message::Close(_))) | None => false,
        Some(Ok(_)) => true,
        Some(Err(_)) => false,
    }
}

/// the reason string shown to the bidder; storage details stay internal.
fn user_message(err: &SubmitError) -> String {
    match err {
        SubmitError::Storage(_) => "Internal error".to_string(),
        other => other.to_string(),
    }
}
