//! gavel library - HTTP handlers and application setup.
//!
//! this crate provides the auction service for the campus marketplace:
//! - [`handlers`]: http and websocket request handlers
//! - [`cli`]: command-line interface implementation
//! - [`rooms`]: per-auction broadcast fan-out to connected watchers
//! - [`sweeper`]: recurring expiry sweep that finalizes ended auctions
//! - [`acceptor`]: bid validation and the per-listing write serialization

#![warn(missing_docs)]

/// bid acceptance and the optimistic retry loop.
pub mod acceptor;
/// command-line interface implementation.
pub mod cli;
/// http and websocket request handlers.
pub mod handlers;
mod notify;
mod rooms;
/// recurring expiry sweep.
pub mod sweeper;

pub use acceptor::{AuctionSnapshot, BidAcceptor, SubmitError};
pub use notify::NotificationDispatcher;
pub use rooms::{RoomEvent, RoomGateway, UserEvent};
pub use sweeper::{ExpirySweeper, SweepStats};

use axum::{
    Router,
    routing::{get, post},
};
use gavel_db::GavelDb;
use gavel_types::Config;

/// shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// database connection for persistent storage.
    pub db: GavelDb,
    /// server configuration.
    pub config: Config,
    /// broadcast gateway for auction rooms and private user events.
    pub rooms: RoomGateway,
    /// bid acceptor shared by the rest and websocket paths.
    pub acceptor: BidAcceptor,
}

/// create the axum application with all routes.
///
/// the room gateway is injected rather than constructed here so the
/// caller (server startup, tests) can share it with the expiry sweeper.
pub fn create_app(db: GavelDb, config: Config, rooms: RoomGateway) -> Router {
    let acceptor = BidAcceptor::new(db.clone(), rooms.clone(), config.auction.bid_retry_limit);

    let state = AppState {
        db,
        config,
        rooms,
        acceptor,
    };

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/listings/{id}/bids",
            post(handlers::place_bid).get(handlers::bidding_status),
        )
        .route("/listings/{id}/auction/ws", get(handlers::auction_ws))
        .with_state(state)
}
