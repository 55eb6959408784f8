//! http and websocket request handlers.

mod auction_ws;
mod auth;
mod bids;
mod error;
mod health;

pub use auction_ws::auction_ws;
pub use auth::AuthedUser;
pub use bids::{bidding_status, place_bid};
pub use error::ApiError;
pub use health::health;
