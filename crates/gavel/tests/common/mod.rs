//! shared test utilities for bidding endpoint tests

#![allow(dead_code)] // Test utilities may not all be used in every test file

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use tower::ServiceExt;

use gavel::{RoomGateway, create_app};
use gavel_db::{Database, GavelDb};
use gavel_types::{AuctionListing, Config, ListingId, UserId, test_utils::TestListingBuilder};

/// test fixture containing database, gateway, and app.
pub struct BidTestFixture {
    pub db: GavelDb,
    pub rooms: RoomGateway,
    pub app: Router,
}

impl BidTestFixture {
    /// create a new fixture over an in-memory database.
    pub async fn new() -> Self {
        let db = GavelDb::new_in_memory().await.unwrap();
        let rooms = RoomGateway::new(16);
        let app = create_app(db.clone(), Config::default(), rooms.clone());
        Self { db, rooms, app }
    }

    /// seed an active auction listing: seller `UserId(1)`, start bid 20,
    /// ends in one hour. returns the created listing.
    pub async fn seed_auction(&self) -> AuctionListing {
        self.seed(TestListingBuilder::new(0).with_seller(UserId(1)).with_start_bid(20))
            .await
    }

    /// seed an arbitrary listing built from the given builder.
    pub async fn seed(&self, builder: TestListingBuilder) -> AuctionListing {
        self.db.create_listing(&builder.build()).await.unwrap()
    }

    /// POST /listings/{id}/bids as `user`.
    pub async fn place_bid(&self, listing: ListingId, user: UserId, amount: u64) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(format!("/listings/{}/bids", listing))
            .header("authorization", format!("Bearer {}", user))
            .header("content-type", "application/json")
            .body(Body::from(format!(r#"{{"amount":{}}}"#, amount)))
            .expect("failed to build request");

        self.app.clone().oneshot(request).await.expect("request failed")
    }

    /// GET /listings/{id}/bids as `user`.
    pub async fn bidding_status(&self, listing: ListingId, user: UserId) -> Response<Body> {
        let request = Request::builder()
            .method("GET")
            .uri(format!("/listings/{}/bids", listing))
            .header("authorization", format!("Bearer {}", user))
            .body(Body::empty())
            .expect("failed to build request");

        self.app.clone().oneshot(request).await.expect("request failed")
    }
}

/// read a response body as json.
pub async fn response_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&body).expect("failed to parse response body")
}
